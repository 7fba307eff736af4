//! Flat in-memory scene used by headless adapters and tests.

use glam::{Quat, Vec3};
use squirm_core::{EntityId, Scene};

/// Transform stored for a single entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Position relative to the scene root.
    pub position: Vec3,
    /// Orientation of the entity.
    pub rotation: Quat,
    /// Per-axis scale.
    pub scale: Vec3,
}

/// Scene without parenting; local and world positions coincide.
#[derive(Clone, Debug, Default)]
pub struct SceneGraph {
    transforms: Vec<Transform>,
}

impl SceneGraph {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform of the entity, if it exists.
    #[must_use]
    pub fn transform(&self, entity: EntityId) -> Option<&Transform> {
        self.transforms.get(entity.get() as usize)
    }

    /// Number of entities created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Reports whether the scene holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    fn transform_mut(&mut self, entity: EntityId) -> Option<&mut Transform> {
        self.transforms.get_mut(entity.get() as usize)
    }
}

impl Scene for SceneGraph {
    fn make_entity(&mut self, position: Vec3, scale: Vec3) -> EntityId {
        let id = EntityId::new(self.transforms.len() as u32);
        self.transforms.push(Transform {
            position,
            rotation: Quat::IDENTITY,
            scale,
        });
        id
    }

    fn set_position(&mut self, entity: EntityId, position: Vec3) {
        if let Some(transform) = self.transform_mut(entity) {
            transform.position = position;
        }
    }

    fn set_rotation(&mut self, entity: EntityId, rotation: Quat) {
        if let Some(transform) = self.transform_mut(entity) {
            transform.rotation = rotation;
        }
    }

    fn set_position_and_rotation(&mut self, entity: EntityId, position: Vec3, rotation: Quat) {
        if let Some(transform) = self.transform_mut(entity) {
            transform.position = position;
            transform.rotation = rotation;
        }
    }

    fn world_position(&self, entity: EntityId) -> Vec3 {
        self.local_position(entity)
    }

    // Unknown entities read as the origin.
    fn local_position(&self, entity: EntityId) -> Vec3 {
        self.transform(entity)
            .map_or(Vec3::ZERO, |transform| transform.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entities_receive_sequential_handles() {
        let mut scene = SceneGraph::new();
        let first = scene.make_entity(Vec3::ZERO, Vec3::ONE);
        let second = scene.make_entity(Vec3::X, Vec3::ONE);
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn position_and_rotation_updates_are_independent() {
        let mut scene = SceneGraph::new();
        let entity = scene.make_entity(Vec3::ZERO, Vec3::ONE);
        let turn = Quat::from_rotation_y(1.0);

        scene.set_rotation(entity, turn);
        scene.set_position(entity, Vec3::new(1.0, 2.0, 3.0));

        let transform = scene.transform(entity).copied().expect("entity exists");
        assert_eq!(transform.rotation, turn);
        assert_eq!(scene.world_position(entity), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn unknown_entities_are_ignored() {
        let mut scene = SceneGraph::new();
        scene.set_position(EntityId::new(4), Vec3::ONE);
        assert_eq!(scene.local_position(EntityId::new(4)), Vec3::ZERO);
        assert!(scene.is_empty());
    }
}
