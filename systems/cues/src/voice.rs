//! Voice selection for the spoken cues.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use squirm_core::{Cue, CueSink};
use thiserror::Error;

/// Recorded voice used for screams, panting and the closing line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceGender {
    /// Female voice recordings.
    #[default]
    Female,
    /// Male voice recordings.
    Male,
}

impl VoiceGender {
    /// Sample played for the cue; effect cues ignore the voice.
    #[must_use]
    pub const fn sample(self, cue: Cue) -> &'static str {
        match (cue, self) {
            (Cue::Scream1, Self::Female) => "scream-1-female",
            (Cue::Scream1, Self::Male) => "scream-1-male",
            (Cue::Scream2, Self::Female) => "scream-2-female",
            (Cue::Scream2, Self::Male) => "scream-2-male",
            (Cue::Pant, Self::Female) => "pant-female",
            (Cue::Pant, Self::Male) => "pant-male",
            (Cue::Insane, Self::Female) => "insane-female",
            (Cue::Insane, Self::Male) => "insane-male",
            (other, _) => other.name(),
        }
    }
}

/// Error returned when a voice name is not recognised.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown voice `{0}`, expected female or male")]
pub struct UnknownVoice(String);

impl FromStr for VoiceGender {
    type Err = UnknownVoice;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "female" => Ok(Self::Female),
            "male" => Ok(Self::Male),
            _ => Err(UnknownVoice(value.to_owned())),
        }
    }
}

/// Audio backend that plays resolved samples by name.
pub trait SampleSink {
    /// Plays the named sample immediately.
    fn play_sample(&mut self, sample: &'static str);
}

impl SampleSink for Vec<&'static str> {
    fn play_sample(&mut self, sample: &'static str) {
        self.push(sample);
    }
}

/// Cue sink that resolves voice cues to the selected recordings.
#[derive(Debug, Default)]
pub struct VoicedSink<S> {
    voice: VoiceGender,
    backend: S,
}

impl<S> VoicedSink<S> {
    /// Wraps the backend, speaking with the provided voice.
    pub const fn new(voice: VoiceGender, backend: S) -> Self {
        Self { voice, backend }
    }

    /// Voice the sink speaks with.
    #[must_use]
    pub const fn voice(&self) -> VoiceGender {
        self.voice
    }

    /// Changes the voice for cues played from now on.
    pub fn set_voice(&mut self, voice: VoiceGender) {
        self.voice = voice;
    }

    /// Wrapped backend.
    #[must_use]
    pub const fn backend(&self) -> &S {
        &self.backend
    }
}

impl<S: SampleSink> CueSink for VoicedSink<S> {
    fn play_cue(&mut self, cue: Cue) {
        self.backend.play_sample(self.voice.sample(cue));
    }
}
