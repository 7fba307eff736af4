//! Plain-text input scripts replayed by the headless driver.
//!
//! One instruction per line; `#` starts a comment.
//!
//! ```text
//! begin            leave the title screen
//! hold <keys> <ms> hold the labelled keys for the given time
//! wait <ms>        hold nothing for the given time
//! bend <offset>    move the pointer to a vertical offset in -1..=1
//! ```

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use squirm_system_controls::Key;

/// Single scripted instruction.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Step {
    Begin,
    Hold { keys: Vec<Key>, duration: Duration },
    Wait(Duration),
    Bend(f32),
}

/// Parses a script, reporting the first malformed line.
pub(crate) fn parse_script(source: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let step = parse_line(line).with_context(|| format!("script line {}", index + 1))?;
        steps.push(step);
    }
    Ok(steps)
}

fn parse_line(line: &str) -> Result<Step> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["begin"] => Ok(Step::Begin),
        ["hold", keys, millis] => Ok(Step::Hold {
            keys: parse_keys(keys)?,
            duration: parse_millis(millis)?,
        }),
        ["wait", millis] => Ok(Step::Wait(parse_millis(millis)?)),
        ["bend", offset] => {
            let offset: f32 = offset
                .parse()
                .with_context(|| format!("invalid bend offset `{offset}`"))?;
            Ok(Step::Bend(offset))
        }
        _ => bail!("unrecognised instruction `{line}`"),
    }
}

fn parse_keys(labels: &str) -> Result<Vec<Key>> {
    labels
        .chars()
        .map(|label| Key::from_char(label).ok_or_else(|| anyhow!("unbound key `{label}`")))
        .collect()
}

fn parse_millis(value: &str) -> Result<Duration> {
    let millis: u64 = value
        .trim_end_matches("ms")
        .parse()
        .with_context(|| format!("invalid duration `{value}`"))?;
    Ok(Duration::from_millis(millis))
}
