#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless driver that replays scripted input against a Squirm level.

mod script;
mod session;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use squirm_system_controls::KeyboardLayout;
use squirm_system_cues::VoiceGender;
use squirm_world::{load_layout, parse_layout};
use tracing_subscriber::EnvFilter;

use crate::session::Session;

const BUNDLED_LEVEL: &str = include_str!("../assets/levels/level1.toml");
const BUNDLED_SCRIPT: &str = include_str!("../assets/scripts/opening.txt");

/// Command-line options for the headless driver.
#[derive(Debug, Parser)]
#[command(name = "squirm", version, about = "Replays scripted input against a Squirm level")]
struct Args {
    /// Level file to load instead of the bundled first level.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,

    /// Input script to replay instead of the bundled opening.
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,

    /// Length of one simulated frame in milliseconds.
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Keyboard layout used to resolve the movement keys.
    #[arg(long, default_value = "qwerty")]
    keyboard: KeyboardLayout,

    /// Voice used for screams, panting and the closing line.
    #[arg(long, default_value = "female")]
    voice: VoiceGender,

    /// Print the final summary as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    ensure!(args.frame_ms > 0, "--frame-ms must be positive");

    let layout = match &args.level {
        Some(path) => load_layout(path)?,
        None => parse_layout(BUNDLED_LEVEL).context("bundled level is invalid")?,
    };
    let source = match &args.script {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?,
        None => BUNDLED_SCRIPT.to_owned(),
    };
    let steps = script::parse_script(&source)?;

    let mut session = Session::new(
        layout,
        args.keyboard,
        args.voice,
        Duration::from_millis(args.frame_ms),
    )?;
    session.run(&steps);

    let summary = session.summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
    }
    Ok(())
}
