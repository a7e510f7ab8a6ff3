mod console;
mod inspect;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use fitfighter_core::audio::AudioPlayer;
use fitfighter_core::gameplay::{
    ComboConfig, ComboEngine, FriendFoeConfig, FriendFoeEngine, RhythmConfig, RhythmEngine,
    TimeLimit,
};
use fitfighter_core::session::{run_session, Engine, Rig, ShutdownSignal};
use fitfighter_core::time::{Clock, MonotonicClock};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rig_schema::{RigConfig, SessionResult};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::console::{ConsoleStrip, StdinButtons};

#[derive(Debug, Parser)]
#[command(name = "fitfighter")]
#[command(about = "Game engine for the eight-pad boxing rig", long_about = None)]
struct Cli {
    /// Rig configuration (JSON). Missing or invalid files fall back to defaults.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print the session result as JSON instead of result lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Combo drill: reactive targets on tier 1, preview-and-replicate on tiers 2-4.
    Combo {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
        tier: u8,
        /// Session length in seconds.
        #[arg(short, long, default_value_t = 60)]
        time: u32,
        /// Play until out of lives.
        #[arg(long)]
        endless: bool,
    },
    /// Friend-or-Foe: strike foes, spare friends.
    FriendFoe {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=4))]
        level: u8,
        #[arg(short, long, default_value_t = 60)]
        time: u32,
    },
    /// Rhythm: play a beatmap against a song.
    Rhythm {
        tier: u8,
        audio: PathBuf,
        beatmap: PathBuf,
    },
    /// Print a per-pad timeline of a beatmap.
    Inspect { beatmap: PathBuf },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("fitfighter=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Command::Combo {
            tier,
            time,
            endless,
        } => {
            let limit = if endless {
                TimeLimit::Endless
            } else {
                TimeLimit::Seconds(time.max(1) as f64)
            };
            let engine = ComboEngine::new(ComboConfig::for_tier(tier, limit), StdRng::from_entropy());
            let result = run_game(engine, &config, Arc::new(MonotonicClock::new()))?;
            report(&result, cli.json)?;
        }
        Command::FriendFoe { level, time } => {
            let limit = TimeLimit::Seconds(time.max(1) as f64);
            let engine =
                FriendFoeEngine::new(FriendFoeConfig::for_level(level, limit), StdRng::from_entropy());
            let result = run_game(engine, &config, Arc::new(MonotonicClock::new()))?;
            report(&result, cli.json)?;
        }
        Command::Rhythm {
            tier,
            audio,
            beatmap,
        } => {
            // Inputs are validated before any hardware is touched.
            let map = beatmap_compiler::compile_file_with_offsets(&beatmap, config.beatmap_offsets.clone())
                .with_context(|| format!("beatmap load failed: {}", beatmap.display()))?;
            info!(
                beats = map.len(),
                offset = map.offset_s,
                "loaded {}",
                beatmap.display()
            );

            let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());
            let player = open_player(&audio, clock.clone())
                .with_context(|| format!("audio load failed: {}", audio.display()))?;
            let engine = RhythmEngine::new(RhythmConfig::for_tier(tier), &map, player);
            let result = run_game(engine, &config, clock)?;
            report(&result, cli.json)?;
        }
        Command::Inspect { beatmap } => {
            let map = beatmap_compiler::compile_file_with_offsets(&beatmap, config.beatmap_offsets.clone())
                .with_context(|| format!("beatmap load failed: {}", beatmap.display()))?;
            inspect::print_timeline(&map);
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> RigConfig {
    let Some(path) = path else {
        return RigConfig::default();
    };
    let loaded = fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|text| serde_json::from_str::<RigConfig>(&text).map_err(anyhow::Error::from));
    match loaded {
        Ok(c) => {
            info!("Loaded config from {:?}", path);
            c
        }
        Err(e) => {
            warn!("Failed to load config: {}, using defaults", e);
            RigConfig::default()
        }
    }
}

#[cfg(feature = "playback")]
fn open_player(path: &Path, _clock: Arc<dyn Clock>) -> anyhow::Result<impl AudioPlayer> {
    let clip = fitfighter_core::audio::AudioClip::load_wav(path)?;
    Ok(fitfighter_core::audio::StreamPlayer::new(clip))
}

#[cfg(not(feature = "playback"))]
fn open_player(path: &Path, clock: Arc<dyn Clock>) -> anyhow::Result<impl AudioPlayer> {
    warn!("built without audio output; the song clock runs silently");
    Ok(fitfighter_core::audio::ClockPlayer::from_wav(path, clock)?)
}

fn run_game<E: Engine>(
    engine: E,
    config: &RigConfig,
    clock: Arc<dyn Clock>,
) -> anyhow::Result<SessionResult> {
    let signal = ShutdownSignal::new();
    let handler_signal = signal.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        handler_signal.trigger();
    })
    .context("failed to install signal handler")?;

    let mut rig = Rig::new(ConsoleStrip::new(config.led_count));
    rig.attach_buttons(Box::new(StdinButtons::new()), clock.clone())
        .context("failed to attach buttons")?;

    let result = run_session(
        engine,
        &mut rig,
        clock.as_ref(),
        &signal,
        Duration::from_millis(config.poll_timeout_ms),
    )
    .context("session failed")?;
    Ok(result)
}

fn report(result: &SessionResult, json: bool) -> anyhow::Result<()> {
    if json {
        let text = serde_json::to_string_pretty(result).context("failed to serialize result")?;
        println!("{text}");
    } else {
        for line in result.result_lines() {
            println!("{line}");
        }
    }
    Ok(())
}
