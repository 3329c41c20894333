// Headless driver: plays a level from sensors or autoplay, checks beat maps
// and prints stored scores.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};

use horizons::config::GameSettings;
use horizons::database::{JsonScoreStore, LevelScores, ScoreStore};
use horizons::input::{ClapWriter, InputFusion, detection_channel};
use horizons::model::{BeatMap, BeatMapFormat, LevelCatalogue, LevelId};
use horizons::play::{Autoplay, NullSpawnSink, PlaySession, SessionConfig};
use horizons::sensor::{JsonLinesLandmarkSource, PoseConfig, SensorHub};
use horizons::state::{PlayScreen, ScreenExit};
use horizons::traits::input::ActionSource;
use horizons::traits::time::{SystemTimeProvider, TimeProvider};
use horizons::util::init_logging;

/// How long shutdown waits for sensor threads.
const SENSOR_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Parser, Debug)]
#[command(name = "horizons", about = "Pose and clap driven rhythm game engine")]
struct Args {
    /// Path to the settings JSON file.
    #[arg(long, global = true, env = "HORIZONS_SETTINGS")]
    settings: Option<PathBuf>,

    /// Path to the score JSON file.
    #[arg(long, global = true, env = "HORIZONS_SCORES")]
    scores: Option<PathBuf>,

    /// Also write logs to a daily rolling file in this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a level until it finishes.
    Play {
        /// Beat map to play. Defaults to the level's bundled track.
        beatmap: Option<PathBuf>,

        /// Level id the result is stored under.
        #[arg(long)]
        level: String,

        #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
        format: FormatArg,

        /// Play the map perfectly with scripted input.
        #[arg(long)]
        autoplay: bool,

        /// Run the pose and clap sensors regardless of settings.
        #[arg(long)]
        sensors: bool,

        /// Read pose frames as JSON lines from stdin.
        #[arg(long)]
        pose_stdin: bool,
    },
    /// Parse a beat map and print its summary.
    Check {
        beatmap: PathBuf,

        #[arg(long, value_enum, default_value_t = FormatArg::Auto)]
        format: FormatArg,
    },
    /// Print stored scores.
    Scores {
        #[arg(long)]
        level: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Auto,
    ThreeField,
    FourField,
}

impl From<FormatArg> for BeatMapFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Auto => BeatMapFormat::Auto,
            FormatArg::ThreeField => BeatMapFormat::ThreeField,
            FormatArg::FourField => BeatMapFormat::FourField,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_logging(args.log_dir.as_deref(), args.verbose)?;

    let settings_path = args.settings.clone().unwrap_or_else(GameSettings::default_path);
    let scores_path = args
        .scores
        .clone()
        .unwrap_or_else(GameSettings::default_scores_path);
    let settings = GameSettings::load_or_default(&settings_path);
    info!(path = %settings_path.display(), "Settings loaded");

    match args.command {
        Command::Play {
            beatmap,
            level,
            format,
            autoplay,
            sensors,
            pose_stdin,
        } => {
            let options = PlayOptions {
                beatmap,
                level: LevelId::new(level),
                format: format.into(),
                autoplay,
                sensors: sensors || settings.detection,
                pose_stdin,
            };
            play(options, &settings, &scores_path)
        }
        Command::Check { beatmap, format } => check(&beatmap, format.into()),
        Command::Scores { level } => scores(&scores_path, level.map(LevelId::new)),
    }
}

struct PlayOptions {
    beatmap: Option<PathBuf>,
    level: LevelId,
    format: BeatMapFormat,
    autoplay: bool,
    sensors: bool,
    pose_stdin: bool,
}

fn play(options: PlayOptions, settings: &GameSettings, scores_path: &Path) -> Result<()> {
    settings.validate().context("Invalid settings")?;

    let catalogue = LevelCatalogue::standard(&settings.tracks_dir);
    let entry = catalogue.get(&options.level);
    let (path, format, binding) = match (options.beatmap, entry) {
        (Some(path), entry) => (
            path,
            options.format,
            entry.map_or(settings.pose_binding, |e| e.pose_binding),
        ),
        (None, Some(entry)) => (entry.beat_map.clone(), entry.format, entry.pose_binding),
        (None, None) => bail!("Unknown level {} and no beat map given", options.level),
    };

    let beat_map = BeatMap::load(&path, format)?;
    let session = PlaySession::new(beat_map, SessionConfig::from_settings(options.level, settings))?;

    let (reader, pose_writer, clap_writer) = detection_channel();
    let mut hub = SensorHub::new(reader.clone());
    if options.sensors {
        if options.pose_stdin {
            hub.spawn_pose(
                || Ok(JsonLinesLandmarkSource::new(std::io::stdin().lock())),
                pose_writer,
                PoseConfig::from_settings(settings),
            )?;
        }
        spawn_microphone(&mut hub, clap_writer, settings)?;
    }
    if let Some(message) = pose_source_warning(options.sensors, options.pose_stdin) {
        warn!("{message}");
    }

    let store = JsonScoreStore::open(scores_path);
    let menu_poll_interval_us = settings.menu_poll_interval_us();
    let exit = if options.autoplay {
        info!("Autoplay enabled");
        let autoplay = Autoplay::new(session.notes());
        let screen = PlayScreen::new(session, autoplay, Some(reader), store, menu_poll_interval_us);
        run(screen, settings)?
    } else {
        let fusion = InputFusion::new(reader.clone(), binding);
        let screen = PlayScreen::new(session, fusion, Some(reader), store, menu_poll_interval_us);
        run(screen, settings)?
    };

    hub.shutdown(SENSOR_SHUTDOWN_TIMEOUT);

    match exit {
        ScreenExit::Finished(result) => {
            println!(
                "{}: score {}/{}  perfect {}  missed {}  stars {}",
                result.level,
                result.score,
                result.max_score,
                result.perfect,
                result.misses,
                result.star_count()
            );
        }
        other => println!("Left the level: {other:?}"),
    }
    Ok(())
}

fn run<A: ActionSource, S: ScoreStore>(
    mut screen: PlayScreen<A, S>,
    settings: &GameSettings,
) -> Result<ScreenExit> {
    let time = SystemTimeProvider::new();
    let frame = settings.frame_interval();
    let mut sink = NullSpawnSink;
    loop {
        if let Some(exit) = screen.update(time.now_us(), &mut sink)? {
            return Ok(exit);
        }
        thread::sleep(frame);
    }
}

/// Flags that leave the pose sensor in a state the player likely did not mean.
fn pose_source_warning(sensors: bool, pose_stdin: bool) -> Option<&'static str> {
    match (sensors, pose_stdin) {
        (true, false) => Some("No pose source given, pose detection is off; pass --pose-stdin to enable it"),
        (false, true) => Some("--pose-stdin ignored because sensors are off; pass --sensors or enable detection"),
        _ => None,
    }
}

#[cfg(feature = "microphone")]
fn spawn_microphone(hub: &mut SensorHub, writer: ClapWriter, settings: &GameSettings) -> Result<()> {
    use horizons::sensor::{ClapConfig, MicrophoneSource};

    let config = ClapConfig::from_settings(settings);
    let window = config.window;
    hub.spawn_clap(move || MicrophoneSource::open(window), writer, config)?;
    Ok(())
}

#[cfg(not(feature = "microphone"))]
fn spawn_microphone(_hub: &mut SensorHub, _writer: ClapWriter, _settings: &GameSettings) -> Result<()> {
    warn!("Built without the `microphone` feature, clap detection is off");
    Ok(())
}

fn check(path: &Path, format: BeatMapFormat) -> Result<()> {
    let map = BeatMap::load(path, format)?;
    let last_end = map.last_note().map_or(0.0, |n| n.time_end);
    println!(
        "{}: {} notes, max score {}, format {:?}, ends at {:.2}s",
        path.display(),
        map.len(),
        map.max_score(),
        map.format(),
        last_end
    );
    Ok(())
}

fn scores(path: &Path, level: Option<LevelId>) -> Result<()> {
    let store = JsonScoreStore::open(path);
    match level {
        Some(level) => {
            let scores: LevelScores = store.load(&level);
            println!("{}", serde_json::to_string_pretty(&scores)?);
        }
        None => println!("{}", serde_json::to_string_pretty(store.file())?),
    }
    Ok(())
}
