//! Opening trainer - binary entry point.
//!
//! ```text
//! main() -> config + catalog + engine -> TerminalSession -> menu -> run_game()
//!                                                                     |
//!                          InputPump --events--> UI loop <--events-- Worker
//!                                                  |                   |
//!                                                draw()         GameSession
//! ```
//!
//! The UI loop waits on terminal input, worker results and a frame tick.
//! Every session mutation happens on the worker; the UI only paints the last
//! snapshot it received.

mod app;
mod config;
mod input;
mod menu;
mod svg;
mod terminal;
#[cfg(test)]
mod test_support;
mod ui;
mod worker;

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use ratatui::{backend::Backend, Terminal};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use trainer_core::{replay_line, Dispatcher, GameSession, StandardRules};
use trainer_engine::{Engine, UciEngine};
use trainer_openings::{builtin_catalog, OpeningCatalog};

use app::{App, AppAction};
use config::TrainerConfig;
use input::{InputMsg, InputPump};
use menu::{MenuAction, OpeningMenu};
use terminal::TerminalSession;
use ui::BoardCache;
use worker::{Worker, WorkerCommand, WorkerEvent};

const FRAME_DURATION: Duration = Duration::from_millis(33);
const LOG_FILE_NAME: &str = "opening-trainer.log";

#[derive(Parser, Debug)]
#[command(name = "opening-trainer")]
#[command(about = "Drill chess openings, then play them out against a UCI engine")]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = "trainer.toml")]
    config: PathBuf,
    /// Opening to train; shows the menu when omitted
    #[arg(short, long)]
    opening: Option<String>,
    /// Engine executable
    #[arg(long)]
    engine: Option<String>,
    /// Engine skill level (0-20)
    #[arg(long)]
    skill: Option<u8>,
    /// Engine search depth
    #[arg(long)]
    depth: Option<u32>,
    /// JSON opening catalog
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Seed for the line choice
    #[arg(long)]
    seed: Option<u64>,
    /// Print the openings and their lines, then exit
    #[arg(short, long)]
    list: bool,
}

impl Args {
    fn apply(&self, config: &mut TrainerConfig) {
        if let Some(engine) = &self.engine {
            config.engine.path.clone_from(engine);
        }
        if let Some(skill) = self.skill {
            config.engine.skill_level = skill;
        }
        if let Some(depth) = self.depth {
            config.engine.depth = depth;
        }
        if let Some(catalog) = &self.catalog {
            config.catalog = Some(catalog.clone());
        }
    }
}

fn init_tracing(log_dir: &Path) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    match open_log_file(log_dir) {
        Ok((path, file)) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter)
                .init();
            info!(path = %path.display(), "Logging initialized");
        }
        // The terminal belongs to the TUI; no log file means no logs.
        Err(_) => tracing_subscriber::registry().with(env_filter).init(),
    }
}

fn open_log_file(log_dir: &Path) -> std::io::Result<(PathBuf, fs::File)> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((path, file))
}

/// The catalog file if one is configured, else the built-in openings.
/// `OpeningCatalog::load` validates what it reads.
fn load_catalog(path: Option<&Path>) -> Result<OpeningCatalog> {
    match path {
        Some(path) => OpeningCatalog::load(path)
            .with_context(|| format!("Failed to load catalog {}", path.display())),
        None => {
            let catalog = builtin_catalog();
            catalog.validate().context("Invalid built-in catalog")?;
            Ok(catalog)
        }
    }
}

fn print_catalog(catalog: &OpeningCatalog) {
    for opening in catalog.all() {
        println!("{}", opening.name);
        for line in &opening.lines {
            println!("  {} ({} moves)", line.name, line.len());
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = TrainerConfig::load(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    args.apply(&mut config);
    config.validate()?;

    let catalog = load_catalog(config.catalog.as_deref())?;
    if args.list {
        print_catalog(&catalog);
        return Ok(());
    }
    if let Some(name) = &args.opening {
        catalog.lines(name)?;
    }

    init_tracing(&config.log_dir);

    let mut engine = UciEngine::spawn(&config.engine.path, &config.engine_options())
        .with_context(|| format!("Failed to start engine '{}'", config.engine.path))?;
    engine.new_game()?;
    info!(engine = engine.name(), "engine ready");

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // The session is dropped before main returns, so errors print to a
    // restored terminal.
    let result = {
        let mut session = TerminalSession::new()?;
        let mut input = InputPump::new();
        let result = run(
            &mut session.terminal,
            &mut input,
            &catalog,
            args.opening,
            engine,
            &mut rng,
            &config,
        )
        .await;
        input.shutdown().await;
        result
    };

    if let Err(e) = &result {
        warn!(error = %e, "trainer stopped");
    }
    result
}

async fn run<B>(
    terminal: &mut Terminal<B>,
    input: &mut InputPump,
    catalog: &OpeningCatalog,
    opening: Option<String>,
    engine: UciEngine,
    rng: &mut StdRng,
    config: &TrainerConfig,
) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let opening = match opening {
        Some(name) => name,
        None => match choose_opening(terminal, input, catalog).await? {
            Some(name) => name,
            None => return Ok(()),
        },
    };

    let opening_name = catalog
        .get(&opening)
        .map_or_else(|| opening.clone(), |o| o.name.clone());
    let line = catalog.random_line(&opening, rng)?.clone();
    replay_line(StandardRules::new(), &line)
        .with_context(|| format!("Line '{}' cannot be trained", line.name))?;
    info!(opening = %opening_name, line = %line.name, moves = line.len(), "line selected");

    let dispatcher = Dispatcher::new(StandardRules::new(), line);
    let session = Arc::new(GameSession::new(opening_name, dispatcher, engine));
    let (mut worker, events) = Worker::spawn(Arc::clone(&session));

    let mut app = App::new(session.snapshot(), config.board.geometry());
    let result = run_game(terminal, input, &worker, events, &mut app, config).await;
    worker.shutdown().await;
    result
}

enum Step {
    Input(Option<InputMsg>),
    Worker(Option<WorkerEvent>),
    Tick,
}

async fn run_game<B>(
    terminal: &mut Terminal<B>,
    input: &mut InputPump,
    worker: &Worker,
    mut events: tokio::sync::mpsc::Receiver<WorkerEvent>,
    app: &mut App,
    config: &TrainerConfig,
) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut cache = BoardCache::default();

    worker.send(WorkerCommand::Evaluate).await?;

    loop {
        terminal.draw(|frame| ui::draw(frame, app, &mut cache))?;

        let step = tokio::select! {
            msg = input.recv() => Step::Input(msg),
            event = events.recv() => Step::Worker(event),
            _ = frames.tick() => Step::Tick,
        };

        match step {
            Step::Input(Some(InputMsg::Event(event))) => match app.handle_event(&event) {
                AppAction::None => {}
                AppAction::Submit(mv) => worker.send(WorkerCommand::Submit(mv)).await?,
                AppAction::RetryEngine => worker.send(WorkerCommand::RetryEngine).await?,
                AppAction::SaveSnapshot => {
                    match svg::write_snapshot(&config.snapshot_dir, app.snapshot(), app.targets()) {
                        Ok(path) => app.set_message(format!("Saved {}", path.display())),
                        Err(e) => {
                            warn!(error = %e, "snapshot failed");
                            app.set_message(e.to_string());
                        }
                    }
                }
                AppAction::Quit => {
                    debug!(board_rebuilds = cache.rebuilds(), "quit requested");
                    return Ok(());
                }
            },
            Step::Input(Some(InputMsg::Error(msg))) => return Err(anyhow!("input error: {msg}")),
            Step::Input(None) => return Err(anyhow!("input pump disconnected")),
            Step::Worker(Some(event)) => app.apply(event),
            Step::Worker(None) => return Err(anyhow!("session worker stopped")),
            Step::Tick => {}
        }
    }
}

/// Shows the opening menu; `None` if the user quit.
async fn choose_opening<B>(
    terminal: &mut Terminal<B>,
    input: &mut InputPump,
    catalog: &OpeningCatalog,
) -> Result<Option<String>>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut menu = OpeningMenu::new(catalog.names().into_iter().map(str::to_string).collect());

    loop {
        terminal.draw(|frame| menu::draw_menu(frame, &menu))?;

        let event = match input.recv().await {
            Some(InputMsg::Event(event)) => event,
            Some(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            None => return Err(anyhow!("input pump disconnected")),
        };

        match menu.handle_event(&event) {
            MenuAction::None => {}
            MenuAction::Choose(index) => {
                let name = menu.name(index).map(str::to_string);
                terminal.clear()?;
                return Ok(name);
            }
            MenuAction::Quit => return Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trainer_openings::CatalogError;

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "opening-trainer",
            "--engine",
            "/opt/sf",
            "--skill",
            "3",
            "--depth",
            "9",
            "--catalog",
            "lines.json",
        ]);
        let mut config = TrainerConfig::default();
        args.apply(&mut config);
        assert_eq!(config.engine.path, "/opt/sf");
        assert_eq!(config.engine.skill_level, 3);
        assert_eq!(config.engine.depth, 9);
        assert_eq!(config.catalog, Some(PathBuf::from("lines.json")));
    }

    #[test]
    fn test_defaults_leave_config_alone() {
        let args = Args::parse_from(["opening-trainer"]);
        assert_eq!(args.config, PathBuf::from("trainer.toml"));
        assert!(!args.list);
        let mut config = TrainerConfig::default();
        args.apply(&mut config);
        assert_eq!(config, TrainerConfig::default());
    }

    #[test]
    fn test_load_builtin_catalog() {
        let catalog = load_catalog(None).unwrap();
        assert!(catalog.get("Ruy Lopez").is_some());
    }

    #[test]
    fn test_load_catalog_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"openings":[{"name":"X","lines":[{"name":"L","moves":["e2e9"]}]}]}"#)
            .unwrap();
        let err = load_catalog(Some(&path)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CatalogError>(),
            Some(CatalogError::MalformedMove { index: 0, .. })
        ));
    }

    #[test]
    fn test_load_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lines.json");
        fs::write(&path, r#"{"openings":[{"name":"X","lines":[{"name":"L","moves":["e2e4"]}]}]}"#)
            .unwrap();
        let catalog = load_catalog(Some(&path)).unwrap();
        assert_eq!(catalog.names(), vec!["X"]);
    }
}
