//! UCI engine process client.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use thiserror::Error;
use tracing::{debug, info, warn};
use uci::{EngineMessage, GoOptions, GuiCommand, Score, UciError};

use crate::Evaluation;

/// Maximum number of lines to read before giving up on a UCI response.
pub const MAX_UCI_LINES: usize = 10_000;

/// Errors that can occur when working with chess engines.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to spawn the engine process or talk to it.
    #[error("Failed to spawn engine: {0}")]
    SpawnError(#[from] std::io::Error),
    /// Engine executable was not found.
    #[error("Engine not found: {0}")]
    NotFound(String),
    /// Engine failed to initialize properly (UCI handshake failed).
    #[error("Engine initialization failed")]
    InitFailed,
    /// Engine returned an invalid or unexpected response.
    #[error("Invalid engine response: {0}")]
    InvalidResponse(String),
    /// A line from the engine could not be decoded.
    #[error("UCI protocol error: {0}")]
    Protocol(#[from] UciError),
    /// A search was requested before any position was set.
    #[error("No position set")]
    NoPosition,
    /// The engine closed its output.
    #[error("Engine closed unexpectedly")]
    Closed,
    /// An earlier search failed before `bestmove`; later output cannot be
    /// matched to a position.
    #[error("Engine output out of sync")]
    OutOfSync,
}

/// What the trainer needs from an engine.
///
/// Implementations are long-lived and queried from the session worker; any
/// call may fail.
pub trait Engine: Send {
    /// Sets the position to analyse.
    fn set_position(&mut self, fen: &str) -> Result<(), EngineError>;

    /// Best move for the side to move, `None` if the engine has none.
    fn best_move(&mut self) -> Result<Option<String>, EngineError>;

    /// Evaluation of the current position from White's point of view.
    fn evaluation(&mut self) -> Result<Evaluation, EngineError>;

    /// The engine's name.
    fn name(&self) -> &str;
}

/// Search and strength settings sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// UCI `Skill Level` (0-20).
    pub skill_level: Option<u8>,
    /// Fixed search depth for every query.
    pub depth: u32,
    pub threads: Option<u32>,
    pub hash_mb: Option<u32>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            skill_level: Some(12),
            depth: 15,
            threads: None,
            hash_mb: None,
        }
    }
}

impl EngineOptions {
    fn setoption_commands(&self) -> Vec<GuiCommand> {
        let mut commands = Vec::new();
        if let Some(threads) = self.threads {
            commands.push(GuiCommand::set_option("Threads", threads));
        }
        if let Some(hash) = self.hash_mb {
            commands.push(GuiCommand::set_option("Hash", hash));
        }
        if let Some(skill) = self.skill_level {
            commands.push(GuiCommand::set_option("Skill Level", skill));
        }
        commands
    }
}

/// Result of searching one position.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub best_move: Option<String>,
    /// Last score reported, relative to the side to move.
    pub score: Option<Score>,
    pub depth: u32,
    pub pv: Vec<String>,
}

/// UCI conversation over any line-oriented reader and writer.
///
/// One search serves both [`Engine::best_move`] and [`Engine::evaluation`]
/// for the same position; setting a new position drops the cached result.
pub struct UciConnection<R: BufRead, W: Write> {
    reader: R,
    writer: W,
    name: String,
    depth: u32,
    fen: Option<String>,
    last_search: Option<SearchResult>,
    out_of_sync: bool,
}

impl<R: BufRead, W: Write> UciConnection<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            name: String::new(),
            depth: EngineOptions::default().depth,
            fen: None,
            last_search: None,
            out_of_sync: false,
        }
    }

    /// Runs `uci`/`uciok`, applies options, then `ucinewgame`/`isready`.
    pub fn handshake(&mut self, options: &EngineOptions) -> Result<(), EngineError> {
        self.send(&GuiCommand::Uci)?;

        let mut name = String::new();
        let mut lines_read = 0;
        loop {
            if lines_read > MAX_UCI_LINES {
                return Err(EngineError::InitFailed);
            }
            lines_read += 1;
            match EngineMessage::parse(&self.read_line()?)? {
                EngineMessage::Id { name: Some(n), .. } => name = n,
                EngineMessage::UciOk => break,
                _ => {}
            }
        }

        self.name = if name.is_empty() {
            "Unknown Engine".to_string()
        } else {
            name
        };
        self.depth = options.depth.max(1);

        for command in options.setoption_commands() {
            self.send(&command)?;
        }

        self.new_game()?;
        info!(engine = %self.name, depth = self.depth, "engine ready");
        Ok(())
    }

    /// Tells the engine a new game starts and waits until it is ready.
    pub fn new_game(&mut self) -> Result<(), EngineError> {
        self.last_search = None;
        self.send(&GuiCommand::UciNewGame)?;
        self.wait_ready()
    }

    fn wait_ready(&mut self) -> Result<(), EngineError> {
        self.send(&GuiCommand::IsReady)?;
        let mut lines_read = 0;
        loop {
            if lines_read > MAX_UCI_LINES {
                return Err(EngineError::InitFailed);
            }
            lines_read += 1;
            if EngineMessage::parse(&self.read_line()?)? == EngineMessage::ReadyOk {
                return Ok(());
            }
        }
    }

    /// Searches the current position to the configured depth.
    ///
    /// A malformed line is reported only after the search has been read up
    /// to its `bestmove`. If the output stops before that, the connection is
    /// marked out of sync and every later search fails.
    pub fn search(&mut self) -> Result<SearchResult, EngineError> {
        if self.out_of_sync {
            return Err(EngineError::OutOfSync);
        }
        let fen = self.fen.clone().ok_or(EngineError::NoPosition)?;
        self.send(&GuiCommand::Position {
            fen: Some(fen),
            moves: Vec::new(),
        })?;
        self.send(&GuiCommand::Go(GoOptions::depth(self.depth)))?;

        let mut result = SearchResult {
            best_move: None,
            score: None,
            depth: 0,
            pv: Vec::new(),
        };

        let mut malformed = None;
        let mut lines_read = 0;
        loop {
            if lines_read > MAX_UCI_LINES {
                self.out_of_sync = true;
                return Err(EngineError::InvalidResponse(
                    "Too many lines without bestmove".to_string(),
                ));
            }
            lines_read += 1;

            let line = match self.read_line() {
                Ok(line) => line,
                Err(e) => {
                    self.out_of_sync = true;
                    return Err(e);
                }
            };
            let message = match EngineMessage::parse(&line) {
                Ok(message) => message,
                Err(e) => {
                    warn!(line = %line, error = %e, "unreadable engine output");
                    malformed.get_or_insert(e);
                    if line.starts_with("bestmove") {
                        break;
                    }
                    continue;
                }
            };

            match message {
                EngineMessage::Info(info) if info.multipv.unwrap_or(1) == 1 => {
                    if let Some(score) = info.score {
                        result.score = Some(score);
                        result.depth = info.depth.unwrap_or(result.depth);
                        if !info.pv.is_empty() {
                            result.pv = info.pv;
                        }
                    }
                }
                EngineMessage::BestMove { mv, .. } => {
                    result.best_move = mv;
                    break;
                }
                _ => {}
            }
        }

        if let Some(e) = malformed {
            return Err(e.into());
        }
        debug!(
            best_move = ?result.best_move,
            score = ?result.score,
            depth = result.depth,
            "search finished"
        );
        Ok(result)
    }

    fn cached_search(&mut self) -> Result<SearchResult, EngineError> {
        if let Some(result) = &self.last_search {
            return Ok(result.clone());
        }
        let result = self.search()?;
        self.last_search = Some(result.clone());
        Ok(result)
    }

    fn white_to_move(&self) -> bool {
        self.fen
            .as_deref()
            .and_then(|fen| fen.split_whitespace().nth(1))
            != Some("b")
    }

    /// Send a command to the engine.
    pub fn send(&mut self, command: &GuiCommand) -> Result<(), EngineError> {
        debug!(command = %command, "uci >");
        writeln!(self.writer, "{}", command)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Read a line from the engine's output. Invalid UTF-8 is replaced
    /// rather than rejected so the line is still consumed.
    fn read_line(&mut self) -> Result<String, EngineError> {
        let mut buf = Vec::new();
        let bytes = self.reader.read_until(b'\n', &mut buf)?;
        if bytes == 0 {
            return Err(EngineError::Closed);
        }
        Ok(String::from_utf8_lossy(&buf).trim().to_string())
    }
}

impl<R, W> Engine for UciConnection<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn set_position(&mut self, fen: &str) -> Result<(), EngineError> {
        if fen.split_whitespace().count() < 2 {
            return Err(EngineError::InvalidResponse(format!("not a FEN: {fen}")));
        }
        if self.fen.as_deref() != Some(fen) {
            self.fen = Some(fen.to_string());
            self.last_search = None;
        }
        Ok(())
    }

    fn best_move(&mut self) -> Result<Option<String>, EngineError> {
        Ok(self.cached_search()?.best_move)
    }

    fn evaluation(&mut self) -> Result<Evaluation, EngineError> {
        let white_to_move = self.white_to_move();
        let score = self
            .cached_search()?
            .score
            .ok_or_else(|| EngineError::InvalidResponse("search reported no score".to_string()))?;
        Ok(Evaluation::from_score(&score, white_to_move))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A UCI engine running as a child process (Stockfish by default).
pub struct UciEngine {
    process: Child,
    conn: UciConnection<BufReader<ChildStdout>, ChildStdin>,
}

impl UciEngine {
    /// Spawns the engine and performs the UCI handshake.
    ///
    /// `path` may be a bare program name looked up on `PATH` (`stockfish`)
    /// or a path to an executable.
    ///
    /// # Errors
    ///
    /// - `EngineError::NotFound` if the executable does not exist
    /// - `EngineError::SpawnError` if the engine process fails to start
    /// - `EngineError::InitFailed` / `Closed` if UCI initialization fails
    pub fn spawn(path: &str, options: &EngineOptions) -> Result<Self, EngineError> {
        let is_path = path.contains('/') || path.contains(std::path::MAIN_SEPARATOR);
        if is_path && !Path::new(path).exists() {
            return Err(EngineError::NotFound(path.to_string()));
        }

        let mut process = match Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(process) => process,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(EngineError::NotFound(path.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let (stdin, stdout) = match (process.stdin.take(), process.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = process.kill();
                let _ = process.wait();
                return Err(EngineError::InitFailed);
            }
        };

        let mut conn = UciConnection::new(BufReader::new(stdout), stdin);
        if let Err(e) = conn.handshake(options) {
            let _ = process.kill();
            let _ = process.wait();
            return Err(e);
        }

        Ok(Self { process, conn })
    }

    /// Resets the engine for a new game.
    pub fn new_game(&mut self) -> Result<(), EngineError> {
        self.conn.new_game()
    }

    /// Searches the current position without caching.
    pub fn search(&mut self) -> Result<SearchResult, EngineError> {
        self.conn.search()
    }
}

impl Engine for UciEngine {
    fn set_position(&mut self, fen: &str) -> Result<(), EngineError> {
        self.conn.set_position(fen)
    }

    fn best_move(&mut self) -> Result<Option<String>, EngineError> {
        self.conn.best_move()
    }

    fn evaluation(&mut self) -> Result<Evaluation, EngineError> {
        self.conn.evaluation()
    }

    fn name(&self) -> &str {
        self.conn.name()
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        let _ = self.conn.send(&GuiCommand::Quit);
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}
