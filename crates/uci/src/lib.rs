//! UCI (Universal Chess Interface) protocol codec, GUI side.
//!
//! The trainer talks to an engine process: it formats [`GuiCommand`]s and
//! parses the lines the engine writes back into [`EngineMessage`]s.
//!
//! # Commands sent
//!
//! - `uci` / `uciok` - Handshake
//! - `setoption name <id> value <x>` - Engine options (skill, threads, hash)
//! - `ucinewgame` - Reset engine state between games
//! - `isready` / `readyok` - Synchronization
//! - `position fen <fen> [moves <move>...]` - Set position
//! - `go [movetime <ms>] [depth <d>]` - Start search
//! - `quit` - Shut the engine down

mod command;
mod info;

pub use command::{GoOptions, GuiCommand};
pub use info::{EngineInfo, Score};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum UciError {
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Messages sent from engine to GUI.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineMessage {
    /// Engine identification.
    Id { name: Option<String>, author: Option<String> },
    /// UCI initialization complete.
    UciOk,
    /// Engine is ready.
    ReadyOk,
    /// Search information.
    Info(EngineInfo),
    /// Best move found; `None` when the engine has no legal move
    /// (`bestmove (none)` or `bestmove 0000`).
    BestMove { mv: Option<String>, ponder: Option<String> },
    /// Anything else (`option ...`, banners, `copyprotection` and so on).
    Unknown(String),
}

impl EngineMessage {
    /// Parse a single line of engine output.
    pub fn parse(line: &str) -> Result<Self, UciError> {
        let line = line.trim();
        let mut parts = line.split_whitespace();

        match parts.next().unwrap_or("") {
            "uciok" => Ok(EngineMessage::UciOk),
            "readyok" => Ok(EngineMessage::ReadyOk),
            "id" => Ok(Self::parse_id(line)),
            "info" => EngineInfo::parse(line)
                .map(EngineMessage::Info)
                .ok_or_else(|| UciError::ParseError(format!("bad info line: {line}"))),
            "bestmove" => {
                let mv = parts
                    .next()
                    .ok_or_else(|| UciError::ParseError("bestmove without a move".to_string()))?;
                let mv = match mv {
                    "(none)" | "0000" => None,
                    other => Some(other.to_string()),
                };
                let ponder = match (parts.next(), parts.next()) {
                    (Some("ponder"), Some(p)) => Some(p.to_string()),
                    _ => None,
                };
                Ok(EngineMessage::BestMove { mv, ponder })
            }
            _ => Ok(EngineMessage::Unknown(line.to_string())),
        }
    }

    fn parse_id(line: &str) -> Self {
        let rest = line.trim_start_matches("id").trim_start();
        if let Some(name) = rest.strip_prefix("name") {
            EngineMessage::Id {
                name: Some(name.trim().to_string()),
                author: None,
            }
        } else if let Some(author) = rest.strip_prefix("author") {
            EngineMessage::Id {
                name: None,
                author: Some(author.trim().to_string()),
            }
        } else {
            EngineMessage::Id {
                name: None,
                author: None,
            }
        }
    }
}
