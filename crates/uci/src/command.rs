//! UCI command formatting.

use std::fmt;

/// Commands sent from GUI to engine.
#[derive(Debug, Clone, PartialEq)]
pub enum GuiCommand {
    /// Initialize UCI mode.
    Uci,
    /// Check if engine is ready.
    IsReady,
    /// The next search belongs to a different game.
    UciNewGame,
    /// Set an engine option.
    SetOption { name: String, value: Option<String> },
    /// Set up position; `fen: None` means the start position.
    Position {
        fen: Option<String>,
        moves: Vec<String>,
    },
    /// Start calculating.
    Go(GoOptions),
    /// Quit the engine.
    Quit,
}

/// Options for the `go` command.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GoOptions {
    /// Search for exactly this time in milliseconds.
    pub movetime: Option<u64>,
    /// Search to this depth.
    pub depth: Option<u32>,
}

impl GoOptions {
    /// Search to a fixed depth.
    pub fn depth(depth: u32) -> Self {
        Self {
            depth: Some(depth),
            ..Self::default()
        }
    }
}

impl GuiCommand {
    /// Shorthand for `setoption name <name> value <value>`.
    pub fn set_option(name: impl Into<String>, value: impl ToString) -> Self {
        GuiCommand::SetOption {
            name: name.into(),
            value: Some(value.to_string()),
        }
    }

    /// Format command for the engine's stdin (without the trailing newline).
    pub fn to_uci(&self) -> String {
        match self {
            GuiCommand::Uci => "uci".to_string(),
            GuiCommand::IsReady => "isready".to_string(),
            GuiCommand::UciNewGame => "ucinewgame".to_string(),
            GuiCommand::SetOption { name, value } => match value {
                Some(v) => format!("setoption name {} value {}", name, v),
                None => format!("setoption name {}", name),
            },
            GuiCommand::Position { fen, moves } => {
                let mut out = match fen {
                    Some(f) => format!("position fen {}", f),
                    None => "position startpos".to_string(),
                };
                if !moves.is_empty() {
                    out.push_str(" moves ");
                    out.push_str(&moves.join(" "));
                }
                out
            }
            GuiCommand::Go(opts) => {
                let mut parts = vec!["go".to_string()];
                if let Some(ms) = opts.movetime {
                    parts.push(format!("movetime {}", ms));
                }
                if let Some(d) = opts.depth {
                    parts.push(format!("depth {}", d));
                }
                parts.join(" ")
            }
            GuiCommand::Quit => "quit".to_string(),
        }
    }
}

impl fmt::Display for GuiCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_simple_commands() {
        assert_eq!(GuiCommand::Uci.to_uci(), "uci");
        assert_eq!(GuiCommand::IsReady.to_uci(), "isready");
        assert_eq!(GuiCommand::UciNewGame.to_uci(), "ucinewgame");
        assert_eq!(GuiCommand::Quit.to_string(), "quit");
    }

    #[test]
    fn format_setoption() {
        assert_eq!(
            GuiCommand::set_option("Skill Level", 12).to_uci(),
            "setoption name Skill Level value 12"
        );
        assert_eq!(
            GuiCommand::SetOption {
                name: "Clear Hash".to_string(),
                value: None
            }
            .to_uci(),
            "setoption name Clear Hash"
        );
    }

    #[test]
    fn format_position_startpos() {
        let cmd = GuiCommand::Position {
            fen: None,
            moves: vec!["e2e4".to_string(), "e7e5".to_string()],
        };
        assert_eq!(cmd.to_uci(), "position startpos moves e2e4 e7e5");
    }

    #[test]
    fn format_position_fen() {
        let cmd = GuiCommand::Position {
            fen: Some("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1".to_string()),
            moves: vec![],
        };
        assert_eq!(
            cmd.to_uci(),
            "position fen rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
    }

    #[test]
    fn format_go() {
        assert_eq!(GuiCommand::Go(GoOptions::depth(15)).to_uci(), "go depth 15");
        assert_eq!(
            GuiCommand::Go(GoOptions {
                movetime: Some(500),
                ..GoOptions::default()
            })
            .to_uci(),
            "go movetime 500"
        );
        assert_eq!(
            GuiCommand::Go(GoOptions {
                movetime: Some(200),
                depth: Some(8),
            })
            .to_uci(),
            "go movetime 200 depth 8"
        );
    }
}
