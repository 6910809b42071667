//! UCI info line parsing.

/// Score in centipawns or mate distance, from the side to move's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawn score (100 = 1 pawn advantage).
    Cp(i32),
    /// Mate in N moves (positive = side to move mates, negative = gets mated).
    Mate(i32),
}

/// Search information from engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineInfo {
    /// Search depth in plies.
    pub depth: Option<u32>,
    /// Selective search depth.
    pub seldepth: Option<u32>,
    /// Which principal variation this line reports (MultiPV mode).
    pub multipv: Option<u32>,
    /// Score evaluation.
    pub score: Option<Score>,
    /// Nodes searched.
    pub nodes: Option<u64>,
    /// Nodes per second.
    pub nps: Option<u64>,
    /// Time spent in milliseconds.
    pub time: Option<u64>,
    /// Principal variation (best line found).
    pub pv: Vec<String>,
    /// Arbitrary string info.
    pub string: Option<String>,
}

impl EngineInfo {
    /// Parse UCI info line. Returns `None` if the line is not an info line.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.first() != Some(&"info") {
            return None;
        }

        let mut info = EngineInfo::default();
        let mut i = 1;

        while i < parts.len() {
            match parts[i] {
                "depth" => {
                    i += 1;
                    info.depth = parts.get(i).and_then(|s| s.parse().ok());
                }
                "seldepth" => {
                    i += 1;
                    info.seldepth = parts.get(i).and_then(|s| s.parse().ok());
                }
                "multipv" => {
                    i += 1;
                    info.multipv = parts.get(i).and_then(|s| s.parse().ok());
                }
                "score" => {
                    i += 1;
                    let kind = parts.get(i).copied();
                    i += 1;
                    let value = parts.get(i).and_then(|s| s.parse().ok());
                    info.score = match (kind, value) {
                        (Some("cp"), Some(cp)) => Some(Score::Cp(cp)),
                        (Some("mate"), Some(m)) => Some(Score::Mate(m)),
                        _ => info.score,
                    };
                    // Bound markers follow the value.
                    while matches!(parts.get(i + 1), Some(&"lowerbound") | Some(&"upperbound")) {
                        i += 1;
                    }
                }
                "nodes" => {
                    i += 1;
                    info.nodes = parts.get(i).and_then(|s| s.parse().ok());
                }
                "nps" => {
                    i += 1;
                    info.nps = parts.get(i).and_then(|s| s.parse().ok());
                }
                "time" => {
                    i += 1;
                    info.time = parts.get(i).and_then(|s| s.parse().ok());
                }
                "pv" => {
                    i += 1;
                    while i < parts.len() && !is_info_keyword(parts[i]) {
                        info.pv.push(parts[i].to_string());
                        i += 1;
                    }
                    continue;
                }
                "string" => {
                    // String consumes rest of line
                    info.string = Some(parts[i + 1..].join(" "));
                    break;
                }
                _ => {}
            }
            i += 1;
        }

        Some(info)
    }
}

fn is_info_keyword(s: &str) -> bool {
    matches!(
        s,
        "depth"
            | "seldepth"
            | "multipv"
            | "score"
            | "nodes"
            | "nps"
            | "time"
            | "pv"
            | "currmove"
            | "currmovenumber"
            | "hashfull"
            | "tbhits"
            | "string"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_info() {
        let line = "info depth 12 score cp 30 nodes 125000 nps 500000 pv e2e4 e7e5 g1f3";
        let info = EngineInfo::parse(line).unwrap();

        assert_eq!(info.depth, Some(12));
        assert_eq!(info.score, Some(Score::Cp(30)));
        assert_eq!(info.nodes, Some(125000));
        assert_eq!(info.nps, Some(500000));
        assert_eq!(info.pv, vec!["e2e4", "e7e5", "g1f3"]);
    }

    #[test]
    fn parse_mate_score() {
        let info = EngineInfo::parse("info depth 20 score mate -3 pv e8f8").unwrap();
        assert_eq!(info.score, Some(Score::Mate(-3)));
    }

    #[test]
    fn parse_bound_markers() {
        let line = "info depth 18 seldepth 24 multipv 1 score cp 41 lowerbound nodes 900 pv d2d4";
        let info = EngineInfo::parse(line).unwrap();
        assert_eq!(info.score, Some(Score::Cp(41)));
        assert_eq!(info.multipv, Some(1));
        assert_eq!(info.seldepth, Some(24));
        assert_eq!(info.nodes, Some(900));
        assert_eq!(info.pv, vec!["d2d4"]);
    }

    #[test]
    fn parse_pv_stops_at_keyword() {
        let info = EngineInfo::parse("info pv e2e4 e7e5 hashfull 12 time 40").unwrap();
        assert_eq!(info.pv, vec!["e2e4", "e7e5"]);
        assert_eq!(info.time, Some(40));
    }

    #[test]
    fn parse_string() {
        let info = EngineInfo::parse("info string NNUE evaluation using nn.nnue").unwrap();
        assert_eq!(
            info.string.as_deref(),
            Some("NNUE evaluation using nn.nnue")
        );
    }

    #[test]
    fn parse_non_info() {
        assert!(EngineInfo::parse("bestmove e2e4").is_none());
        assert!(EngineInfo::parse("information").is_none());
    }
}
