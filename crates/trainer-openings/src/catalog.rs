//! Opening catalog storage, loading and lookup.

use std::collections::HashSet;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::opening::{Opening, OpeningLine};

/// Errors that can occur when loading or querying a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Failed to read the catalog file.
    #[error("failed to read opening catalog: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The catalog contains no openings at all.
    #[error("opening catalog is empty")]
    Empty,

    /// No opening with the requested name exists.
    #[error("unknown opening: {0}")]
    UnknownOpening(String),

    /// The opening exists but has no lines to pick from.
    #[error("opening '{0}' has no lines")]
    NoLines(String),

    /// A line has no moves.
    #[error("line '{0}' has no moves")]
    EmptyLine(String),

    /// A move in a line is not in UCI notation.
    #[error("line '{line}': move {index} ('{mv}') is not a UCI move")]
    MalformedMove {
        line: String,
        index: usize,
        mv: String,
    },

    /// Two openings share a name.
    #[error("duplicate opening: {0}")]
    DuplicateOpening(String),
}

/// The full set of openings the trainer can drill.
///
/// Opening order is preserved; the menu lists openings in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningCatalog {
    openings: Vec<Opening>,
}

impl OpeningCatalog {
    /// Creates a new empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a catalog with the given openings.
    #[must_use]
    pub fn with_openings(openings: Vec<Opening>) -> Self {
        Self { openings }
    }

    /// Parses a catalog from JSON of the form `{"openings": [...]}`.
    ///
    /// The result is not validated; call [`OpeningCatalog::validate`].
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads and validates a catalog from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.openings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.openings.is_empty()
    }

    /// Returns all openings in catalog order.
    #[must_use]
    pub fn all(&self) -> &[Opening] {
        &self.openings
    }

    /// Opening names in catalog order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.openings.iter().map(|o| o.name.as_str()).collect()
    }

    /// Finds an opening by name.
    ///
    /// An exact match wins; otherwise the first case-insensitive match is
    /// returned, so `--opening "ruy lopez"` works from the command line.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Opening> {
        self.openings.iter().find(|o| o.name == name).or_else(|| {
            self.openings
                .iter()
                .find(|o| o.name.eq_ignore_ascii_case(name))
        })
    }

    /// Returns the lines of the named opening.
    pub fn lines(&self, name: &str) -> Result<&[OpeningLine], CatalogError> {
        self.get(name)
            .map(|o| o.lines.as_slice())
            .ok_or_else(|| CatalogError::UnknownOpening(name.to_string()))
    }

    /// Picks one line of the named opening uniformly at random.
    pub fn random_line<R: Rng + ?Sized>(
        &self,
        name: &str,
        rng: &mut R,
    ) -> Result<&OpeningLine, CatalogError> {
        let opening = self
            .get(name)
            .ok_or_else(|| CatalogError::UnknownOpening(name.to_string()))?;
        opening
            .lines
            .choose(rng)
            .ok_or_else(|| CatalogError::NoLines(opening.name.clone()))
    }

    /// Checks the catalog's structure and move syntax.
    ///
    /// Move legality is not checked here; that needs a rules provider.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.openings.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for opening in &self.openings {
            if !seen.insert(opening.name.as_str()) {
                return Err(CatalogError::DuplicateOpening(opening.name.clone()));
            }
            if opening.lines.is_empty() {
                return Err(CatalogError::NoLines(opening.name.clone()));
            }
            for line in &opening.lines {
                if line.is_empty() {
                    return Err(CatalogError::EmptyLine(line.name.clone()));
                }
                if let Some((index, mv)) = line.first_malformed() {
                    return Err(CatalogError::MalformedMove {
                        line: line.name.clone(),
                        index,
                        mv: mv.to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn create_test_catalog() -> OpeningCatalog {
        OpeningCatalog::with_openings(vec![
            Opening::new(
                "Italian Game",
                vec![
                    OpeningLine::from_moves("Giuoco Piano", &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "f8c5"]),
                    OpeningLine::from_moves("Two Knights", &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "g8f6"]),
                ],
            ),
            Opening::new(
                "Scandinavian Defense",
                vec![OpeningLine::from_moves("Main Line", &["e2e4", "d7d5", "e4d5", "d8d5"])],
            ),
        ])
    }

    #[test]
    fn test_catalog_new() {
        let catalog = OpeningCatalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.len(), 0);
    }

    #[test]
    fn test_catalog_names_keep_order() {
        let catalog = create_test_catalog();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.names(), vec!["Italian Game", "Scandinavian Defense"]);
    }

    #[test]
    fn test_get_exact_and_case_insensitive() {
        let catalog = create_test_catalog();
        assert!(catalog.get("Italian Game").is_some());
        assert_eq!(
            catalog.get("italian game").map(|o| o.name.as_str()),
            Some("Italian Game")
        );
        assert!(catalog.get("Italian").is_none());
    }

    #[test]
    fn test_lines_unknown_opening() {
        let catalog = create_test_catalog();
        assert_eq!(catalog.lines("Italian Game").unwrap().len(), 2);
        assert!(matches!(
            catalog.lines("Dutch Defense"),
            Err(CatalogError::UnknownOpening(name)) if name == "Dutch Defense"
        ));
    }

    #[test]
    fn test_random_line_is_from_opening() {
        let catalog = create_test_catalog();
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let line = catalog.random_line("Italian Game", &mut rng).unwrap();
            assert!(line.name == "Giuoco Piano" || line.name == "Two Knights");
        }
    }

    #[test]
    fn test_random_line_seeded_is_deterministic() {
        let catalog = create_test_catalog();
        let first = catalog
            .random_line("Italian Game", &mut StdRng::seed_from_u64(7))
            .unwrap()
            .name
            .clone();
        for _ in 0..5 {
            let again = catalog
                .random_line("Italian Game", &mut StdRng::seed_from_u64(7))
                .unwrap();
            assert_eq!(again.name, first);
        }
    }

    #[test]
    fn test_random_line_no_lines() {
        let catalog = OpeningCatalog::with_openings(vec![Opening::new("Empty", vec![])]);
        let mut rng = rand::thread_rng();
        assert!(matches!(
            catalog.random_line("Empty", &mut rng),
            Err(CatalogError::NoLines(_))
        ));
    }

    #[test]
    fn test_validate_ok() {
        assert!(create_test_catalog().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_catalogs() {
        assert!(matches!(
            OpeningCatalog::new().validate(),
            Err(CatalogError::Empty)
        ));

        let duplicate = OpeningCatalog::with_openings(vec![
            Opening::new("A", vec![OpeningLine::from_moves("x", &["e2e4"])]),
            Opening::new("A", vec![OpeningLine::from_moves("y", &["d2d4"])]),
        ]);
        assert!(matches!(
            duplicate.validate(),
            Err(CatalogError::DuplicateOpening(name)) if name == "A"
        ));

        let empty_line =
            OpeningCatalog::with_openings(vec![Opening::new("A", vec![OpeningLine::new("x", vec![])])]);
        assert!(matches!(
            empty_line.validate(),
            Err(CatalogError::EmptyLine(_))
        ));

        let malformed = OpeningCatalog::with_openings(vec![Opening::new(
            "A",
            vec![OpeningLine::from_moves("x", &["e2e4", "e5"])],
        )]);
        match malformed.validate() {
            Err(CatalogError::MalformedMove { line, index, mv }) => {
                assert_eq!(line, "x");
                assert_eq!(index, 1);
                assert_eq!(mv, "e5");
            }
            other => panic!("expected MalformedMove, got {other:?}"),
        }
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "openings": [
                {"name": "Caro-Kann Defense", "lines": [
                    {"name": "Advance", "moves": ["e2e4", "c7c6", "d2d4", "d7d5", "e4e5"]}
                ]}
            ]
        }"#;
        let catalog = OpeningCatalog::from_json(json).unwrap();
        assert_eq!(catalog.names(), vec!["Caro-Kann Defense"]);
        assert_eq!(catalog.lines("Caro-Kann Defense").unwrap()[0].len(), 5);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(
            OpeningCatalog::from_json("{ not json"),
            Err(CatalogError::JsonError(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&create_test_catalog()).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let catalog = OpeningCatalog::load(file.path()).unwrap();
        assert_eq!(catalog, create_test_catalog());
    }

    #[test]
    fn test_load_validates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"openings": [{"name": "A", "lines": []}]}"#)
            .unwrap();
        assert!(matches!(
            OpeningCatalog::load(file.path()),
            Err(CatalogError::NoLines(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            OpeningCatalog::load(&dir.path().join("missing.json")),
            Err(CatalogError::IoError(_))
        ));
    }
}
