//! Puzzle-bank ingestion and persistence collaborators: the line shapes
//! the external text banks use, deterministic puzzle identities, and the
//! difficulty-label partitioning applied to graded output.

use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::grid::Grid;
use crate::solver::Graded;
use crate::technique::Technique;

/// One bank line. Shape (a) is a bare 81-char puzzle; shape (b) is
/// whitespace-separated `<id> <puzzle> <rating>`.
#[derive(Clone, Debug, PartialEq)]
pub struct BankEntry {
    pub id: Option<String>,
    pub puzzle: String,
    pub rating: Option<f64>,
}

fn is_puzzle_string(s: &str) -> bool {
    s.len() == 81 && s.chars().all(|ch| ch.is_ascii_digit() || ch == '.')
}

/// Parse one bank line; lines matching neither shape yield `None` and are
/// skipped by the reader (banks carry headers and blank separators).
pub fn parse_bank_line(line: &str) -> Option<BankEntry> {
    let trimmed = line.trim();
    if is_puzzle_string(trimmed) {
        return Some(BankEntry { id: None, puzzle: trimmed.to_string(), rating: None });
    }
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if parts.len() >= 3 && is_puzzle_string(parts[1]) {
        return Some(BankEntry {
            id: Some(parts[0].to_string()),
            puzzle: parts[1].to_string(),
            rating: parts[2].parse().ok(),
        });
    }
    None
}

pub fn read_bank(path: &Path) -> Result<Vec<BankEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading bank {}", path.display()))?;
    Ok(content.lines().filter_map(parse_bank_line).collect())
}

/// Deterministic content identity: first 12 hex chars of the SHA-256 of
/// the raw puzzle string.
pub fn content_id(puzzle: &str) -> String {
    let digest = Sha256::digest(puzzle.as_bytes());
    digest.iter().take(6).map(|b| format!("{b:02x}")).collect()
}

/// Bank-provided id when present, content hash otherwise.
pub fn puzzle_id(entry: &BankEntry) -> String {
    match &entry.id {
        Some(id) => id.clone(),
        None => content_id(&entry.puzzle),
    }
}

/// Consumer-facing difficulty band derived from the normalized score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLabel {
    Easy,
    Normal,
    Medium,
    Hard,
    Expert,
    Master,
}

impl DifficultyLabel {
    pub const ALL: [DifficultyLabel; 6] = [
        DifficultyLabel::Easy,
        DifficultyLabel::Normal,
        DifficultyLabel::Medium,
        DifficultyLabel::Hard,
        DifficultyLabel::Expert,
        DifficultyLabel::Master,
    ];

    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            DifficultyLabel::Master
        } else if score >= 7.0 {
            DifficultyLabel::Expert
        } else if score >= 5.0 {
            DifficultyLabel::Hard
        } else if score >= 4.0 {
            DifficultyLabel::Medium
        } else if score >= 3.0 {
            DifficultyLabel::Normal
        } else {
            DifficultyLabel::Easy
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DifficultyLabel::Easy => "easy",
            DifficultyLabel::Normal => "normal",
            DifficultyLabel::Medium => "medium",
            DifficultyLabel::Hard => "hard",
            DifficultyLabel::Expert => "expert",
            DifficultyLabel::Master => "master",
        }
    }
}

impl fmt::Display for DifficultyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The per-puzzle record persisted by the batch driver, keyed by puzzle
/// id in the output JSON.
#[derive(Clone, Debug, Serialize)]
pub struct GradedRecord {
    pub puzzle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    pub score: f64,
    pub techniques: Vec<Technique>,
}

impl GradedRecord {
    pub fn new(entry: &BankEntry, graded: &Graded) -> Self {
        Self {
            puzzle: entry.puzzle.clone(),
            solution: graded.solution.as_ref().map(Grid::to_compact),
            score: graded.difficulty,
            techniques: graded.techniques_used.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PUZZLE: &str =
        "070010050900300007000080000000000200012004900000100005003900406006001070780530000";

    #[test]
    fn parses_bare_puzzle_line() {
        let e = parse_bank_line(&format!("  {PUZZLE}\n")).unwrap();
        assert_eq!(e.id, None);
        assert_eq!(e.puzzle, PUZZLE);
        assert_eq!(e.rating, None);
    }

    #[test]
    fn parses_rated_line() {
        let e = parse_bank_line(&format!("a1b2c3 {PUZZLE} 4.5")).unwrap();
        assert_eq!(e.id.as_deref(), Some("a1b2c3"));
        assert_eq!(e.puzzle, PUZZLE);
        assert_eq!(e.rating, Some(4.5));
    }

    #[test]
    fn skips_malformed_lines() {
        assert_eq!(parse_bank_line(""), None);
        assert_eq!(parse_bank_line("# comment"), None);
        assert_eq!(parse_bank_line("too short 1.0"), None);
        assert_eq!(parse_bank_line(&PUZZLE[..80]), None);
    }

    #[test]
    fn content_id_is_12_hex_and_stable() {
        let id = content_id(PUZZLE);
        assert_eq!(id.len(), 12);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, content_id(PUZZLE));
        assert_ne!(id, content_id(&PUZZLE.replace('7', "6")));
    }

    #[test]
    fn puzzle_id_prefers_bank_id() {
        let e = parse_bank_line(&format!("bank-42 {PUZZLE} 2.0")).unwrap();
        assert_eq!(puzzle_id(&e), "bank-42");
        let bare = parse_bank_line(PUZZLE).unwrap();
        assert_eq!(puzzle_id(&bare), content_id(PUZZLE));
    }

    #[test]
    fn label_thresholds() {
        assert_eq!(DifficultyLabel::from_score(0.0), DifficultyLabel::Easy);
        assert_eq!(DifficultyLabel::from_score(2.99), DifficultyLabel::Easy);
        assert_eq!(DifficultyLabel::from_score(3.0), DifficultyLabel::Normal);
        assert_eq!(DifficultyLabel::from_score(4.0), DifficultyLabel::Medium);
        assert_eq!(DifficultyLabel::from_score(5.0), DifficultyLabel::Hard);
        assert_eq!(DifficultyLabel::from_score(7.0), DifficultyLabel::Expert);
        assert_eq!(DifficultyLabel::from_score(9.0), DifficultyLabel::Master);
        assert_eq!(DifficultyLabel::from_score(12.3), DifficultyLabel::Master);
    }

    #[test]
    fn label_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&DifficultyLabel::Hard).unwrap(), "\"hard\"");
    }
}
