use std::collections::BTreeSet;

use crate::grid::{bit, peers, Digit, Grid};
use crate::technique::Technique;
use crate::techniques;

/// One placement made by the battery, in the order it happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolveStep {
    pub technique: Technique,
    pub row: usize,
    pub col: usize,
    pub value: Digit,
}

/// The result of grading one puzzle. Immutable once returned; a grading
/// call never touches its input grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Graded {
    pub is_solvable: bool,
    pub solution: Option<Grid>,
    pub difficulty: f64,
    pub techniques_used: BTreeSet<Technique>,
    pub steps: Vec<SolveStep>,
}

/// One grading session: the working board, per-cell candidate bitmasks,
/// and the technique/step accounting. Owned by a single `grade_puzzle`
/// call and never shared, so grading parallelizes across puzzles with no
/// locking.
pub(crate) struct Grader {
    pub(crate) grid: Grid,
    pub(crate) cands: [u16; 81],
    pub(crate) used: BTreeSet<Technique>,
    pub(crate) steps: Vec<SolveStep>,
}

type TechniqueFn = fn(&mut Grader) -> Option<u32>;

/// The battery in fixed priority order, cheapest and most certain first.
/// After any hit the loop restarts from the top, so an expensive
/// technique never fires while a cheaper one still applies. The ordering
/// decides which puzzles complete by logic alone versus needing the
/// fallback, and with it the score, so it must not be reshuffled.
const BATTERY: &[(Technique, TechniqueFn)] = &[
    (Technique::NakedSingle, |g| techniques::naked_single(g).then_some(0)),
    (Technique::HiddenSingle, |g| techniques::hidden_single(g).then_some(0)),
    (Technique::PointingPairs, |g| techniques::pointing_pairs(g).then_some(0)),
    (Technique::LineBoxReduction, |g| techniques::box_line_reduction(g).then_some(0)),
    (Technique::NakedPair, |g| techniques::naked_subsets(g, 2, Technique::NakedPair).then_some(0)),
    (Technique::HiddenPair, |g| techniques::hidden_subsets(g, 2, Technique::HiddenPair).then_some(0)),
    (Technique::NakedTriple, |g| techniques::naked_subsets(g, 3, Technique::NakedTriple).then_some(0)),
    (Technique::HiddenTriple, |g| techniques::hidden_subsets(g, 3, Technique::HiddenTriple).then_some(0)),
    (Technique::NakedQuad, |g| techniques::naked_subsets(g, 4, Technique::NakedQuad).then_some(0)),
    (Technique::HiddenQuad, |g| techniques::hidden_subsets(g, 4, Technique::HiddenQuad).then_some(0)),
    (Technique::XWing, |g| techniques::fish(g, 2, Technique::XWing).then_some(0)),
    (Technique::Swordfish, |g| techniques::fish(g, 3, Technique::Swordfish).then_some(0)),
    (Technique::Jellyfish, |g| techniques::fish(g, 4, Technique::Jellyfish).then_some(0)),
    (Technique::UniqueRectangleType1, |g| techniques::unique_rectangle(g).then_some(0)),
    (Technique::YWing, |g| techniques::y_wing(g).then_some(0)),
    (Technique::XyzWing, |g| techniques::xyz_wing(g).then_some(0)),
    (Technique::XyChain, techniques::xy_chain),
    (Technique::SimpleColouring, |g| techniques::simple_colouring(g).then_some(0)),
    (Technique::BugPlusOne, |g| techniques::bug_plus_one(g).then_some(0)),
];

/// Candidate count of a template empty grid; the density factor divides
/// by it so technique weight scales with how open the board still is.
const TEMPLATE_CANDIDATES: f64 = 727.0;

impl Grader {
    pub(crate) fn new(grid: &Grid) -> Self {
        let mut g = Self {
            grid: grid.clone(),
            cands: [0; 81],
            used: BTreeSet::new(),
            steps: Vec::new(),
        };
        g.seed_candidates();
        g
    }

    fn seed_candidates(&mut self) {
        for i in 0..81 {
            if self.grid.cells[i] != 0 {
                self.cands[i] = 0;
                continue;
            }
            let (r, c) = (i / 9, i % 9);
            let mut m = 0u16;
            for d in 1..=9 {
                if self.grid.is_valid(r, c, d) {
                    m |= bit(d);
                }
            }
            self.cands[i] = m;
        }
    }

    /// Cell is empty and still has digit `d` as a candidate.
    pub(crate) fn open_with(&self, idx: usize, d: Digit) -> bool {
        self.grid.cells[idx] == 0 && self.cands[idx] & bit(d) != 0
    }

    pub(crate) fn remove_candidate(&mut self, idx: usize, d: Digit) -> bool {
        if self.cands[idx] & bit(d) != 0 {
            self.cands[idx] &= !bit(d);
            true
        } else {
            false
        }
    }

    /// Place a value, clear the cell's candidates, strike the value from
    /// all peers, and record the technique and step.
    pub(crate) fn place(&mut self, idx: usize, d: Digit, tech: Technique) {
        self.grid.cells[idx] = d;
        self.cands[idx] = 0;
        for &p in peers(idx) {
            self.cands[p] &= !bit(d);
        }
        self.used.insert(tech);
        self.steps.push(SolveStep { technique: tech, row: idx / 9, col: idx % 9, value: d });
    }

    fn candidate_count(&self) -> u32 {
        self.cands.iter().map(|m| m.count_ones()).sum()
    }

    fn density_factor(&self) -> f64 {
        f64::from(self.candidate_count()) / TEMPLATE_CANDIDATES * 20.0
    }

    /// Run the battery to fixpoint; returns the raw weighted score. The
    /// density factor is re-read before every pass so earlier, more open
    /// board states weigh heavier per application.
    fn propagate(&mut self) -> f64 {
        let mut total = 0.0;
        loop {
            let factor = self.density_factor();
            let mut fired = None;
            for &(tech, run) in BATTERY {
                if let Some(extra) = run(self) {
                    fired = Some((tech, extra));
                    break;
                }
            }
            match fired {
                Some((tech, extra)) => total += (tech.base_score() + f64::from(extra)) * factor,
                None => break,
            }
        }
        total
    }

    /// Exhaustive fallback: row-major first empty cell, try each of its
    /// propagation-time candidates that still passes `is_valid`, recurse,
    /// undo on failure. Candidates are left untouched during the search;
    /// the board alone carries the trial state. False at the root is the
    /// authoritative unsolvable signal.
    fn backtrack(&mut self) -> bool {
        for idx in 0..81 {
            if self.grid.cells[idx] != 0 {
                continue;
            }
            let mask = self.cands[idx];
            let (r, c) = (idx / 9, idx % 9);
            for d in 1..=9 {
                if mask & bit(d) == 0 || !self.grid.is_valid(r, c, d) {
                    continue;
                }
                self.grid.cells[idx] = d;
                if self.backtrack() {
                    return true;
                }
                self.grid.cells[idx] = 0;
            }
            return false;
        }
        true
    }
}

/// Log-compress the raw weighted score: log5(raw) * 2.
pub fn normalize_score(raw: f64) -> f64 {
    if raw <= 0.0 {
        0.0
    } else {
        raw.ln() / 5f64.ln() * 2.0
    }
}

/// Grade one puzzle: propagation to fixpoint, backtracking fallback if
/// the logic stalls, then score normalization. Deterministic, and the
/// caller's grid is never mutated.
pub fn grade_puzzle(grid: &Grid) -> Graded {
    let mut g = Grader::new(grid);
    let raw = g.propagate();

    if !g.grid.is_solved() {
        if g.backtrack() {
            // the fallback proves solvability but adds no human-comparable cost
            g.used.insert(Technique::Backtracking);
        } else {
            return Graded {
                is_solvable: false,
                solution: None,
                difficulty: 0.0,
                techniques_used: g.used,
                steps: g.steps,
            };
        }
    }

    Graded {
        is_solvable: true,
        solution: Some(g.grid),
        difficulty: normalize_score(raw),
        techniques_used: g.used,
        steps: g.steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EASY: &str =
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079";

    #[test]
    fn empty_grid_has_729_candidates() {
        let g = Grader::new(&Grid::empty());
        assert_eq!(g.candidate_count(), 729);
    }

    #[test]
    fn seeding_respects_placements() {
        let grid = Grid::from_compact(EASY).unwrap();
        let g = Grader::new(&grid);
        // row holds 5,3,7; box adds 6,9,8; column adds nothing new -> {1,2,4} at (0,2)
        assert_eq!(g.cands[2], bit(1) | bit(2) | bit(4));
        assert_eq!(g.cands[0], 0); // given cell
    }

    #[test]
    fn normalize_anchors() {
        assert_eq!(normalize_score(0.0), 0.0);
        assert_eq!(normalize_score(-3.0), 0.0);
        assert!((normalize_score(5.0) - 2.0).abs() < 1e-12);
        assert!((normalize_score(25.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn candidates_never_grow_during_propagation() {
        let grid = Grid::from_compact(EASY).unwrap();
        let mut g = Grader::new(&grid);
        loop {
            let before = g.cands;
            let mut fired = false;
            for &(_, run) in BATTERY {
                if run(&mut g).is_some() {
                    fired = true;
                    break;
                }
            }
            if !fired {
                break;
            }
            for i in 0..81 {
                assert_eq!(before[i] & g.cands[i], g.cands[i], "cell {i} candidates grew");
            }
        }
    }

    #[test]
    fn battery_priority_is_fixed() {
        let order: Vec<Technique> = BATTERY.iter().map(|&(t, _)| t).collect();
        assert_eq!(order[0], Technique::NakedSingle);
        assert_eq!(order[1], Technique::HiddenSingle);
        assert_eq!(order[2], Technique::PointingPairs);
        assert_eq!(*order.last().unwrap(), Technique::BugPlusOne);
        assert_eq!(order.len(), 19);
    }

    #[test]
    fn steps_record_battery_placements() {
        let grid = Grid::from_compact(EASY).unwrap();
        let graded = grade_puzzle(&grid);
        assert!(graded.is_solvable);
        assert!(!graded.steps.is_empty());
        let first = graded.steps[0];
        assert!((1..=9).contains(&first.value));
        assert!(graded.techniques_used.contains(&first.technique));
    }
}
