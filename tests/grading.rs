use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use sudograde::{grade_puzzle, Graded, Grid, Pos, Technique};

fn grade(s: &str) -> Graded {
    grade_puzzle(&Grid::from_compact(s).expect("parse"))
}

fn assert_solution_valid(solution: &Grid) {
    let digits: BTreeSet<u8> = (1..=9).collect();
    for i in 0..9 {
        let row: BTreeSet<u8> = (0..9).map(|c| solution.get(Pos { r: i, c })).collect();
        let col: BTreeSet<u8> = (0..9).map(|r| solution.get(Pos { r, c: i })).collect();
        let boks: BTreeSet<u8> = (0..9)
            .map(|j| solution.get(Pos { r: (i / 3) * 3 + j / 3, c: (i % 3) * 3 + j % 3 }))
            .collect();
        assert_eq!(row, digits, "row {i}");
        assert_eq!(col, digits, "column {i}");
        assert_eq!(boks, digits, "box {i}");
    }
}

fn assert_solves_with(puzzle: &str, technique: Technique) {
    let graded = grade(puzzle);
    assert!(graded.is_solvable, "{technique} puzzle should be solvable");
    assert!(
        graded.techniques_used.contains(&technique),
        "expected {technique}, got {:?}",
        graded.techniques_used
    );
    assert!(graded.difficulty > 0.0);
    assert_solution_valid(graded.solution.as_ref().expect("solution"));
}

#[test]
fn grades_with_pointing_pairs() {
    assert_solves_with(
        "070010050900300007000080000000000200012004900000100005003900406006001070780530000",
        Technique::PointingPairs,
    );
}

#[test]
fn grades_with_naked_pair() {
    assert_solves_with(
        "000005094000940300020007000400060008301000500008000070052070000007009000800302060",
        Technique::NakedPair,
    );
}

#[test]
fn grades_with_hidden_pair() {
    assert_solves_with(
        "300000000040600008100004035800000600000000080500002900604030000005700820073500040",
        Technique::HiddenPair,
    );
}

#[test]
fn grades_with_x_wing() {
    assert_solves_with(
        "009020000060000057800030010500009040702600000094003206000060008600000009000004100",
        Technique::XWing,
    );
}

#[test]
fn grades_with_swordfish() {
    assert_solves_with(
        "204600005800070900000030020000000096100302007680000000040050000006020008300009602",
        Technique::Swordfish,
    );
}

#[test]
fn grades_with_jellyfish() {
    assert_solves_with(
        "140000097970000016000000000000453000060170000730020000000000000420060071610000039",
        Technique::Jellyfish,
    );
}

#[test]
fn grades_with_y_wing() {
    assert_solves_with(
        "050000080000086000000201070009020601280000054703060900090605000000170000030000010",
        Technique::YWing,
    );
}

#[test]
fn grades_with_xyz_wing() {
    assert_solves_with(
        "000400600050030000309100200180605004000000000700901053001009408000060010002007000",
        Technique::XyzWing,
    );
}

#[test]
fn grades_with_xy_chain() {
    assert_solves_with(
        "800400057250000640097300800000070406000905000904060000008001720019000085530007004",
        Technique::XyChain,
    );
}

#[test]
fn already_solved_grid_grades_to_zero() {
    let solved =
        "534678912672195348198342567859761423426853791713924856961537284287419635345286179";
    let graded = grade(solved);
    assert!(graded.is_solvable);
    assert_eq!(graded.difficulty, 0.0);
    assert!(graded.techniques_used.is_empty());
    assert!(graded.steps.is_empty());
    assert_eq!(graded.solution.as_ref().map(Grid::to_compact).as_deref(), Some(solved));
}

#[test]
fn unsolvable_puzzle_reports_cleanly() {
    // (0,8) can hold nothing: 1-8 fill its row and 9 sits in its column
    let mut s = String::from("123456780");
    s.push_str("000000009");
    s.push_str(&"0".repeat(63));
    let graded = grade(&s);
    assert!(!graded.is_solvable);
    assert_eq!(graded.solution, None);
    assert_eq!(graded.difficulty, 0.0);
}

#[test]
fn grading_is_deterministic() {
    let puzzle =
        "070010050900300007000080000000000200012004900000100005003900406006001070780530000";
    let a = grade(puzzle);
    let b = grade(puzzle);
    assert_eq!(a.is_solvable, b.is_solvable);
    assert_eq!(a.difficulty.to_bits(), b.difficulty.to_bits());
    assert_eq!(a.techniques_used, b.techniques_used);
    assert_eq!(a.steps, b.steps);
    assert_eq!(
        a.solution.as_ref().map(Grid::to_compact),
        b.solution.as_ref().map(Grid::to_compact)
    );
}

#[test]
fn grading_does_not_mutate_input() {
    let puzzle =
        "000005094000940300020007000400060008301000500008000070052070000007009000800302060";
    let grid = Grid::from_compact(puzzle).unwrap();
    let before = grid.clone();
    let _ = grade_puzzle(&grid);
    assert_eq!(grid, before);
}

#[test]
fn hard_puzzle_falls_back_to_backtracking() {
    // near-empty board: propagation stalls long before completion
    let mut s = String::from("123456789");
    s.push_str(&"0".repeat(72));
    let graded = grade(&s);
    assert!(graded.is_solvable);
    assert!(graded.techniques_used.contains(&Technique::Backtracking));
    assert_solution_valid(graded.solution.as_ref().unwrap());
}

#[test]
fn easy_puzzle_solves_by_singles_alone() {
    let graded = grade(
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079",
    );
    assert!(graded.is_solvable);
    assert!(!graded.techniques_used.contains(&Technique::Backtracking));
    assert!(graded.techniques_used.contains(&Technique::NakedSingle)
        || graded.techniques_used.contains(&Technique::HiddenSingle));
    assert!(graded.difficulty > 0.0);
    assert_solution_valid(graded.solution.as_ref().unwrap());
}
