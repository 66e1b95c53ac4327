//! The deduction battery. Each finder scans the session for its pattern,
//! places a value or strikes candidates, tags the technique, and reports
//! whether it made progress. Finders are pure over the session; ordering
//! and scoring live in `solver`.
//!
//! First-hit-wins versus fill-everything varies per finder on purpose:
//! naked singles sweep the whole board in one call and hidden singles keep
//! scanning after row/column hits, while everything else stops at the
//! first productive pattern. Grading reproducibility depends on keeping
//! these shapes as they are.

use itertools::Itertools;
use std::collections::{BTreeSet, VecDeque};

use crate::grid::{bit, bitcount, box_cells, col_cells, digits_of, first_digit, row_cells, sees, Digit};
use crate::solver::Grader;
use crate::technique::Technique;

pub(crate) fn naked_single(g: &mut Grader) -> bool {
    let mut found = false;
    for i in 0..81 {
        if g.grid.cells[i] == 0 && bitcount(g.cands[i]) == 1 {
            let d = first_digit(g.cands[i]).unwrap();
            g.place(i, d, Technique::NakedSingle);
            found = true;
        }
    }
    found
}

pub(crate) fn hidden_single(g: &mut Grader) -> bool {
    let mut found = false;
    for d in 1..=9 {
        for i in 0..9 {
            let row_hits: Vec<usize> =
                row_cells(i).iter().copied().filter(|&x| g.open_with(x, d)).collect();
            if row_hits.len() == 1 {
                g.place(row_hits[0], d, Technique::HiddenSingle);
                found = true;
                continue;
            }
            let col_hits: Vec<usize> =
                col_cells(i).iter().copied().filter(|&x| g.open_with(x, d)).collect();
            if col_hits.len() == 1 {
                g.place(col_hits[0], d, Technique::HiddenSingle);
                found = true;
                continue;
            }
            let box_hits: Vec<usize> =
                box_cells(i).iter().copied().filter(|&x| g.open_with(x, d)).collect();
            if box_hits.len() == 1 {
                g.place(box_hits[0], d, Technique::HiddenSingle);
                return true;
            }
        }
    }
    found
}

/// Locked candidates, pointing form: a value confined to one row or column
/// inside a box is struck from the rest of that line.
pub(crate) fn pointing_pairs(g: &mut Grader) -> bool {
    for d in 1..=9 {
        for b in 0..9 {
            let start_row = (b / 3) * 3;
            let start_col = (b % 3) * 3;
            let positions: Vec<usize> =
                box_cells(b).iter().copied().filter(|&i| g.open_with(i, d)).collect();
            if !(2..=3).contains(&positions.len()) {
                continue;
            }
            if positions.iter().all(|&i| i / 9 == positions[0] / 9) {
                let r = positions[0] / 9;
                let mut removed = false;
                for c in 0..9 {
                    if c < start_col || c >= start_col + 3 {
                        removed |= g.remove_candidate(r * 9 + c, d);
                    }
                }
                if removed {
                    g.used.insert(Technique::PointingPairs);
                    return true;
                }
            }
            if positions.iter().all(|&i| i % 9 == positions[0] % 9) {
                let c = positions[0] % 9;
                let mut removed = false;
                for r in 0..9 {
                    if r < start_row || r >= start_row + 3 {
                        removed |= g.remove_candidate(r * 9 + c, d);
                    }
                }
                if removed {
                    g.used.insert(Technique::PointingPairs);
                    return true;
                }
            }
        }
    }
    false
}

/// Locked candidates, claiming form: a value confined to one box inside a
/// row or column is struck from the rest of that box.
pub(crate) fn box_line_reduction(g: &mut Grader) -> bool {
    for d in 1..=9 {
        for i in 0..9 {
            let cols: Vec<usize> = (0..9).filter(|&c| g.open_with(i * 9 + c, d)).collect();
            if (2..=3).contains(&cols.len()) && cols.iter().all(|&c| c / 3 == cols[0] / 3) {
                let b = (i / 3) * 3 + cols[0] / 3;
                let mut removed = false;
                for &cell in box_cells(b).iter() {
                    if cell / 9 != i {
                        removed |= g.remove_candidate(cell, d);
                    }
                }
                if removed {
                    g.used.insert(Technique::LineBoxReduction);
                    return true;
                }
            }
            let rows: Vec<usize> = (0..9).filter(|&r| g.open_with(r * 9 + i, d)).collect();
            if (2..=3).contains(&rows.len()) && rows.iter().all(|&r| r / 3 == rows[0] / 3) {
                let b = (rows[0] / 3) * 3 + i / 3;
                let mut removed = false;
                for &cell in box_cells(b).iter() {
                    if cell % 9 != i {
                        removed |= g.remove_candidate(cell, d);
                    }
                }
                if removed {
                    g.used.insert(Technique::LineBoxReduction);
                    return true;
                }
            }
        }
    }
    false
}

pub(crate) fn naked_subsets(g: &mut Grader, k: usize, tech: Technique) -> bool {
    for i in 0..9 {
        if naked_subset_in_unit(g, &row_cells(i), k, tech) {
            return true;
        }
        if naked_subset_in_unit(g, &col_cells(i), k, tech) {
            return true;
        }
        if naked_subset_in_unit(g, &box_cells(i), k, tech) {
            return true;
        }
    }
    false
}

fn naked_subset_in_unit(g: &mut Grader, cells: &[usize; 9], k: usize, tech: Technique) -> bool {
    let eligible: Vec<usize> = cells
        .iter()
        .copied()
        .filter(|&i| {
            let n = bitcount(g.cands[i]);
            g.grid.cells[i] == 0 && n > 1 && n <= k as u32
        })
        .collect();
    if eligible.len() < k {
        return false;
    }
    for combo in eligible.iter().copied().combinations(k) {
        let union = combo.iter().fold(0u16, |m, &i| m | g.cands[i]);
        if bitcount(union) != k as u32 {
            continue;
        }
        let mut removed = false;
        for &i in cells.iter() {
            if combo.contains(&i) {
                continue;
            }
            let after = g.cands[i] & !union;
            if after != g.cands[i] {
                g.cands[i] = after;
                removed = true;
            }
        }
        if removed {
            g.used.insert(tech);
            return true;
        }
    }
    false
}

pub(crate) fn hidden_subsets(g: &mut Grader, k: usize, tech: Technique) -> bool {
    for i in 0..9 {
        if hidden_subset_in_unit(g, &row_cells(i), k, tech) {
            return true;
        }
        if hidden_subset_in_unit(g, &col_cells(i), k, tech) {
            return true;
        }
        if hidden_subset_in_unit(g, &box_cells(i), k, tech) {
            return true;
        }
    }
    false
}

fn hidden_subset_in_unit(g: &mut Grader, cells: &[usize; 9], k: usize, tech: Technique) -> bool {
    let mut val_map: Vec<(Digit, Vec<usize>)> = Vec::new();
    for d in 1..=9 {
        let positions: Vec<usize> =
            cells.iter().copied().filter(|&i| g.open_with(i, d)).collect();
        if positions.len() >= 2 && positions.len() <= k {
            val_map.push((d, positions));
        }
    }
    if val_map.len() < k {
        return false;
    }
    for combo in val_map.iter().combinations(k) {
        let combined: BTreeSet<usize> =
            combo.iter().flat_map(|(_, p)| p.iter().copied()).collect();
        if combined.len() != k {
            continue;
        }
        let keep = combo.iter().fold(0u16, |m, (d, _)| m | bit(*d));
        let mut removed = false;
        for &i in &combined {
            let after = g.cands[i] & keep;
            if after != g.cands[i] {
                g.cands[i] = after;
                removed = true;
            }
        }
        if removed {
            g.used.insert(tech);
            return true;
        }
    }
    false
}

/// Fish of size k (X-Wing / Swordfish / Jellyfish): k parallel lines whose
/// candidates for a value occupy the same k crossing lines; the value is
/// struck from the crossing lines outside the pattern.
pub(crate) fn fish(g: &mut Grader, k: usize, tech: Technique) -> bool {
    for d in 1..=9 {
        if fish_lines(g, d, k, tech, true) {
            return true;
        }
        if fish_lines(g, d, k, tech, false) {
            return true;
        }
    }
    false
}

fn fish_lines(g: &mut Grader, d: Digit, k: usize, tech: Technique, rows: bool) -> bool {
    let mut lines: Vec<(usize, Vec<usize>)> = Vec::new();
    for i in 0..9 {
        let positions: Vec<usize> = (0..9)
            .filter(|&j| {
                let idx = if rows { i * 9 + j } else { j * 9 + i };
                g.open_with(idx, d)
            })
            .collect();
        if positions.len() >= 2 && positions.len() <= k {
            lines.push((i, positions));
        }
    }
    if lines.len() < k {
        return false;
    }
    for combo in lines.iter().combinations(k) {
        let targets: BTreeSet<usize> =
            combo.iter().flat_map(|(_, p)| p.iter().copied()).collect();
        if targets.len() != k {
            continue;
        }
        let sources: Vec<usize> = combo.iter().map(|(i, _)| *i).collect();
        let mut removed = false;
        for &t in &targets {
            for i in 0..9 {
                if sources.contains(&i) {
                    continue;
                }
                let idx = if rows { i * 9 + t } else { t * 9 + i };
                removed |= g.remove_candidate(idx, d);
            }
        }
        if removed {
            g.used.insert(tech);
            return true;
        }
    }
    false
}

/// Unique Rectangle Type 1: four empty corners on two rows and two columns
/// spanning exactly two boxes, three of them exactly the pair `{v1,v2}`.
/// If the puzzle has a unique solution the fourth corner cannot collapse
/// to that pair, so both values are struck from it.
pub(crate) fn unique_rectangle(g: &mut Grader) -> bool {
    for r1 in 0..9 {
        for r2 in r1 + 1..9 {
            for c1 in 0..9 {
                for c2 in c1 + 1..9 {
                    let corners = [r1 * 9 + c1, r1 * 9 + c2, r2 * 9 + c1, r2 * 9 + c2];
                    let boxes: BTreeSet<usize> = corners
                        .iter()
                        .map(|&i| (i / 9 / 3) * 3 + (i % 9) / 3)
                        .collect();
                    if boxes.len() != 2 {
                        continue;
                    }
                    if corners.iter().any(|&i| g.grid.cells[i] != 0) {
                        continue;
                    }
                    let all = corners.iter().fold(0u16, |m, &i| m | g.cands[i]);
                    let vals: Vec<Digit> = digits_of(all).collect();
                    for x in 0..vals.len() {
                        for y in x + 1..vals.len() {
                            let pair = bit(vals[x]) | bit(vals[y]);
                            let floor = corners.iter().filter(|&&i| g.cands[i] == pair).count();
                            if floor != 3 {
                                continue;
                            }
                            let fourth = corners
                                .iter()
                                .copied()
                                .find(|&i| g.cands[i] != pair)
                                .unwrap();
                            if g.cands[fourth] & pair == pair {
                                g.cands[fourth] &= !pair;
                                g.used.insert(Technique::UniqueRectangleType1);
                                return true;
                            }
                        }
                    }
                }
            }
        }
    }
    false
}

fn bivalue_cells(g: &Grader) -> Vec<(usize, [Digit; 2])> {
    (0..81)
        .filter(|&i| g.grid.cells[i] == 0 && bitcount(g.cands[i]) == 2)
        .map(|i| {
            let v: Vec<Digit> = digits_of(g.cands[i]).collect();
            (i, [v[0], v[1]])
        })
        .collect()
}

/// Y-Wing: a bivalue pivot sees two bivalue pincers `{x,z}` and `{y,z}`;
/// any cell seeing both pincers loses `z`.
pub(crate) fn y_wing(g: &mut Grader) -> bool {
    let cells = bivalue_cells(g);
    for i in 0..cells.len() {
        for j in 0..cells.len() {
            if i == j {
                continue;
            }
            let (pivot, pvals) = cells[i];
            let (p1, p1vals) = cells[j];
            if !sees(pivot, p1) {
                continue;
            }
            let Some(common) = pvals.iter().copied().find(|v| p1vals.contains(v)) else {
                continue;
            };
            let Some(z) = p1vals.iter().copied().find(|&v| v != common) else {
                continue;
            };
            let Some(y) = pvals.iter().copied().find(|&v| v != common) else {
                continue;
            };
            if z == y {
                continue;
            }
            for k in j + 1..cells.len() {
                if k == i {
                    continue;
                }
                let (p2, p2vals) = cells[k];
                if !sees(pivot, p2) {
                    continue;
                }
                if !(p2vals.contains(&y) && p2vals.contains(&z)) {
                    continue;
                }
                let mut removed = false;
                for idx in 0..81 {
                    if g.grid.cells[idx] != 0 || idx == p1 || idx == p2 {
                        continue;
                    }
                    if sees(idx, p1) && sees(idx, p2) {
                        removed |= g.remove_candidate(idx, z);
                    }
                }
                if removed {
                    g.used.insert(Technique::YWing);
                    return true;
                }
            }
        }
    }
    false
}

/// XYZ-Wing: a trivalue pivot plus two bivalue wings drawn from the
/// pivot's candidates with a single value `z` common to all three; `z` is
/// struck from cells seeing the whole trio.
pub(crate) fn xyz_wing(g: &mut Grader) -> bool {
    let mut trivalue = Vec::new();
    let mut bivalue = Vec::new();
    for i in 0..81 {
        if g.grid.cells[i] != 0 {
            continue;
        }
        match bitcount(g.cands[i]) {
            3 => trivalue.push(i),
            2 => bivalue.push(i),
            _ => {}
        }
    }
    for &pivot in &trivalue {
        let pmask = g.cands[pivot];
        for a in 0..bivalue.len() {
            let w1 = bivalue[a];
            if !sees(pivot, w1) || g.cands[w1] & !pmask != 0 {
                continue;
            }
            for b in a + 1..bivalue.len() {
                let w2 = bivalue[b];
                if !sees(pivot, w2) || g.cands[w2] & !pmask != 0 {
                    continue;
                }
                let shared = pmask & g.cands[w1] & g.cands[w2];
                if bitcount(shared) != 1 {
                    continue;
                }
                let z = first_digit(shared).unwrap();
                let mut removed = false;
                for idx in 0..81 {
                    if g.grid.cells[idx] != 0 || idx == pivot || idx == w1 || idx == w2 {
                        continue;
                    }
                    if sees(idx, pivot) && sees(idx, w1) && sees(idx, w2) {
                        removed |= g.remove_candidate(idx, z);
                    }
                }
                if removed {
                    g.used.insert(Technique::XyzWing);
                    return true;
                }
            }
        }
    }
    false
}

/// XY-Chain: depth-first search over the "sees" graph of bivalue cells.
/// Links share a candidate; when a chain closes with the start value at
/// both ends, that value is struck from every cell seeing both ends.
/// Returns the chain length on success, which feeds into the score.
pub(crate) fn xy_chain(g: &mut Grader) -> Option<u32> {
    let cells = bivalue_cells(g);
    for &(start, vals) in &cells {
        for s in 0..2 {
            let start_val = vals[s];
            let seek = vals[1 - s];
            let mut visited = vec![start];
            if let Some(len) = xy_chain_dfs(g, &cells, start, start_val, start, seek, &mut visited) {
                return Some(len);
            }
        }
    }
    None
}

fn xy_chain_dfs(
    g: &mut Grader,
    cells: &[(usize, [Digit; 2])],
    start: usize,
    start_val: Digit,
    current: usize,
    seek: Digit,
    visited: &mut Vec<usize>,
) -> Option<u32> {
    for &(next, nvals) in cells {
        if visited.contains(&next) || !sees(current, next) || !nvals.contains(&seek) {
            continue;
        }
        let other = if nvals[0] == seek { nvals[1] } else { nvals[0] };
        if other == start_val {
            let mut removed = false;
            for idx in 0..81 {
                if g.grid.cells[idx] != 0 || idx == start || idx == next {
                    continue;
                }
                if sees(idx, start) && sees(idx, next) {
                    removed |= g.remove_candidate(idx, start_val);
                }
            }
            if removed {
                g.used.insert(Technique::XyChain);
                return Some(visited.len() as u32);
            }
        }
        visited.push(next);
        if let Some(len) = xy_chain_dfs(g, cells, start, start_val, next, other, visited) {
            return Some(len);
        }
        visited.pop();
    }
    None
}

/// Simple colouring on the conjugate graph of one value: nodes are cells
/// holding the candidate, edges join the sole two holders in a unit.
/// Each component is 2-coloured, then: a colour appearing twice in a unit
/// is struck wholesale, and an outside cell seeing both colours loses the
/// value.
pub(crate) fn simple_colouring(g: &mut Grader) -> bool {
    for d in 1..=9 {
        let nodes: Vec<usize> = (0..81).filter(|&i| g.open_with(i, d)).collect();
        let mut adj: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        for i in 0..9 {
            let houses = [
                nodes.iter().positions(|&n| n / 9 == i).collect::<Vec<_>>(),
                nodes.iter().positions(|&n| n % 9 == i).collect::<Vec<_>>(),
                nodes
                    .iter()
                    .positions(|&n| (n / 9 / 3) * 3 + (n % 9) / 3 == i)
                    .collect::<Vec<_>>(),
            ];
            for house in houses {
                if house.len() == 2 {
                    adj[house[0]].push(house[1]);
                    adj[house[1]].push(house[0]);
                }
            }
        }

        let mut colors: Vec<Option<u8>> = vec![None; nodes.len()];
        for i in 0..nodes.len() {
            if colors[i].is_some() {
                continue;
            }
            let mut component = Vec::new();
            let mut queue = VecDeque::from([(i, 0u8)]);
            colors[i] = Some(0);
            while let Some((u, cu)) = queue.pop_front() {
                component.push(u);
                for &v in &adj[u] {
                    if colors[v].is_none() {
                        colors[v] = Some(1 - cu);
                        queue.push_back((v, 1 - cu));
                    }
                }
            }

            // a colour twice in one unit falsifies that whole colour
            for color in 0..=1u8 {
                let colored: Vec<usize> = component
                    .iter()
                    .copied()
                    .filter(|&n| colors[n] == Some(color))
                    .map(|n| nodes[n])
                    .collect();
                for j in 0..9 {
                    let in_row = colored.iter().filter(|&&n| n / 9 == j).count();
                    let in_col = colored.iter().filter(|&&n| n % 9 == j).count();
                    let in_box = colored
                        .iter()
                        .filter(|&&n| (n / 9 / 3) * 3 + (n % 9) / 3 == j)
                        .count();
                    if in_row > 1 || in_col > 1 || in_box > 1 {
                        let mut removed = false;
                        for &n in &component {
                            if colors[n] == Some(color) {
                                removed |= g.remove_candidate(nodes[n], d);
                            }
                        }
                        if removed {
                            g.used.insert(Technique::SimpleColouring);
                            return true;
                        }
                    }
                }
            }

            // a cell outside the component seeing both colours loses the value
            for n in 0..nodes.len() {
                if component.contains(&n) {
                    continue;
                }
                let mut sees_color = [false, false];
                for &cn in &component {
                    if sees(nodes[n], nodes[cn]) {
                        if let Some(c) = colors[cn] {
                            sees_color[c as usize] = true;
                        }
                    }
                }
                if sees_color[0] && sees_color[1] && g.remove_candidate(nodes[n], d) {
                    g.used.insert(Technique::SimpleColouring);
                    return true;
                }
            }
        }
    }
    false
}

/// BUG+1: every empty cell bivalue except one trivalue cell. Placing the
/// candidate that occurs exactly three times in that cell's row, column,
/// and box avoids the deadly bivalue-universal-grave pattern.
pub(crate) fn bug_plus_one(g: &mut Grader) -> bool {
    let mut bug: Option<usize> = None;
    for i in 0..81 {
        if g.grid.cells[i] != 0 {
            continue;
        }
        match bitcount(g.cands[i]) {
            2 => {}
            3 => {
                if bug.is_some() {
                    return false;
                }
                bug = Some(i);
            }
            _ => return false,
        }
    }
    let Some(idx) = bug else { return false };
    let (r, c) = (idx / 9, idx % 9);
    for d in digits_of(g.cands[idx]).collect::<Vec<_>>() {
        let in_row = row_cells(r).iter().filter(|&&i| g.cands[i] & bit(d) != 0).count();
        let in_col = col_cells(c).iter().filter(|&&i| g.cands[i] & bit(d) != 0).count();
        let b = (r / 3) * 3 + c / 3;
        let in_box = box_cells(b).iter().filter(|&&i| g.cands[i] & bit(d) != 0).count();
        if in_row == 3 && in_col == 3 && in_box == 3 {
            g.place(idx, d, Technique::BugPlusOne);
            return true;
        }
    }
    false
}
