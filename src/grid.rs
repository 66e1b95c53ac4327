use anyhow::{bail, Result};
use once_cell::sync::Lazy;

pub type Digit = u8; // 0 = empty, 1..=9 placed

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos { pub r: usize, pub c: usize }

impl Pos {
    pub fn idx(self) -> usize { self.r * 9 + self.c }
    pub fn from_idx(i: usize) -> Self { Pos { r: i / 9, c: i % 9 } }
    pub fn box_index(self) -> usize { (self.r / 3) * 3 + self.c / 3 }
}

/// 9x9 value grid, row-major. Candidates live in the grading session,
/// not here, so a `Grid` is a plain snapshot that callers can keep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub(crate) cells: [Digit; 81],
}

impl Grid {
    pub fn empty() -> Self { Self { cells: [0; 81] } }

    /// Parse an 81-char compact puzzle string. `'0'` and `'.'` are empty.
    /// Wrong length or a stray character is an error; contradictory givens
    /// are not checked here and surface later as unsolvable.
    pub fn from_compact(s: &str) -> Result<Self> {
        if s.len() != 81 { bail!("compact string must be 81 chars (have {})", s.len()) }
        let mut g = Grid::empty();
        for (i, ch) in s.chars().enumerate() {
            g.cells[i] = match ch {
                '.' | '0' => 0,
                '1'..='9' => ch as u8 - b'0',
                _ => bail!("invalid char {ch:?} at index {i}"),
            };
        }
        Ok(g)
    }

    pub fn to_compact(&self) -> String {
        self.cells.iter().map(|&d| (b'0' + d) as char).collect()
    }

    pub fn to_pretty_string(&self) -> String {
        let mut s = String::new();
        for r in 0..9 {
            if r % 3 == 0 { s.push_str("+-------+-------+-------+\n"); }
            for c in 0..9 {
                if c % 3 == 0 { s.push('|'); s.push(' '); }
                let d = self.get(Pos { r, c });
                s.push(if d == 0 { '·' } else { (b'0' + d) as char });
                s.push(' ');
            }
            s.push('|'); s.push('\n');
        }
        s.push_str("+-------+-------+-------+\n");
        s
    }

    pub fn get(&self, p: Pos) -> Digit { self.cells[p.idx()] }
    pub fn is_solved(&self) -> bool { self.cells.iter().all(|&d| d != 0) }

    /// True iff `value` does not already appear among the placed values of
    /// the row, the column, or the 3x3 box containing `(row, col)`. Drives
    /// both candidate seeding and the backtracking fallback.
    pub fn is_valid(&self, row: usize, col: usize, value: Digit) -> bool {
        for x in 0..9 {
            if self.cells[row * 9 + x] == value { return false; }
            if self.cells[x * 9 + col] == value { return false; }
        }
        let br = (row / 3) * 3;
        let bc = (col / 3) * 3;
        for r in br..br + 3 {
            for c in bc..bc + 3 {
                if self.cells[r * 9 + c] == value { return false; }
            }
        }
        true
    }
}

/// Two distinct cells see each other when they share a row, column, or box.
pub fn sees(a: usize, b: usize) -> bool {
    let (ar, ac) = (a / 9, a % 9);
    let (br, bc) = (b / 9, b % 9);
    ar == br || ac == bc || (ar / 3 == br / 3 && ac / 3 == bc / 3)
}

pub fn row_cells(r: usize) -> [usize; 9] {
    std::array::from_fn(|c| r * 9 + c)
}

pub fn col_cells(c: usize) -> [usize; 9] {
    std::array::from_fn(|r| r * 9 + c)
}

pub fn box_cells(b: usize) -> [usize; 9] {
    let br = (b / 3) * 3;
    let bc = (b % 3) * 3;
    std::array::from_fn(|i| (br + i / 3) * 9 + bc + i % 3)
}

static PEERS: Lazy<Vec<Vec<usize>>> = Lazy::new(|| {
    (0..81)
        .map(|i| (0..81).filter(|&j| j != i && sees(i, j)).collect())
        .collect()
});

pub fn peers(idx: usize) -> &'static [usize] { &PEERS[idx] }

// candidate bitmask helpers; bit d means digit d (1..=9) possible
#[inline]
pub(crate) const fn bit(d: Digit) -> u16 { 1 << d }

pub(crate) fn bitcount(m: u16) -> u32 { m.count_ones() }

pub(crate) fn digits_of(m: u16) -> impl Iterator<Item = Digit> {
    (1..=9).filter(move |&d| m & bit(d) != 0)
}

pub(crate) fn first_digit(m: u16) -> Option<Digit> {
    if m == 0 { None } else { Some(m.trailing_zeros() as Digit) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_roundtrip() {
        let s = "530070000600195000098000060800060003400803001700020006060000280000419005000080079";
        let g = Grid::from_compact(s).unwrap();
        assert_eq!(g.to_compact(), s);
        assert_eq!(g.get(Pos { r: 0, c: 0 }), 5);
        assert_eq!(g.get(Pos { r: 8, c: 8 }), 9);
    }

    #[test]
    fn parse_accepts_dots() {
        let s = "53..7....6..195....98....6.8...6...34..8.3..17...2...6.6....28....419..5....8..79";
        let g = Grid::from_compact(s).unwrap();
        assert_eq!(g.get(Pos { r: 0, c: 1 }), 3);
        assert_eq!(g.get(Pos { r: 0, c: 2 }), 0);
    }

    #[test]
    fn parse_rejects_bad_length() {
        assert!(Grid::from_compact("123").is_err());
        assert!(Grid::from_compact(&"0".repeat(82)).is_err());
    }

    #[test]
    fn parse_rejects_bad_char() {
        let mut s = "0".repeat(81);
        s.replace_range(40..41, "x");
        assert!(Grid::from_compact(&s).is_err());
    }

    #[test]
    fn validity_checks_row_col_box() {
        let s = "530070000600195000098000060800060003400803001700020006060000280000419005000080079";
        let g = Grid::from_compact(s).unwrap();
        assert!(!g.is_valid(0, 2, 5)); // 5 already in row 0
        assert!(!g.is_valid(2, 0, 6)); // 6 already in column 0
        assert!(!g.is_valid(1, 1, 9)); // 9 already in top-left box
        assert!(g.is_valid(0, 2, 1));
    }

    #[test]
    fn sees_covers_units() {
        assert!(sees(0, 8)); // same row
        assert!(sees(0, 72)); // same column
        assert!(sees(0, 10)); // same box
        assert!(!sees(0, 40));
    }

    #[test]
    fn peer_counts() {
        for i in 0..81 {
            assert_eq!(peers(i).len(), 20);
        }
    }
}
