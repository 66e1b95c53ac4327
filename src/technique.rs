use serde::{Serialize, Serializer};
use std::fmt;

/// Closed catalogue of deduction techniques. The propagation battery fires
/// only a subset; the rest are declared and scored so that graded output
/// keeps the full table and the difficulty distribution stays stable if
/// more finders are added later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Technique {
    NakedSingle,
    HiddenSingle,
    NakedPair,
    NakedTriple,
    HiddenPair,
    HiddenTriple,
    NakedQuad,
    HiddenQuad,
    PointingPairs,
    LineBoxReduction,
    GurthsTheorem,
    BugPlusOne,
    XWing,
    UniqueRectangleType1,
    ChuteRemotePair,
    SimpleColouring,
    YWing,
    RectangleElimination,
    Swordfish,
    XyzWing,
    Tridagon,
    XCycle,
    XyChain,
    Medusa3d,
    Jellyfish,
    UniqueRectangle2345,
    AvoidableRectangle,
    TwinnedXyChain,
    Fireworks,
    SkLoop,
    ExtendedUniqueRectangle,
    HiddenUniqueRectangle,
    WxyzWing,
    AlignedPairExclusion,
    Exocet,
    GroupedXCycle,
    FinnedXWing,
    FinnedSwordfish,
    FrankenSwordfish,
    AlternatingInferenceChain,
    SueDeCoq,
    DigitForcingChain,
    NishioForcingChain,
    CellForcingChain,
    UnitForcingChain,
    AlmostLockedSet,
    DeathBlossom,
    PatternOverlay,
    QuadForcingChain,
    BowmanBingo,
    Backtracking,
}

impl Technique {
    pub fn name(self) -> &'static str {
        use Technique::*;
        match self {
            NakedSingle => "Naked Single",
            HiddenSingle => "Hidden Single",
            NakedPair => "Naked Pair",
            NakedTriple => "Naked Triple",
            HiddenPair => "Hidden Pair",
            HiddenTriple => "Hidden Triple",
            NakedQuad => "Naked Quad",
            HiddenQuad => "Hidden Quad",
            PointingPairs => "Pointing Pairs",
            LineBoxReduction => "Line/Box Reduction",
            GurthsTheorem => "Gurth's Theorem",
            BugPlusOne => "BUG+1",
            XWing => "X-Wing",
            UniqueRectangleType1 => "Unique Rectangle Type 1",
            ChuteRemotePair => "Chute Remote Pair",
            SimpleColouring => "Simple Colouring",
            YWing => "Y-Wing",
            RectangleElimination => "Rectangle Elimination",
            Swordfish => "Swordfish",
            XyzWing => "XYZ-Wing",
            Tridagon => "Tridagon",
            XCycle => "X-Cycle",
            XyChain => "XY-Chain",
            Medusa3d => "3D Medusa",
            Jellyfish => "Jellyfish",
            UniqueRectangle2345 => "Unique Rectangle 2,3,4,5",
            AvoidableRectangle => "Avoidable Rectangle",
            TwinnedXyChain => "Twinned XY-Chain",
            Fireworks => "Fireworks",
            SkLoop => "SK Loop",
            ExtendedUniqueRectangle => "Extended Unique Rectangle",
            HiddenUniqueRectangle => "Hidden Unique Rectangle",
            WxyzWing => "WXYZ-Wing",
            AlignedPairExclusion => "Aligned Pair Exclusion",
            Exocet => "Exocet",
            GroupedXCycle => "Grouped X-Cycle",
            FinnedXWing => "Finned X-Wing",
            FinnedSwordfish => "Finned Swordfish",
            FrankenSwordfish => "Franken Swordfish",
            AlternatingInferenceChain => "Alternating Inference Chain",
            SueDeCoq => "Sue-de-Coq",
            DigitForcingChain => "Digit Forcing Chain",
            NishioForcingChain => "Nishio Forcing Chain",
            CellForcingChain => "Cell Forcing Chain",
            UnitForcingChain => "Unit Forcing Chain",
            AlmostLockedSet => "Almost Locked Set",
            DeathBlossom => "Death Blossom",
            PatternOverlay => "Pattern Overlay",
            QuadForcingChain => "Quad Forcing Chain",
            BowmanBingo => "Bowman Bingo",
            Backtracking => "Backtracking",
        }
    }

    /// Base difficulty weight before the density factor. Chain techniques
    /// additionally add their chain length. Backtracking costs nothing;
    /// its effort is not comparable to a human deduction.
    pub fn base_score(self) -> f64 {
        use Technique::*;
        let s: u32 = match self {
            NakedSingle => 1,
            HiddenSingle => 2,
            NakedPair => 5,
            NakedTriple => 10,
            HiddenPair => 10,
            HiddenTriple => 25,
            NakedQuad => 40,
            HiddenQuad => 60,
            PointingPairs => 20,
            LineBoxReduction => 20,
            GurthsTheorem => 80,
            BugPlusOne => 30,
            XWing => 30,
            UniqueRectangleType1 => 20,
            ChuteRemotePair => 25,
            SimpleColouring => 50,
            YWing => 50,
            RectangleElimination => 25,
            Swordfish => 50,
            XyzWing => 60,
            Tridagon => 60,
            XCycle => 60,
            XyChain => 50,
            Medusa3d => 80,
            Jellyfish => 80,
            UniqueRectangle2345 => 50,
            AvoidableRectangle => 60,
            TwinnedXyChain => 100,
            Fireworks => 100,
            SkLoop => 100,
            ExtendedUniqueRectangle => 90,
            HiddenUniqueRectangle => 100,
            WxyzWing => 100,
            AlignedPairExclusion => 140,
            Exocet => 300,
            GroupedXCycle => 100,
            FinnedXWing => 160,
            FinnedSwordfish => 190,
            FrankenSwordfish => 150,
            AlternatingInferenceChain => 100,
            SueDeCoq => 180,
            DigitForcingChain => 120,
            NishioForcingChain => 120,
            CellForcingChain => 180,
            UnitForcingChain => 180,
            AlmostLockedSet => 140,
            DeathBlossom => 200,
            PatternOverlay => 100,
            QuadForcingChain => 200,
            BowmanBingo => 100,
            Backtracking => 0,
        };
        f64::from(s)
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Technique {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_match_catalogue() {
        assert_eq!(Technique::PointingPairs.name(), "Pointing Pairs");
        assert_eq!(Technique::LineBoxReduction.name(), "Line/Box Reduction");
        assert_eq!(Technique::SimpleColouring.name(), "Simple Colouring");
        assert_eq!(Technique::UniqueRectangleType1.name(), "Unique Rectangle Type 1");
        assert_eq!(Technique::BugPlusOne.name(), "BUG+1");
    }

    #[test]
    fn score_table_anchors() {
        assert_eq!(Technique::NakedSingle.base_score(), 1.0);
        assert_eq!(Technique::Jellyfish.base_score(), 80.0);
        assert_eq!(Technique::Exocet.base_score(), 300.0);
        assert_eq!(Technique::Backtracking.base_score(), 0.0);
    }

    #[test]
    fn serializes_as_display_name() {
        let json = serde_json::to_string(&Technique::XyChain).unwrap();
        assert_eq!(json, "\"XY-Chain\"");
    }
}
