use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

//
// ─── OPERATORS ─────────────────────────────────────────────────────────────────
//

/// Canonical arithmetic operator tag.
///
/// The practice page renders operators with whatever glyph its stylesheet
/// picked (`×` vs `x` vs `*`, `−` vs `-`, …). Statistics must not split on
/// glyph variants, so raw symbols are folded through an explicit mapping
/// table before any bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    /// All operators, in the order the dashboard lists them.
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
    ];

    /// Folds a raw display glyph into its canonical operator.
    ///
    /// Returns `None` for symbols outside the known table; callers treat
    /// such problems as unclassifiable rather than guessing.
    #[must_use]
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '+' => Some(Self::Add),
            '-' | '\u{2212}' | '\u{2013}' => Some(Self::Sub),
            '*' | '\u{00D7}' | 'x' | 'X' => Some(Self::Mul),
            '/' | '\u{00F7}' => Some(Self::Div),
            _ => None,
        }
    }

    /// Canonical display symbol for the operator.
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '\u{2212}',
            Self::Mul => '\u{00D7}',
            Self::Div => '\u{00F7}',
        }
    }

    /// Short operation label used on the dashboard.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Sub => "Sub",
            Self::Mul => "Mult",
            Self::Div => "Div",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

//
// ─── PROBLEM EXPRESSIONS ───────────────────────────────────────────────────────
//

static EXPR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(\S)\s*(\d+)").expect("expression pattern is valid"));

/// A parsed `<int> <operator> <int>` practice problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemExpr {
    pub left: u32,
    pub op: Operator,
    pub right: u32,
}

impl ProblemExpr {
    /// Parses raw problem text as displayed by the practice page.
    ///
    /// Text that does not contain an integer/operator/integer shape, uses an
    /// unknown operator glyph, or carries operands outside `u32` yields
    /// `None`; such results contribute to no statistics bucket.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let caps = EXPR_RE.captures(text)?;
        let left = caps[1].parse().ok()?;
        let glyph = caps[2].chars().next()?;
        let op = Operator::from_glyph(glyph)?;
        let right = caps[3].parse().ok()?;
        Some(Self { left, op, right })
    }

    /// Both operands, in display order.
    #[must_use]
    pub fn operands(self) -> [u32; 2] {
        [self.left, self.right]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_all_known_glyphs() {
        for glyph in ['*', '×', 'x', 'X'] {
            assert_eq!(Operator::from_glyph(glyph), Some(Operator::Mul));
        }
        for glyph in ['-', '−', '–'] {
            assert_eq!(Operator::from_glyph(glyph), Some(Operator::Sub));
        }
        for glyph in ['/', '÷'] {
            assert_eq!(Operator::from_glyph(glyph), Some(Operator::Div));
        }
        assert_eq!(Operator::from_glyph('+'), Some(Operator::Add));
        assert_eq!(Operator::from_glyph('%'), None);
    }

    #[test]
    fn parses_spaced_and_tight_expressions() {
        let spaced = ProblemExpr::parse("12 × 7").unwrap();
        assert_eq!(spaced.left, 12);
        assert_eq!(spaced.op, Operator::Mul);
        assert_eq!(spaced.right, 7);

        let tight = ProblemExpr::parse("3+4").unwrap();
        assert_eq!(tight.op, Operator::Add);
        assert_eq!(tight.operands(), [3, 4]);
    }

    #[test]
    fn rejects_non_problem_text() {
        assert_eq!(ProblemExpr::parse(""), None);
        assert_eq!(ProblemExpr::parse("Game over"), None);
        assert_eq!(ProblemExpr::parse("12 % 4"), None);
    }
}
