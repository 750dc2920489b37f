//! Boundary offset calculation
//!
//! Obfuscated bundles that route string lookups through a rotated array
//! offset every index by a constant: somewhere near the top of the file
//! the decoder subtracts a hex literal from its argument, and the array
//! itself spans a recognizable region of the file. Recovering the valid
//! index range therefore takes two measurements over raw text:
//!
//! - the **base** — the first hex literal subtracted near the top
//! - a **count** — how many entries the lookup table holds
//!
//! and the high boundary is simply `base + count`. Two script generations
//! located the base differently (bare `- 0x..` vs. inside a function
//! body) and counted differently (lines inside a marked region vs. the
//! largest quoted-string array literal), so both strategies survive here
//! as selectable modes.
//!
//! Everything in this module is a pure pass over text. Appending the
//! resulting declarations to a file belongs to [`crate::workflow`].

use crate::{DeobError, DeobResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Markers ───────────────────────────────────────────────────────

/// Opens the lookup-table region: the line carrying the array assignment.
pub const START_MARKER: &str = "= [";

/// Closes the region: the first `return` on or after the start line.
pub const END_MARKER: &str = "return";

// ─── Regex Patterns ────────────────────────────────────────────────

static MINUS_HEX_RE: Lazy<Regex> = Lazy::new(|| {
    // Matches: - 0x1b (minus, optional whitespace, hex literal)
    Regex::new(r"-\s*0x([0-9a-fA-F]+)").unwrap()
});

static FN_BODY_HEX_RE: Lazy<Regex> = Lazy::new(|| {
    // Matches a function-expression assignment whose body subtracts a short
    // hex literal from an identifier. The body scan stops at the first `}`;
    // no nested-brace awareness, same contract as the rest of this module.
    Regex::new(
        r"[A-Za-z_$][\w$]*\s*=\s*function\s*\([^)]*\)\s*\{[^}]*?[A-Za-z_$][\w$]*\s*-\s*0x([0-9a-fA-F]{1,3})\b",
    )
    .unwrap()
});

static BRACKET_LITERAL_RE: Lazy<Regex> = Lazy::new(|| {
    // Any [ ... ] span; the first ] terminates the match
    Regex::new(r"\[([^\]]*)\]").unwrap()
});

// ─── Hex Literals ──────────────────────────────────────────────────

/// A non-negative value that renders and parses as lowercase `0x` hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HexLiteral(u64);

impl HexLiteral {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Parse a bare digit string (no `0x` prefix) as base-16.
    pub fn parse(digits: &str) -> DeobResult<Self> {
        u64::from_str_radix(digits, 16)
            .map(Self)
            .map_err(|_| DeobError::HexOverflow(digits.to_string()))
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// The literal shifted up by a count. Saturates rather than wraps.
    pub fn offset_by(self, count: usize) -> Self {
        Self(self.0.saturating_add(count as u64))
    }
}

impl fmt::Display for HexLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

// ─── Modes ─────────────────────────────────────────────────────────

/// How the base hex literal is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BaseHexMode {
    /// First `- 0x..` anywhere in the file
    MinusHex,
    /// First function-expression assignment subtracting a 1–3 digit hex
    FnBodyHex,
}

impl FromStr for BaseHexMode {
    type Err = DeobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "minus-hex" => Ok(Self::MinusHex),
            "fn-body-hex" => Ok(Self::FnBodyHex),
            other => Err(DeobError::UnknownMode(other.to_string())),
        }
    }
}

/// How the count half of the offset pair is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CountMode {
    /// Lines strictly between the `= [` line and the next `return` line
    LinesBetween,
    /// Element count of the largest qualifying quoted-string array literal
    LargestStringArray,
}

impl FromStr for CountMode {
    type Err = DeobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lines-between" => Ok(Self::LinesBetween),
            "largest-string-array" => Ok(Self::LargestStringArray),
            other => Err(DeobError::UnknownMode(other.to_string())),
        }
    }
}

// ─── Regions ───────────────────────────────────────────────────────

/// A marker-delimited span of lines. `start_line <= end_line` always holds:
/// the end marker is only accepted on or after the start line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub start_line: usize,
    pub end_line: usize,
}

impl Region {
    /// Lines strictly inside the region, exclusive of both boundary lines.
    /// Markers on the same or adjacent lines enclose nothing.
    pub fn interior_lines(&self) -> usize {
        self.end_line.saturating_sub(self.start_line + 1)
    }
}

/// Locate the lookup-table region by its markers.
///
/// The start line itself may also carry the end marker: single-line
/// table declarations collapse to an empty region.
pub fn locate_region(text: &str) -> DeobResult<Region> {
    let mut start_line = None;

    for (i, line) in text.lines().enumerate() {
        if start_line.is_none() && line.contains(START_MARKER) {
            start_line = Some(i);
        }
        if let Some(start) = start_line {
            if line.contains(END_MARKER) {
                return Ok(Region {
                    start_line: start,
                    end_line: i,
                });
            }
        }
    }

    match start_line {
        Some(_) => Err(DeobError::EndMarkerNotFound),
        None => Err(DeobError::StartMarkerNotFound),
    }
}

// ─── Base Hex Location ─────────────────────────────────────────────

/// Find the base hex literal. Deterministic: the first match in file
/// order wins. Absence is fatal for the caller; there is no default.
pub fn find_base_hex(text: &str, mode: BaseHexMode) -> DeobResult<HexLiteral> {
    let pattern: &Regex = match mode {
        BaseHexMode::MinusHex => &MINUS_HEX_RE,
        BaseHexMode::FnBodyHex => &FN_BODY_HEX_RE,
    };

    match pattern.captures(text) {
        Some(caps) => HexLiteral::parse(&caps[1]),
        None => Err(DeobError::HexNotFound),
    }
}

// ─── Counting ──────────────────────────────────────────────────────

/// Compute the count half of the offset pair in the requested mode.
pub fn compute_count(text: &str, mode: CountMode) -> DeobResult<usize> {
    match mode {
        CountMode::LinesBetween => locate_region(text).map(|r| r.interior_lines()),
        CountMode::LargestStringArray => Ok(largest_string_array_len(text)),
    }
}

/// Element count of the largest bracketed, comma-separated list whose
/// elements are all non-empty after trimming whitespace and quotes.
/// Ties keep the first-seen maximum; no qualifying literal means 0.
fn largest_string_array_len(text: &str) -> usize {
    let mut best = 0usize;

    for caps in BRACKET_LITERAL_RE.captures_iter(text) {
        let inner = &caps[1];
        let mut qualifies = true;
        let mut len = 0usize;

        for raw in inner.split(',') {
            let elem = raw
                .trim()
                .trim_matches(|c| c == '"' || c == '\'' || c == '`')
                .trim();
            if elem.is_empty() {
                qualifies = false;
                break;
            }
            len += 1;
        }

        if qualifies && len > best {
            best = len;
        }
    }

    best
}

// ─── Derivation ────────────────────────────────────────────────────

/// The computed boundary pair: `derived - base == count` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryOffsets {
    /// The base hex literal as found in the file
    pub base: HexLiteral,
    /// `base + count`, the high boundary
    pub derived: HexLiteral,
    /// The measured quantity between the two
    pub count: usize,
}

/// Run both measurements and derive the boundary pair.
pub fn derive_offsets(
    text: &str,
    base_mode: BaseHexMode,
    count_mode: CountMode,
) -> DeobResult<BoundaryOffsets> {
    let base = find_base_hex(text, base_mode)?;
    let count = compute_count(text, count_mode)?;

    Ok(BoundaryOffsets {
        base,
        derived: base.offset_by(count),
        count,
    })
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_literal_roundtrip() {
        let h = HexLiteral::parse("1b").unwrap();
        assert_eq!(h.value(), 27);
        assert_eq!(h.to_string(), "0x1b");
        // Uppercase digits parse, rendering is always lowercase
        assert_eq!(HexLiteral::parse("FF").unwrap().to_string(), "0xff");
    }

    #[test]
    fn test_hex_literal_overflow() {
        assert!(matches!(
            HexLiteral::parse("fffffffffffffffff"),
            Err(DeobError::HexOverflow(_))
        ));
    }

    #[test]
    fn test_minus_hex_takes_first_match() {
        let text = "var a = b - 0x10;\nvar c = d - 0x20;";
        let base = find_base_hex(text, BaseHexMode::MinusHex).unwrap();
        assert_eq!(base.value(), 0x10);
    }

    #[test]
    fn test_minus_hex_optional_whitespace() {
        let base = find_base_hex("x=y-0x2f;", BaseHexMode::MinusHex).unwrap();
        assert_eq!(base.value(), 0x2f);
    }

    #[test]
    fn test_minus_hex_missing_is_fatal() {
        let text = "var a = 0x10; // no subtraction anywhere";
        assert!(matches!(
            find_base_hex(text, BaseHexMode::MinusHex),
            Err(DeobError::HexNotFound)
        ));
    }

    #[test]
    fn test_fn_body_hex() {
        let text = r#"
            var _0x12ab = function (a, b) { a = a - 0x1a2; return c[a]; };
        "#;
        let base = find_base_hex(text, BaseHexMode::FnBodyHex).unwrap();
        assert_eq!(base.value(), 0x1a2);
    }

    #[test]
    fn test_fn_body_hex_rejects_long_literal() {
        // The fn-body variant only ever emitted 1–3 digit offsets
        let text = "f = function (a) { a = a - 0x12345; }";
        assert!(find_base_hex(text, BaseHexMode::FnBodyHex).is_err());
    }

    #[test]
    fn test_find_base_hex_is_deterministic() {
        let text = "u = v - 0xabc;\nw = x - 0xdef;";
        let first = find_base_hex(text, BaseHexMode::MinusHex).unwrap();
        for _ in 0..3 {
            assert_eq!(find_base_hex(text, BaseHexMode::MinusHex).unwrap(), first);
        }
    }

    #[test]
    fn test_lines_between_counts_interior() {
        let text = "var t = [\n'a',\n'b',\n'c',\nreturn t;\n";
        assert_eq!(compute_count(text, CountMode::LinesBetween).unwrap(), 3);
    }

    #[test]
    fn test_lines_between_adjacent_lines_is_zero() {
        let text = "var t = [\nreturn t;\n";
        assert_eq!(compute_count(text, CountMode::LinesBetween).unwrap(), 0);
    }

    #[test]
    fn test_lines_between_same_line_is_zero() {
        let text = "var t = [ ]; return t;\n";
        assert_eq!(compute_count(text, CountMode::LinesBetween).unwrap(), 0);
    }

    #[test]
    fn test_lines_between_start_marker_missing() {
        assert!(matches!(
            compute_count("nothing here\nreturn x;\n", CountMode::LinesBetween),
            Err(DeobError::StartMarkerNotFound)
        ));
    }

    #[test]
    fn test_lines_between_end_marker_missing() {
        assert!(matches!(
            compute_count("var t = [\n'a',\n'b'\n", CountMode::LinesBetween),
            Err(DeobError::EndMarkerNotFound)
        ));
    }

    #[test]
    fn test_lines_between_ignores_return_before_start() {
        // A `return` above the array must not close the region
        let text = "function f() { return 1; }\nvar t = [\n'a',\nreturn t;\n";
        assert_eq!(compute_count(text, CountMode::LinesBetween).unwrap(), 1);
    }

    #[test]
    fn test_largest_string_array_picks_longest() {
        let text = r#"var a = ["a","b"]; var b = ["x","y","z"];"#;
        assert_eq!(
            compute_count(text, CountMode::LargestStringArray).unwrap(),
            3
        );
    }

    #[test]
    fn test_largest_string_array_rejects_empty_elements() {
        // Trailing comma leaves an empty element, so the candidate is out
        let text = r#"var a = ["a","b",]; var b = ["x"];"#;
        assert_eq!(
            compute_count(text, CountMode::LargestStringArray).unwrap(),
            1
        );
    }

    #[test]
    fn test_largest_string_array_none_qualifies() {
        assert_eq!(
            compute_count("var a = []; var b = [ ];", CountMode::LargestStringArray).unwrap(),
            0
        );
    }

    #[test]
    fn test_largest_string_array_mixed_quotes() {
        let text = "var a = ['one', \"two\", `three`, 'four'];";
        assert_eq!(
            compute_count(text, CountMode::LargestStringArray).unwrap(),
            4
        );
    }

    #[test]
    fn test_derive_offsets_invariant() {
        let text = "foo = foo - 0x10;\nvar t = [\n1,\n2,\n3,\n4,\n5,\nreturn t;\n";
        let offsets =
            derive_offsets(text, BaseHexMode::MinusHex, CountMode::LinesBetween).unwrap();
        assert_eq!(offsets.base.value(), 0x10);
        assert_eq!(offsets.count, 5);
        assert_eq!(offsets.derived.value(), 0x15);
        assert_eq!(
            offsets.derived.value() - offsets.base.value(),
            offsets.count as u64
        );
    }

    #[test]
    fn test_derive_offsets_rendering() {
        let text = "x = y - 0x1b;\nq = [\nreturn q;\n";
        let offsets =
            derive_offsets(text, BaseHexMode::MinusHex, CountMode::LinesBetween).unwrap();
        assert_eq!(offsets.base.to_string(), "0x1b");
        assert_eq!(offsets.derived.to_string(), "0x1b");
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!(
            "minus-hex".parse::<BaseHexMode>().unwrap(),
            BaseHexMode::MinusHex
        );
        assert_eq!(
            "fn-body-hex".parse::<BaseHexMode>().unwrap(),
            BaseHexMode::FnBodyHex
        );
        assert_eq!(
            "largest-string-array".parse::<CountMode>().unwrap(),
            CountMode::LargestStringArray
        );
        assert!(matches!(
            "line-count".parse::<CountMode>(),
            Err(DeobError::UnknownMode(_))
        ));
    }
}
