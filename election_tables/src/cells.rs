//! Reading figures out of single cells.
//!
//! The functions of this module never fail: a cell that cannot be understood
//! reads as zero. The sources routinely leave cells blank for the parties
//! that did not run in a given unit.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::{RawCellValue, VoteNotation};

/// Replaces the full-width digits and separators by their ASCII versions.
pub(crate) fn normalize_digits(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '０'..='９' => char::from(b'0' + (c as u32 - '０' as u32) as u8),
            '，' => ',',
            '．' => '.',
            '％' => '%',
            _ => c,
        })
        .collect()
}

static DIGIT_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());
static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+(?:\.[0-9]+)?").unwrap());

/// All the groups of consecutive digits, in order of appearance.
fn digit_groups(s: &str) -> Vec<u64> {
    DIGIT_GROUP
        .find_iter(&normalize_digits(s))
        .map(|m| m.as_str().parse::<u64>().unwrap_or(0))
        .collect()
}

fn to_count(x: u64) -> u32 {
    u32::try_from(x).unwrap_or(u32::MAX)
}

/// Reads a count of candidates.
///
/// A text cell may hold a merged run such as `"2    1    3"` (new, incumbent,
/// total): the last number is the subtotal.
pub fn parse_count(v: &RawCellValue) -> u32 {
    match v {
        RawCellValue::Int(i) => to_count((*i).max(0) as u64),
        // Saturating cast: negative and NaN values read as 0.
        RawCellValue::Real(f) => f.trunc() as u32,
        RawCellValue::Text(s) => digit_groups(s).last().map(|x| to_count(*x)).unwrap_or(0),
        RawCellValue::Absent => 0,
    }
}

/// Reads a number of seats to fill.
///
/// Unlike `parse_count`, all the numbers of an annotated figure are added:
/// `"6(1)"` is 6 ordinary seats and 1 seat from a by-election.
pub fn parse_capacity(v: &RawCellValue) -> u32 {
    match v {
        RawCellValue::Text(s) => to_count(
            digit_groups(s)
                .iter()
                .fold(0u64, |acc, x| acc.saturating_add(*x)),
        ),
        _ => parse_count(v),
    }
}

/// Reads a vote count, with the notation used by most sources.
pub fn parse_votes(v: &RawCellValue) -> u64 {
    parse_votes_with(v, VoteNotation::Grouped)
}

pub fn parse_votes_with(v: &RawCellValue, notation: VoteNotation) -> u64 {
    match v {
        RawCellValue::Int(i) => (*i).max(0) as u64,
        RawCellValue::Real(f) if !f.is_finite() || *f <= 0.0 => 0,
        RawCellValue::Real(f) if f.fract() == 0.0 => *f as u64,
        RawCellValue::Real(f) => match notation {
            VoteNotation::Grouped => {
                let digits = format!("{:.3}", f).replace('.', "");
                digits.parse::<u64>().unwrap_or(0)
            }
            VoteNotation::Decimal => f.round() as u64,
        },
        RawCellValue::Text(s) => {
            let cleaned: String = normalize_digits(s)
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            leading_number(&cleaned)
                .map(|x| x.round() as u64)
                .unwrap_or(0)
        }
        RawCellValue::Absent => 0,
    }
}

/// Reads a percentage.
pub fn parse_rate(v: &RawCellValue) -> f64 {
    let x = match v {
        RawCellValue::Int(i) => *i as f64,
        RawCellValue::Real(f) => *f,
        RawCellValue::Text(s) => {
            let cleaned: String = normalize_digits(s)
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            cleaned
                .trim_end_matches('%')
                .parse::<f64>()
                .unwrap_or(0.0)
        }
        RawCellValue::Absent => 0.0,
    };
    if x.is_finite() && x > 0.0 {
        x
    } else {
        0.0
    }
}

// The first decimal number found in the string, ignoring any prefix or suffix.
fn leading_number(s: &str) -> Option<f64> {
    DECIMAL.find(s).and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Whether a cell holds something that can be read as a number.
pub(crate) fn holds_number(v: &RawCellValue) -> bool {
    match v {
        RawCellValue::Int(_) | RawCellValue::Real(_) => true,
        RawCellValue::Text(s) => normalize_digits(s).chars().any(|c| c.is_ascii_digit()),
        RawCellValue::Absent => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawCellValue {
        RawCellValue::Text(s.to_string())
    }

    #[test]
    fn count_takes_last_number_of_run() {
        assert_eq!(parse_count(&text("2    1    3")), 3);
        assert_eq!(parse_count(&text("1\u{3000}\u{3000}1")), 1);
        assert_eq!(parse_count(&text("６(１)")), 1);
        assert_eq!(parse_count(&RawCellValue::Real(4.9)), 4);
        assert_eq!(parse_count(&RawCellValue::Int(-2)), 0);
        assert_eq!(parse_count(&RawCellValue::Absent), 0);
        assert_eq!(parse_count(&text("－")), 0);
    }

    #[test]
    fn capacity_adds_all_numbers() {
        assert_eq!(parse_capacity(&text("6(1)")), 7);
        assert_eq!(parse_capacity(&text("４（１）")), 5);
        assert_eq!(parse_capacity(&RawCellValue::Int(2)), 2);
        assert_eq!(parse_capacity(&RawCellValue::Absent), 0);
    }

    #[test]
    fn oversized_numbers_saturate() {
        assert_eq!(parse_capacity(&text("18446744073709551615(1)")), u32::MAX);
        assert_eq!(parse_capacity(&text("99999999999999999999999(1)")), 1);
        assert_eq!(parse_count(&text("4294967296")), u32::MAX);
    }

    #[test]
    fn votes_from_text() {
        assert_eq!(parse_votes(&text("1,234,567")), 1234567);
        assert_eq!(parse_votes(&text("14,470,016.925")), 14470017);
        assert_eq!(parse_votes(&text(" 98 765票")), 98765);
        assert_eq!(parse_votes(&text("１２，３４５")), 12345);
        assert_eq!(parse_votes(&text("-")), 0);
        assert_eq!(parse_votes(&RawCellValue::Absent), 0);
    }

    #[test]
    fn votes_with_period_grouping() {
        assert_eq!(parse_votes(&RawCellValue::Real(879.676)), 879676);
        assert_eq!(parse_votes(&RawCellValue::Real(1.5)), 1500);
        assert_eq!(parse_votes(&RawCellValue::Real(120345.0)), 120345);
        assert_eq!(
            parse_votes_with(&RawCellValue::Real(879.676), VoteNotation::Decimal),
            880
        );
    }

    #[test]
    fn votes_are_idempotent_on_integers() {
        for n in [0_i64, 1, 999, 1_000, 12_345_678] {
            assert_eq!(parse_votes(&RawCellValue::Int(n)), n as u64);
        }
    }

    #[test]
    fn rates() {
        assert_eq!(parse_rate(&text("34.56")), 34.56);
        assert_eq!(parse_rate(&text(" 12.5 %")), 12.5);
        assert_eq!(parse_rate(&RawCellValue::Real(7.25)), 7.25);
        assert_eq!(parse_rate(&text("n/a")), 0.0);
        assert_eq!(parse_rate(&RawCellValue::Absent), 0.0);
    }
}
