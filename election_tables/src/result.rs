// ******** Output data structures *********

use std::fmt::Display;

use crate::config::PartyFigure;

/// The result of one party in one district or block.
#[derive(PartialEq, Debug, Clone)]
pub struct PartyResult {
    pub party: String,
    pub seats: u32,
    pub total_votes: u64,
    /// In percent, rounded to 2 decimals.
    pub vote_rate: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct DistrictResult {
    pub name: String,
    /// The base units forming the district.
    pub members: Vec<String>,
    pub capacity: u32,
    pub valid_votes: u64,
    pub party_results: Vec<PartyResult>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct BlockResult {
    pub name: String,
    pub members: Vec<String>,
    pub total_seats: u32,
    pub total_votes: u64,
    pub parties: Vec<PartyResult>,
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct DistrictSection {
    pub total_seats: u32,
    pub units: Vec<DistrictResult>,
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct ProportionalSection {
    pub total_seats: u32,
    pub blocks: Vec<BlockResult>,
}

#[derive(PartialEq, Debug, Clone)]
pub struct ElectionResult {
    pub year: u32,
    pub election_date: String,
    pub proportional: ProportionalSection,
    pub district: DistrictSection,
    /// The inconsistencies found in the sources. They do not affect the figures.
    pub warnings: Vec<ValidationWarning>,
}

/// The section of the election a warning relates to.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Scope {
    District,
    Block,
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::District => write!(f, "district"),
            Scope::Block => write!(f, "block"),
        }
    }
}

/// A cross-table inconsistency. The result is still usable, with a caveat.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ValidationWarning {
    /// The elected counts do not add up to the seats to fill.
    SeatMismatch {
        scope: Scope,
        name: String,
        expected: u32,
        actual: u32,
    },
    /// A party reported by one kind of table and by none of the other kind.
    UncoveredParty {
        scope: Scope,
        party: String,
        found_in: PartyFigure,
        missing_from: PartyFigure,
    },
}

impl Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationWarning::SeatMismatch {
                scope,
                name,
                expected,
                actual,
            } => write!(
                f,
                "{} {}: elected={} != seats={}",
                scope, name, actual, expected
            ),
            ValidationWarning::UncoveredParty {
                scope,
                party,
                found_in,
                missing_from,
            } => write!(
                f,
                "{} section: party {} found in the {} tables but in none of the {} tables",
                scope, party, found_in, missing_from
            ),
        }
    }
}
