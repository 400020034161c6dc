use crate::config::PartyFigure;
use crate::result::{Scope, ValidationWarning};

/// The figures of one party in one unit, district or block, while the source
/// tables are being read.
#[derive(PartialEq, Debug, Clone, Copy, Default)]
pub struct PartyFigures {
    pub seats: u32,
    pub votes: u64,
    /// The vote rate, when the source states it.
    pub rate: f64,
}

impl PartyFigures {
    pub fn seats(seats: u32) -> PartyFigures {
        PartyFigures {
            seats,
            ..Default::default()
        }
    }

    pub fn votes(votes: u64) -> PartyFigures {
        PartyFigures {
            votes,
            ..Default::default()
        }
    }

    /// Adds figures that describe distinct voters or seats.
    pub fn add(&mut self, other: &PartyFigures) {
        self.seats = self.seats.saturating_add(other.seats);
        self.votes = self.votes.saturating_add(other.votes);
        self.rate = self.rate.max(other.rate);
    }

    /// Completes figures with the ones found later: only the fields still at
    /// zero are taken.
    pub fn fill_zero(&mut self, other: &PartyFigures) {
        if self.seats == 0 {
            self.seats = other.seats;
        }
        if self.votes == 0 {
            self.votes = other.votes;
        }
        if self.rate == 0.0 {
            self.rate = other.rate;
        }
    }

    /// Merges figures that restate the same totals: the largest value wins,
    /// so that a value found once is never erased by a blank cell.
    pub fn merge_max(&mut self, other: &PartyFigures) {
        self.seats = self.seats.max(other.seats);
        self.votes = self.votes.max(other.votes);
        self.rate = self.rate.max(other.rate);
    }

    /// Takes the non-zero values of figures that are authoritative.
    pub fn replace_nonzero(&mut self, other: &PartyFigures) {
        if other.seats > 0 {
            self.seats = other.seats;
        }
        if other.votes > 0 {
            self.votes = other.votes;
        }
        if other.rate > 0.0 {
            self.rate = other.rate;
        }
    }

    /// A party with neither seats nor votes was not on the ballot.
    pub fn is_empty(&self) -> bool {
        self.seats == 0 && self.votes == 0
    }
}

/// The figures of all the parties of one entity, in order of discovery.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct PartyTally {
    entries: Vec<(String, PartyFigures)>,
}

impl PartyTally {
    pub fn new() -> PartyTally {
        PartyTally {
            entries: Vec::new(),
        }
    }

    pub fn entry(&mut self, party: &str) -> &mut PartyFigures {
        let idx = match self.entries.iter().position(|(p, _)| p == party) {
            Some(idx) => idx,
            None => {
                self.entries
                    .push((party.to_string(), PartyFigures::default()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn get(&self, party: &str) -> Option<&PartyFigures> {
        self.entries
            .iter()
            .find(|(p, _)| p == party)
            .map(|(_, f)| f)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, PartyFigures)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add_all(&mut self, other: &PartyTally) {
        for (p, f) in other.iter() {
            self.entry(p).add(f);
        }
    }

    pub fn merge_max_all(&mut self, other: &PartyTally) {
        for (p, f) in other.iter() {
            self.entry(p).merge_max(f);
        }
    }

    pub fn fill_zero_all(&mut self, other: &PartyTally) {
        for (p, f) in other.iter() {
            self.entry(p).fill_zero(f);
        }
    }

    pub fn replace_nonzero_all(&mut self, other: &PartyTally) {
        for (p, f) in other.iter() {
            self.entry(p).replace_nonzero(f);
        }
    }

    pub fn total_votes(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, (_, f)| acc.saturating_add(f.votes))
    }

    pub fn total_seats(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |acc, (_, f)| acc.saturating_add(f.seats))
    }
}

/// The parties reported by the seat tables and by the vote tables of one
/// section of the election.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Coverage {
    seat_parties: Vec<String>,
    vote_parties: Vec<String>,
    has_seat_source: bool,
    has_vote_source: bool,
}

impl Coverage {
    /// Records that a table reporting this kind of figure was read.
    pub fn record_source(&mut self, figure: PartyFigure) {
        match figure {
            PartyFigure::Seats => self.has_seat_source = true,
            PartyFigure::Votes => self.has_vote_source = true,
            PartyFigure::Rate => {}
        }
    }

    pub fn record(&mut self, figure: PartyFigure, party: &str) {
        self.record_source(figure);
        let l = match figure {
            PartyFigure::Seats => &mut self.seat_parties,
            PartyFigure::Votes => &mut self.vote_parties,
            PartyFigure::Rate => return,
        };
        if !l.iter().any(|p| p == party) {
            l.push(party.to_string());
        }
    }

    /// The parties found by one kind of table but by none of the other kind.
    ///
    /// Nothing is reported when the section has no table of one of the kinds.
    pub fn warnings(&self, scope: Scope) -> Vec<ValidationWarning> {
        if !(self.has_seat_source && self.has_vote_source) {
            return vec![];
        }
        let mut res: Vec<ValidationWarning> = Vec::new();
        for p in self.vote_parties.iter() {
            if !self.seat_parties.contains(p) {
                res.push(ValidationWarning::UncoveredParty {
                    scope,
                    party: p.clone(),
                    found_in: PartyFigure::Votes,
                    missing_from: PartyFigure::Seats,
                });
            }
        }
        for p in self.seat_parties.iter() {
            if !self.vote_parties.contains(p) {
                res.push(ValidationWarning::UncoveredParty {
                    scope,
                    party: p.clone(),
                    found_in: PartyFigure::Seats,
                    missing_from: PartyFigure::Votes,
                });
            }
        }
        res
    }
}
