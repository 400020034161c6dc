use log::{debug, info};

use crate::block::Block;
use crate::config::ExtractionConfig;
use crate::district::ElectoralDistrict;
use crate::result::*;
use crate::tally::PartyTally;

/// Rounds to 2 decimals, the precision of the published rates.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// The share of `votes` in `denominator`, in percent.
pub fn vote_rate(votes: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    clamp_rate(round2(votes as f64 / denominator as f64 * 100.0))
}

// Votes above a separately stated total, or a misread rate cell, would go
// past 100.
fn clamp_rate(rate: f64) -> f64 {
    if rate > 100.0 {
        debug!("clamp_rate: rate {} above 100", rate);
    }
    rate.clamp(0.0, 100.0)
}

/// The published results of the parties: the parties without any seat nor
/// vote are dropped, the others are sorted by seats then by votes.
///
/// A rate stated by the source is preferred to the computed one.
pub fn assemble_party_results(tally: &PartyTally, denominator: u64) -> Vec<PartyResult> {
    let mut res: Vec<PartyResult> = tally
        .iter()
        .filter(|(_, f)| !f.is_empty())
        .map(|(p, f)| PartyResult {
            party: p.clone(),
            seats: f.seats,
            total_votes: f.votes,
            vote_rate: if f.rate > 0.0 {
                clamp_rate(round2(f.rate))
            } else {
                vote_rate(f.votes, denominator)
            },
        })
        .collect();
    // Stable: ties keep the order of discovery.
    res.sort_by(|a, b| {
        b.seats
            .cmp(&a.seats)
            .then_with(|| b.total_votes.cmp(&a.total_votes))
    });
    res
}

pub fn assemble_result(
    config: &ExtractionConfig,
    districts: &[ElectoralDistrict],
    blocks: &[Block],
) -> ElectionResult {
    let units: Vec<DistrictResult> = districts
        .iter()
        .map(|d| DistrictResult {
            name: d.name.clone(),
            members: d.members.clone(),
            capacity: d.capacity,
            valid_votes: d.valid_votes,
            party_results: assemble_party_results(&d.parties, d.valid_votes),
        })
        .collect();
    let blocks: Vec<BlockResult> = blocks
        .iter()
        .map(|b| BlockResult {
            name: b.name.clone(),
            members: b.members.clone(),
            total_seats: b.total_seats,
            total_votes: b.total_votes,
            parties: assemble_party_results(&b.parties, b.total_votes),
        })
        .collect();
    let res = ElectionResult {
        year: config.year,
        election_date: config.election_date.clone(),
        proportional: ProportionalSection {
            total_seats: blocks
                .iter()
                .fold(0u32, |acc, b| acc.saturating_add(b.total_seats)),
            blocks,
        },
        district: DistrictSection {
            total_seats: units
                .iter()
                .fold(0u32, |acc, d| acc.saturating_add(d.capacity)),
            units,
        },
        warnings: vec![],
    };
    info!(
        "assemble_result: {} districts ({} seats), {} blocks ({} seats)",
        res.district.units.len(),
        res.district.total_seats,
        res.proportional.blocks.len(),
        res.proportional.total_seats
    );
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates() {
        assert_eq!(vote_rate(1, 3), 33.33);
        assert_eq!(vote_rate(2, 3), 66.67);
        assert_eq!(vote_rate(5, 0), 0.0);
        assert_eq!(vote_rate(0, 10), 0.0);
        assert_eq!(round2(44.987), 44.99);
        assert_eq!(vote_rate(1200, 1000), 100.0);
    }

    #[test]
    fn stated_rates_are_clamped() {
        let mut t = PartyTally::new();
        t.entry("X").votes = 10;
        t.entry("X").rate = 250.0;
        let res = assemble_party_results(&t, 100);
        assert_eq!(res[0].vote_rate, 100.0);
    }

    #[test]
    fn party_results_are_filtered_and_sorted() {
        let mut t = PartyTally::new();
        t.entry("none");
        t.entry("votes only").votes = 300;
        t.entry("first tie").votes = 100;
        t.entry("winner").seats = 1;
        t.entry("second tie").votes = 100;
        t.entry("stated rate").votes = 50;
        t.entry("stated rate").rate = 12.3456;
        let res = assemble_party_results(&t, 1000);
        let names: Vec<&str> = res.iter().map(|r| r.party.as_str()).collect();
        assert_eq!(
            names,
            vec!["winner", "votes only", "first tie", "second tie", "stated rate"]
        );
        assert!(res.iter().all(|r| r.seats > 0 || r.total_votes > 0));
        assert_eq!(res[1].vote_rate, 30.0);
        assert_eq!(res[4].vote_rate, 12.35);
    }
}
