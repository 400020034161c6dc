use log::debug;

use crate::result::*;

fn elected(parties: &[PartyResult]) -> u32 {
    parties
        .iter()
        .fold(0u32, |acc, p| acc.saturating_add(p.seats))
}

/// Checks that the elected counts add up to the seats to fill, in every
/// district and every block.
pub fn validate(result: &ElectionResult) -> Vec<ValidationWarning> {
    let mut res: Vec<ValidationWarning> = Vec::new();
    for d in result.district.units.iter() {
        let actual = elected(&d.party_results);
        if actual != d.capacity {
            res.push(ValidationWarning::SeatMismatch {
                scope: Scope::District,
                name: d.name.clone(),
                expected: d.capacity,
                actual,
            });
        }
    }
    for b in result.proportional.blocks.iter() {
        let actual = elected(&b.parties);
        if actual != b.total_seats {
            res.push(ValidationWarning::SeatMismatch {
                scope: Scope::Block,
                name: b.name.clone(),
                expected: b.total_seats,
                actual,
            });
        }
    }
    debug!("validate: {} seat mismatches", res.len());
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn party(name: &str, seats: u32, votes: u64) -> PartyResult {
        PartyResult {
            party: name.to_string(),
            seats,
            total_votes: votes,
            vote_rate: 0.0,
        }
    }

    fn result(capacity: u32, block_seats: u32) -> ElectionResult {
        ElectionResult {
            year: 2025,
            election_date: "2025-07-20".to_string(),
            proportional: ProportionalSection {
                total_seats: block_seats,
                blocks: vec![BlockResult {
                    name: "全国".to_string(),
                    members: vec![],
                    total_seats: block_seats,
                    total_votes: 300,
                    parties: vec![party("X", 2, 200), party("Y", 1, 100)],
                }],
            },
            district: DistrictSection {
                total_seats: capacity,
                units: vec![DistrictResult {
                    name: "A".to_string(),
                    members: vec!["A".to_string()],
                    capacity,
                    valid_votes: 1000,
                    party_results: vec![party("X", 3, 600), party("Y", 1, 400)],
                }],
            },
            warnings: vec![],
        }
    }

    #[test]
    fn consistent_result() {
        assert!(validate(&result(4, 3)).is_empty());
    }

    #[test]
    fn one_warning_per_mismatch() {
        let w = validate(&result(5, 3));
        assert_eq!(
            w,
            vec![ValidationWarning::SeatMismatch {
                scope: Scope::District,
                name: "A".to_string(),
                expected: 5,
                actual: 4,
            }]
        );
        assert_eq!(w[0].to_string(), "district A: elected=4 != seats=5");

        let w = validate(&result(4, 2));
        assert_eq!(w.len(), 1);
        assert!(matches!(
            &w[0],
            ValidationWarning::SeatMismatch { scope: Scope::Block, expected: 2, actual: 3, .. }
        ));
    }
}
