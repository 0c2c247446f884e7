//! The side-pot builder: a pure function from per-player total contributions
//! and fold status to an ordered list of side pots with exact eligibility.

use serde::{Deserialize, Serialize};

/// One contributor's standing at showdown time: how much they've put in the
/// pot across the whole hand, whether they folded, and whether they're
/// all-in (contributed everything they had).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution<Id> {
    pub player_id: Id,
    pub total: u64,
    pub folded: bool,
    pub all_in: bool,
}

/// A single pot — main or side — with its eligible contestants. Eligibility
/// is carried in "lowest all-in level first, main pot last" order; amounts
/// sum exactly to the sum of all contributions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePot<Id> {
    pub amount: u64,
    pub eligible_player_ids: Vec<Id>,
}

/// Build the ordered list of pots for one showdown.
///
/// Levels are the distinct contribution totals of non-folded all-in
/// players, ascending. Between consecutive levels (and from 0 up to the
/// first level, and from the last level to infinity), every contributor's
/// chips in that band are pooled into one pot, and that pot's eligibility
/// is every non-folded contributor whose total reaches the band's upper
/// level. Each all-in threshold peels off
/// exactly the layer of the pot that player can contest, and the remaining
/// action among deeper stacks becomes a final pot (the ordinary main pot
/// when nobody is all-in).
pub fn build_side_pots<Id: Clone + PartialEq>(contributions: &[Contribution<Id>]) -> Vec<SidePot<Id>> {
    let mut levels: Vec<u64> = contributions
        .iter()
        .filter(|c| c.all_in && !c.folded && c.total > 0)
        .map(|c| c.total)
        .collect();
    levels.sort_unstable();
    levels.dedup();

    let mut pots = Vec::new();
    let mut floor = 0u64;

    for &level in &levels {
        push_band(contributions, floor, level, &mut pots);
        floor = level;
    }

    // Final band: everything contributed beyond the last all-in level (or,
    // if nobody went all-in, the whole pot). Eligibility is every
    // non-folded contributor whose total exceeds `floor` — for the no-all-in
    // case that's every non-folded contributor, i.e. the ordinary main pot.
    let final_eligible_exists = contributions
        .iter()
        .any(|c| !c.folded && !c.all_in && c.total > floor);
    if levels.is_empty() || final_eligible_exists {
        push_band(contributions, floor, u64::MAX, &mut pots);
    }

    pots
}

fn push_band<Id: Clone + PartialEq>(
    contributions: &[Contribution<Id>],
    floor: u64,
    ceiling: u64,
    pots: &mut Vec<SidePot<Id>>,
) {
    let amount: u64 = contributions
        .iter()
        .map(|c| c.total.min(ceiling).saturating_sub(floor))
        .sum();
    if amount == 0 {
        return;
    }

    let eligible_player_ids: Vec<Id> = contributions
        .iter()
        .filter(|c| {
            if c.folded {
                return false;
            }
            if ceiling == u64::MAX {
                c.total > floor
            } else {
                c.total >= ceiling
            }
        })
        .map(|c| c.player_id.clone())
        .collect();

    if !eligible_player_ids.is_empty() {
        pots.push(SidePot {
            amount,
            eligible_player_ids,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contrib(id: u32, total: u64, folded: bool, all_in: bool) -> Contribution<u32> {
        Contribution {
            player_id: id,
            total,
            folded,
            all_in,
        }
    }

    #[test]
    fn no_all_ins_makes_one_main_pot() {
        let contributions = vec![
            contrib(1, 20, false, false),
            contrib(2, 20, false, false),
            contrib(3, 20, false, false),
        ];
        let pots = build_side_pots(&contributions);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 60);
        assert_eq!(pots[0].eligible_player_ids, vec![1, 2, 3]);
    }

    #[test]
    fn s2_three_way_single_all_in_level_needs_no_side_pot() {
        // A all-in for 10, B calls 10, C calls 10 — everyone capped at 10.
        let contributions = vec![
            contrib(1, 10, false, true),
            contrib(2, 10, false, false),
            contrib(3, 10, false, false),
        ];
        let pots = build_side_pots(&contributions);
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, 30);
        assert_eq!(pots[0].eligible_player_ids, vec![1, 2, 3]);
    }

    #[test]
    fn two_side_pots_from_two_distinct_all_in_levels() {
        // A all-in for 10, B all-in for 25, C covers at 60.
        let contributions = vec![
            contrib(1, 10, false, true),
            contrib(2, 25, false, true),
            contrib(3, 60, false, false),
        ];
        let pots = build_side_pots(&contributions);
        assert_eq!(pots.len(), 3);

        assert_eq!(pots[0].amount, 30); // 10 * 3
        assert_eq!(pots[0].eligible_player_ids, vec![1, 2, 3]);

        assert_eq!(pots[1].amount, 30); // (25-10) * 2
        assert_eq!(pots[1].eligible_player_ids, vec![2, 3]);

        assert_eq!(pots[2].amount, 35); // (60-25) * 1
        assert_eq!(pots[2].eligible_player_ids, vec![3]);

        let total: u64 = pots.iter().map(|p| p.amount).sum();
        assert_eq!(total, 95);
    }

    #[test]
    fn folded_dead_money_is_pooled_but_not_eligible() {
        // D folds having put in 20; A is all-in for 10; B and C cover at 50.
        let contributions = vec![
            contrib(1, 10, false, true),
            contrib(2, 50, false, false),
            contrib(3, 50, false, false),
            contrib(4, 20, true, false),
        ];
        let pots = build_side_pots(&contributions);
        let total: u64 = pots.iter().map(|p| p.amount).sum();
        let total_contrib: u64 = contributions.iter().map(|c| c.total).sum();
        assert_eq!(total, total_contrib);
        assert!(pots.iter().all(|p| !p.eligible_player_ids.contains(&4)));
    }

    #[test]
    fn single_folded_contributor_yields_no_pot() {
        let contributions = vec![contrib(1, 20, true, false)];
        let pots = build_side_pots(&contributions);
        // Dead money with no eligible claimant is never emitted as a pot by
        // this builder; callers resolve the single-remaining-player case
        // via the engine's fast path before pots are ever built.
        assert!(pots.is_empty());
    }

    #[test]
    fn eligibility_sets_are_monotonically_non_increasing() {
        let contributions = vec![
            contrib(1, 10, false, true),
            contrib(2, 25, false, true),
            contrib(3, 60, false, false),
        ];
        let pots = build_side_pots(&contributions);
        for window in pots.windows(2) {
            let (a, b) = (&window[0].eligible_player_ids, &window[1].eligible_player_ids);
            assert!(b.iter().all(|id| a.contains(id)));
        }
    }

    #[test]
    fn pot_amounts_sum_to_total_contributions_property() {
        // A small exhaustive sweep over contribution/fold/all-in patterns.
        for a_total in [0u64, 10, 25] {
            for b_total in [0u64, 10, 25, 60] {
                for c_total in [0u64, 60] {
                    let contributions = vec![
                        contrib(1, a_total, false, a_total > 0 && a_total < 60),
                        contrib(2, b_total, false, b_total > 0 && b_total < 60),
                        contrib(3, c_total, false, false),
                    ];
                    let pots = build_side_pots(&contributions);
                    let total: u64 = pots.iter().map(|p| p.amount).sum();
                    let expected: u64 = contributions.iter().map(|c| c.total).sum();
                    assert_eq!(total, expected);
                    assert!(pots.iter().all(|p| p.amount > 0 && !p.eligible_player_ids.is_empty()));
                }
            }
        }
    }
}
