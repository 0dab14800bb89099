//! Winner selection over the decoded ticket set.

use rand::Rng;
use tracing::info;

use crate::state::FairLaunchTicket;

/// Per-ticket lottery outcome, ordered by sequence number after selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LotteryDecision {
    pub seq: u64,
    pub eligible: bool,
    pub chosen: bool,
}

/// A ticket can win only while it is still active and its bid covers the
/// clearing price.
pub fn is_eligible(ticket: &FairLaunchTicket, clearing_price: u64) -> bool {
    ticket.state.is_active() && ticket.amount >= clearing_price
}

/// Partitions tickets into winners and losers.
///
/// When `quota` covers the whole ticket set, everybody wins — including
/// tickets that fail the eligibility check. That mirrors the on-chain
/// program's expectation that nobody is excluded while supply covers total
/// demand, and it is deliberately not "corrected" here.
///
/// Otherwise the draw is a truncated Fisher-Yates over the eligible pool:
/// pick a random pool index, mark it chosen, swap-remove it, repeat until
/// the quota or the pool runs out. Bounded at one draw per winner, unlike
/// the rejection sampling it replaces. Exactly `min(quota, eligible)`
/// tickets end up chosen.
pub fn select_winners<R: Rng>(
    tickets: &[FairLaunchTicket],
    clearing_price: u64,
    quota: u64,
    rng: &mut R,
) -> Vec<LotteryDecision> {
    let mut decisions: Vec<LotteryDecision> = tickets
        .iter()
        .map(|t| LotteryDecision {
            seq: t.seq,
            eligible: is_eligible(t, clearing_price),
            chosen: false,
        })
        .collect();

    if quota >= decisions.len() as u64 {
        info!("quota covers all {} tickets, everybody wins", decisions.len());
        for decision in decisions.iter_mut() {
            decision.chosen = true;
        }
    } else {
        let mut pool: Vec<usize> = decisions
            .iter()
            .enumerate()
            .filter(|(_, d)| d.eligible)
            .map(|(i, _)| i)
            .collect();
        info!(
            eligible = pool.len(),
            total = decisions.len(),
            quota,
            "running lottery"
        );

        let mut remaining = quota;
        while remaining > 0 && !pool.is_empty() {
            let picked = rng.gen_range(0..pool.len());
            let index = pool.swap_remove(picked);
            decisions[index].chosen = true;
            remaining -= 1;
        }
    }

    decisions.sort_by_key(|d| d.seq);
    decisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{fixtures::ticket_data, TicketState};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use solana_sdk::pubkey::Pubkey;

    fn ticket(seq: u64, amount: u64, state: TicketState) -> FairLaunchTicket {
        let data = ticket_data(&Pubkey::new_unique(), &Pubkey::new_unique(), amount, state, seq);
        FairLaunchTicket::decode(Pubkey::new_unique(), &data).unwrap()
    }

    #[test]
    fn quota_covering_all_tickets_means_everybody_wins() {
        // five tickets, five tokens: even withdrawn and under-bid tickets win
        let tickets = vec![
            ticket(0, 10, TicketState::Active),
            ticket(1, 0, TicketState::Active),
            ticket(2, 10, TicketState::Withdrawn),
            ticket(3, 5, TicketState::Punched),
            ticket(4, 1, TicketState::Active),
        ];
        let mut rng = StdRng::seed_from_u64(1);
        let decisions = select_winners(&tickets, 0, 5, &mut rng);
        assert!(decisions.iter().all(|d| d.chosen));
    }

    #[test]
    fn only_eligible_tickets_win_when_demand_exceeds_supply() {
        // 10 tickets, 3 eligible (active and amount >= 100), quota 5
        let mut tickets = Vec::new();
        for seq in 0..3 {
            tickets.push(ticket(seq, 100 + seq, TicketState::Active));
        }
        for seq in 3..7 {
            tickets.push(ticket(seq, 50, TicketState::Active));
        }
        for seq in 7..10 {
            tickets.push(ticket(seq, 500, TicketState::Withdrawn));
        }

        let mut rng = StdRng::seed_from_u64(7);
        let decisions = select_winners(&tickets, 100, 5, &mut rng);

        let chosen: Vec<_> = decisions.iter().filter(|d| d.chosen).collect();
        assert_eq!(chosen.len(), 3);
        assert!(chosen.iter().all(|d| d.eligible));
        assert!(chosen.iter().all(|d| d.seq < 3));
    }

    #[test]
    fn never_chooses_more_than_quota() {
        let tickets: Vec<_> = (0..50)
            .map(|seq| ticket(seq, 1_000, TicketState::Active))
            .collect();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let decisions = select_winners(&tickets, 10, 12, &mut rng);
            assert_eq!(decisions.iter().filter(|d| d.chosen).count(), 12);
        }
    }

    #[test]
    fn ineligible_tickets_never_win_under_subscription() {
        let tickets: Vec<_> = (0..40)
            .map(|seq| {
                if seq % 2 == 0 {
                    ticket(seq, 200, TicketState::Active)
                } else {
                    ticket(seq, 10, TicketState::Active)
                }
            })
            .collect();
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let decisions = select_winners(&tickets, 100, 5, &mut rng);
            for d in decisions.iter().filter(|d| d.chosen) {
                assert!(d.eligible);
                assert_eq!(d.seq % 2, 0);
            }
        }
    }

    #[test]
    fn draw_is_reproducible_for_a_fixed_seed() {
        let tickets: Vec<_> = (0..30)
            .map(|seq| ticket(seq, 1_000, TicketState::Active))
            .collect();
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        assert_eq!(
            select_winners(&tickets, 1, 8, &mut a),
            select_winners(&tickets, 1, 8, &mut b)
        );
    }

    #[test]
    fn output_is_sorted_by_sequence_number() {
        let tickets = vec![
            ticket(9, 10, TicketState::Active),
            ticket(2, 10, TicketState::Active),
            ticket(5, 10, TicketState::Active),
        ];
        let mut rng = StdRng::seed_from_u64(3);
        let decisions = select_winners(&tickets, 0, 2, &mut rng);
        let seqs: Vec<u64> = decisions.iter().map(|d| d.seq).collect();
        assert_eq!(seqs, vec![2, 5, 9]);
    }
}
