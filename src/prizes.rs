use crate::models::{Player, PlayerId, PrizeTier, Ticket, Winner};
use crate::rng::RandomSource;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("ticket price must be greater than zero")]
    NonPositiveTicketPrice,
    #[error("prize pool cannot be negative")]
    NegativePrizePool,
    #[error("ticket owner {0} is not in the player roster")]
    UnknownOwner(PlayerId),
}

// Fixed tier allocations: 50/30/10 percent of revenue. The remaining 10%
// is never assigned to a tier and stays with the house unconditionally.
fn revenue_share(tier: PrizeTier) -> Decimal {
    match tier {
        PrizeTier::Grand => dec!(0.5),
        PrizeTier::Second => dec!(0.3),
        PrizeTier::Third => dec!(0.1),
    }
}

fn winner_share(tier: PrizeTier) -> Decimal {
    match tier {
        PrizeTier::Grand => Decimal::ZERO,
        PrizeTier::Second => dec!(0.1),
        PrizeTier::Third => dec!(0.2),
    }
}

/// The tier's slice of the round revenue. No rounding at this stage.
pub fn prize_pool(total_revenue: Decimal, tier: PrizeTier) -> Decimal {
    total_revenue * revenue_share(tier)
}

/// How many winners the tier pays: one for Grand, a fixed percentage of
/// the ticket count for the others, rounded to nearest with ties away
/// from zero.
pub fn winner_count(total_tickets: u64, tier: PrizeTier) -> u64 {
    if tier == PrizeTier::Grand {
        return 1;
    }
    (Decimal::from(total_tickets) * winner_share(tier))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .unwrap_or(0)
}

/// Outcome of a single tier draw. `distributed` never exceeds
/// `prize_pool`; the shortfall from indivisible-cent splits stays with
/// the house.
#[derive(Clone, Debug)]
pub struct TierDraw {
    pub tier: PrizeTier,
    pub prize_pool: Decimal,
    pub distributed: Decimal,
    pub winners: Vec<Winner>,
}

/// Aggregate of the three tier draws. Totals are recomputed on demand,
/// never stored.
#[derive(Clone, Debug)]
pub struct WinningResults {
    pub total_revenue: Decimal,
    pub draws: Vec<TierDraw>,
}

impl WinningResults {
    pub fn total_distributed(&self) -> Decimal {
        self.draws.iter().map(|draw| draw.distributed).sum()
    }

    pub fn house_profit(&self) -> Decimal {
        self.total_revenue - self.total_distributed()
    }

    pub fn all_winners(&self) -> impl Iterator<Item = &Winner> {
        self.draws.iter().flat_map(|draw| draw.winners.iter())
    }
}

/// Runs the full draw: revenue is the ticket count times the price, and
/// the three tiers are drawn in rank order against one shared pool of
/// candidate tickets, so later tiers only see tickets no earlier tier
/// consumed. Each tier's prize pool comes from the original revenue, not
/// the shrinking candidate pool.
pub fn determine_winners(
    rng: &mut dyn RandomSource,
    tickets: &mut [Ticket],
    players: &mut [Player],
    ticket_price: Decimal,
) -> Result<WinningResults, Error> {
    if ticket_price <= Decimal::ZERO {
        return Err(Error::NonPositiveTicketPrice);
    }

    let total_revenue = Decimal::from(tickets.len() as u64) * ticket_price;
    let mut available: Vec<usize> = (0..tickets.len()).collect();

    let mut draws = Vec::with_capacity(PrizeTier::ALL.len());
    for tier in PrizeTier::ALL {
        let pool = prize_pool(total_revenue, tier);
        draws.push(draw_prizes(rng, tier, &mut available, tickets, players, pool)?);
    }

    Ok(WinningResults {
        total_revenue,
        draws,
    })
}

/// Draws one tier against the shared candidate pool. The winner target is
/// computed from the pool as it currently stands. With no winners the
/// result still records the offered pool, with nothing distributed;
/// otherwise each winner gets `floor(pool / n * 100) / 100` and the
/// remainder of the split stays with the house.
pub fn draw_prizes(
    rng: &mut dyn RandomSource,
    tier: PrizeTier,
    available: &mut Vec<usize>,
    tickets: &mut [Ticket],
    players: &mut [Player],
    prize_pool: Decimal,
) -> Result<TierDraw, Error> {
    if prize_pool < Decimal::ZERO {
        return Err(Error::NegativePrizePool);
    }
    // every candidate must resolve to a roster entry before anything is
    // marked or removed
    if let Some(&idx) = available
        .iter()
        .find(|&&idx| !players.iter().any(|p| p.id == tickets[idx].owner))
    {
        return Err(Error::UnknownOwner(tickets[idx].owner));
    }

    let target = winner_count(available.len() as u64, tier);
    let selected = select_winning_tickets(rng, tier, target, available, tickets, players);

    if selected.is_empty() {
        return Ok(TierDraw {
            tier,
            prize_pool,
            distributed: Decimal::ZERO,
            winners: Vec::new(),
        });
    }

    let count = Decimal::from(selected.len() as u64);
    let per_winner = (prize_pool / count * dec!(100)).floor() / dec!(100);
    let distributed = per_winner * count;

    let winners = selected
        .into_iter()
        .map(|idx| {
            let ticket = &mut tickets[idx];
            ticket.assign_prize(tier, per_winner);
            let owner = players
                .iter_mut()
                .find(|p| p.id == ticket.owner)
                .expect("ticket owner missing from roster");
            owner.add_winnings(per_winner);
            Winner {
                player: owner.id,
                player_name: owner.name.clone(),
                ticket: ticket.id,
                tier,
                amount: per_winner,
            }
        })
        .collect();

    tracing::debug!(%tier, %prize_pool, %distributed, "tier drawn");
    Ok(TierDraw {
        tier,
        prize_pool,
        distributed,
        winners,
    })
}

/// Scans the candidate pool in a random order, skipping tickets whose
/// owner already won this tier; each selected ticket marks its owner and
/// leaves the shared pool for good, so later tiers cannot draw it again.
/// Stops at `target` winners or when candidates run out. Returns indices
/// into `tickets`.
fn select_winning_tickets(
    rng: &mut dyn RandomSource,
    tier: PrizeTier,
    target: u64,
    available: &mut Vec<usize>,
    tickets: &[Ticket],
    players: &mut [Player],
) -> Vec<usize> {
    let mut scan_order = available.clone();
    // random sort keys; only the selected set is observable, so this is
    // interchangeable with a full shuffle
    scan_order.sort_by_cached_key(|_| rng.next());

    let mut selected = Vec::new();
    for idx in scan_order {
        if selected.len() as u64 >= target {
            break;
        }
        let owner = players
            .iter_mut()
            .find(|p| p.id == tickets[idx].owner)
            .expect("ticket owner missing from roster");
        if owner.has_won_tier(tier) {
            continue;
        }
        owner.mark_tier_won(tier);
        available.retain(|&i| i != idx);
        selected.push(idx);
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ChaChaSource, ScriptedSource};
    use crate::utils::assert_are_close;
    use std::collections::HashSet;

    fn distinct_players(count: u64) -> (Vec<Ticket>, Vec<Player>) {
        let players = (1..=count)
            .map(|id| Player::new(id as u32, dec!(10), true))
            .collect();
        let tickets = (1..=count).map(|id| Ticket::new(id, id as u32)).collect();
        (tickets, players)
    }

    #[test]
    fn pools_follow_the_fixed_percentages() {
        assert_eq!(prize_pool(dec!(100), PrizeTier::Grand), dec!(50));
        assert_eq!(prize_pool(dec!(100), PrizeTier::Second), dec!(30));
        assert_eq!(prize_pool(dec!(100), PrizeTier::Third), dec!(10));
    }

    #[test]
    fn winner_counts_round_to_nearest() {
        for (tickets, tier, expected) in [
            (10, PrizeTier::Grand, 1),
            (10, PrizeTier::Second, 1),
            (10, PrizeTier::Third, 2),
            (20, PrizeTier::Second, 2),
            (20, PrizeTier::Third, 4),
        ] {
            assert_eq!(winner_count(tickets, tier), expected);
        }
    }

    #[test]
    fn winner_count_ties_round_away_from_zero() {
        // 5 * 0.1 = 0.5 and 25 * 0.1 = 2.5 both round up
        assert_eq!(winner_count(5, PrizeTier::Second), 1);
        assert_eq!(winner_count(25, PrizeTier::Second), 3);
    }

    #[test]
    fn empty_pool_records_the_offered_prize() {
        let (mut tickets, mut players) = distinct_players(0);
        let mut rng = ScriptedSource::new([]);
        let mut available = Vec::new();

        let draw = draw_prizes(
            &mut rng,
            PrizeTier::Grand,
            &mut available,
            &mut tickets,
            &mut players,
            dec!(100),
        )
        .unwrap();

        assert!(draw.winners.is_empty());
        assert_eq!(draw.distributed, Decimal::ZERO);
        assert_eq!(draw.prize_pool, dec!(100));
    }

    #[test]
    fn negative_pool_is_rejected_before_any_mutation() {
        let (mut tickets, mut players) = distinct_players(3);
        let mut rng = ScriptedSource::new([]);
        let mut available = vec![0, 1, 2];

        let result = draw_prizes(
            &mut rng,
            PrizeTier::Grand,
            &mut available,
            &mut tickets,
            &mut players,
            dec!(-1),
        );

        assert!(matches!(result, Err(Error::NegativePrizePool)));
        assert_eq!(available.len(), 3);
        assert!(players.iter().all(|p| !p.has_won_tier(PrizeTier::Grand)));
    }

    #[test]
    fn grand_pays_its_single_winner_the_whole_pool() {
        let (mut tickets, mut players) = distinct_players(10);
        let mut rng = ChaChaSource::from_u64_seed(7);
        let mut available = (0..10).collect();

        let draw = draw_prizes(
            &mut rng,
            PrizeTier::Grand,
            &mut available,
            &mut tickets,
            &mut players,
            dec!(30),
        )
        .unwrap();

        assert_eq!(draw.winners.len(), 1);
        assert_eq!(draw.distributed, dec!(30.00));
        assert_eq!(available.len(), 9);

        let winner = &draw.winners[0];
        let ticket = tickets.iter().find(|t| t.id == winner.ticket).unwrap();
        assert_eq!(ticket.prize, Some((PrizeTier::Grand, dec!(30.00))));
        let owner = players.iter().find(|p| p.id == winner.player).unwrap();
        assert_eq!(owner.total_winnings(), dec!(30.00));
        assert!(owner.has_won_tier(PrizeTier::Grand));
    }

    #[test]
    fn indivisible_pool_truncates_to_cents() {
        // 15 tickets -> Third targets round(15 * 0.2) = 3 winners;
        // 10 / 3 truncates to 3.33 each, the spare cent stays unpaid
        let (mut tickets, mut players) = distinct_players(15);
        let mut rng = ChaChaSource::from_u64_seed(1);
        let mut available = (0..15).collect();

        let draw = draw_prizes(
            &mut rng,
            PrizeTier::Third,
            &mut available,
            &mut tickets,
            &mut players,
            dec!(10),
        )
        .unwrap();

        assert_eq!(draw.winners.len(), 3);
        assert!(draw.winners.iter().all(|w| w.amount == dec!(3.33)));
        assert_eq!(draw.distributed, dec!(9.99));
        assert!(draw.prize_pool - draw.distributed < Decimal::ONE);
    }

    #[test]
    fn one_player_cannot_win_a_tier_twice() {
        let mut players = vec![Player::new(1, dec!(10), true)];
        let mut tickets: Vec<Ticket> = (1..=5).map(|id| Ticket::new(id, 1)).collect();
        let mut rng = ChaChaSource::from_u64_seed(3);
        let mut available = (0..5).collect::<Vec<_>>();

        let draw = draw_prizes(
            &mut rng,
            PrizeTier::Third,
            &mut available,
            &mut tickets,
            &mut players,
            dec!(10),
        )
        .unwrap();

        // target is round(5 * 0.2) = 1 anyway, but even a larger target
        // could not pay the same player twice
        assert_eq!(draw.winners.len(), 1);
        assert_eq!(available.len(), 4);
    }

    #[test]
    fn orphan_ticket_fails_the_draw_before_any_mutation() {
        let mut players = vec![Player::new(1, dec!(10), true)];
        // ticket 2 claims an owner the roster has never seen
        let mut tickets = vec![Ticket::new(1, 1), Ticket::new(2, 9)];
        let mut rng = ScriptedSource::new([]);
        let mut available = vec![0, 1];

        let result = draw_prizes(
            &mut rng,
            PrizeTier::Grand,
            &mut available,
            &mut tickets,
            &mut players,
            dec!(2),
        );

        assert!(matches!(result, Err(Error::UnknownOwner(9))));
        assert_eq!(available, vec![0, 1]);
        assert!(!players[0].has_won_tier(PrizeTier::Grand));
    }

    #[test]
    fn orphan_ticket_fails_determine_winners_cleanly() {
        let mut players = vec![Player::new(1, dec!(10), true)];
        let mut tickets = vec![Ticket::new(1, 1), Ticket::new(2, 9)];
        let mut rng = ScriptedSource::new([]);

        let result = determine_winners(&mut rng, &mut tickets, &mut players, dec!(1));

        assert!(matches!(result, Err(Error::UnknownOwner(9))));
        assert!(tickets.iter().all(|t| t.prize.is_none()));
        assert_eq!(players[0].total_winnings(), Decimal::ZERO);
    }

    #[test]
    fn non_positive_price_is_an_invalid_argument() {
        let (mut tickets, mut players) = distinct_players(4);
        let mut rng = ScriptedSource::new([]);
        assert!(matches!(
            determine_winners(&mut rng, &mut tickets, &mut players, Decimal::ZERO),
            Err(Error::NonPositiveTicketPrice)
        ));
    }

    #[test]
    fn ten_tickets_at_unit_price() {
        let (mut tickets, mut players) = distinct_players(10);
        let mut rng = ChaChaSource::from_u64_seed(11);

        let results = determine_winners(&mut rng, &mut tickets, &mut players, dec!(1)).unwrap();

        assert_eq!(results.total_revenue, dec!(10));
        let tiers: Vec<PrizeTier> = results.draws.iter().map(|d| d.tier).collect();
        assert_eq!(tiers, PrizeTier::ALL);

        assert_eq!(results.draws[0].prize_pool, dec!(5.0));
        assert_eq!(results.draws[0].winners.len(), 1);
        assert_eq!(results.draws[1].prize_pool, dec!(3.0));
        assert_eq!(results.draws[1].winners.len(), 1);
        assert_eq!(results.draws[2].prize_pool, dec!(1.0));
        assert_eq!(results.draws[2].winners.len(), 2);
    }

    #[test]
    fn drawn_tickets_never_return_in_later_tiers() {
        let (mut tickets, mut players) = distinct_players(30);
        let mut rng = ChaChaSource::from_u64_seed(99);

        let results = determine_winners(&mut rng, &mut tickets, &mut players, dec!(1)).unwrap();

        let mut seen = HashSet::new();
        for winner in results.all_winners() {
            assert!(seen.insert(winner.ticket), "ticket drawn twice");
        }
    }

    #[test]
    fn draw_invariants_hold_across_seeds() {
        for seed in 0..50 {
            // 12 players holding 3 tickets each
            let mut players: Vec<Player> =
                (1..=12).map(|id| Player::new(id, dec!(10), true)).collect();
            let mut tickets: Vec<Ticket> = (1..=36)
                .map(|id| Ticket::new(id, ((id - 1) % 12 + 1) as u32))
                .collect();
            let mut rng = ChaChaSource::from_u64_seed(seed);

            let results =
                determine_winners(&mut rng, &mut tickets, &mut players, dec!(1.5)).unwrap();

            for draw in &results.draws {
                assert!(draw.distributed <= draw.prize_pool);
                assert!(draw.prize_pool - draw.distributed < Decimal::ONE);
                let winner_players: HashSet<_> =
                    draw.winners.iter().map(|w| w.player).collect();
                assert_eq!(winner_players.len(), draw.winners.len());
            }

            // house profit identity, recomputed both ways
            let distributed: Decimal = results.draws.iter().map(|d| d.distributed).sum();
            assert_eq!(results.house_profit(), results.total_revenue - distributed);
            assert!(results.house_profit() >= Decimal::ZERO);

            // player ledgers agree with the draw records
            let ledger: Decimal = players.iter().map(|p| p.total_winnings()).sum();
            assert_are_close(ledger, distributed);
        }
    }
}
