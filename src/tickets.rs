use crate::config::{self, LotteryConfig};
use crate::models::{Player, Ticket, TicketId};
use crate::rng::RandomSource;
use crate::ui::UserInterface;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("ticket count must be greater than zero")]
    InvalidTicketCount,
    #[error(transparent)]
    Config(#[from] config::Error),
}

/// Produces the round's ticket numbers: a uniformly random permutation of
/// `1..=count`, via an in-place Fisher-Yates pass. Every permutation is
/// equally likely given a uniform source.
pub fn generate_ticket_numbers(
    rng: &mut dyn RandomSource,
    count: u64,
) -> Result<Vec<TicketId>, Error> {
    if count == 0 {
        return Err(Error::InvalidTicketCount);
    }
    let mut numbers: Vec<TicketId> = (1..=count).collect();
    for i in (1..numbers.len()).rev() {
        let j = rng.next_below(i as u64 + 1) as usize;
        numbers.swap(i, j);
    }
    Ok(numbers)
}

/// Runs the purchase phase for the whole roster: collects each player's
/// desired count (simulated players draw it, the human is prompted), clamps
/// it to their balance, debits them, and deals out one shared permutation
/// of ticket numbers in roster order. Returns the full ticket list; each
/// ticket is also recorded against its owner.
pub fn process_purchases(
    players: &mut [Player],
    config: &LotteryConfig,
    rng: &mut dyn RandomSource,
    ui: &mut dyn UserInterface,
) -> Result<Vec<Ticket>, Error> {
    config.validate()?;

    let purchases = collect_purchases(players, config, rng, ui);
    assign_tickets(players, &purchases, rng)
}

/// Purchased ticket count per player, in roster order.
fn collect_purchases(
    players: &mut [Player],
    config: &LotteryConfig,
    rng: &mut dyn RandomSource,
    ui: &mut dyn UserInterface,
) -> Vec<u64> {
    players
        .iter_mut()
        .map(|player| {
            let desired = if player.is_cpu {
                rng.next_range(1, config.max_tickets_per_player + 1)
            } else {
                ui.ticket_purchase_count(
                    player.balance,
                    config.ticket_price,
                    config.max_tickets_per_player,
                )
            };
            player.purchase_tickets(desired, config.ticket_price)
        })
        .collect()
}

fn assign_tickets(
    players: &mut [Player],
    purchases: &[u64],
    rng: &mut dyn RandomSource,
) -> Result<Vec<Ticket>, Error> {
    let total: u64 = purchases.iter().sum();
    if total == 0 {
        return Ok(Vec::new());
    }

    let numbers = generate_ticket_numbers(rng, total)?;
    tracing::debug!(tickets = total, "assigning ticket numbers");

    let mut tickets = Vec::with_capacity(numbers.len());
    let mut next = 0usize;
    for (player, &count) in players.iter_mut().zip(purchases) {
        for &number in &numbers[next..next + count as usize] {
            player.tickets.push(number);
            tickets.push(Ticket::new(number, player.id));
        }
        next += count as usize;
    }
    Ok(tickets)
}
