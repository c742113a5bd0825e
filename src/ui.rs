use crate::models::{Player, PrizeTier, Ticket, Winner};
use crate::prizes::WinningResults;
use itertools::Itertools;
use rust_decimal::Decimal;
use std::io::{self, BufRead, Write};

/// Everything the round needs from the person at the keyboard, behind a
/// trait so the purchase phase and the game loop stay testable.
pub trait UserInterface {
    /// How many tickets the human wants, bounded to `[1, max_tickets]`.
    fn ticket_purchase_count(
        &mut self,
        balance: Decimal,
        ticket_price: Decimal,
        max_tickets: u64,
    ) -> u64;

    fn display_results(&mut self, summary: &RoundSummary);

    /// Whether to play another round.
    fn confirm_restart(&mut self) -> bool;
}

/// View of a finished round for the display layer.
#[derive(Clone, Debug)]
pub struct RoundSummary {
    pub total_tickets: usize,
    pub total_revenue: Decimal,
    pub distributed_by_tier: Vec<(PrizeTier, Decimal)>,
    pub players: Vec<Player>,
    pub winners: Vec<Winner>,
    pub house_profit: Decimal,
}

impl RoundSummary {
    pub fn new(players: &[Player], tickets: &[Ticket], results: &WinningResults) -> Self {
        Self {
            total_tickets: tickets.len(),
            total_revenue: results.total_revenue,
            distributed_by_tier: results
                .draws
                .iter()
                .map(|draw| (draw.tier, draw.distributed))
                .collect(),
            players: players.to_vec(),
            winners: results.all_winners().cloned().collect(),
            house_profit: results.house_profit(),
        }
    }
}

/// Interactive console implementation with re-prompt loops on invalid
/// input. Generic over its reader and writer so the loops are testable
/// with in-memory buffers; `ConsoleUi::stdio()` wires up the real
/// terminal. On a closed input the prompts fall back to their minimal
/// answers instead of spinning.
pub struct ConsoleUi<R, W> {
    input: R,
    output: W,
}

impl ConsoleUi<io::BufReader<io::Stdin>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleUi<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl<R: BufRead, W: Write> UserInterface for ConsoleUi<R, W> {
    fn ticket_purchase_count(
        &mut self,
        balance: Decimal,
        ticket_price: Decimal,
        max_tickets: u64,
    ) -> u64 {
        let _ = writeln!(
            self.output,
            "\nYou have {}. Each ticket costs {}",
            balance, ticket_price
        );
        let _ = write!(
            self.output,
            "How many tickets would you like to purchase (1-{})? ",
            max_tickets
        );
        let _ = self.output.flush();

        loop {
            let Some(line) = self.read_line() else {
                return 1;
            };
            match line.parse::<u64>() {
                Ok(count) if (1..=max_tickets).contains(&count) => return count,
                _ => {
                    let _ = write!(
                        self.output,
                        "Please enter a valid number between 1 and {}: ",
                        max_tickets
                    );
                    let _ = self.output.flush();
                }
            }
        }
    }

    fn display_results(&mut self, summary: &RoundSummary) {
        let _ = write_summary(&mut self.output, summary);
    }

    fn confirm_restart(&mut self) -> bool {
        let _ = writeln!(self.output, "\nWould you like to play again? (y/n)");
        loop {
            match self.read_line().as_deref().map(str::to_lowercase) {
                Some(answer) if answer == "y" => return true,
                Some(answer) if answer == "n" => return false,
                None => return false,
                _ => {
                    let _ = writeln!(self.output, "Please enter 'y' or 'n'.");
                }
            }
        }
    }
}

/// Non-interactive stand-in for scripted runs: the human buys the maximum
/// allowed (still clamped to their balance) and no replay is offered.
pub struct AutoPilot;

impl UserInterface for AutoPilot {
    fn ticket_purchase_count(&mut self, _: Decimal, _: Decimal, max_tickets: u64) -> u64 {
        max_tickets
    }

    fn display_results(&mut self, summary: &RoundSummary) {
        let _ = write_summary(&mut io::stdout(), summary);
    }

    fn confirm_restart(&mut self) -> bool {
        false
    }
}

fn write_summary(out: &mut impl Write, summary: &RoundSummary) -> io::Result<()> {
    writeln!(out, "\n=== LOTTERY RESULTS ===")?;
    writeln!(out, "\nTotal Tickets Sold: {}", summary.total_tickets)?;
    writeln!(out, "Total Prize Pool: {:.2}", summary.total_revenue)?;

    writeln!(out, "\nTicket Purchases:")?;
    for player in &summary.players {
        writeln!(
            out,
            "{}: {} tickets (IDs: {})",
            player.name,
            player.tickets.len(),
            player.tickets.iter().join(", ")
        )?;
    }

    writeln!(out, "\nPrize Pools:")?;
    for (tier, distributed) in &summary.distributed_by_tier {
        writeln!(out, "{} Prize Pool: {:.2}", tier, distributed)?;
    }

    writeln!(out, "\nWINNING TICKETS BY TIER:")?;
    for tier in PrizeTier::ALL {
        let tier_winners: Vec<&Winner> =
            summary.winners.iter().filter(|w| w.tier == tier).collect();
        if tier_winners.is_empty() {
            continue;
        }
        writeln!(out, "\n{} Tier Winners:", tier)?;
        for winner in tier_winners {
            writeln!(
                out,
                "{} - Ticket #{} - {:.2}",
                winner.player_name, winner.ticket, winner.amount
            )?;
        }
    }

    let distributed: Decimal = summary.winners.iter().map(|w| w.amount).sum();
    writeln!(out, "\nSummary:")?;
    writeln!(out, "Total Revenue: {:.2}", summary.total_revenue)?;
    writeln!(out, "Total Prizes Distributed: {:.2}", distributed)?;
    writeln!(out, "House Profit: {:.2}", summary.house_profit)
}
