use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("min_players must be greater than zero")]
    NonPositiveMinPlayers,
    #[error("max_players must be greater than or equal to min_players")]
    MaxPlayersBelowMin,
    #[error("initial_balance cannot be negative")]
    NegativeInitialBalance,
    #[error("ticket_price must be greater than zero")]
    NonPositiveTicketPrice,
    #[error("max_tickets_per_player must be greater than zero")]
    NonPositiveMaxTickets,
}

/// Round parameters, externally supplied (the cli reads them from a json
/// file) and validated before any player or ticket is touched.
#[derive(Clone, Debug, Deserialize)]
pub struct LotteryConfig {
    pub min_players: u32,
    pub max_players: u32,
    pub initial_balance: Decimal,
    pub ticket_price: Decimal,
    pub max_tickets_per_player: u64,
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            min_players: 10,
            max_players: 15,
            initial_balance: dec!(10),
            ticket_price: dec!(1),
            max_tickets_per_player: 10,
        }
    }
}

impl LotteryConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.min_players == 0 {
            return Err(Error::NonPositiveMinPlayers);
        }
        if self.max_players < self.min_players {
            return Err(Error::MaxPlayersBelowMin);
        }
        if self.initial_balance < Decimal::ZERO {
            return Err(Error::NegativeInitialBalance);
        }
        if self.ticket_price <= Decimal::ZERO {
            return Err(Error::NonPositiveTicketPrice);
        }
        if self.max_tickets_per_player == 0 {
            return Err(Error::NonPositiveMaxTickets);
        }
        Ok(())
    }
}
