use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

pub type PlayerId = u32;
/// The lottery number printed on a ticket, drawn from a permutation of
/// `1..=N` where `N` is the number of tickets sold this round.
pub type TicketId = u64;

/// The three ranked prize tiers, in draw order. Grand is drawn first and
/// later tiers select from whatever tickets the earlier ones left behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PrizeTier {
    Grand,
    Second,
    Third,
}

impl PrizeTier {
    pub const ALL: [PrizeTier; 3] = [PrizeTier::Grand, PrizeTier::Second, PrizeTier::Third];

    fn bit(self) -> u8 {
        match self {
            PrizeTier::Grand => 0b001,
            PrizeTier::Second => 0b010,
            PrizeTier::Third => 0b100,
        }
    }
}

impl fmt::Display for PrizeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrizeTier::Grand => write!(f, "Grand"),
            PrizeTier::Second => write!(f, "Second"),
            PrizeTier::Third => write!(f, "Third"),
        }
    }
}

/// Membership set over the tier enum, used to enforce the
/// one-win-per-tier-per-player rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TierSet(u8);

impl TierSet {
    pub fn contains(self, tier: PrizeTier) -> bool {
        self.0 & tier.bit() != 0
    }

    pub fn insert(&mut self, tier: PrizeTier) {
        self.0 |= tier.bit();
    }
}

/// A lottery participant. Player 1 is the human; everyone else is
/// simulated. Players live in a per-round roster and are referenced by id.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub balance: Decimal,
    pub is_cpu: bool,
    pub tickets: Vec<TicketId>,
    total_winnings: Decimal,
    won_tiers: TierSet,
}

impl Player {
    pub fn new(id: PlayerId, initial_balance: Decimal, is_cpu: bool) -> Self {
        Self {
            id,
            name: format!("Player {}", id),
            balance: initial_balance,
            is_cpu,
            tickets: Vec::new(),
            total_winnings: Decimal::ZERO,
            won_tiers: TierSet::default(),
        }
    }

    /// Buys up to `desired` tickets, clamped to what the balance affords.
    /// Debits exactly `purchased * ticket_price` and returns the purchased
    /// count. The balance never goes negative; a non-positive price buys
    /// nothing.
    pub fn purchase_tickets(&mut self, desired: u64, ticket_price: Decimal) -> u64 {
        if ticket_price <= Decimal::ZERO {
            return 0;
        }
        let affordable = (self.balance / ticket_price)
            .floor()
            .to_u64()
            .unwrap_or(0);
        let purchased = desired.min(affordable);
        self.balance -= Decimal::from(purchased) * ticket_price;
        purchased
    }

    pub fn has_won_tier(&self, tier: PrizeTier) -> bool {
        self.won_tiers.contains(tier)
    }

    pub fn mark_tier_won(&mut self, tier: PrizeTier) {
        self.won_tiers.insert(tier);
    }

    pub fn add_winnings(&mut self, amount: Decimal) {
        self.total_winnings += amount;
    }

    pub fn total_winnings(&self) -> Decimal {
        self.total_winnings
    }
}

/// A ticket belongs to exactly one player for its lifetime; the prize
/// assignment stays empty until the ticket is drawn for a tier.
#[derive(Clone, Debug)]
pub struct Ticket {
    pub id: TicketId,
    pub owner: PlayerId,
    pub prize: Option<(PrizeTier, Decimal)>,
}

impl Ticket {
    pub fn new(id: TicketId, owner: PlayerId) -> Self {
        Self {
            id,
            owner,
            prize: None,
        }
    }

    pub fn assign_prize(&mut self, tier: PrizeTier, amount: Decimal) {
        self.prize = Some((tier, amount));
    }
}

/// One winning ticket in a tier draw, in a shape ready for csv reports.
#[derive(Clone, Debug, Serialize)]
pub struct Winner {
    pub player: PlayerId,
    pub player_name: String,
    pub ticket: TicketId,
    pub tier: PrizeTier,
    pub amount: Decimal,
}
