use crate::config::{self, LotteryConfig};
use crate::models::{Player, PlayerId};
use crate::rng::RandomSource;

/// Builds the round roster: player 1 is the human, the rest are simulated,
/// with the roster size drawn uniformly from the configured range. Everyone
/// starts with the same balance.
pub fn initialize_players(
    rng: &mut dyn RandomSource,
    config: &LotteryConfig,
) -> Result<Vec<Player>, config::Error> {
    config.validate()?;

    let total = rng.next_range(config.min_players as u64, config.max_players as u64 + 1);
    let mut players = vec![Player::new(1, config.initial_balance, false)];
    for id in 2..=total as PlayerId {
        players.push(Player::new(id, config.initial_balance, true));
    }
    tracing::debug!(players = total, "initialized round roster");
    Ok(players)
}
