use color_eyre::Report;
use lottery_sim::config::LotteryConfig;
use lottery_sim::players::initialize_players;
use lottery_sim::prizes::determine_winners;
use lottery_sim::rng::ChaChaSource;
use lottery_sim::tickets::process_purchases;
use lottery_sim::ui::{AutoPilot, ConsoleUi, RoundSummary, UserInterface};
use lottery_sim::utils::csv::dump_data_to_csv;
use std::fs::File;
use std::path::PathBuf;
use structopt::StructOpt;

/// Runs lottery rounds until the player declines a replay.
#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case")]
pub struct Play {
    /// Path to a json-encoded LotteryConfig; built-in defaults apply when
    /// omitted
    #[structopt(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible round; entropy-seeded when omitted
    #[structopt(long)]
    seed: Option<u64>,

    /// Dump the winner records of the last round to this csv file
    #[structopt(long)]
    winners_csv: Option<PathBuf>,

    /// Run without prompts: the human buys the maximum allowed and a
    /// single round is played
    #[structopt(long)]
    auto: bool,
}

impl Play {
    pub fn exec(self) -> Result<(), Report> {
        let config: LotteryConfig = match &self.config {
            Some(path) => serde_json::from_reader(File::open(path)?)?,
            None => LotteryConfig::default(),
        };
        config.validate()?;

        let mut rng = match self.seed {
            Some(seed) => ChaChaSource::from_u64_seed(seed),
            None => ChaChaSource::from_entropy(),
        };
        let mut ui: Box<dyn UserInterface> = if self.auto {
            Box::new(AutoPilot)
        } else {
            Box::new(ConsoleUi::stdio())
        };

        loop {
            let mut players = initialize_players(&mut rng, &config)?;
            let mut tickets = process_purchases(&mut players, &config, &mut rng, ui.as_mut())?;
            let results =
                determine_winners(&mut rng, &mut tickets, &mut players, config.ticket_price)?;

            let summary = RoundSummary::new(&players, &tickets, &results);
            ui.display_results(&summary);

            if let Some(path) = &self.winners_csv {
                dump_data_to_csv(&summary.winners, path)?;
            }

            if !ui.confirm_restart() {
                break;
            }
        }
        Ok(())
    }
}
