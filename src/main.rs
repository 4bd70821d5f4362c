use clap::Parser;
use std::error::Error;
use teloxide::prelude::*;
use werewolves::{
    config::{GameConfig, DEFAULT_QUORUM},
    game::Game,
    handlers,
};

#[derive(Parser, Debug)]
#[command(version, about = "Werewolves game server, played over Telegram")]
struct Args {
    /// Players needed before a game starts
    #[arg(long, env = "WEREWOLVES_QUORUM", default_value_t = DEFAULT_QUORUM)]
    quorum: usize,

    /// Time allowed for more players to join once quorum is reached
    #[arg(long, env = "WEREWOLVES_GRACE_PERIOD", default_value = "60s")]
    grace_period: humantime::Duration,

    /// Length of each voting window
    #[arg(long, env = "WEREWOLVES_VOTE_WINDOW", default_value = "60s")]
    vote_window: humantime::Duration,

    /// Close a voting window as soon as every prompted player has voted
    #[arg(long, env = "WEREWOLVES_EARLY_RESOLVE")]
    early_resolve: bool,

    /// Only werewolf ballots count at night
    #[arg(long, env = "WEREWOLVES_WEREWOLF_ONLY_NIGHT")]
    werewolf_only_night: bool,
}

impl From<Args> for GameConfig {
    fn from(args: Args) -> Self {
        GameConfig {
            quorum: args.quorum,
            grace_period: args.grace_period.into(),
            vote_window: args.vote_window.into(),
            early_resolve: args.early_resolve,
            werewolf_only_night: args.werewolf_only_night,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();
    pretty_env_logger::init();

    let config = GameConfig::from(Args::parse());
    config.validate()?;
    log::info!("Starting Werewolves Bot with {:?}", config);

    let game = Game::new(config);
    let bot_state = handlers::new_async_bot_state();

    let bot = Bot::from_env();
    Dispatcher::builder(bot, handlers::get_handler())
        .dependencies(dptree::deps![game.clone(), bot_state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    game.shutdown();

    Ok(())
}
