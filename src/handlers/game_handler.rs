use log::warn;
use teloxide::{prelude::*, utils::command::BotCommands};

use super::{lock_bot_state, AsyncBotState};
use crate::game::Game;

pub fn get_game_handler() -> Handler<
    'static,
    DependencyMap,
    Result<(), teloxide::RequestError>,
    teloxide::dispatching::DpHandlerDescription,
> {
    dptree::filter_map(|msg: Message, bot_state: AsyncBotState| {
        lock_bot_state(&bot_state)
            .sessions
            .get(&msg.chat.id)
            .cloned()
            .map(Username)
    })
    .filter_command::<GameCommand>()
    .endpoint(game_handler)
}

/// The name a chat joined the game with
#[derive(Clone)]
struct Username(String);

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Game commands")]
enum GameCommand {
    #[command(description = "Shows this message.")]
    Help,
    #[command(description = "List players in the game")]
    Players,
    #[command(description = "Vote for a player")]
    Vote(String),
    #[command(description = "Stop receiving game messages in this chat")]
    Leave,
}

async fn game_handler(
    game: Game,
    bot: Bot,
    bot_state: AsyncBotState,
    msg: Message,
    cmd: GameCommand,
    Username(username): Username,
) -> Result<(), teloxide::RequestError> {
    let text = match cmd {
        GameCommand::Help => GameCommand::descriptions().to_string(),
        GameCommand::Players => game
            .players()
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if p.is_alive {
                    format!("{}. {}", i + 1, p.username)
                } else {
                    format!("{}. {} (eliminated)", i + 1, p.username)
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        GameCommand::Vote(votee) => {
            let votee = votee.trim();
            game.submit_vote(&username, votee);
            format!("Vote received for {votee}")
        }
        GameCommand::Leave => {
            lock_bot_state(&bot_state).sessions.remove(&msg.chat.id);
            match game.disconnect(&username) {
                Ok(()) => format!("{username} left. No more game messages will be sent here."),
                Err(e) => {
                    warn!("Failed to disconnect {username}: {e}");
                    e.to_string()
                }
            }
        }
    };

    bot.send_message(msg.chat.id, text).await?;

    Ok(())
}
