use log::error;
use teloxide::{prelude::*, utils::command::BotCommands};

use super::{delivery::deliver, lock_bot_state, AsyncBotState};
use crate::game::Game;

pub fn get_main_menu_handler() -> Handler<
    'static,
    DependencyMap,
    Result<(), teloxide::RequestError>,
    teloxide::dispatching::DpHandlerDescription,
> {
    dptree::entry()
        .filter(|msg: Message, bot_state: AsyncBotState| {
            !lock_bot_state(&bot_state)
                .sessions
                .contains_key(&msg.chat.id)
        })
        .filter_command::<MainMenuCommand>()
        .endpoint(main_menu_handler)
}

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Main menu commands")]
enum MainMenuCommand {
    #[command(description = "Shows this message.")]
    Help,
    #[command(description = "Join the game under the given name")]
    Join(String),
}

/// The name to join under, or `None` when the command carried no name
fn requested_username(name: &str) -> Option<String> {
    match name.trim() {
        "" => None,
        name => Some(name.to_string()),
    }
}

async fn main_menu_handler(
    game: Game,
    bot_state: AsyncBotState,
    bot: Bot,
    msg: Message,
    cmd: MainMenuCommand,
) -> Result<(), teloxide::RequestError> {
    let text = match cmd {
        MainMenuCommand::Help => MainMenuCommand::descriptions().to_string(),
        MainMenuCommand::Join(name) => match requested_username(&name) {
            None => String::from("Tell me what to call you: /join <name>"),
            Some(username) => match game.connect(&username) {
                Ok(reply) => {
                    lock_bot_state(&bot_state)
                        .sessions
                        .insert(msg.chat.id, username.clone());

                    match game.subscribe(&username) {
                        Ok(stream) => {
                            tokio::spawn(deliver(bot.clone(), msg.chat.id, stream));
                        }
                        Err(e) => error!("Cannot deliver to {username}: {e}"),
                    }
                    reply.to_string()
                }
                Err(message) => format!("Encountered error: {}", message),
            },
        },
    };

    bot.send_message(msg.chat.id, text).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_needs_a_name() {
        assert_eq!(requested_username(""), None);
        assert_eq!(requested_username("   "), None);
    }

    #[test]
    fn join_name_is_trimmed() {
        assert_eq!(requested_username("  mira "), Some(String::from("mira")));
    }
}
