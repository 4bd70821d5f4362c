use futures_util::StreamExt;
use log::{info, warn};
use teloxide::prelude::*;

use crate::mailbox::MessageStream;

/// Forwards a player's mailbox to their chat until the game shuts down
pub async fn deliver(bot: Bot, chat_id: ChatId, stream: MessageStream) {
    info!("Delivering messages to chat {}", chat_id.0);

    let messages = stream.into_stream();
    tokio::pin!(messages);
    while let Some(message) = messages.next().await {
        if let Err(e) = bot.send_message(chat_id, message.to_string()).await {
            warn!("Failed to deliver to chat {}: {}", chat_id.0, e);
        }
    }

    info!("Delivery to chat {} stopped", chat_id.0);
}
