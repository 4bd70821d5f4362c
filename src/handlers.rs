use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use teloxide::prelude::*;

pub struct BotState {
    /// Username each chat joined the game under
    pub sessions: HashMap<ChatId, String>,
}

pub type AsyncBotState = Arc<Mutex<BotState>>;

pub fn new_async_bot_state() -> AsyncBotState {
    Arc::new(Mutex::new(BotState {
        sessions: HashMap::new(),
    }))
}

pub fn lock_bot_state(bot_state: &AsyncBotState) -> MutexGuard<'_, BotState> {
    bot_state.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn get_handler() -> Handler<
    'static,
    DependencyMap,
    Result<(), teloxide::RequestError>,
    teloxide::dispatching::DpHandlerDescription,
> {
    Update::filter_message()
        .branch(main_menu_handler::get_main_menu_handler())
        .branch(game_handler::get_game_handler())
}

pub mod delivery;
pub mod game_handler;
pub mod main_menu_handler;
