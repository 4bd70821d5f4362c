pub mod config;
pub mod error;
pub mod game;
pub mod handlers;
pub mod mailbox;
pub mod message;
pub mod player_registry;
