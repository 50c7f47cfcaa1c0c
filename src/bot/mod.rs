pub mod command;
pub mod engine;

pub use engine::BotEngine;
