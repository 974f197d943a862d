pub mod commands;
pub mod constants;
pub mod keyboards;
pub mod telegram;
pub mod types;

pub use teloxide::prelude::Dispatcher;
pub use types::{Command, HandlerResult, LinkSettings};
