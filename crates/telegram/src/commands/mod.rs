//! Command handlers for the Telegram bot
//!
//! This module contains all handler functions organized by category:
//! - `basic`: Start and help commands
//! - `stream`: Media intake and stream link generation

mod basic;
mod stream;

pub use basic::*;
pub use stream::*;
