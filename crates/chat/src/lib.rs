//! Support-chat provisioning.
//!
//! Every citizen who opens the app gets a user record and a seat in one
//! shared support channel. [`ChatClient::provision_member`] does all of that
//! and returns the token the client connects with; admins can wipe the
//! channel with [`ChatClient::truncate_support_channel`].

pub mod config;
pub mod error;

mod client;
mod token;

pub use crate::client::ChatClient;
pub use crate::config::ChatConfig;
pub use crate::error::ChatError;
pub use crate::token::TokenSigner;
