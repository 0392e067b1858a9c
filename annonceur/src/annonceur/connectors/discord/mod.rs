//! Discord connectivity for the announcement bot.
//!
//! This module keeps the rest of the bot independent of the Discord client library:
//! - Error types for Discord operations
//! - The narrow capability the announcement handler needs (post an embed, reply privately)
//! - The capability used to (re-)register the guild's slash commands
//!
//! A concrete implementation using poise and Serenity lives in the `serenity` submodule.

use crate::annonceur::commands::TargetChannel;
use crate::annonceur::commands::announcement::AnnouncementPayload;
use async_trait::async_trait;
use thiserror::Error;

pub(crate) mod serenity;

/// Errors that can occur while talking to Discord.
#[derive(Error, Debug)]
pub enum Error {
    /// Posting into the target channel failed; carries Discord's description
    #[error("{0}")]
    CannotSendMessage(String),
    /// Failed to send the private reply to the invoker
    #[error("Cannot send reply")]
    CannotSendReply,
    /// The platform refused the command definitions
    #[error("Cannot register commands: {0}")]
    CannotRegisterCommands(String),
    /// No application id is known yet, so commands cannot be addressed
    #[error("Application id is not resolved yet")]
    ApplicationIdUnresolved,
    /// The command was not executed in a server
    #[error("Not in a server")]
    NotInServer,
    /// The invoker's role names could not be looked up
    #[error("Cannot resolve roles")]
    CannotResolveRoles,
}

/// Gateway operations available while handling one invocation.
///
/// An implementation is bound to a single invocation, so replies always go to its invoker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiscordConnector {
    /// Posts the payload as an embed into the given channel.
    async fn send_embed(
        &self,
        channel: &TargetChannel,
        payload: &AnnouncementPayload,
    ) -> Result<(), Error>;

    /// Sends an ephemeral reply only the invoker can see.
    async fn send_private_reply(&self, message: &str) -> Result<(), Error>;
}

/// Registers the bot's slash commands with a guild.
///
/// Registering the same definitions again replaces them with identical ones.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRegistry {
    /// Returns the number of commands registered.
    async fn register_guild_commands(&self, guild_id: u64) -> Result<usize, Error>;
}
