//! Serenity-based implementation of Discord connectivity.
//!
//! This module provides the concrete implementations of the Discord connector
//! traits using poise and the Serenity Discord library, along with conversions
//! from Serenity's models into the bot's own invocation types.

use crate::annonceur::commands::announcement::AnnouncementPayload;
use crate::annonceur::commands::{ChannelKind, Invocation, Invoker, TargetChannel};
use crate::annonceur::config::Config;
use crate::annonceur::connectors::discord::Error::{
    ApplicationIdUnresolved, CannotRegisterCommands, CannotResolveRoles, CannotSendMessage,
    CannotSendReply, NotInServer,
};
use crate::annonceur::connectors::discord::{CommandRegistry, DiscordConnector, Error};
use async_trait::async_trait;
use log::debug;
use poise::CreateReply;
use poise::serenity_prelude as serenity;

/// Discord connector bound to one command invocation.
pub struct SerenityDiscordConnector<'a> {
    context: Context<'a>,
}

impl<'a> SerenityDiscordConnector<'a> {
    /// Creates a new SerenityDiscordConnector instance.
    ///
    /// # Arguments
    ///
    /// * `context` - Poise command context of the invocation being handled
    pub fn new(context: Context<'a>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl DiscordConnector for SerenityDiscordConnector<'_> {
    async fn send_embed(
        &self,
        channel: &TargetChannel,
        payload: &AnnouncementPayload,
    ) -> Result<(), Error> {
        let message = serenity::CreateMessage::new().embed(embed_from(payload));
        serenity::ChannelId::new(channel.id)
            .send_message(self.context, message)
            .await
            .map_err(|error| CannotSendMessage(error.to_string()))?;
        Ok(())
    }

    async fn send_private_reply(&self, message: &str) -> Result<(), Error> {
        let reply = CreateReply::default().content(message).ephemeral(true);
        let Ok(_) = self.context.send(reply).await else {
            return Err(CannotSendReply);
        };
        Ok(())
    }
}

/// Registers commands through a Serenity HTTP client.
pub struct SerenityCommandRegistry<'a> {
    http: &'a serenity::Http,
    commands: &'a [poise::Command<Data, anyhow::Error>],
}

impl<'a> SerenityCommandRegistry<'a> {
    pub fn new(http: &'a serenity::Http, commands: &'a [poise::Command<Data, anyhow::Error>]) -> Self {
        Self { http, commands }
    }
}

#[async_trait]
impl CommandRegistry for SerenityCommandRegistry<'_> {
    async fn register_guild_commands(&self, guild_id: u64) -> Result<usize, Error> {
        if self.http.application_id().is_none() {
            return Err(ApplicationIdUnresolved);
        }
        poise::builtins::register_in_guild(self.http, self.commands, serenity::GuildId::new(guild_id))
            .await
            .map_err(|error| CannotRegisterCommands(error.to_string()))?;
        Ok(self.commands.len())
    }
}

fn embed_from(payload: &AnnouncementPayload) -> serenity::CreateEmbed {
    let footer =
        serenity::CreateEmbedFooter::new(&payload.footer_text).icon_url(&payload.footer_icon_url);
    let timestamp = serenity::Timestamp::from_unix_timestamp(payload.timestamp.timestamp())
        .unwrap_or_else(|_| serenity::Timestamp::now());

    let mut embed = serenity::CreateEmbed::new()
        .title(&payload.title)
        .description(&payload.body)
        .color(payload.color)
        .footer(footer)
        .timestamp(timestamp);
    if let Some(url) = &payload.thumbnail_url {
        embed = embed.thumbnail(url);
    }
    if let Some(url) = &payload.image_url {
        embed = embed.image(url);
    }
    embed
}

/// Collects everything the announcement handler needs from a slash command invocation.
///
/// Role names come from the cache when the guild is cached, otherwise from the API.
pub(crate) async fn invocation_from_context(
    ctx: Context<'_>,
    message: String,
    channel: &serenity::Channel,
    title: Option<String>,
    image_url: Option<String>,
) -> Result<Invocation, Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Err(NotInServer);
    };
    let Some(member) = ctx.author_member().await else {
        return Err(NotInServer);
    };

    let role_names: Vec<String> = match member.roles(ctx) {
        Some(roles) => roles.into_iter().map(|role| role.name).collect(),
        None => {
            debug!("Guild {} not cached, fetching roles", guild_id);
            let Ok(guild_roles) = guild_id.roles(ctx).await else {
                return Err(CannotResolveRoles);
            };
            member
                .roles
                .iter()
                .filter_map(|role_id| guild_roles.get(role_id))
                .map(|role| role.name.clone())
                .collect()
        }
    };

    let author = ctx.author();
    Ok(Invocation {
        invoker: Invoker {
            id: author.id.get(),
            display_name: author.tag(),
            avatar_url: author.face(),
            role_names,
        },
        message,
        channel: channel.into(),
        title,
        image_url,
    })
}

impl From<&serenity::Channel> for TargetChannel {
    fn from(channel: &serenity::Channel) -> Self {
        let kind = match channel {
            serenity::Channel::Guild(guild_channel) => guild_channel.kind.into(),
            serenity::Channel::Private(_) => ChannelKind::Direct,
            _ => ChannelKind::Other,
        };
        TargetChannel {
            id: channel.id().get(),
            kind,
        }
    }
}

impl From<serenity::ChannelType> for ChannelKind {
    fn from(kind: serenity::ChannelType) -> Self {
        match kind {
            serenity::ChannelType::Text => ChannelKind::Text,
            serenity::ChannelType::News => ChannelKind::News,
            serenity::ChannelType::PublicThread
            | serenity::ChannelType::PrivateThread
            | serenity::ChannelType::NewsThread => ChannelKind::Thread,
            serenity::ChannelType::Private => ChannelKind::Direct,
            serenity::ChannelType::Voice => ChannelKind::Voice,
            serenity::ChannelType::Stage => ChannelKind::Stage,
            serenity::ChannelType::Category => ChannelKind::Category,
            serenity::ChannelType::Forum => ChannelKind::Forum,
            _ => ChannelKind::Other,
        }
    }
}

/// Data shared by every command invocation
pub struct Data {
    pub(crate) config: Config,
}

impl Data {
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

/// Type alias for Poise command context
pub type Context<'a> = poise::Context<'a, Data, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annonceur::commands::InvocationBuilder;

    #[test]
    fn text_like_channel_types_are_text_based() {
        for kind in [
            serenity::ChannelType::Text,
            serenity::ChannelType::News,
            serenity::ChannelType::PublicThread,
            serenity::ChannelType::PrivateThread,
            serenity::ChannelType::NewsThread,
        ] {
            assert!(ChannelKind::from(kind).is_text_based(), "{:?}", kind);
        }
    }

    #[test]
    fn voice_like_channel_types_are_not_text_based() {
        for kind in [
            serenity::ChannelType::Voice,
            serenity::ChannelType::Stage,
            serenity::ChannelType::Category,
            serenity::ChannelType::Forum,
            serenity::ChannelType::Directory,
        ] {
            assert!(!ChannelKind::from(kind).is_text_based(), "{:?}", kind);
        }
    }

    #[test]
    fn voice_channel_maps_to_voice_kind() {
        assert_eq!(
            ChannelKind::from(serenity::ChannelType::Voice),
            ChannelKind::Voice
        );
    }

    #[test]
    fn embed_is_built_without_optional_parts() {
        // Arrange
        let invocation = InvocationBuilder::new().build();
        let payload = AnnouncementPayload::new(&invocation, None);

        // Act
        let embed = serde_json::to_value(embed_from(&payload)).unwrap();

        // Assert
        assert_eq!(embed["title"], "📢 Annonce NorthSide Illégal");
        assert_eq!(embed["description"], "Patrol at 9pm");
        assert_eq!(embed["color"], 0xFF0000);
        assert_eq!(embed["footer"]["text"], "Annonce faite par Modo#0001");
        assert!(embed["thumbnail"].is_null());
        assert!(embed["image"].is_null());
    }

    #[test]
    fn embed_carries_thumbnail_and_image() {
        // Arrange
        let invocation = InvocationBuilder::new()
            .image_url("https://example.com/map.png")
            .build();
        let payload = AnnouncementPayload::new(&invocation, Some("https://example.com/logo.png"));

        // Act
        let embed = serde_json::to_value(embed_from(&payload)).unwrap();

        // Assert
        assert_eq!(embed["thumbnail"]["url"], "https://example.com/logo.png");
        assert_eq!(embed["image"]["url"], "https://example.com/map.png");
    }
}
