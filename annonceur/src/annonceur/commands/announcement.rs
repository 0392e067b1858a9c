use crate::annonceur::commands::{Error, Invocation, Outcome, Rejection};
use crate::annonceur::config::Config;
use crate::annonceur::connectors::discord::DiscordConnector;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{error, info, warn};

pub const DEFAULT_TITLE: &str = "📢 Annonce NorthSide Illégal";
pub const ANNOUNCEMENT_COLOR: u32 = 0xFF0000;

/// Content of the embed posted into the target channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnouncementPayload {
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) color: u32,
    pub(crate) footer_text: String,
    pub(crate) footer_icon_url: String,
    pub(crate) thumbnail_url: Option<String>,
    pub(crate) image_url: Option<String>,
    pub(crate) timestamp: DateTime<Utc>,
}

impl AnnouncementPayload {
    /// Builds the embed content for an invocation, stamped with the current time.
    ///
    /// The message is passed through verbatim; Discord enforces its own length limits.
    pub fn new(invocation: &Invocation, thumbnail_url: Option<&str>) -> Self {
        let title = invocation
            .title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(DEFAULT_TITLE);

        Self {
            title: title.to_string(),
            body: invocation.message.clone(),
            color: ANNOUNCEMENT_COLOR,
            footer_text: format!("Annonce faite par {}", invocation.invoker.display_name),
            footer_icon_url: invocation.invoker.avatar_url.clone(),
            thumbnail_url: thumbnail_url
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            image_url: invocation
                .image_url
                .as_deref()
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            timestamp: Utc::now(),
        }
    }
}

#[async_trait]
pub trait Announcer {
    /// Handles one `/annonce` invocation from authorization through the private reply.
    async fn announce(&self, invocation: &Invocation) -> Result<Outcome, Error>;
}

pub struct AnnouncerImpl<'a, DISCORD: DiscordConnector> {
    config: &'a Config,
    discord_connector: &'a DISCORD,
}

impl<'a, DISCORD: DiscordConnector + Send + Sync> AnnouncerImpl<'a, DISCORD> {
    pub fn new(config: &'a Config, discord_connector: &'a DISCORD) -> Self {
        Self {
            config,
            discord_connector,
        }
    }

    async fn reject(&self, rejection: Rejection) -> Result<Outcome, Error> {
        self.discord_connector
            .send_private_reply(&rejection.to_string())
            .await?;
        Ok(Outcome::Rejected(rejection))
    }
}

#[async_trait]
impl<'a, DISCORD: DiscordConnector + Send + Sync> Announcer for AnnouncerImpl<'a, DISCORD> {
    async fn announce(&self, invocation: &Invocation) -> Result<Outcome, Error> {
        let invoker = &invocation.invoker;
        let channel = &invocation.channel;

        if !invoker.has_role(self.config.authorized_role()) {
            warn!(
                "{} ({}) tried to announce without the '{}' role",
                invoker.display_name,
                invoker.id,
                self.config.authorized_role()
            );
            return self.reject(Rejection::AuthorizationDenied).await;
        }

        if !channel.is_text_based() {
            warn!(
                "{} picked channel {} of kind {:?}, which cannot receive announcements",
                invoker.display_name, channel.id, channel.kind
            );
            return self.reject(Rejection::InvalidTarget).await;
        }

        let payload = AnnouncementPayload::new(invocation, self.config.thumbnail_url());
        match self.discord_connector.send_embed(channel, &payload).await {
            Ok(()) => {
                info!(
                    "Announcement by {} ({}) posted in channel {}",
                    invoker.display_name, invoker.id, channel.id
                );
                self.discord_connector
                    .send_private_reply(&format!("✅ Annonce envoyée dans {} !", channel.mention()))
                    .await?;
                Ok(Outcome::Delivered)
            }
            Err(error) => {
                error!(
                    "Failed to post announcement by {} in channel {}: {}",
                    invoker.display_name, channel.id, error
                );
                self.reject(Rejection::DeliveryFailure(error)).await
            }
        }
    }
}
