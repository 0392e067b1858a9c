use crate::annonceur::connectors::discord;
use thiserror::Error;

pub mod announcement;

/// Outcomes of an announcement that are reported back to the invoker instead of the channel.
///
/// The `Display` form of each variant is the exact private reply sent to the invoker.
#[derive(Error, Debug)]
pub enum Rejection {
    #[error("❌ Vous n'avez pas la permission d'utiliser cette commande.")]
    AuthorizationDenied,
    #[error("❌ Veuillez choisir un salon texte valide.")]
    InvalidTarget,
    #[error("❌ Je n'ai pas pu envoyer le message : {0}")]
    DeliveryFailure(discord::Error),
}

/// Errors that prevent the invoker from being told what happened.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Discord error: {0}")]
    DiscordError(#[from] discord::Error),
}

/// Result of handling one invocation.
#[derive(Debug)]
pub enum Outcome {
    Delivered,
    Rejected(Rejection),
}

/// Private reply for a command that failed before or outside the handler's own replies.
///
/// `None` when the failure was the private reply itself, as nothing more can reach the invoker.
pub fn failure_reply(error: &anyhow::Error) -> Option<String> {
    if error.downcast_ref::<Error>().is_some() {
        return None;
    }
    Some(format!("❌ Je n'ai pas pu traiter la commande : {}", error))
}

/// The member who issued the command, as seen at invocation time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Invoker {
    pub(crate) id: u64,
    /// Name shown in the announcement footer
    pub(crate) display_name: String,
    pub(crate) avatar_url: String,
    /// Names of every role the member holds in the guild
    pub(crate) role_names: Vec<String>,
}

impl Invoker {
    /// Exact, case-sensitive role name match.
    pub fn has_role(&self, role_name: &str) -> bool {
        self.role_names.iter().any(|name| name == role_name)
    }
}

/// Kind of the channel an announcement is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    News,
    Thread,
    Direct,
    Voice,
    Stage,
    Category,
    Forum,
    Other,
}

impl ChannelKind {
    /// Whether messages can be posted directly into a channel of this kind.
    pub fn is_text_based(&self) -> bool {
        matches!(
            self,
            ChannelKind::Text | ChannelKind::News | ChannelKind::Thread | ChannelKind::Direct
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetChannel {
    pub(crate) id: u64,
    pub(crate) kind: ChannelKind,
}

impl TargetChannel {
    pub fn is_text_based(&self) -> bool {
        self.kind.is_text_based()
    }

    pub fn mention(&self) -> String {
        format!("<#{}>", self.id)
    }
}

/// One use of the `/annonce` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub(crate) invoker: Invoker,
    pub(crate) message: String,
    pub(crate) channel: TargetChannel,
    pub(crate) title: Option<String>,
    pub(crate) image_url: Option<String>,
}

/// Builder for Invocation instances, keeping test setup readable.
#[cfg(test)]
#[derive(Debug)]
pub struct InvocationBuilder {
    invoker: Invoker,
    message: String,
    channel: TargetChannel,
    title: Option<String>,
    image_url: Option<String>,
}

#[cfg(test)]
impl InvocationBuilder {
    /// Starts from a member named "Modo#0001" posting "Patrol at 9pm" to a text channel.
    pub fn new() -> Self {
        Self {
            invoker: Invoker {
                id: 42,
                display_name: "Modo#0001".to_string(),
                avatar_url: "https://cdn.discordapp.com/avatars/42/abc.png".to_string(),
                role_names: Vec::new(),
            },
            message: "Patrol at 9pm".to_string(),
            channel: TargetChannel {
                id: 555,
                kind: ChannelKind::Text,
            },
            title: None,
            image_url: None,
        }
    }

    pub fn role(mut self, role_name: impl Into<String>) -> Self {
        self.invoker.role_names.push(role_name.into());
        self
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.invoker.display_name = display_name.into();
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn channel(mut self, id: u64, kind: ChannelKind) -> Self {
        self.channel = TargetChannel { id, kind };
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn build(self) -> Invocation {
        Invocation {
            invoker: self.invoker,
            message: self.message,
            channel: self.channel,
            title: self.title,
            image_url: self.image_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_role_matches_exact_name() {
        let invoker = Invoker {
            role_names: vec!["Member".to_string(), "Staff".to_string()],
            ..Default::default()
        };

        assert!(invoker.has_role("Staff"));
    }

    #[test]
    fn has_role_is_case_sensitive() {
        let invoker = Invoker {
            role_names: vec!["staff".to_string()],
            ..Default::default()
        };

        assert!(!invoker.has_role("Staff"));
    }

    #[test]
    fn has_role_does_not_match_substrings() {
        let invoker = Invoker {
            role_names: vec!["Staff Junior".to_string(), "Sta".to_string()],
            ..Default::default()
        };

        assert!(!invoker.has_role("Staff"));
    }

    #[test]
    fn has_role_without_roles() {
        let invoker = Invoker::default();

        assert!(!invoker.has_role("Staff"));
    }

    #[test]
    fn text_based_channel_kinds() {
        assert!(ChannelKind::Text.is_text_based());
        assert!(ChannelKind::News.is_text_based());
        assert!(ChannelKind::Thread.is_text_based());
        assert!(ChannelKind::Direct.is_text_based());
    }

    #[test]
    fn non_text_channel_kinds() {
        assert!(!ChannelKind::Voice.is_text_based());
        assert!(!ChannelKind::Stage.is_text_based());
        assert!(!ChannelKind::Category.is_text_based());
        assert!(!ChannelKind::Forum.is_text_based());
        assert!(!ChannelKind::Other.is_text_based());
    }

    #[test]
    fn channel_mention_uses_discord_format() {
        let channel = TargetChannel {
            id: 987654321,
            kind: ChannelKind::Text,
        };

        assert_eq!(channel.mention(), "<#987654321>");
    }

    #[test]
    fn rejection_messages_match_private_replies() {
        assert_eq!(
            Rejection::AuthorizationDenied.to_string(),
            "❌ Vous n'avez pas la permission d'utiliser cette commande."
        );
        assert_eq!(
            Rejection::InvalidTarget.to_string(),
            "❌ Veuillez choisir un salon texte valide."
        );
        assert_eq!(
            Rejection::DeliveryFailure(discord::Error::CannotSendMessage(
                "Missing Permissions".to_string()
            ))
            .to_string(),
            "❌ Je n'ai pas pu envoyer le message : Missing Permissions"
        );
    }

    #[test]
    fn failure_reply_names_the_discord_error() {
        // Arrange
        let error = anyhow::Error::from(discord::Error::CannotResolveRoles);

        // Act
        let reply = failure_reply(&error);

        // Assert
        assert_eq!(
            reply.as_deref(),
            Some("❌ Je n'ai pas pu traiter la commande : Cannot resolve roles")
        );
    }

    #[test]
    fn failure_reply_for_missing_server() {
        let error = anyhow::Error::from(discord::Error::NotInServer);

        assert_eq!(
            failure_reply(&error).as_deref(),
            Some("❌ Je n'ai pas pu traiter la commande : Not in a server")
        );
    }

    #[test]
    fn no_failure_reply_when_private_reply_failed() {
        let error = anyhow::Error::from(Error::DiscordError(discord::Error::CannotSendReply));

        assert_eq!(failure_reply(&error), None);
    }
}
