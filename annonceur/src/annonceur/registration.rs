use crate::annonceur::connectors::discord::CommandRegistry;
use log::{error, info};
use std::fmt::{Display, Formatter};

/// When a registration attempt happens in the bot's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Before the gateway connection, using the configured application id
    Startup,
    /// Once the gateway reports ready and the application identity is known
    Ready,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Startup => write!(f, "startup"),
            Stage::Ready => write!(f, "ready"),
        }
    }
}

/// Makes one attempt at (re-)registering the guild's slash commands.
///
/// A failure is logged and reported as `false`; it never stops the bot.
pub async fn deploy_commands<R: CommandRegistry + Sync>(
    registry: &R,
    guild_id: u64,
    stage: Stage,
) -> bool {
    info!("🔄 Déploiement des commandes slash sur le serveur {guild_id} ({stage})...");
    match registry.register_guild_commands(guild_id).await {
        Ok(count) => {
            info!("✅ {count} commande(s) déployée(s) avec succès ({stage})");
            true
        }
        Err(error) => {
            error!("Command registration failed ({stage}): {error}");
            false
        }
    }
}
