mod annonceur;

use self::annonceur::commands::announcement::{Announcer, AnnouncerImpl};
use self::annonceur::commands::{Outcome, failure_reply};
use self::annonceur::config::Config;
use self::annonceur::connectors::discord::serenity::{
    Context, Data, SerenityCommandRegistry, SerenityDiscordConnector, invocation_from_context,
};
use self::annonceur::registration::{Stage, deploy_commands};
use log::{LevelFilter, debug, error, info, warn};
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Logger, Root};
use poise::serenity_prelude as serenity;

/// Faire une annonce NorthSide Illégal
///
/// Posts an announcement embed into the chosen channel. Reserved to members holding the configured role.
#[poise::command(slash_command, guild_only)]
async fn annonce(
    ctx: Context<'_>,
    #[description = "Le message à annoncer"] message: String,
    #[description = "Le salon où poster l'annonce"] channel: serenity::Channel,
    #[description = "Titre de l'annonce (optionnel)"] title: Option<String>,
    #[description = "URL d'une image à afficher dans l'embed (optionnel)"] image: Option<String>,
) -> anyhow::Result<()> {
    let invocation = invocation_from_context(ctx, message, &channel, title, image).await?;
    let connector = SerenityDiscordConnector::new(ctx);
    let announcer = AnnouncerImpl::new(&ctx.data().config, &connector);
    match announcer.announce(&invocation).await? {
        Outcome::Delivered => debug!("Announcement by {} delivered", ctx.author().tag()),
        Outcome::Rejected(rejection) => debug!(
            "Announcement by {} rejected: {:?}",
            ctx.author().tag(),
            rejection
        ),
    }
    Ok(())
}

/// Keeps every failure reply private to the invoker and logs it.
async fn on_error(error: poise::FrameworkError<'_, Data, anyhow::Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Command '{}' failed: {:#}", ctx.command().name, error);
            let Some(message) = failure_reply(&error) else {
                return;
            };
            send_private_error(ctx, message).await;
        }
        poise::FrameworkError::ArgumentParse { error, ctx, .. } => {
            warn!("Invalid options for '{}': {}", ctx.command().name, error);
            send_private_error(ctx, format!("❌ Option invalide : {}", error)).await;
        }
        other => {
            if let Err(error) = poise::builtins::on_error(other).await {
                error!("Error while handling error: {}", error);
            }
        }
    }
}

async fn send_private_error(ctx: Context<'_>, message: String) {
    let reply = poise::CreateReply::default().content(message).ephemeral(true);
    if let Err(error) = ctx.send(reply).await {
        error!("Cannot send error reply: {}", error);
    }
}

fn init_logging() -> anyhow::Result<()> {
    let stdout = ConsoleAppender::builder().build();
    let config = log4rs::Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .logger(Logger::builder().build("annonceur", LevelFilter::Info))
        .build(Root::builder().appender("stdout").build(LevelFilter::Warn))?;
    log4rs::init_config(config)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    if let Err(error) = dotenvy::dotenv() {
        debug!("No .env file loaded: {}", error);
    }

    let config = match Config::load() {
        Ok(config) => config,
        Err(error) => {
            error!(
                "⚠️ Veuillez vérifier que DISCORD_TOKEN, AUTHORIZED_ROLE et GUILD_ID sont bien définis dans .env ({})",
                error
            );
            std::process::exit(1);
        }
    };
    debug!("Loaded {:?}", config);

    let commands = vec![annonce()];

    let http = serenity::Http::new(config.token());
    if let Some(application_id) = config.application_id() {
        http.set_application_id(serenity::ApplicationId::new(application_id));
    }
    deploy_commands(
        &SerenityCommandRegistry::new(&http, &commands),
        config.guild_id(),
        Stage::Startup,
    )
    .await;

    let token = config.token().to_string();
    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::<Data, anyhow::Error>::builder()
        .options(poise::FrameworkOptions {
            commands,
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Connecté en tant que {} (ID: {})", ready.user.tag(), ready.user.id);
                ctx.http.set_application_id(ready.application.id);
                let registry = SerenityCommandRegistry::new(&ctx.http, &framework.options().commands);
                deploy_commands(&registry, config.guild_id(), Stage::Ready).await;
                Ok(Data::new(config))
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    info!("Starting bot...");
    client.start().await?;
    Ok(())
}
