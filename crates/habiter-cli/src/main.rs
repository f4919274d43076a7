//! # habiter
//!
//! Small front end over the client library:
//! - `created-at`: decode the creation time packed into an id (offline)
//! - `dm`: message a user known only by id

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use habiter_client::{ConnectionState, CreateMessage, Messageable, Object, ObjectKind, RestClient, Snowflake};

#[derive(Parser)]
#[command(name = "habiter", version, about = "Habiter client utilities")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print when an id was created, plus its other snowflake fields.
    CreatedAt {
        id: String,
    },
    /// Send a direct message to a user.
    Dm {
        /// Recipient user id.
        #[arg(long)]
        user: String,
        /// Bot token. Overrides `http.token` from configuration.
        #[arg(long, env = "HABITER_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Message content.
        message: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "habiter_cli=info,habiter_client=info".into()),
        )
        .with_target(true)
        .init();

    match Cli::parse().command {
        Command::CreatedAt { id } => {
            let id: Snowflake = id.parse()?;
            println!("id:         {id}");
            println!("created_at: {}", id.created_at().to_rfc3339());
            println!("worker:     {}", id.worker_id());
            println!("process:    {}", id.process_id());
            println!("increment:  {}", id.increment());
        }
        Command::Dm { user, token, message } => {
            let mut config = habiter_common::config::load().context("loading configuration")?;
            if let Some(token) = token {
                config.http.token = token;
            }
            anyhow::ensure!(!config.http.token.is_empty(), "no bot token configured (HABITER__HTTP__TOKEN or --token)");

            let rest = RestClient::from_config(&config.http)?;
            let state = Arc::new(ConnectionState::new(Arc::new(rest), config.cache.max_private_channels));

            let recipient = Object::bound(user, &state, ObjectKind::USER)?;
            tracing::info!(%recipient, "sending direct message");
            let sent = recipient.send(&CreateMessage::new().content(message)).await?;
            println!("sent message {} to channel {}", sent.id, sent.channel_id);
        }
    }

    Ok(())
}
