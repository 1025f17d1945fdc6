mod handlers;

use clap::{Parser, Subcommand};
use sdkwa_client::{Client, SendMessageParams};
use sdkwa_core::config::{self, ClientConfig};
use sdkwa_core::error::SdkwaError;
use sdkwa_core::messenger::{MessengerType, RequestOptions};
use sdkwa_notifications::{webhook, CallbackRegistry, NotificationPoller, PushChannel};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "sdkwa",
    version,
    about = "Client for the SDKWA WhatsApp/Telegram gateway"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Gateway base URL.
    #[arg(long, env = "SDKWA_API_HOST")]
    api_host: Option<String>,

    #[arg(long, env = "SDKWA_ID_INSTANCE")]
    id_instance: Option<String>,

    #[arg(long, env = "SDKWA_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Account id for instance management.
    #[arg(long, env = "SDKWA_USER_ID")]
    user_id: Option<String>,

    #[arg(long, env = "SDKWA_USER_TOKEN", hide_env_values = true)]
    user_token: Option<String>,

    /// Messenger to talk to (whatsapp or telegram).
    #[arg(long)]
    messenger: Option<MessengerType>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the instance state.
    State,
    /// Send a text message.
    Send {
        /// Target chat, e.g. 79001234567@c.us.
        chat_id: String,
        /// Message text.
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },
    /// Drain the notification queue and log every notification.
    Poll,
    /// Log notifications pushed over the WebSocket stream.
    Listen,
    /// Serve the webhook receiver and log every notification.
    Webhook,
}

impl Cli {
    /// Flags and environment take precedence over the config file.
    fn apply_overrides(&self, client: &mut ClientConfig) {
        if let Some(ref host) = self.api_host {
            client.api_host = host.clone();
        }
        if let Some(ref id) = self.id_instance {
            client.id_instance = id.clone();
        }
        if let Some(ref token) = self.api_token {
            client.api_token_instance = token.clone();
        }
        if self.user_id.is_some() {
            client.user_id = self.user_id.clone();
        }
        if self.user_token.is_some() {
            client.user_token = self.user_token.clone();
        }
        if let Some(messenger) = self.messenger {
            client.messenger_type = messenger;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut cfg = config::load(&cli.config)?;
    cli.apply_overrides(&mut cfg.client);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.sdkwa.log_level)),
        )
        .init();

    match cli.command {
        Commands::State => {
            let client = Client::new(&cfg.client)?;
            let state = client.get_state_instance(RequestOptions::default()).await?;
            println!("{}", state.state_instance);
        }
        Commands::Send { chat_id, text } => {
            let client = Client::new(&cfg.client)?;
            let params = SendMessageParams::new(chat_id, text.join(" "));
            let sent = client.send_message(&params, RequestOptions::default()).await?;
            println!("{}", sent.id_message);
        }
        Commands::Poll => {
            let client = Client::new(&cfg.client)?;
            let registry = logging_registry();
            let poller = NotificationPoller::from_config(client, &cfg.notifications);
            ignore_cancelled(poller.run(&shutdown_token(), &registry).await)?;
        }
        Commands::Listen => {
            let client = Client::new(&cfg.client)?;
            let registry = logging_registry();
            let cancel = shutdown_token();
            let channel = PushChannel::from_config(&client, &cfg.notifications)?;
            ignore_cancelled(channel.connect(&cancel).await)?;
            ignore_cancelled(channel.listen(&cancel, &registry).await)?;
        }
        Commands::Webhook => {
            let registry = Arc::new(logging_registry());
            webhook::serve(&cfg.webhook, registry, &shutdown_token()).await?;
        }
    }

    Ok(())
}

fn logging_registry() -> CallbackRegistry {
    let registry = CallbackRegistry::new();
    handlers::register_logging(&registry);
    registry
}

/// Token cancelled on Ctrl-C.
fn shutdown_token() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutting down");
        }
        token.cancel();
    });
    cancel
}

/// Ctrl-C is a normal way to stop.
fn ignore_cancelled(result: Result<(), SdkwaError>) -> Result<(), SdkwaError> {
    match result {
        Err(e) if e.is_cancelled() => Ok(()),
        other => other,
    }
}
