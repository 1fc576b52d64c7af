//! sharepush CLI - runs the content shell headless over stdio.
//!
//! Stdout carries the bridge protocol, so logs go to stderr or to
//! `SHAREPUSH_LOG_FILE`.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sharepush::env::Environment;
use sharepush::host::{spawn_line_reader, HeadlessNotifications, StdioContent};
use sharepush::{
    Config, ContentDescriptor, DeviceInfo, HttpTokenRegistry, PipelineOptions, PushToken,
    SessionIdentity, Shell, TokenPipeline,
};

#[derive(Parser)]
#[command(name = "sharepush")]
#[command(version, about = "Web content shell with push token registration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the shell until stdin closes or Ctrl-C
    Start,
    /// Deliver one token to the registration endpoint and exit
    Deliver {
        /// Push token to register
        #[arg(long)]
        token: String,
        /// Signed-in user id (guest when omitted)
        #[arg(long)]
        user: Option<String>,
    },
    /// Print the content descriptor handed to the web view
    Content,
    /// Print the effective configuration
    Config,
}

fn init_logging() -> Result<()> {
    let target = match std::env::var("SHAREPUSH_LOG_FILE") {
        Ok(path) => {
            let log_file = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create log file at {path}"))?;
            env_logger::Target::Pipe(Box::new(log_file))
        }
        Err(_) => env_logger::Target::Stderr,
    };
    let filter = Environment::current().default_log_filter();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .target(target)
        .format_timestamp_secs()
        .init();
    Ok(())
}

fn build_pipeline(
    config: &Config,
    notifications: Arc<HeadlessNotifications>,
) -> Result<TokenPipeline> {
    let registry = HttpTokenRegistry::new(config.save_token_url.clone())?;
    let device = DeviceInfo::detect(config.device_model.as_deref());
    log::info!("Device: {} / {}", device.os, device.model);

    Ok(TokenPipeline::new(
        Arc::new(registry),
        notifications,
        device,
        PipelineOptions::from_config(config),
    ))
}

async fn run_start(config: Config) -> Result<()> {
    log::info!(
        "Starting sharepush ({}) for {}",
        Environment::current(),
        config.content_url
    );
    let notifications = Arc::new(HeadlessNotifications::from_config(&config));
    let pipeline = build_pipeline(&config, Arc::clone(&notifications))?;

    let content = StdioContent::stdout();
    let inbound = spawn_line_reader(tokio::io::stdin());

    let shell = Shell::new(
        pipeline,
        Arc::new(content),
        notifications,
        config.refresh_interval(),
    );
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };
    shell.run(inbound, shutdown).await;
    Ok(())
}

async fn run_deliver(config: Config, token: String, user: Option<String>) -> Result<()> {
    let notifications = Arc::new(HeadlessNotifications::from_config(&config));
    let pipeline = build_pipeline(&config, notifications)?;
    let session = user.map(SessionIdentity::for_user);

    let outcome = pipeline
        .deliver(&PushToken::new(token), session.as_ref(), 0)
        .await
        .context("Delivery task failed")?;

    println!("{}", serde_json::to_string(&outcome)?);
    if !outcome.is_delivered() {
        anyhow::bail!("Push token was not delivered");
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        Commands::Start => run_start(config).await?,
        Commands::Deliver { token, user } => run_deliver(config, token, user).await?,
        Commands::Content => {
            let descriptor = ContentDescriptor::new(config.content_url);
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        }
        Commands::Config => println!("{}", serde_json::to_string_pretty(&config)?),
    }

    Ok(())
}
