mod commands;
mod output;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use paylio_api::{Client, DEFAULT_BASE_URL};

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "paylio")]
#[command(about = "Manage subscriptions through the Paylio API")]
struct Cli {
    /// API key (sk_live_... or sk_test_...)
    #[arg(long, env = "PAYLIO_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// API base URL
    #[arg(long, env = "PAYLIO_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    base_url: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30", global = true)]
    timeout: u64,

    /// Output format: table, json or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a user's current subscription
    Retrieve(commands::retrieve::RetrieveArgs),
    /// List a user's subscription history
    List(commands::list::ListArgs),
    /// Cancel a subscription
    Cancel(commands::cancel::CancelArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("paylio=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "markdown" | "md" => OutputFormat::Markdown,
        _ => OutputFormat::Table,
    };

    let client = Client::builder(cli.api_key.as_deref().unwrap_or_default())
        .base_url(&cli.base_url)
        .timeout(Duration::from_secs(cli.timeout))
        .build()
        .map_err(commands::describe)?;

    let result = match &cli.command {
        Commands::Retrieve(args) => commands::retrieve::run(args, &client, &format).await,
        Commands::List(args) => commands::list::run(args, &client, &format).await,
        Commands::Cancel(args) => commands::cancel::run(args, &client, &format).await,
    };
    client.close();
    result
}
