use anyhow::Result;
use clap::Args;
use paylio_api::Client;

use crate::output::{print_subscription, OutputFormat};

#[derive(Args)]
pub struct RetrieveArgs {
    /// User whose subscription to show
    pub user_id: String,
}

pub async fn run(args: &RetrieveArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let sub = client
        .subscription()
        .retrieve(&args.user_id)
        .await
        .map_err(super::describe)?;

    print_subscription(&sub, format);
    Ok(())
}
