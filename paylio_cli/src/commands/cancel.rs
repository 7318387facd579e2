use anyhow::Result;
use clap::Args;
use paylio_api::{CancelOptions, Client};

use crate::output::{print_cancel, OutputFormat};

#[derive(Args)]
pub struct CancelArgs {
    /// Subscription to cancel
    pub subscription_id: String,

    /// Cancel immediately instead of at the end of the billing period
    #[arg(long)]
    pub now: bool,
}

pub async fn run(args: &CancelArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let opts = CancelOptions {
        cancel_now: args.now,
    };
    let result = client
        .subscription()
        .cancel(&args.subscription_id, Some(opts))
        .await
        .map_err(super::describe)?;

    tracing::info!(
        subscription_id = %result.id,
        at_period_end = result.cancel_at_period_end,
        "subscription cancel requested"
    );
    print_cancel(&result, format);
    Ok(())
}
