use anyhow::Result;
use clap::Args;
use paylio_api::{Client, ListOptions};

use crate::output::{print_history, OutputFormat};

#[derive(Args)]
pub struct ListArgs {
    /// User whose subscription history to list
    pub user_id: String,

    /// Page number
    #[arg(long, default_value = "1")]
    pub page: i64,

    /// Results per page
    #[arg(long, default_value = "20")]
    pub page_size: i64,
}

pub async fn run(args: &ListArgs, client: &Client, format: &OutputFormat) -> Result<()> {
    let opts = ListOptions {
        page: args.page,
        page_size: args.page_size,
    };
    let resp = client
        .subscription()
        .list(&args.user_id, Some(opts))
        .await
        .map_err(super::describe)?;

    eprintln!(
        "Page {}/{} ({} total subscriptions)",
        resp.page, resp.total_pages, resp.total
    );
    print_history(&resp.items, format);
    if resp.has_more() {
        eprintln!("More results: --page {}", resp.page + 1);
    }

    Ok(())
}
