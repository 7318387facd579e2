use paylio_api::types::{Subscription, SubscriptionCancel, SubscriptionHistoryItem};
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Markdown,
}

#[derive(Tabled)]
struct SubscriptionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Plan")]
    plan: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Period End")]
    period_end: String,
    #[tabled(rename = "Cancels")]
    cancels: String,
    #[tabled(rename = "Provider")]
    provider: String,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Plan")]
    plan: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Period Start")]
    period_start: String,
    #[tabled(rename = "Period End")]
    period_end: String,
}

#[derive(Tabled)]
struct CancelRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Success")]
    success: bool,
    #[tabled(rename = "At Period End")]
    at_period_end: bool,
}

// -- Row builders --

fn build_subscription_rows(sub: &Subscription) -> Vec<SubscriptionRow> {
    let cancels = match (&sub.canceled_at, sub.cancel_at_period_end) {
        (Some(at), _) => format!("canceled {}", at),
        (None, true) => "at period end".to_string(),
        (None, false) => "-".to_string(),
    };
    vec![SubscriptionRow {
        id: sub.id.clone(),
        status: sub.status.clone(),
        plan: sub.plan.name.clone(),
        price: format_price(sub.plan.amount, &sub.plan.currency, &sub.plan.interval),
        period_end: sub.subscription_period.end.clone(),
        cancels,
        provider: sub.provider.clone(),
    }]
}

fn build_history_rows(items: &[SubscriptionHistoryItem]) -> Vec<HistoryRow> {
    items
        .iter()
        .map(|i| HistoryRow {
            id: i.id.clone(),
            plan: i.plan_name.clone(),
            price: format_price(i.plan_amount, &i.plan_currency, &i.plan_interval),
            status: i.status.clone(),
            period_start: i.current_period_start.clone(),
            period_end: i.current_period_end.clone(),
        })
        .collect()
}

fn build_cancel_rows(cancel: &SubscriptionCancel) -> Vec<CancelRow> {
    vec![CancelRow {
        id: cancel.id.clone(),
        success: cancel.success,
        at_period_end: cancel.cancel_at_period_end,
    }]
}

// -- Rendering --

fn render<R: Tabled>(rows: Vec<R>, format: &OutputFormat) -> String {
    let mut table = Table::new(rows);
    if let OutputFormat::Markdown = format {
        table.with(Style::markdown());
    }
    table.to_string()
}

pub fn print_subscription(sub: &Subscription, format: &OutputFormat) {
    match format {
        OutputFormat::Json => print_json(sub),
        _ => println!("{}", render(build_subscription_rows(sub), format)),
    }
}

pub fn print_history(items: &[SubscriptionHistoryItem], format: &OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&items),
        _ => println!("{}", render(build_history_rows(items), format)),
    }
}

pub fn print_cancel(cancel: &SubscriptionCancel, format: &OutputFormat) {
    match format {
        OutputFormat::Json => print_json(cancel),
        _ => println!("{}", render(build_cancel_rows(cancel), format)),
    }
}

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}

fn format_price(amount: f64, currency: &str, interval: &str) -> String {
    let mut price = format!("{} {}", amount, currency.to_uppercase());
    if !interval.is_empty() {
        price.push('/');
        price.push_str(interval);
    }
    price
}
