//! CLI subcommand implementations.

pub mod cancel;
pub mod list;
pub mod retrieve;

use paylio_api::Error;

/// Turns a client error into a report that names the API error kind, status
/// and code when there is one.
pub fn describe(err: Error) -> anyhow::Error {
    let Some(api) = err.as_api() else {
        return err.into();
    };
    let mut context = format!("{}", api.kind());
    if api.http_status() != 0 {
        context.push_str(&format!(" (HTTP {})", api.http_status()));
    }
    if let Some(code) = api.code() {
        context.push_str(&format!(" [{}]", code));
    }
    anyhow::Error::new(err).context(context)
}
