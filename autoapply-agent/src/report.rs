//! Summary output: pretty JSON on stdout, optionally POSTed to a webhook.
use autoapply_common::ApplyError;
use autoapply_common::model::RunSummary;
use autoapply_http::{Delivery, HttpClient, RequestOpts};
use std::io::{self, Write};
use tracing::{info, warn};

pub fn write_summary<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    let json = summary.to_pretty_json().map_err(io::Error::other)?;
    writeln!(out, "{json}")
}

pub fn print_summary(summary: &RunSummary) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    write_summary(&mut lock, summary)
}

/// One POST, no retries.
pub async fn send_webhook(
    client: &HttpClient,
    url: &str,
    summary: &RunSummary,
) -> Result<Delivery, ApplyError> {
    client
        .post_json(url, summary, RequestOpts::default())
        .await
        .map_err(|e| ApplyError::Webhook(e.to_string()))
}

/// Print the summary and deliver it if a webhook is configured. Delivery
/// problems are logged and never fail the run.
pub async fn report(summary: &RunSummary, webhook_url: Option<&str>) {
    if let Err(err) = print_summary(summary) {
        warn!(target: "apply.report", error = %err, "failed to write summary to stdout");
    }

    let Some(url) = webhook_url else {
        return;
    };
    let client = match HttpClient::new() {
        Ok(client) => client,
        Err(err) => {
            warn!(target: "apply.report", error = %err, "could not build webhook client");
            return;
        }
    };
    match send_webhook(&client, url, summary).await {
        Ok(delivery) => info!(
            target: "apply.report",
            status = delivery.status.as_u16(),
            request_id = %delivery.request_id,
            "webhook delivered"
        ),
        Err(err) => warn!(target: "apply.report", error = %err, "webhook delivery failed"),
    }
}
