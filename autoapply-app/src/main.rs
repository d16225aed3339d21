use anyhow::{Context, Result};
use autoapply_agent::report::report;
use autoapply_agent::run::run_session;
use autoapply_agent::session::FantocciniSession;
use autoapply_common::observability::{LogConfig, LogFormat, init_logging};
use clap::Parser;
use cli::Cli;
use std::process::ExitCode;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;
mod cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging = init_logging(LogConfig {
        format: LogFormat::from_name(&cli.log_format),
        ..LogConfig::default()
    });
    match logging {
        Ok(path) => info!(target: "app", log_file = %path.display(), "logging initialised"),
        Err(err) => eprintln!("file logging disabled: {err:#}"),
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(target: "app", error = %format!("{err:#}"), "run failed");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    // 1) Config: file < env < flags
    let cfg = cli
        .loader()?
        .load()
        .context("failed to load configuration")?;

    // 2) Credentials before any browser is started
    let credentials = cfg.credentials()?;

    let run_id = Uuid::new_v4();
    async move {
        let mut session = FantocciniSession::connect(&cfg.browser, &cfg.pacing)
            .await
            .context("failed to start browser session")?;

        let outcome = run_session(&mut session, &cfg, &credentials).await;
        if let Err(err) = session.shutdown().await {
            warn!(target: "app", error = %format!("{err:#}"), "browser shutdown failed");
        }
        let summary = outcome?;

        report(&summary, cfg.webhook_url.as_deref()).await;
        Ok(())
    }
    .instrument(info_span!("run", %run_id))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use autoapply_common::ApplyError;

    #[test]
    fn missing_credentials_stop_before_the_browser() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoapply.yaml");
        // Nothing listens on the discard port, so reaching connect would fail differently.
        std::fs::write(&path, "browser:\n  webdriver_url: \"http://127.0.0.1:9\"\n").unwrap();
        let cli = Cli::parse_from(["autoapply", "--config", path.to_str().unwrap()]);

        let err = temp_env::with_vars_unset(["AUTOAPPLY_EMAIL", "AUTOAPPLY_PASSWORD"], || {
            tokio::runtime::Runtime::new().unwrap().block_on(run(cli))
        })
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ApplyError>(),
            Some(ApplyError::MissingCredential("email"))
        ));
    }
}
