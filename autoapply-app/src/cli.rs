use autoapply_config::{ApplyConfigLoader, ConfigError};
use clap::Parser;
use std::path::PathBuf;

/// Sign in to a job board, search, and submit in-page applications up to a cap.
#[derive(Parser, Debug)]
#[command(name = "autoapply", version)]
pub struct Cli {
    /// Config file (defaults to ./autoapply.yaml, then the user config dir)
    #[arg(short, long, env = "AUTOAPPLY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Search keywords
    #[arg(long)]
    pub keywords: Option<String>,

    /// Search location
    #[arg(long)]
    pub location: Option<String>,

    /// Stop after this many successful applications
    #[arg(long)]
    pub max_applications: Option<u32>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// POST the run summary to this URL
    #[arg(long)]
    pub webhook_url: Option<String>,

    /// Log encoding: text or json
    #[arg(long, env = "AUTOAPPLY_LOG_FORMAT", default_value = "text")]
    pub log_format: String,
}

impl Cli {
    /// Config sources in precedence order: file, environment, flags.
    pub fn loader(&self) -> Result<ApplyConfigLoader, ConfigError> {
        let mut loader = match &self.config {
            Some(path) => ApplyConfigLoader::new().with_file(path),
            None => ApplyConfigLoader::new().with_default_files(),
        };
        if let Some(keywords) = &self.keywords {
            loader = loader.with_override("keywords", keywords.as_str())?;
        }
        if let Some(location) = &self.location {
            loader = loader.with_override("location", location.as_str())?;
        }
        if let Some(max) = self.max_applications {
            loader = loader.with_override("max_applications", i64::from(max))?;
        }
        if self.headed {
            loader = loader.with_override("browser.headless", false)?;
        }
        if let Some(url) = &self.webhook_url {
            loader = loader.with_override("webhook_url", url.as_str())?;
        }
        Ok(loader)
    }
}
