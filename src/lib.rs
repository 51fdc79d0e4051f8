pub mod cli;
pub mod config;
pub mod input;
pub mod logging;
pub mod model;
pub mod providers;

use anyhow::{Context, Result};
use reqwest::Client;
use std::ffi::OsString;
use std::io;
use tracing::debug;

use config::{RuntimeSettings, resolve_api_key};
use providers::openai::ChatCompletions;

pub use cli::UsageError;

/// Runs one prompt through the chat completions API and prints the reply.
pub async fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match cli::parse_args(args) {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => return Err(err).context("failed to parse arguments"),
    };
    let cfg = cli.into_config()?;
    let api_key = resolve_api_key(&cfg.api_key_env)?;
    let prompt = input::read_prompt(io::stdin().lock())?;

    input::write_diagnostics(io::stderr().lock(), &cfg, &prompt)?;

    let settings = RuntimeSettings::from_env();
    debug!(
        request_timeout_secs = ?settings.request_timeout_secs,
        "loaded runtime settings"
    );
    let client = Client::builder()
        .build()
        .context("Failed to initialize HTTP client")?;

    let reply = ChatCompletions::new(&client, &settings)
        .execute_query(&cfg.base_url, &cfg.model, api_key.expose(), &prompt)
        .await?;
    println!("{}", reply);
    Ok(())
}
