use clap::Parser;
use std::ffi::OsString;
use std::fmt;

use crate::config::Config;

pub const USAGE: &str = "Usage: chatpipe --base-url URL --model MODEL --api-key ENV_VAR";

#[derive(Debug, Clone, Parser, PartialEq, Eq)]
#[command(name = "chatpipe")]
#[command(about = "Send a prompt read from stdin to an OpenAI-compatible chat completions API")]
#[command(version)]
pub struct Cli {
    /// Base URL for the API (e.g. https://api.openai.com/v1)
    #[arg(long, value_name = "URL", default_value = "", hide_default_value = true)]
    pub base_url: String,

    /// Model name
    #[arg(long, value_name = "MODEL", default_value = "", hide_default_value = true)]
    pub model: String,

    /// Name of the environment variable containing the API key
    #[arg(long, value_name = "ENV_VAR", default_value = "", hide_default_value = true)]
    pub api_key: String,
}

/// Raised when one or more required flags are missing or empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageError;

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(USAGE)
    }
}

impl std::error::Error for UsageError {}

/// Parses flags only; missing flags come back as empty strings.
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)
}

impl Cli {
    pub fn into_config(self) -> Result<Config, UsageError> {
        if self.base_url.is_empty() || self.model.is_empty() || self.api_key.is_empty() {
            return Err(UsageError);
        }

        Ok(Config {
            base_url: self.base_url,
            model: self.model,
            api_key_env: self.api_key,
        })
    }
}
