use anyhow::{Context, Result, bail};
use std::io::{Read, Write};

use crate::config::Config;

pub fn read_prompt(mut reader: impl Read) -> Result<String> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .context("failed to read stdin")?;

    let prompt = content.trim();
    if prompt.is_empty() {
        bail!("no input provided on stdin");
    }
    Ok(prompt.to_string())
}

/// Echoes the resolved invocation. The credential itself is never written.
pub fn write_diagnostics(mut writer: impl Write, cfg: &Config, prompt: &str) -> Result<()> {
    writeln!(writer, "base_url: {}", cfg.base_url)?;
    writeln!(writer, "model:    {}", cfg.model)?;
    writeln!(writer, "api_key:  ******** (from {})", cfg.api_key_env)?;
    writeln!(writer, "prompt:   {}", prompt)?;
    writer.flush().context("Failed to flush diagnostics")
}
