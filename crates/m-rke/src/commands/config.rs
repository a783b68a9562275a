use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::config::Settings;

/// Print the effective configuration as TOML.
pub fn run(settings: &Settings) -> Result<()> {
  let rendered = toml::to_string(settings).context("failed to render effective config")?;
  let mut stdout = io::stdout().lock();
  write!(stdout, "{rendered}")?;
  Ok(())
}
