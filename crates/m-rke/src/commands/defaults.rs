use std::io::{self, Write};

use anyhow::Result;

use crate::config::defaults_toml;

pub fn run() -> Result<()> {
  let mut stdout = io::stdout().lock();
  write!(stdout, "{}", defaults_toml())?;
  Ok(())
}
