use anyhow::Result;

use crate::config::Settings;
use crate::utils::log::t;

/// Print every well-known location under the resolved roots.
pub fn run(settings: &Settings) -> Result<()> {
  for (name, path) in settings.paths().entries() {
    anstream::println!("{}: {}", t::key(name), t::path(path.display()));
  }
  Ok(())
}
