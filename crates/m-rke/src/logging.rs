use std::io::Write as _;

use log::LevelFilter;

/// Verbosity tier for the resolved `debug` option.
#[must_use]
pub fn level_for(debug: bool) -> LevelFilter {
  if debug {
    LevelFilter::Trace
  } else {
    LevelFilter::Warn
  }
}

/// Install the console logger and apply `level` as the global maximum.
///
/// Lines look like `<timestamp> <LEVEL> <file>:<line> <message>` and go to stdout.
/// The backend accepts everything and the `log` max level does the gating, so
/// calling this again only moves the level.
pub fn init(level: LevelFilter) {
  let _ = env_logger::Builder::new()
    .filter_level(LevelFilter::Trace)
    .target(env_logger::Target::Stdout)
    .format(|buf, record| {
      let style = buf.default_level_style(record.level());
      writeln!(
        buf,
        "{} {style}{:<5}{style:#} {}:{} {}",
        buf.timestamp_seconds(),
        record.level(),
        record.file().unwrap_or("<unknown>"),
        record.line().unwrap_or(0),
        record.args()
      )
    })
    .try_init();
  log::set_max_level(level);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn debug_selects_most_verbose_tier() {
    assert_eq!(level_for(true), LevelFilter::Trace);
    assert_eq!(level_for(true), LevelFilter::max());
  }

  #[test]
  fn quiet_selects_warn_tier() {
    assert_eq!(level_for(false), LevelFilter::Warn);
  }

  #[test]
  fn init_applies_level_and_can_be_repeated() {
    init(LevelFilter::Trace);
    assert_eq!(log::max_level(), LevelFilter::Trace);
    init(LevelFilter::Warn);
    assert_eq!(log::max_level(), LevelFilter::Warn);
  }
}
