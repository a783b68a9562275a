/// Token styling helpers.
///
/// The `t` module stands for "tokens". Use these helpers to highlight
/// values inside command output consistently across the CLI.
pub mod t {
  use std::fmt::Display;

  use owo_colors::OwoColorize as _;

  pub fn key(value: impl Display) -> String {
    format!("{}", value.to_string().bold())
  }

  pub fn path(p: impl Display) -> String {
    format!("{}", p.to_string().cyan())
  }
}

#[cfg(test)]
mod tests {
  use super::t;

  #[test]
  fn tokens_keep_their_text() {
    assert!(t::key("state").contains("state"));
    assert!(t::path("/shared/state.json").contains("/shared/state.json"));
  }

  #[test]
  fn tokens_are_styled() {
    assert!(t::path("/shared").contains("\u{1b}["));
  }
}
