mod common;

use anyhow::Result;
use predicates::prelude::*;

use crate::common::TestEnv;

#[test]
fn help_lists_persistent_flags() -> Result<()> {
  let env = TestEnv::new();
  env.bin_cmd()?.arg("--help").assert().success().stdout(
    predicate::str::contains("Usage")
      .and(predicate::str::contains("-d, --debug"))
      .and(predicate::str::contains("--shared <DIR>"))
      .and(predicate::str::contains("--resources <DIR>"))
      .and(predicate::str::contains("-a, --ansible_debug_level <LEVEL>"))
      .and(predicate::str::contains("-V, --version"))
      .from_utf8(),
  );
  Ok(())
}

#[test]
fn subcommand_help_inherits_persistent_flags() -> Result<()> {
  let env = TestEnv::new();
  env
    .bin_cmd()?
    .args(["paths", "--help"])
    .assert()
    .success()
    .stdout(
      predicate::str::contains("--shared")
        .and(predicate::str::contains("--ansible_debug_level"))
        .from_utf8(),
    );
  Ok(())
}

#[test]
fn version_reports_binary_name() -> Result<()> {
  let env = TestEnv::new();
  env
    .bin_cmd()?
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::starts_with("m-rke ").from_utf8());
  Ok(())
}

#[test]
fn non_numeric_level_is_a_usage_error() -> Result<()> {
  let env = TestEnv::new();
  env
    .bin_cmd()?
    .args(["-a", "loud", "config"])
    .assert()
    .code(2)
    .stderr(predicate::str::contains("ansible_debug_level").from_utf8());
  Ok(())
}
