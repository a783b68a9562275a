#![allow(dead_code)]
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use assert_cmd::Command;
use tempfile::{Builder, TempDir};

/// Environment variables bound to the persistent flags.
pub const BOUND_VARS: [&str; 4] = ["DEBUG", "SHARED", "RESOURCES", "ANSIBLE_DEBUG_LEVEL"];

/// Isolated environment for invoking the `m-rke` binary.
///
/// Each instance owns a private `XDG_CONFIG_HOME` and strips the bound
/// variables so the host environment cannot leak into resolution.
#[derive(Debug)]
pub struct TestEnv {
  xdg_home: TempDir,
}

impl TestEnv {
  pub fn new() -> Self {
    let xdg_home = Builder::new()
      .prefix("m-rke-test-")
      .tempdir_in(tmp_root())
      .expect("temp dir");
    Self { xdg_home }
  }

  pub fn xdg_home_dir(&self) -> &Path {
    self.xdg_home.path()
  }

  /// Write `$XDG_CONFIG_HOME/m-rke/m-rke.toml`.
  pub fn write_global_config(&self, contents: &str) -> Result<PathBuf> {
    let dir = self.xdg_home_dir().join("m-rke");
    std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let path = dir.join("m-rke.toml");
    std::fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
  }

  pub fn bin_cmd(&self) -> Result<Command> {
    let mut cmd = Command::cargo_bin("m-rke")?;
    cmd.env("XDG_CONFIG_HOME", self.xdg_home_dir());
    for name in BOUND_VARS {
      cmd.env_remove(name);
    }
    Ok(cmd)
  }
}

/// Returns a workspace-local temp root under `./target/test-tmp`.
pub fn tmp_root() -> PathBuf {
  let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
  // Walk two parents up: crates/m-rke -> crates -> workspace root
  let workspace_root = manifest_dir
    .parent()
    .and_then(|p| p.parent())
    .unwrap_or(&manifest_dir)
    .to_path_buf();
  let root = workspace_root.join("target").join("test-tmp");
  let _ = std::fs::create_dir_all(&root);
  root
}
