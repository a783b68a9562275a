use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::OwoColorize as _;
use serde::{Deserialize, Serialize};
use toml::Value as TomlValue;

/// Short module name, used as the module directory under the shared root.
pub const MODULE_SHORT_NAME: &str = "rke";
pub const CONFIG_FILE_NAME: &str = "rke-config.json";
pub const STATE_FILE_NAME: &str = "state.json";
pub const INVENTORY_DIRECTORY_NAME: &str = "inventory";
pub const INVENTORY_FILE_NAME: &str = "hosts.json";
pub const ENV_DIRECTORY_NAME: &str = "env";
pub const SSH_KEY_FILE_NAME: &str = "ssh_key";
pub const CMDLINE_FILE_NAME: &str = "cmdline";

pub const DEFAULT_SHARED_DIRECTORY_PATH: &str = "/shared";
pub const DEFAULT_RESOURCES_DIRECTORY_PATH: &str = "/resources";

/// Environment variables bound to each option, one per key.
pub const DEBUG_ENV: &str = "DEBUG";
pub const SHARED_ENV: &str = "SHARED";
pub const RESOURCES_ENV: &str = "RESOURCES";
pub const ANSIBLE_DEBUG_LEVEL_ENV: &str = "ANSIBLE_DEBUG_LEVEL";

/// Highest verbosity the provisioning engine accepts (`-vvvvvv`).
pub const MAX_ANSIBLE_DEBUG_LEVEL: u8 = 6;

const APP_NAME: &str = "m-rke";
const GLOBAL_CONFIG_FILE_NAME: &str = "m-rke.toml";

/// Known top-level config keys.
const KNOWN_KEYS: &[&str] = &["debug", "shared", "resources", "ansible_debug_level"];

// Embed repository defaults
const DEFAULT_TOML: &str =
  include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/defaults/m-rke.toml"));

/// Returns the embedded defaults document.
#[must_use]
pub fn defaults_toml() -> &'static str {
  DEFAULT_TOML
}

/// Resolve the global config file path.
///
/// # Errors
/// Returns an error if the XDG config home cannot be resolved.
pub fn global_config_path() -> Result<PathBuf> {
  let xdg = xdg::BaseDirectories::with_prefix(APP_NAME);
  let config_home = xdg
    .get_config_home()
    .ok_or_else(|| anyhow::anyhow!("unable to resolve XDG config home"))?;
  Ok(config_home.join(GLOBAL_CONFIG_FILE_NAME))
}

/// The file layer: embedded defaults merged with the optional global config.
///
/// Every key is optional so that a partial global file only overrides what it names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FileConfig {
  #[serde(default)]
  pub debug: Option<bool>,
  #[serde(default)]
  pub shared: Option<PathBuf>,
  #[serde(default)]
  pub resources: Option<PathBuf>,
  #[serde(default)]
  pub ansible_debug_level: Option<i64>,
}

/// Values supplied on the command line or through the environment bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
  pub debug: Option<bool>,
  pub shared: Option<PathBuf>,
  pub resources: Option<PathBuf>,
  pub ansible_debug_level: Option<i64>,
}

/// A bound environment variable whose value could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEnv {
  pub name: &'static str,
  pub value: String,
}

impl Overrides {
  /// Read the bound variables from the process environment.
  #[must_use]
  pub fn from_env() -> (Self, Vec<RejectedEnv>) {
    Self::from_lookup(|name| std::env::var(name).ok())
  }

  /// Read the bound variables through `lookup`.
  ///
  /// Empty values count as unset. Unparsable values are left unset and
  /// returned so the caller can report them once logging is up.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<RejectedEnv>) {
    let mut rejected = Vec::new();
    let read = |name: &'static str| -> Option<String> {
      let value = lookup(name)?;
      let trimmed = value.trim();
      if trimmed.is_empty() {
        None
      } else {
        Some(trimmed.to_string())
      }
    };

    let debug_raw = read(DEBUG_ENV);
    let shared = read(SHARED_ENV).map(PathBuf::from);
    let resources = read(RESOURCES_ENV).map(PathBuf::from);
    let level_raw = read(ANSIBLE_DEBUG_LEVEL_ENV);

    let debug = debug_raw.and_then(|raw| {
      parse_bool(&raw).or_else(|| {
        rejected.push(RejectedEnv {
          name: DEBUG_ENV,
          value: raw,
        });
        None
      })
    });
    let ansible_debug_level = level_raw.and_then(|raw| {
      raw.parse::<i64>().ok().or_else(|| {
        rejected.push(RejectedEnv {
          name: ANSIBLE_DEBUG_LEVEL_ENV,
          value: raw,
        });
        None
      })
    });

    let overrides = Self {
      debug,
      shared,
      resources,
      ansible_debug_level,
    };
    (overrides, rejected)
  }

  /// Keep every key set in `self`, filling the rest from `lower`.
  #[must_use]
  pub fn or(self, lower: Self) -> Self {
    Self {
      debug: self.debug.or(lower.debug),
      shared: self.shared.or(lower.shared),
      resources: self.resources.or(lower.resources),
      ansible_debug_level: self.ansible_debug_level.or(lower.ansible_debug_level),
    }
  }
}

fn parse_bool(raw: &str) -> Option<bool> {
  match raw.to_ascii_lowercase().as_str() {
    "1" | "t" | "true" | "y" | "yes" | "on" => Some(true),
    "0" | "f" | "false" | "n" | "no" | "off" => Some(false),
    _ => None,
  }
}

/// Effective configuration, immutable once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
  pub debug: bool,
  pub shared: PathBuf,
  pub resources: PathBuf,
  /// Always within `0..=MAX_ANSIBLE_DEBUG_LEVEL`.
  pub ansible_debug_level: u8,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      debug: false,
      shared: PathBuf::from(DEFAULT_SHARED_DIRECTORY_PATH),
      resources: PathBuf::from(DEFAULT_RESOURCES_DIRECTORY_PATH),
      ansible_debug_level: 0,
    }
  }
}

impl Settings {
  #[must_use]
  pub fn paths(&self) -> ModulePaths {
    ModulePaths::new(&self.shared, &self.resources)
  }
}

/// Force the provisioning engine verbosity into `0..=6`.
#[must_use]
pub fn clamp_ansible_debug_level(level: i64) -> u8 {
  let max = MAX_ANSIBLE_DEBUG_LEVEL;
  u8::try_from(level.clamp(0, i64::from(max))).unwrap_or(max)
}

/// Resolve `debug` alone. Needed before the logger exists, so it tolerates a
/// missing file layer.
#[must_use]
pub fn resolve_debug(overrides: &Overrides, file: Option<&FileConfig>) -> bool {
  overrides
    .debug
    .or_else(|| file.and_then(|f| f.debug))
    .unwrap_or(false)
}

/// Merge overrides over the file layer over the compiled-in defaults.
///
/// Precedence per key: flag > environment > file > default.
#[must_use]
pub fn resolve(overrides: &Overrides, file: &FileConfig) -> Settings {
  let defaults = Settings::default();

  let shared = overrides
    .shared
    .clone()
    .or_else(|| file.shared.clone())
    .unwrap_or(defaults.shared);
  let resources = overrides
    .resources
    .clone()
    .or_else(|| file.resources.clone())
    .unwrap_or(defaults.resources);
  let raw_level = overrides
    .ansible_debug_level
    .or(file.ansible_debug_level)
    .unwrap_or(i64::from(defaults.ansible_debug_level));
  log::trace!("original ansible_debug_level: {raw_level}");

  Settings {
    debug: resolve_debug(overrides, Some(file)),
    shared,
    resources,
    ansible_debug_level: clamp_ansible_debug_level(raw_level),
  }
}

fn merge_values(base: &mut TomlValue, overlay: TomlValue) {
  match (base, overlay) {
    (TomlValue::Table(base_tbl), TomlValue::Table(overlay_tbl)) => {
      for (k, v) in overlay_tbl {
        match base_tbl.get_mut(&k) {
          Some(existing) => merge_values(existing, v),
          None => {
            base_tbl.insert(k, v);
          }
        }
      }
    }
    // Scalars: replace last-wins
    (base_slot, new_v) => *base_slot = new_v,
  }
}

/// Warn about unknown top-level keys so typos do not go unnoticed.
fn warn_unknown_keys(val: &TomlValue, file_path: &Path) {
  let TomlValue::Table(table) = val else {
    return;
  };

  for key in table.keys() {
    if !KNOWN_KEYS.contains(&key.as_str()) {
      eprintln!(
        "{}: unknown config key '{}' in {} (known keys: {})",
        "warning".yellow(),
        key,
        file_path.display(),
        KNOWN_KEYS.join(", ")
      );
    }
  }
}

/// Load the file layer from the embedded defaults and the XDG global config.
///
/// Without a resolvable config home there is no global file to merge.
///
/// # Errors
/// Returns an error if the global config exists but cannot be read or parsed.
pub fn load_file_config() -> Result<FileConfig> {
  let global_path = global_config_path().ok().filter(|path| path.exists());
  load_file_config_from(global_path.as_deref())
}

/// Load the file layer, merging `global_path` over the embedded defaults.
///
/// # Errors
/// Returns an error if the file cannot be read, is not valid TOML, or holds a
/// value of the wrong type.
pub fn load_file_config_from(global_path: Option<&Path>) -> Result<FileConfig> {
  let mut merged: TomlValue =
    toml::from_str(DEFAULT_TOML).context("invalid embedded default config")?;

  if let Some(path) = global_path {
    let data =
      fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let val: TomlValue =
      toml::from_str(&data).with_context(|| format!("invalid TOML in {}", path.display()))?;
    warn_unknown_keys(&val, path);
    merge_values(&mut merged, val);
  }

  let merged_str = toml::to_string(&merged).context("failed to serialize merged config")?;
  let cfg: FileConfig = toml::from_str(&merged_str).context("failed to parse merged config")?;
  Ok(cfg)
}

/// Well-known locations anchored under the resolved shared and resources roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePaths {
  shared: PathBuf,
  resources: PathBuf,
}

impl ModulePaths {
  pub fn new(shared: impl Into<PathBuf>, resources: impl Into<PathBuf>) -> Self {
    Self {
      shared: shared.into(),
      resources: resources.into(),
    }
  }

  #[must_use]
  pub fn shared(&self) -> &PathBuf {
    &self.shared
  }

  #[must_use]
  pub fn resources(&self) -> &PathBuf {
    &self.resources
  }

  #[must_use]
  pub fn module_dir(&self) -> PathBuf {
    self.shared.join(MODULE_SHORT_NAME)
  }

  #[must_use]
  pub fn config_file(&self) -> PathBuf {
    self.module_dir().join(CONFIG_FILE_NAME)
  }

  /// The state file is shared between modules, so it lives at the shared root.
  #[must_use]
  pub fn state_file(&self) -> PathBuf {
    self.shared.join(STATE_FILE_NAME)
  }

  #[must_use]
  pub fn inventory_dir(&self) -> PathBuf {
    self.module_dir().join(INVENTORY_DIRECTORY_NAME)
  }

  #[must_use]
  pub fn inventory_file(&self) -> PathBuf {
    self.inventory_dir().join(INVENTORY_FILE_NAME)
  }

  #[must_use]
  pub fn env_dir(&self) -> PathBuf {
    self.resources.join(ENV_DIRECTORY_NAME)
  }

  #[must_use]
  pub fn ssh_key_file(&self) -> PathBuf {
    self.env_dir().join(SSH_KEY_FILE_NAME)
  }

  #[must_use]
  pub fn cmdline_file(&self) -> PathBuf {
    self.env_dir().join(CMDLINE_FILE_NAME)
  }

  /// All locations as `(name, path)` pairs in display order.
  #[must_use]
  pub fn entries(&self) -> Vec<(&'static str, PathBuf)> {
    vec![
      ("shared", self.shared.clone()),
      ("resources", self.resources.clone()),
      ("module", self.module_dir()),
      ("config", self.config_file()),
      ("state", self.state_file()),
      ("inventory", self.inventory_dir()),
      ("hosts", self.inventory_file()),
      ("env", self.env_dir()),
      ("ssh_key", self.ssh_key_file()),
      ("cmdline", self.cmdline_file()),
    ]
  }
}
