use std::path::PathBuf;

use anyhow::Result;
use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand, ValueHint};

mod commands;
pub mod config;
pub mod logging;
mod utils;

use crate::config::{
  ANSIBLE_DEBUG_LEVEL_ENV, DEBUG_ENV, DEFAULT_RESOURCES_DIRECTORY_PATH,
  DEFAULT_SHARED_DIRECTORY_PATH, MAX_ANSIBLE_DEBUG_LEVEL, Overrides, RESOURCES_ENV, SHARED_ENV,
  Settings,
};

/// Version reported by `--version`; release builds inject `M_RKE_VERSION`.
const VERSION: &str = match option_env!("M_RKE_VERSION") {
  Some(version) => version,
  None => env!("CARGO_PKG_VERSION"),
};

/// Module responsible for installation of Kubernetes cluster with RKE.
#[derive(Debug, Parser)]
#[command(name = "m-rke", version = VERSION, about, long_about = None)]
pub struct Cli {
  #[command(flatten)]
  pub global: GlobalArgs,

  #[command(subcommand)]
  command: Option<Commands>,
}

/// Options shared by every subcommand.
///
/// Each option also reads the environment variable named in its help text;
/// an explicit flag wins over it.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
  #[arg(
    short,
    long,
    global = true,
    num_args = 0..=1,
    require_equals = true,
    default_missing_value = "true",
    value_name = "BOOL",
    value_parser = BoolishValueParser::new(),
    help = format!("Print debug information [env: {DEBUG_ENV}]"),
  )]
  pub debug: Option<bool>,

  #[arg(
    long,
    global = true,
    value_name = "DIR",
    value_hint = ValueHint::DirPath,
    help = format!(
      "Shared directory path [env: {SHARED_ENV}] [default: {DEFAULT_SHARED_DIRECTORY_PATH}]"
    ),
  )]
  pub shared: Option<PathBuf>,

  #[arg(
    long,
    global = true,
    value_name = "DIR",
    value_hint = ValueHint::DirPath,
    help = format!(
      "Resources directory path [env: {RESOURCES_ENV}] [default: {DEFAULT_RESOURCES_DIRECTORY_PATH}]"
    ),
  )]
  pub resources: Option<PathBuf>,

  #[arg(
    short,
    long = "ansible_debug_level",
    global = true,
    value_name = "LEVEL",
    allow_negative_numbers = true,
    help = format!(
      "Set ansible debug level 0-{MAX_ANSIBLE_DEBUG_LEVEL} [env: {ANSIBLE_DEBUG_LEVEL_ENV}]"
    ),
  )]
  pub ansible_debug_level: Option<i64>,
}

impl GlobalArgs {
  /// Values given explicitly on the command line.
  #[must_use]
  pub fn overrides(&self) -> Overrides {
    Overrides {
      debug: self.debug,
      shared: self.shared.clone(),
      resources: self.resources.clone(),
      ansible_debug_level: self.ansible_debug_level,
    }
  }
}

#[derive(Debug, Subcommand)]
enum Commands {
  /// Print the effective configuration as TOML
  Config,
  /// Print the embedded default configuration
  Defaults,
  /// Print the well-known file locations under the resolved directories
  Paths,
}

pub fn parse() -> Cli {
  Cli::parse()
}

/// Resolve the effective settings for this invocation.
///
/// The logger is installed from the resolved `debug` value before the
/// remaining options are read, so resolution diagnostics honour it.
///
/// # Errors
/// Returns an error if the configuration file layer cannot be loaded.
pub fn bootstrap(args: &GlobalArgs) -> Result<Settings> {
  let (env, rejected) = Overrides::from_env();
  let overrides = args.overrides().or(env);
  let file = config::load_file_config();

  let debug = config::resolve_debug(&overrides, file.as_ref().ok());
  logging::init(logging::level_for(debug));
  log::debug!("bootstrap: logging level selected (debug={debug})");
  for item in &rejected {
    log::warn!("ignoring {}={:?}: not a valid value", item.name, item.value);
  }

  let file = file?;
  let settings = config::resolve(&overrides, &file);
  log::debug!(
    "bootstrap: ready (shared={}, resources={})",
    settings.shared.display(),
    settings.resources.display()
  );
  Ok(settings)
}

fn fatal(err: &anyhow::Error) -> ! {
  log::error!("initialization error occurred: {err:#}");
  std::process::exit(1);
}

pub fn run() -> Result<()> {
  let cli = parse();
  let settings = bootstrap(&cli.global).unwrap_or_else(|err| fatal(&err));

  match cli.command {
    Some(Commands::Config) => commands::config::run(&settings)?,
    Some(Commands::Defaults) => commands::defaults::run()?,
    Some(Commands::Paths) => commands::paths::run(&settings)?,
    None => {}
  }

  Ok(())
}
