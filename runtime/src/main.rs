//! kubsh entry point
//!
//! Loads the config, installs the logger and signal handlers, syncs the VFS
//! mirror and hands stdin to the read-eval loop.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufReader, IsTerminal};
use std::path::PathBuf;

use kubsh::config::ConfigError;
use kubsh::history::History;
use kubsh::signals::{SignalAwareReader, SignalController};
use kubsh::vfs::{AccountProvisioner, NoopProvisioner, SystemProvisioner, VfsUsers};
use kubsh::{logger, Config, Shell};

#[derive(Parser)]
#[command(name = "kubsh")]
#[command(about = "Interactive shell with a boot sector inspector and a VFS user mirror", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory mirroring system accounts
    #[arg(long, value_name = "DIR")]
    vfs_root: Option<PathBuf>,

    /// History file (relative paths resolve against $HOME)
    #[arg(long, value_name = "FILE")]
    history_file: Option<PathBuf>,

    /// Account database to mirror
    #[arg(long, value_name = "FILE")]
    passwd_file: Option<PathBuf>,

    /// Skip the VFS sync at startup and on SIGHUP
    #[arg(long)]
    no_vfs_sync: bool,

    /// Do not run adduser/userdel for VFS user directories
    #[arg(long)]
    no_provision: bool,
}

impl Cli {
    /// Load the config file and apply command-line overrides.
    ///
    /// A config that cannot be read or parsed is replaced by the defaults;
    /// the error is handed back so it can be logged once logging is up.
    fn config(&self) -> (Config, Option<ConfigError>) {
        let (mut config, error) = match self.config.clone().or_else(Config::default_path) {
            Some(path) => match Config::load(&path) {
                Ok(config) => (config, None),
                Err(e) => (Config::default(), Some(e)),
            },
            None => (Config::default(), None),
        };
        if let Some(root) = &self.vfs_root {
            config.vfs_root = root.clone();
        }
        if let Some(file) = &self.history_file {
            config.history_file = file.clone();
        }
        if let Some(file) = &self.passwd_file {
            config.passwd_file = file.clone();
        }
        if self.no_vfs_sync {
            config.sync_vfs_on_start = false;
        }
        if self.no_provision {
            config.provision_accounts = false;
        }
        (config, error)
    }
}

fn open_history(config: &Config) -> History {
    let Some(path) = config.history_path() else {
        log::info!("HOME is unset, history kept in memory");
        return History::in_memory();
    };
    History::open(&path).unwrap_or_else(|e| {
        log::warn!("cannot open history {}: {}", path.display(), e);
        History::in_memory()
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, config_error) = cli.config();

    let level = logger::level_from(
        std::env::var(logger::LOG_ENV).ok().as_deref(),
        &config.log_level,
    );
    logger::init(level).context("installing logger")?;
    if let Some(e) = config_error {
        log::warn!("{}; using defaults", e);
    }

    let signals = SignalController::install().context("installing signal handlers")?;
    let history = open_history(&config);

    let provisioner: Box<dyn AccountProvisioner> = if config.provision_accounts {
        Box::new(SystemProvisioner)
    } else {
        Box::new(NoopProvisioner)
    };
    let vfs = VfsUsers::new(&config.vfs_root, &config.passwd_file, provisioner);
    if config.sync_vfs_on_start {
        if let Err(e) = vfs.sync() {
            log::warn!("VFS sync failed: {}", e);
        }
    }

    let interactive = io::stdin().is_terminal();
    log::debug!("starting, interactive={}", interactive);

    let mut shell = Shell::new(config, history, vfs, signals, io::stdout());
    shell.run(
        BufReader::new(SignalAwareReader::new(io::stdin(), signals)),
        interactive,
    )?;
    Ok(())
}
