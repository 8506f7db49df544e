//! Interactive Shell Module
//!
//! Provides the read-eval loop: read a line, record it in history, classify
//! it and run the matching builtin or external program. Signal flags are
//! checked between lines, never in the middle of a command.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::config::Config;
use crate::history::History;
use crate::shell::commands::{self, CommandContext, Intercept, ShellCommands};
use crate::shell::executor::{self, SpawnError};
use crate::shell::{classify, resolve, Line};
use crate::signals::SignalController;
use crate::vfs::VfsUsers;

/// What the loop does after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// Leave the loop.
    Shutdown,
}

/// The shell session: owns history, the VFS mirror and the output stream.
pub struct Shell<W: Write> {
    config: Config,
    history: History,
    vfs: VfsUsers,
    signals: SignalController,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(
        config: Config,
        history: History,
        vfs: VfsUsers,
        signals: SignalController,
        out: W,
    ) -> Self {
        log::debug!(
            "builtins: {:?}",
            ShellCommands::list_commands()
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
        );
        Self {
            config,
            history,
            vfs,
            signals,
            out,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Consume the shell and return its output stream.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Run until `\q`, end of input, or a shutdown signal.
    ///
    /// The prompt is written only when `interactive` is set. Errors writing
    /// command output are logged and the loop goes on; only a failing input
    /// stream or prompt write ends it with an error.
    pub fn run<R: BufRead>(&mut self, mut input: R, interactive: bool) -> io::Result<()> {
        let mut raw = Vec::new();

        while self.signals.running() {
            if self.signals.take_reload() {
                self.reload();
            }

            if interactive {
                write!(self.out, "{}", self.config.prompt)?;
            }
            self.out.flush()?;

            raw.clear();
            match input.read_until(b'\n', &mut raw) {
                Ok(0) => break,
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }

            if !self.signals.running() {
                break;
            }

            // Input is not required to be UTF-8; invalid bytes become U+FFFD.
            let line = String::from_utf8_lossy(&raw);
            let text = line.strip_suffix('\n').unwrap_or(&line);
            let text = text.strip_suffix('\r').unwrap_or(text);

            match self.execute_line(text) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Shutdown) => break,
                Err(e) => log::warn!("writing output for {:?}: {}", text, e),
            }
        }

        log::debug!("read-eval loop finished");
        self.out.flush()
    }

    /// Classify and run a single line.
    ///
    /// Every non-empty line is recorded in history before it runs, whether
    /// or not it succeeds.
    pub fn execute_line(&mut self, line: &str) -> io::Result<Flow> {
        let command = classify(line);
        if command == Line::Empty {
            return Ok(Flow::Continue);
        }
        self.history.record(line);

        match command {
            Line::Empty => {}
            Line::History => commands::core::history(&mut self.out, self.history.entries())?,
            Line::Quit => return Ok(Flow::Shutdown),
            Line::Disk(device) => commands::disk::inspect(&mut self.out, device)?,
            Line::Debug(text) | Line::Echo(text) => commands::core::print(&mut self.out, text)?,
            Line::EnvList(name) => {
                let value = std::env::var_os(name);
                commands::env::list_var(&mut self.out, name, value.as_deref())?
            }
            Line::Argv(argv) => self.run_words(&argv)?,
        }
        Ok(Flow::Continue)
    }

    fn run_words(&mut self, argv: &[&str]) -> io::Result<()> {
        let Some(name) = argv.first() else {
            return Ok(());
        };

        if let Some(builtin) = ShellCommands::get_command(name) {
            let mut ctx = CommandContext {
                vfs: &self.vfs,
                out: &mut self.out,
            };
            if builtin(argv, &mut ctx)? == Intercept::Handled {
                return Ok(());
            }
        }

        self.run_external(name, argv)
    }

    fn run_external(&mut self, name: &str, argv: &[&str]) -> io::Result<()> {
        let search_path = std::env::var("PATH").ok();
        let Some(path) = resolve(name, search_path.as_deref(), Path::exists) else {
            return writeln!(self.out, "{}: command not found", name);
        };

        // Child output goes straight to the inherited stdout.
        self.out.flush()?;

        match executor::run(&path, argv) {
            Ok(outcome) => {
                log::debug!("{}: {:?}", name, outcome);
                Ok(())
            }
            Err(e) => self.report_spawn_error(name, &e),
        }
    }

    fn report_spawn_error(&mut self, name: &str, e: &SpawnError) -> io::Result<()> {
        match e {
            SpawnError::ImageLoadFailed { .. } => {
                log::warn!("{} (reported as {:?})", e, e.exit_outcome());
                Ok(())
            }
            SpawnError::ProcessCreationFailed { .. } => {
                log::warn!("{}", e);
                writeln!(self.out, "{}: failed to create process", name)
            }
        }
    }

    fn reload(&mut self) {
        log::info!("reload requested");
        if !self.config.sync_vfs_on_start {
            return;
        }
        if let Err(e) = self.vfs.sync() {
            log::warn!("VFS resync failed: {}", e);
        }
    }
}
