//! The orchestrator: parse the command line, collect root nodes, run once
//!
//! ```no_run
//! use genesis::{Installer, modules::Mkdir};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut installer = Installer::new()?;
//!     installer.add_task(Mkdir::new("/tmp/genesis_example"));
//!     let counts = installer.done()?;
//!     std::process::exit(i32::from(counts.fail > 0));
//! }
//! ```

use crate::cli::{Cli, Command};
use crate::facts::Facts;
use crate::ui::ConsoleReporter;
use crate::{history, package, paths};
use anyhow::{Context, Result, bail};
use changestore::Store;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tasktree::{Doer, Module, Node, Reporter, RunContext, StatusCount, TagFilter, Task};
use tempfile::TempDir;

/// Prefix of the per-run working directory
const WORKDIR_PREFIX: &str = "genesis";

/// Holds one parsed invocation and the root nodes it will run
#[derive(Debug)]
pub struct Installer {
    command: Command,
    dir: PathBuf,
    filter: TagFilter,
    store: Store,
    facts: Facts,
    workdir: TempDir,
    roots: Vec<Node>,
}

impl Installer {
    /// Parse the process arguments and set up logging
    ///
    /// Exits with a usage message when the arguments are invalid.
    pub fn new() -> Result<Self> {
        let args: Vec<OsString> = std::env::args_os().collect();
        let cli = Cli::parse_from(&args);
        env_logger::Builder::new()
            .filter_level(cli.log_level())
            .format_timestamp(None)
            .init();
        Self::build(cli, &args, history::prompt)
    }

    /// Set up from explicit arguments (the first one is the program name)
    pub fn from_args<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let cli = Cli::try_parse_from(&args)?;
        Self::build(cli, &args, history::prompt)
    }

    /// `pick` chooses the command line to run for `rerun`, given the
    /// state directory holding the history.
    fn build<F>(cli: Cli, args: &[OsString], pick: F) -> Result<Self>
    where
        F: FnOnce(&Path) -> Result<String>,
    {
        let (cli, line) = if matches!(cli.command, Command::Rerun) {
            let line = pick(&paths::state_dir(&cli.dir)?)?;
            (reparse(args, &line)?, line)
        } else {
            let line = command_line(args);
            (cli, line)
        };
        let dir = paths::state_dir(&cli.dir)?;

        if matches!(cli.command, Command::Install(_) | Command::Remove(_)) {
            if let Err(e) = history::record(&dir, &line) {
                log::warn!("Could not record command history: {e:#}");
            }
        }

        let store = if cli.command.touches_system() {
            Store::open(&dir)?
        } else {
            Store::disabled()
        };

        let workdir = match &cli.tmpdir {
            Some(parent) => {
                let parent = paths::expand_path(parent);
                tempfile::Builder::new()
                    .prefix(WORKDIR_PREFIX)
                    .tempdir_in(&parent)
                    .with_context(|| format!("Cannot create working directory in {}", parent.display()))?
            }
            None => tempfile::Builder::new()
                .prefix(WORKDIR_PREFIX)
                .tempdir()
                .context("Cannot create working directory")?,
        };
        log::debug!("Working directory: {}", workdir.path().display());

        if cli.command.touches_system() {
            let exe = std::env::current_exe().context("Cannot locate own executable")?;
            package::extract(&exe, workdir.path())?;
        }

        Ok(Self {
            filter: cli.command.filter(),
            command: cli.command,
            dir,
            store,
            facts: Facts::gather(),
            workdir,
            roots: Vec::new(),
        })
    }

    /// Change store modules should record into
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn facts(&self) -> &Facts {
        &self.facts
    }

    /// Persisted-state directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Directory the packaged resources are extracted into
    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Path of a packaged resource file
    pub fn resource(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.workdir.path().join(rel)
    }

    /// Append a leaf task wrapping `module`
    pub fn add_task(&mut self, module: impl Module + 'static) -> &mut Self {
        self.add(Task::new(module))
    }

    /// Append a root node
    pub fn add(&mut self, node: impl Into<Node>) -> &mut Self {
        self.roots.push(node.into());
        self
    }

    /// Every file referenced by a root node
    pub fn files(&self) -> Vec<PathBuf> {
        self.roots.iter().flat_map(Doer::files).collect()
    }

    /// Run the parsed command over the root nodes and tear down
    ///
    /// A root node that fails is logged and the remaining ones still run.
    pub fn done(self) -> Result<StatusCount> {
        let mut reporter = ConsoleReporter::new();
        let result = self.dispatch(&mut reporter);
        if self.command.touches_system() {
            reporter.summary();
        }
        if let Err(e) = self.workdir.close() {
            log::warn!("Could not remove working directory: {e}");
        }
        result.map(|()| reporter.counts())
    }

    fn dispatch(&self, reporter: &mut dyn Reporter) -> Result<()> {
        let mut ctx = RunContext::new(self.filter.clone(), reporter);
        match &self.command {
            Command::Install(_) => {
                for root in &self.roots {
                    if let Err(e) = root.apply(&mut ctx) {
                        log::warn!("{}: {e:#}", root.tag());
                    }
                }
            }
            Command::Remove(_) => {
                for root in self.roots.iter().rev() {
                    if let Err(e) = root.undo(&mut ctx) {
                        log::warn!("{}: {e:#}", root.tag());
                    }
                }
            }
            Command::Status(_) => {
                for root in &self.roots {
                    if let Err(e) = root.status(&mut ctx) {
                        log::warn!("{}: {e:#}", root.tag());
                    }
                }
            }
            Command::Build(args) => {
                package::build(&self.files(), self.workdir.path(), &args.dirs, args.exe.as_deref())?;
            }
            Command::Completions { shell } => {
                clap_complete::generate(*shell, &mut Cli::command(), "genesis", &mut std::io::stdout());
            }
            Command::Rerun => bail!("rerun cannot be dispatched"),
        }
        Ok(())
    }
}

/// Arguments after the program name, joined for the history file
fn command_line(args: &[OsString]) -> String {
    args.iter()
        .skip(1)
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a command line picked from the history in place of `rerun`
fn reparse(args: &[OsString], line: &str) -> Result<Cli> {
    let program = args.first().cloned().unwrap_or_else(|| OsString::from("genesis"));
    let argv = std::iter::once(program).chain(line.split_whitespace().map(OsString::from));
    let cli = Cli::try_parse_from(argv).with_context(|| format!("Invalid command line: {line}"))?;
    if matches!(cli.command, Command::Rerun) {
        bail!("Cannot rerun a rerun");
    }
    Ok(cli)
}
