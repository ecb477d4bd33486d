use crate::paths::{DEFAULT_STATE_DIR, ENV_SKIP_TAGS, ENV_STATE_DIR, ENV_TAGS, ENV_TMPDIR};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tasktree::TagFilter;

#[derive(Parser, Debug)]
#[command(name = "genesis")]
#[command(author = "Genesis Developers")]
#[command(version)]
#[command(about = "Idempotent, reversible machine configuration", long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory for persisted state (change store, history)
    #[arg(long, global = true, env = ENV_STATE_DIR, default_value = DEFAULT_STATE_DIR)]
    pub dir: String,

    /// Parent directory for the temporary working directory
    #[arg(long, global = true, env = ENV_TMPDIR)]
    pub tmpdir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Log level for `env_logger`
    pub fn log_level(&self) -> log::LevelFilter {
        if self.quiet {
            return log::LevelFilter::Error;
        }
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Apply every selected task
    Install(TagArgs),

    /// Undo every selected task, last first
    Remove(TagArgs),

    /// Report the state of every selected task without changing anything
    Status(TagArgs),

    /// Append resource files to the executable, producing `<exe>.x`
    Build(BuildArgs),

    /// Pick, edit and run a previous install/remove command line
    Rerun,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Command {
    /// Whether this command changes or inspects the machine
    pub fn touches_system(&self) -> bool {
        matches!(self, Self::Install(_) | Self::Remove(_) | Self::Status(_))
    }

    /// Tag filter of the command (unfiltered when it takes no tags)
    pub fn filter(&self) -> TagFilter {
        match self {
            Self::Install(args) | Self::Remove(args) | Self::Status(args) => args.filter(),
            _ => TagFilter::default(),
        }
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct TagArgs {
    /// Run only tasks with these tags (comma-separated)
    #[arg(long, env = ENV_TAGS, default_value = "")]
    pub tags: String,

    /// Skip tasks with these tags (comma-separated)
    #[arg(long = "skip-tags", env = ENV_SKIP_TAGS, default_value = "")]
    pub skip_tags: String,
}

impl TagArgs {
    pub fn filter(&self) -> TagFilter {
        TagFilter::from_csv(&self.tags, &self.skip_tags)
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Executable to append resources to (defaults to this program)
    #[arg(short = 'x', long = "exe")]
    pub exe: Option<PathBuf>,

    /// Directories to search for resource files (defaults to `.`)
    pub dirs: Vec<PathBuf>,
}
