//! Console output: status lines, section frames and the run summary

use colored::Colorize;
use tasktree::{Outcome, Reporter, StatusCount};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

fn label(outcome: Outcome) -> String {
    let text = outcome.label();
    match outcome {
        Outcome::Pass => text.green().to_string(),
        Outcome::Done => text.green().bold().to_string(),
        Outcome::Fail => text.red().to_string(),
        Outcome::Unknown => text.yellow().to_string(),
    }
}

/// Reporter that renders each event to stdout as it happens
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    counts: StatusCount,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print the accumulated counters
    pub fn summary(&self) {
        let c = self.counts;
        println!();
        println!(
            "    {} {}   {} {}   {} {}   {} {}",
            "Pass:".green(),
            c.pass,
            "Done:".green().bold(),
            c.done,
            "Unknown:".yellow(),
            c.unknown,
            "Fail:".red(),
            c.fail,
        );
        println!();
    }
}

impl Reporter for ConsoleReporter {
    fn task_header(&mut self, tag: &str, description: &str) {
        println!();
        println!("    {} {}", tag.cyan(), description);
    }

    fn section_header(&mut self, tag: &str, name: &str) {
        println!();
        println!("    ======== {} {} ========", tag.cyan(), name.bold());
    }

    fn section_footer(&mut self, tag: &str, name: &str) {
        println!();
        println!("    -------- {} {} --------", tag.cyan(), name);
    }

    fn outcome(&mut self, outcome: Outcome, message: &str, error: Option<&anyhow::Error>) {
        self.counts.record(outcome);
        println!("    {} {}", label(outcome), message);
        if let Some(error) = error {
            for cause in error.chain().map(ToString::to_string) {
                if cause != message {
                    println!("        {}", cause.dimmed());
                }
            }
        }
    }

    fn counts(&self) -> StatusCount {
        self.counts
    }
}
