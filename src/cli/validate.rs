use std::path::PathBuf;

use clap::Parser;
use currmap::Store;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Validate curriculum health")]
pub struct Validate {
    /// Types of checks to run (can be specified multiple times)
    #[arg(long, value_name = "TYPE")]
    check: Vec<CheckType>,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum, PartialEq, Eq)]
enum CheckType {
    /// Check for dependency edges that reference missing nodes
    Links,
    /// Check for cycles in the prerequisite relation
    Cycles,
    /// Run all checks
    All,
}

impl Validate {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let store = Store::open(root)?;
        let topics = store.topics();

        let wants = |check: CheckType| {
            self.check.is_empty()
                || self.check.contains(&check)
                || self.check.contains(&CheckType::All)
        };

        let mut issues = 0usize;

        if wants(CheckType::Links) {
            let dangling = topics.dangling_links();
            issues += dangling.len();
            if !dangling.is_empty() && !self.quiet {
                println!(
                    "{}",
                    format!("⚠️  {} dangling link(s):", dangling.len()).warning()
                );
                for link in &dangling {
                    let direction = if link.prerequisite {
                        "prerequisite"
                    } else {
                        "postrequisite"
                    };
                    println!("  • {} {direction} \u{2192} {}", link.node, link.target);
                }
                println!();
            }
        }

        if wants(CheckType::Cycles) {
            let cycles = topics.prerequisite_cycles();
            issues += cycles.len();
            if !cycles.is_empty() && !self.quiet {
                println!(
                    "{}",
                    format!("⚠️  {} prerequisite cycle(s):", cycles.len()).warning()
                );
                for cycle in &cycles {
                    let members: Vec<String> = cycle.iter().map(ToString::to_string).collect();
                    println!("  • {}", members.join(" \u{2192} "));
                }
                println!();
            }
        }

        if issues == 0 {
            if !self.quiet {
                println!("{}", "✅ No issues detected.".success());
            }
            Ok(())
        } else {
            if !self.quiet {
                println!("{issues} issue(s) found");
            }
            // Non-zero exit for CI, distinct from hard failures.
            std::process::exit(2);
        }
    }
}
