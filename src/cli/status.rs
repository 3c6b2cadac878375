use std::path::PathBuf;

use clap::Parser;
use currmap::Store;
use tracing::instrument;

use super::terminal::{is_narrow, Colorize};

#[derive(Debug, Parser, Default)]
#[command(about = "Show node counts and link health")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Status {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let store = Store::open(root)?;
        let topics = store.topics();

        let topic_count = topics.topics().len();
        let subtopic_count = topics.subtopics().count();
        let concept_count = topics.concepts().count();
        let question_count = topics.questions().count();
        let edge_count: usize = topics
            .nodes()
            .map(|node| node.links().prerequisites().count())
            .sum();
        let dangling = topics.dangling_links().len();
        let cycles = topics.prerequisite_cycles().len();

        match self.output {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "topics": topic_count,
                    "subtopics": subtopic_count,
                    "concepts": concept_count,
                    "questions": question_count,
                    "prerequisite_links": edge_count,
                    "dangling_links": dangling,
                    "cycles": cycles,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Table => {
                if self.quiet {
                    println!(
                        "{topic_count} {subtopic_count} {concept_count} {question_count} \
                         {edge_count}"
                    );
                } else {
                    let label_width = if is_narrow() { 10 } else { 20 };
                    println!("{:<label_width$} {topic_count}", "Topics");
                    println!("{:<label_width$} {subtopic_count}", "Subtopics");
                    println!("{:<label_width$} {concept_count}", "Concepts");
                    println!("{:<label_width$} {question_count}", "Questions");
                    println!("{:<label_width$} {edge_count}", "Links");
                    println!();
                    if dangling == 0 && cycles == 0 {
                        println!("{}", "✅ All links are healthy.".success());
                    } else {
                        if dangling > 0 {
                            println!(
                                "{}",
                                format!("⚠️  {dangling} dangling link(s)").warning()
                            );
                        }
                        if cycles > 0 {
                            println!(
                                "{}",
                                format!("⚠️  {cycles} prerequisite cycle(s)").warning()
                            );
                        }
                        println!("{}", "Run 'cmap validate' for details".dim());
                    }
                }
            }
        }

        Ok(())
    }
}
