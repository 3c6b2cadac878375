use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use currmap::{Level, Store, Topics};
use regex::Regex;
use tracing::instrument;

use super::terminal::Colorize;

/// Command arguments for `cmap list`.
#[derive(Debug, Parser)]
#[command(about = "List the hierarchy as an ordinal-numbered tree")]
pub struct List {
    /// Restrict output to a single level.
    #[arg(long, value_enum, value_name = "LEVEL")]
    level: Option<LevelArg>,

    /// Filter by a regex matched against composite IDs (case-insensitive).
    #[arg(long, value_name = "REGEX")]
    filter: Option<String>,

    /// Print bare composite IDs, one per line, for scripting.
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LevelArg {
    Topic,
    Subtopic,
    Concept,
    Question,
}

impl From<LevelArg> for Level {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::Topic => Self::Topic,
            LevelArg::Subtopic => Self::Subtopic,
            LevelArg::Concept => Self::Concept,
            LevelArg::Question => Self::Question,
        }
    }
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let store = Store::open(root)?;

        let filter = self
            .filter
            .as_deref()
            .map(|pattern| {
                Regex::new(&format!("(?i){pattern}"))
                    .with_context(|| format!("invalid filter regex '{pattern}'"))
            })
            .transpose()?;
        let level = self.level.map(Level::from);

        let mut printed = 0usize;
        self.walk(store.topics(), level, filter.as_ref(), &mut printed);

        if printed == 0 && !self.quiet {
            println!("{}", "Nothing to list.".dim());
        }
        Ok(())
    }

    fn walk(
        &self,
        topics: &Topics,
        level: Option<Level>,
        filter: Option<&Regex>,
        printed: &mut usize,
    ) {
        let wants = |candidate: Level| level.is_none_or(|wanted| wanted == candidate);
        let matches = |id: &str| filter.is_none_or(|regex| regex.is_match(id));

        for (t, topic) in topics.topics().iter().enumerate() {
            let topic_id = topic.id().to_string();
            if wants(Level::Topic) && matches(&topic_id) {
                self.line(&format!("{}", t + 1), &topic_id, 0, printed);
            }
            for (s, subtopic) in topic.subtopics().iter().enumerate() {
                let subtopic_id = subtopic.id().to_string();
                if wants(Level::Subtopic) && matches(&subtopic_id) {
                    self.line(&format!("{}.{}", t + 1, s + 1), &subtopic_id, 1, printed);
                }
                for (c, concept) in subtopic.concepts().iter().enumerate() {
                    let concept_id = concept.id().to_string();
                    if wants(Level::Concept) && matches(&concept_id) {
                        self.line(
                            &format!("{}.{}.{}", t + 1, s + 1, c + 1),
                            &concept_id,
                            2,
                            printed,
                        );
                    }
                    for (q, question) in concept.questions().iter().enumerate() {
                        let question_id = question.id().to_string();
                        if wants(Level::Question) && matches(&question_id) {
                            self.line(
                                &format!("{}.{}.{}.{}", t + 1, s + 1, c + 1, q + 1),
                                &question_id,
                                3,
                                printed,
                            );
                        }
                    }
                }
            }
        }
    }

    fn line(&self, ordinal: &str, id: &str, depth: usize, printed: &mut usize) {
        *printed += 1;
        if self.quiet {
            println!("{id}");
        } else {
            let indent = "  ".repeat(depth);
            println!("{indent}{} {id}", ordinal.dim());
        }
    }
}
