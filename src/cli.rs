use std::path::{Path, PathBuf};

mod export;
mod list;
mod show;
mod status;
mod terminal;
mod validate;

use clap::ArgAction;
use currmap::{
    domain::{Difficulty, NameString, NodeId, QuestionSpec, TopicOutline},
    Config, Store,
};
use export::{Export, Import};
use list::List;
use show::Show;
use status::Status;
use terminal::Colorize;
use tracing::instrument;
use validate::Validate;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The path to the root of the curriculum directory
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show curriculum counts and link health (default)
    Status(Status),

    /// Initialize a new curriculum directory
    Init,

    /// Add a topic, subtopic, concept, question, or generated outline
    Add(Add),

    /// Record prerequisite links for a node
    ///
    /// Each prerequisite is attached at the level where the two ID paths
    /// first diverge, with the mirrored postrequisite recorded on the
    /// other side.
    Link(Link),

    /// Show detailed information about a node
    Show(Show),

    /// List the hierarchy as an ordinal-numbered tree
    List(List),

    /// Validate curriculum health
    Validate(Validate),

    /// Export the curriculum as flattened rows
    Export(Export),

    /// Import flattened rows into the curriculum
    Import(Import),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(root)?,
            Self::Init => Init::run(&root)?,
            Self::Add(command) => command.run(root)?,
            Self::Link(command) => command.run(root)?,
            Self::Show(command) => command.run(root)?,
            Self::List(command) => command.run(root)?,
            Self::Validate(command) => command.run(root)?,
            Self::Export(command) => command.run(root)?,
            Self::Import(command) => command.run(root)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument]
    fn run(root: &Path) -> anyhow::Result<()> {
        use std::fs;

        let config_path = root.join("config.toml");
        if config_path.exists() {
            anyhow::bail!("Directory already initialized (found existing config.toml)");
        }

        fs::create_dir_all(root)
            .map_err(|e| anyhow::anyhow!("Failed to create curriculum directory: {e}"))?;

        let config = Config::default();
        config
            .save(&config_path)
            .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

        // Write an empty snapshot so the directory is immediately loadable.
        let store = Store::open(root.to_path_buf())?;
        store.flush()?;

        println!("Initialized curriculum directory in {}", root.display());
        println!("  Created: config.toml");
        println!("  Created: {}", config.snapshot_file());
        println!();
        println!("Next steps:");
        println!("  cmap add topic Algebra");

        Ok(())
    }
}

/// Difficulty rating accepted on the command line.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(arg: DifficultyArg) -> Self {
        match arg {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Medium => Self::Medium,
            DifficultyArg::Hard => Self::Hard,
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct Add {
    #[command(subcommand)]
    what: AddCommand,
}

#[derive(Debug, clap::Parser)]
enum AddCommand {
    /// Add a topic
    Topic {
        /// The topic name
        name: NameString,
    },

    /// Add a subtopic, creating its topic if needed
    Subtopic {
        /// The name of the containing topic
        topic: NameString,

        /// The subtopic name
        name: NameString,
    },

    /// Add a concept, creating its topic and subtopic if needed
    Concept {
        /// The name of the containing topic
        topic: NameString,

        /// The name of the containing subtopic
        subtopic: NameString,

        /// The concept name
        name: NameString,
    },

    /// Add a question, creating its whole ancestor chain if needed
    Question {
        /// The name of the containing topic
        topic: NameString,

        /// The name of the containing subtopic
        subtopic: NameString,

        /// The name of the containing concept
        concept: NameString,

        /// The problem statement
        #[clap(long, short)]
        problem: String,

        /// The worked solution
        #[clap(long, short)]
        solution: String,

        /// Difficulty rating
        #[clap(long, value_enum, default_value = "easy")]
        difficulty: DifficultyArg,
    },

    /// Fold a generated topic outline (JSON) into the curriculum
    Outline {
        /// Path to the outline file
        path: PathBuf,
    },
}

impl Add {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = Store::open(root)?;
        let topics = store.topics_mut();

        let added = match self.what {
            AddCommand::Topic { name } => topics.add_topic(name).to_string(),
            AddCommand::Subtopic { topic, name } => topics.add_subtopic(topic, name).to_string(),
            AddCommand::Concept {
                topic,
                subtopic,
                name,
            } => topics.add_concept(topic, subtopic, name).to_string(),
            AddCommand::Question {
                topic,
                subtopic,
                concept,
                problem,
                solution,
                difficulty,
            } => {
                let id = topics
                    .add_question(QuestionSpec {
                        topic,
                        subtopic,
                        concept,
                        problem,
                        solution,
                        difficulty: difficulty.into(),
                        subquestions: Vec::new(),
                    })
                    .ok_or_else(|| anyhow::anyhow!("Concept is full; question not added"))?;
                id.to_string()
            }
            AddCommand::Outline { path } => {
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("Failed to read outline: {e}"))?;
                let outline: TopicOutline = serde_json::from_str(&content)
                    .map_err(|e| anyhow::anyhow!("Failed to parse outline: {e}"))?;
                topics.add_outline(&outline).to_string()
            }
        };

        store.flush()?;

        println!("Added {added}");
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Link {
    /// The composite ID of the dependent node
    id: NodeId,

    /// The composite IDs of its prerequisites
    #[arg(required = true, num_args = 1..)]
    prerequisites: Vec<NodeId>,
}

impl Link {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = Store::open(root)?;

        let outcomes = store
            .topics_mut()
            .add_prerequisites(&self.id, &self.prerequisites);
        store.flush()?;

        let mut linked = 0usize;
        for outcome in &outcomes {
            use currmap::domain::LinkOutcome;
            match outcome {
                LinkOutcome::Linked {
                    already_linked: false,
                    ..
                } => {
                    linked += 1;
                    println!("{outcome}");
                }
                LinkOutcome::Linked { .. } => println!("{}", outcome.to_string().dim()),
                _ => println!("{}", outcome.to_string().warning()),
            }
        }
        println!(
            "{}",
            format!("Recorded {linked} of {} links", outcomes.len()).success()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn add_concept(root: &Path, topic: &str, subtopic: &str, concept: &str) {
        let add = Add {
            what: AddCommand::Concept {
                topic: topic.parse().unwrap(),
                subtopic: subtopic.parse().unwrap(),
                name: concept.parse().unwrap(),
            },
        };
        add.run(root.to_path_buf()).expect("add should succeed");
    }

    #[test]
    fn init_creates_config_and_snapshot() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        Init::run(&root).expect("init should succeed");

        assert!(root.join("config.toml").exists());
        assert!(root.join("topics.json").exists());

        // A second init must refuse to clobber the directory.
        assert!(Init::run(&root).is_err());
    }

    #[test]
    fn add_question_persists_through_flush() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        let add = Add {
            what: AddCommand::Question {
                topic: "Algebra".parse().unwrap(),
                subtopic: "LinearEquations".parse().unwrap(),
                concept: "SolveForX".parse().unwrap(),
                problem: "Solve 2x=4".to_string(),
                solution: "x=2".to_string(),
                difficulty: DifficultyArg::Easy,
            },
        };
        add.run(root.clone()).expect("add should succeed");

        let store = Store::open(root).unwrap();
        let question = store
            .topics()
            .resolve("Algebra_LinearEquations_SolveForX_1")
            .expect("question should have been persisted");
        assert_eq!(question.as_question().unwrap().problem(), "Solve 2x=4");
    }

    #[test]
    fn link_records_mirrored_edges() {
        let tmp = tempdir().unwrap();
        let root = tmp.path();

        add_concept(root, "Algebra", "LinearEquations", "SolveForX");
        add_concept(root, "Algebra", "LinearEquations", "Substitution");

        let link = Link {
            id: "Algebra_LinearEquations_Substitution".parse().unwrap(),
            prerequisites: vec!["Algebra_LinearEquations_SolveForX".parse().unwrap()],
        };
        link.run(root.to_path_buf()).expect("link should succeed");

        let store = Store::open(root.to_path_buf()).unwrap();
        let node = store
            .topics()
            .resolve("Algebra_LinearEquations_Substitution")
            .unwrap();
        let prerequisites: Vec<String> = node
            .links()
            .prerequisites()
            .map(ToString::to_string)
            .collect();
        assert_eq!(prerequisites, vec!["Algebra_LinearEquations_SolveForX"]);

        let mirror = store
            .topics()
            .resolve("Algebra_LinearEquations_SolveForX")
            .unwrap();
        assert_eq!(mirror.links().postrequisites().count(), 1);
    }

    #[test]
    fn outline_intake_builds_the_hierarchy() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        let outline_path = tmp.path().join("outline.json");
        std::fs::write(
            &outline_path,
            r#"{"name": "Algebra", "subtopics": [{"name": "Graphing", "concepts": ["PlotLines"]}]}"#,
        )
        .unwrap();

        let add = Add {
            what: AddCommand::Outline { path: outline_path },
        };
        add.run(root.clone()).expect("outline add should succeed");

        let store = Store::open(root).unwrap();
        assert!(store.topics().resolve("Algebra_Graphing_PlotLines").is_some());
    }
}
