use std::path::PathBuf;

use clap::Parser;
use currmap::{domain::NodeRef, Address, Store};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Show detailed information about a node")]
pub struct Show {
    /// The node to show: a composite ID like
    /// `Algebra_LinearEquations_SolveForX_1`, or a dotted ordinal address
    /// like `1.1.1.1`
    address: Address,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let store = Store::open(root)?;

        let Some(node) = store.topics().get(&self.address) else {
            anyhow::bail!("Node {} not found", self.address);
        };

        println!("{} {}", node.id(), format!("({})", node.level()).dim());

        match node {
            NodeRef::Topic(topic) => {
                println!("  Subtopics: {}", topic.subtopics().len());
            }
            NodeRef::Subtopic(subtopic) => {
                println!("  Concepts: {}", subtopic.concepts().len());
            }
            NodeRef::Concept(concept) => {
                println!("  Questions: {}", concept.questions().len());
            }
            NodeRef::Question(question) => {
                println!("  Difficulty: {:?}", question.difficulty());
                println!();
                println!("  Problem:  {}", question.problem());
                println!("  Solution: {}", question.solution());
                for (index, subquestion) in question.subquestions().iter().enumerate() {
                    println!();
                    println!("  Subquestion {}:", index + 1);
                    println!("    Problem:  {}", subquestion.problem);
                    println!("    Solution: {}", subquestion.solution);
                }
            }
        }

        let links = node.links();
        if !links.is_empty() {
            println!();
        }
        let prerequisites: Vec<String> = links.prerequisites().map(ToString::to_string).collect();
        if !prerequisites.is_empty() {
            println!("  Prerequisites:");
            for id in prerequisites {
                println!("    \u{2190} {id}");
            }
        }
        let postrequisites: Vec<String> = links.postrequisites().map(ToString::to_string).collect();
        if !postrequisites.is_empty() {
            println!("  Postrequisites:");
            for id in postrequisites {
                println!("    \u{2192} {id}");
            }
        }

        Ok(())
    }
}
