use std::path::PathBuf;

use clap::Parser;
use currmap::{
    storage::{apply_rows, to_rows, Row},
    Store,
};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum RowFormat {
    #[default]
    Json,
    Ndjson,
}

#[derive(Debug, Parser)]
#[command(about = "Export the curriculum as flattened rows")]
pub struct Export {
    /// Output format (json, ndjson)
    #[arg(long, value_name = "FORMAT", default_value = "json")]
    format: RowFormat,
}

impl Export {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let store = Store::open(root)?;
        let rows = to_rows(store.topics());

        match self.format {
            RowFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
            RowFormat::Ndjson => {
                for row in &rows {
                    println!("{}", serde_json::to_string(row)?);
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Parser)]
#[command(about = "Import flattened rows into the curriculum")]
pub struct Import {
    /// Path to the row file
    path: PathBuf,

    /// Input format (json, ndjson)
    #[arg(long, value_name = "FORMAT", default_value = "json")]
    format: RowFormat,
}

impl Import {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| anyhow::anyhow!("Failed to read rows: {e}"))?;

        let rows: Vec<Row> = match self.format {
            RowFormat::Json => serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse rows: {e}"))?,
            RowFormat::Ndjson => content
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(serde_json::from_str)
                .collect::<Result<_, _>>()
                .map_err(|e| anyhow::anyhow!("Failed to parse rows: {e}"))?,
        };

        let count = rows.len();
        let mut store = Store::open(root)?;
        apply_rows(store.topics_mut(), rows);
        store.flush()?;

        println!("{}", format!("✅ Imported {count} row(s)").success());
        Ok(())
    }
}
