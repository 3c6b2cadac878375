/// Flattened row export/import.
pub mod rows;
/// The JSON snapshot format.
pub mod snapshot;
mod store;

pub use rows::{apply_rows, from_rows, to_rows, Row};
pub use store::{FlushError, OpenError, Store};
