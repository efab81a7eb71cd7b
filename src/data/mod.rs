mod fetch;
mod generate;
mod snapshot;

pub use fetch::{FetchConfig, fetch_snapshot, spawn_fetch};
pub use generate::generate_snapshot;
pub use snapshot::{ConceptEdge, ConceptNode, GraphSnapshot};
