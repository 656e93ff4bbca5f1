mod context;
mod graph;
mod types;

pub use context::{branch_context, ContextMessage};
pub use graph::TreeGraph;
pub use types::*;
