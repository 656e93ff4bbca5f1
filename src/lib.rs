//! Canopy core: positions the nodes of a branching conversation tree.
//!
//! The tree grows one prompt at a time. Every node gets a position the first
//! time it is seen and keeps it; new branches push neighbouring branches
//! aside instead of re-solving the whole drawing.

mod error;
pub mod layout;
pub mod model;
pub mod output;
pub mod session;
mod wasm;

pub use error::{LayoutError, Result};
pub use layout::{LayoutConfig, PlacementReport, PositionStore};
pub use model::{ChatNode, NodeId, PointI, TreeSnapshot};
pub use output::{GraphOutput, RenderGraph};
pub use session::LayoutSession;
pub use wasm::TreeLayoutEngine;
