//! WASM bindings for the canopy-core library.
//!
//! All functions exposed to JavaScript via wasm-bindgen are defined here.
//! Every call answers with the JSON of the freshly laid out graph, or an
//! inline error object.

use wasm_bindgen::prelude::*;

use crate::error::{LayoutError, Result};
use crate::layout::{LayoutConfig, PlacementReport};
use crate::model::{ChatNode, NodeId, PointI, TreeSnapshot};
use crate::output::GraphOutput;
use crate::session::LayoutSession;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn console_error(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = warn)]
    pub fn console_warn(s: &str);
}

/// Layout engine owned by the chat view. One per conversation.
#[wasm_bindgen]
pub struct TreeLayoutEngine {
    session: LayoutSession,
}

#[wasm_bindgen]
impl TreeLayoutEngine {
    /// `config_json` may be empty or name any subset of `LayoutConfig` fields.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> TreeLayoutEngine {
        let config = if config_json.trim().is_empty() {
            LayoutConfig::default()
        } else {
            match serde_json::from_str(config_json) {
                Ok(config) => config,
                Err(e) => {
                    console_error(&format!("Invalid layout config, using defaults: {}", e));
                    LayoutConfig::default()
                }
            }
        };
        TreeLayoutEngine { session: LayoutSession::new(config) }
    }

    /// Replace the whole tree with a backend snapshot.
    pub fn sync(&mut self, snapshot_json: &str) -> String {
        let result = serde_json::from_str::<TreeSnapshot>(snapshot_json)
            .map_err(LayoutError::from)
            .and_then(|snapshot| self.session.sync_snapshot(snapshot));
        self.respond(result)
    }

    /// Add one node (e.g. the placeholder for a prompt awaiting its response).
    pub fn add_node(&mut self, node_json: &str) -> String {
        let result = serde_json::from_str::<ChatNode>(node_json)
            .map_err(LayoutError::from)
            .and_then(|node| self.session.add_node(node));
        self.respond(result)
    }

    /// Swap a temporary node id for the one assigned by the backend.
    pub fn rekey(&mut self, old_id: &str, new_id: &str) -> String {
        let result = self.session.rekey(&NodeId::from(old_id), NodeId::from(new_id));
        self.respond(result)
    }

    pub fn delete_node(&mut self, node_id: &str) -> String {
        self.session.delete_node(&NodeId::from(node_id));
        self.respond(Ok(()))
    }

    pub fn set_active(&mut self, node_id: Option<String>) -> String {
        let result = self.session.set_active(node_id.map(NodeId::from));
        self.respond(result)
    }

    /// Drag end. `x`/`y` is the top-left corner the node was dropped at.
    pub fn move_node(&mut self, node_id: &str, x: i32, y: i32) -> String {
        let result = self.session.move_node(&NodeId::from(node_id), PointI { x, y });
        self.respond(result)
    }

    pub fn layout(&mut self) -> String {
        self.respond(Ok(()))
    }

    /// Messages from the root down to `node_id`, as a JSON array.
    pub fn branch_context(&self, node_id: &str) -> String {
        match self.session.branch_context(&NodeId::from(node_id)) {
            Ok(messages) => serde_json::to_string(&messages).unwrap_or_else(|_| "[]".to_string()),
            Err(e) => {
                console_error(&format!("Error building branch context: {}", e));
                "[]".to_string()
            }
        }
    }
}

impl TreeLayoutEngine {
    fn respond(&mut self, result: Result<()>) -> String {
        let output = GraphOutput::from_result(result.and_then(|()| self.session.layout()));
        if let Some(error) = &output.error {
            console_error(&format!("Error laying out tree: {}", error.message));
        } else if let Some(message) = degraded_warning(self.session.last_report()) {
            console_warn(&message);
        }
        output.to_json()
    }
}

/// Console message for nodes the last pass had to lock while overlapping.
fn degraded_warning(report: &PlacementReport) -> Option<String> {
    if report.degraded.is_empty() {
        return None;
    }
    let ids: Vec<&str> = report.degraded.iter().map(NodeId::as_str).collect();
    Some(format!("Collision pass ceiling reached, overlapping nodes: {}", ids.join(", ")))
}
