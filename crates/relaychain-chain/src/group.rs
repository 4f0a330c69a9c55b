use std::sync::Arc;

use relaychain_bypass::{Bypass, BypassGroup};
use relaychain_selector::{SelectContext, Selector};

use crate::node::Node;

/// One hop of a chain: candidate nodes, the selector choosing among them
/// and the hop-level bypass.
#[derive(Debug)]
pub struct NodeGroup {
    name: String,
    nodes: Vec<Arc<Node>>,
    selector: Arc<Selector>,
    bypass: BypassGroup,
}

impl NodeGroup {
    pub fn new(
        name: impl Into<String>,
        nodes: Vec<Arc<Node>>,
        selector: Arc<Selector>,
        bypass: BypassGroup,
    ) -> Self {
        Self {
            name: name.into(),
            nodes,
            selector,
            bypass,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nodes in configuration order.
    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    pub fn selector(&self) -> &Arc<Selector> {
        &self.selector
    }

    pub fn bypass(&self) -> &BypassGroup {
        &self.bypass
    }

    /// Pick a node for `addr`, skipping nodes whose own bypass contains it.
    pub fn select(&self, ctx: &SelectContext, addr: &str) -> Option<Arc<Node>> {
        let candidates: Vec<Arc<Node>> = self
            .nodes
            .iter()
            .filter(|node| !node.bypass().contains(addr))
            .cloned()
            .collect();
        self.selector.select(&candidates, ctx)
    }
}
