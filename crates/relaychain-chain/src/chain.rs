use relaychain_bypass::Bypass;
use relaychain_config::Metadata;
use relaychain_selector::SelectContext;
use relaychain_transport::Network;
use tracing::trace;

use crate::group::NodeGroup;
use crate::route::Route;

/// A built chain: an ordered list of hops.
///
/// Immutable once built; selection state lives inside each hop's selector
/// and each node's failure marker.
#[derive(Debug)]
pub struct Chain {
    name: String,
    metadata: Metadata,
    groups: Vec<NodeGroup>,
}

impl Chain {
    pub fn new(name: impl Into<String>, metadata: Metadata, groups: Vec<NodeGroup>) -> Self {
        Self {
            name: name.into(),
            metadata,
            groups,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Hops in configuration order.
    pub fn groups(&self) -> &[NodeGroup] {
        &self.groups
    }

    /// Select one node per hop for a connection to `addr`.
    ///
    /// Routing stops at the first hop whose bypass contains `addr`, or that
    /// has no eligible node; the nodes picked so far form the route.
    pub fn route(&self, ctx: &SelectContext, network: Network, addr: &str) -> Route {
        let mut route = Route::default();
        for group in &self.groups {
            if group.bypass().contains(addr) {
                trace!(chain = %self.name, hop = group.name(), addr, "hop bypassed");
                break;
            }
            let Some(node) = group.select(ctx, addr) else {
                trace!(chain = %self.name, hop = group.name(), addr, "no eligible node");
                break;
            };
            route.push(node);
        }
        trace!(
            chain = %self.name,
            %network,
            addr,
            hops = route.len(),
            "route selected"
        );
        route
    }
}
