use std::sync::Arc;

use relaychain_core::{ERROR_DIAL, ERROR_RESOLVE};
use relaychain_resolver::resolve_addr;
use relaychain_transport::dialer::{DialOptions, connect_tcp};
use relaychain_transport::{BoxStream, Network};
use tracing::{debug, error};

use crate::error::ChainError;
use crate::node::Node;

/// The nodes selected for one connection, first hop first.
#[derive(Debug, Clone, Default)]
pub struct Route {
    nodes: Vec<Arc<Node>>,
}

impl Route {
    pub fn new(nodes: Vec<Arc<Node>>) -> Self {
        Self { nodes }
    }

    pub(crate) fn push(&mut self, node: Arc<Node>) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[Arc<Node>] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Open a connection to `addr` through every node of the route.
    ///
    /// An empty route connects directly, TCP only.
    pub async fn dial(&self, network: Network, addr: &str) -> Result<BoxStream, ChainError> {
        let (Some(first), Some(last)) = (self.nodes.first(), self.nodes.last()) else {
            if network != Network::Tcp {
                return Err(ChainError::NoRoute);
            }
            debug!(addr, "empty route, connecting directly");
            let stream = connect_tcp(addr, &DialOptions::default())
                .await
                .map_err(ChainError::Transport)?;
            return Ok(Box::new(stream));
        };

        let mut stream = self.dial_first(first).await?;

        for pair in self.nodes.windows(2) {
            let (prev, node) = (&pair[0], &pair[1]);
            let result = match prev
                .transport()
                .connect(stream, Network::Tcp, node.addr())
                .await
            {
                Ok(s) => node.transport().handshake(s).await,
                Err(e) => Err(e),
            };
            stream = node.record(result)?;
        }

        let stream = last
            .transport()
            .connect(stream, network, addr)
            .await
            .map_err(|source| {
                error!(
                    parent: last.span(),
                    kind = ERROR_DIAL,
                    addr,
                    error = %source,
                    "connect to target failed"
                );
                ChainError::Dial {
                    node: last.name().to_string(),
                    source,
                }
            })?;
        debug!(addr, hops = self.nodes.len(), "route established");
        Ok(stream)
    }

    async fn dial_first(&self, node: &Node) -> Result<BoxStream, ChainError> {
        let addr = resolve_addr(node.addr(), node.hosts(), node.resolver())
            .await
            .map_err(|e| {
                error!(
                    parent: node.span(),
                    kind = ERROR_RESOLVE,
                    error = %e,
                    "resolve node address"
                );
                ChainError::Resolve(e)
            })?;

        let result = match node.transport().dial(&addr).await {
            Ok(s) => node.transport().handshake(s).await,
            Err(e) => Err(e),
        };
        node.record(result)
    }
}
