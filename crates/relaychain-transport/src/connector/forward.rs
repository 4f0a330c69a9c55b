use async_trait::async_trait;
use relaychain_config::Metadata;
use tracing::trace;

use super::{Connector, ConnectorOptions};
use crate::error::TransportError;
use crate::{BoxStream, Network};

/// Pass-through connector: the dialed stream already is the connection.
#[derive(Debug)]
pub struct ForwardConnector {
    span: tracing::Span,
}

impl ForwardConnector {
    pub fn new(opts: ConnectorOptions) -> Self {
        Self { span: opts.span }
    }
}

#[async_trait]
impl Connector for ForwardConnector {
    fn init(&mut self, _md: &Metadata) -> Result<(), TransportError> {
        Ok(())
    }

    async fn connect(
        &self,
        stream: BoxStream,
        network: Network,
        addr: &str,
    ) -> Result<BoxStream, TransportError> {
        trace!(parent: &self.span, %network, addr, "forward");
        Ok(stream)
    }
}
