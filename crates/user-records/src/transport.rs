//! Transport seam for sealed envelopes.

use async_trait::async_trait;
use envelope_crypto::Envelope;

use crate::error::UserError;

/// Carries a sealed envelope to a downstream service and returns its sealed
/// reply.
#[async_trait]
pub trait EnvelopeTransport: Send + Sync {
    async fn exchange(&self, envelope: Envelope) -> Result<Envelope, UserError>;
}

/// Echoes every envelope back unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoopbackTransport;

#[async_trait]
impl EnvelopeTransport for LoopbackTransport {
    async fn exchange(&self, envelope: Envelope) -> Result<Envelope, UserError> {
        tracing::debug!(
            key_len = envelope.key.len(),
            data_len = envelope.data.len(),
            "loopback exchange"
        );
        Ok(envelope)
    }
}
