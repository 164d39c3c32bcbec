//! Fault reports carried by `ERROR`-flagged responses.

use serde::{Deserialize, Serialize};

use crate::error::TetherError;
use crate::flags::ProtocolFlags;
use crate::message::Command;
use crate::packet::Packet;

/// Describes why the host could not service a call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteFault {
    pub message: String,
}

impl RemoteFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TetherError> {
        bincode::serialize(self).map_err(|e| TetherError::Encoding(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TetherError> {
        bincode::deserialize(bytes).map_err(|e| TetherError::Encoding(e.to_string()))
    }

    /// Build an `ERROR`-flagged response `Packet`.
    pub fn into_packet(self, request_id: u64, command: Command) -> Result<Packet, TetherError> {
        let payload = self.to_bytes()?;
        Packet::new_response_with_flags(request_id, command, payload, ProtocolFlags::ERROR)
    }
}

impl From<&TetherError> for RemoteFault {
    fn from(e: &TetherError) -> Self {
        Self::new(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_packet_is_flagged() {
        let err = TetherError::Capture("display gone".into());
        let pkt = RemoteFault::from(&err)
            .into_packet(11, Command::ScreenCapture)
            .unwrap();

        assert!(pkt.flags().contains(ProtocolFlags::ERROR));
        let fault = RemoteFault::from_bytes(pkt.payload()).unwrap();
        assert!(fault.message.contains("display gone"));
    }
}
