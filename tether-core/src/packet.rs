use std::fmt::Debug;

use crate::error::TetherError;
use crate::flags::ProtocolFlags;
use crate::header::{HEADER_LENGTH, PacketHeader};
use crate::message::{Command, MessageType};

/// Largest payload a single packet may carry (256 MiB).
///
/// Whole files travel in one packet, so this bounds the largest
/// transferable file.
pub const MAX_PAYLOAD_SIZE: usize = 256 * 1024 * 1024;

#[derive(Clone)]
pub struct Packet {
    header: PacketHeader,
    payload: Vec<u8>,
}

/// First four bytes of the payload's BLAKE3 digest; 0 for an empty payload.
pub fn payload_checksum(payload: &[u8]) -> u32 {
    if payload.is_empty() {
        return 0;
    }
    let hash = blake3::hash(payload);
    let bytes = hash.as_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

impl Packet {
    /// Keep-alive packet. Request id 0 is reserved for it.
    pub fn heartbeat() -> Self {
        Self {
            header: PacketHeader::new(
                0,
                MessageType::Command as u32,
                ProtocolFlags::empty().bits(),
                Command::Heartbeat as u64,
                0,
                0,
            ),
            payload: Vec::new(),
        }
    }

    pub fn new_command(
        request_id: u64,
        command: Command,
        payload: Vec<u8>,
    ) -> Result<Self, TetherError> {
        Self::build(
            MessageType::Command,
            request_id,
            command,
            payload,
            ProtocolFlags::empty(),
        )
    }

    pub fn new_response(
        request_id: u64,
        command: Command,
        payload: Vec<u8>,
    ) -> Result<Self, TetherError> {
        Self::build(
            MessageType::Response,
            request_id,
            command,
            payload,
            ProtocolFlags::empty(),
        )
    }

    pub fn new_response_with_flags(
        request_id: u64,
        command: Command,
        payload: Vec<u8>,
        flags: ProtocolFlags,
    ) -> Result<Self, TetherError> {
        Self::build(MessageType::Response, request_id, command, payload, flags)
    }

    fn build(
        message_type: MessageType,
        request_id: u64,
        command: Command,
        payload: Vec<u8>,
        flags: ProtocolFlags,
    ) -> Result<Self, TetherError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(TetherError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let header = PacketHeader::new(
            payload_checksum(&payload),
            message_type as u32,
            flags.bits(),
            command as u64,
            request_id,
            payload.len() as u64,
        );
        Ok(Self { header, payload })
    }

    pub fn header(&self) -> &PacketHeader {
        &self.header
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    pub fn checksum(&self) -> u32 {
        self.header.checksum()
    }

    pub fn message_type(&self) -> Result<MessageType, TetherError> {
        MessageType::try_from(self.header.message_type())
    }

    pub fn command(&self) -> Result<Command, TetherError> {
        Command::try_from(self.header.command_id())
    }

    /// Unknown flag bits are ignored.
    pub fn flags(&self) -> ProtocolFlags {
        ProtocolFlags::from_bits_truncate(self.header.flags())
    }

    pub fn request_id(&self) -> u64 {
        self.header.request_id()
    }

    pub fn payload_length(&self) -> u64 {
        self.header.payload_length()
    }

    pub fn is_heartbeat(&self) -> bool {
        self.request_id() == 0
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TetherError> {
        if self.payload.len() > MAX_PAYLOAD_SIZE {
            return Err(TetherError::PayloadTooLarge {
                size: self.payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let mut out = Vec::with_capacity(HEADER_LENGTH + self.payload.len());
        out.extend_from_slice(&self.header.to_bytes());
        out.extend_from_slice(&self.payload);
        Ok(out)
    }

    /// Parse exactly one packet; trailing or missing bytes are an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TetherError> {
        let header = PacketHeader::from_bytes(bytes)?;
        let payload_len = header.payload_length() as usize;

        if header.payload_length() > MAX_PAYLOAD_SIZE as u64 {
            return Err(TetherError::PayloadTooLarge {
                size: payload_len,
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let expected = HEADER_LENGTH + payload_len;
        if bytes.len() != expected {
            return Err(TetherError::InvalidPacketLength {
                expected,
                actual: bytes.len(),
            });
        }

        Ok(Self::from_parts(header, bytes[HEADER_LENGTH..].to_vec()))
    }

    pub(crate) fn from_parts(header: PacketHeader, payload: Vec<u8>) -> Self {
        Self { header, payload }
    }

    /// Returns `true` when the header checksum matches the payload.
    pub fn validate(&self) -> bool {
        self.checksum() == payload_checksum(&self.payload)
    }
}

impl Debug for Packet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Packet")
            .field("header", &self.header)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}
