use crate::error::TetherError;

/// Magic bytes at the start of every packet.
pub const MAGIC: [u8; 4] = *b"TTH1";

/// Serialized header size: 3 × u32 + 4 × u64, no padding.
pub const HEADER_LENGTH: usize = 44;

pub type PacketHeaderBytes = [u8; HEADER_LENGTH];

/// Fixed-size little-endian packet header.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    checksum: u32,
    message_type: u32,
    flags: u64,
    command_id: u64,
    request_id: u64,
    payload_length: u64,
}

impl PacketHeader {
    pub fn new(
        checksum: u32,
        message_type: u32,
        flags: u64,
        command_id: u64,
        request_id: u64,
        payload_length: u64,
    ) -> Self {
        Self {
            checksum,
            message_type,
            flags,
            command_id,
            request_id,
            payload_length,
        }
    }

    pub fn to_bytes(&self) -> PacketHeaderBytes {
        let mut out: PacketHeaderBytes = [0; HEADER_LENGTH];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..8].copy_from_slice(&self.checksum.to_le_bytes());
        out[8..12].copy_from_slice(&self.message_type.to_le_bytes());
        out[12..20].copy_from_slice(&self.flags.to_le_bytes());
        out[20..28].copy_from_slice(&self.command_id.to_le_bytes());
        out[28..36].copy_from_slice(&self.request_id.to_le_bytes());
        out[36..44].copy_from_slice(&self.payload_length.to_le_bytes());
        out
    }

    /// Parse a header from the first [`HEADER_LENGTH`] bytes of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TetherError> {
        if bytes.len() < HEADER_LENGTH {
            return Err(TetherError::InvalidPacketLength {
                expected: HEADER_LENGTH,
                actual: bytes.len(),
            });
        }
        if bytes[0..4] != MAGIC {
            return Err(TetherError::InvalidMagic);
        }

        Ok(Self {
            checksum: read_u32(bytes, 4),
            message_type: read_u32(bytes, 8),
            flags: read_u64(bytes, 12),
            command_id: read_u64(bytes, 20),
            request_id: read_u64(bytes, 28),
            payload_length: read_u64(bytes, 36),
        })
    }

    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    pub fn set_checksum(&mut self, checksum: u32) {
        self.checksum = checksum;
    }

    pub fn message_type(&self) -> u32 {
        self.message_type
    }

    pub fn flags(&self) -> u64 {
        self.flags
    }

    pub fn command_id(&self) -> u64 {
        self.command_id
    }

    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn payload_length(&self) -> u64 {
        self.payload_length
    }
}

// Callers guarantee `bytes.len() >= HEADER_LENGTH`.
fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8], at: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    u64::from_le_bytes(buf)
}

impl std::fmt::Debug for PacketHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketHeader")
            .field("message_type", &self.message_type)
            .field("flags", &self.flags)
            .field("command_id", &self.command_id)
            .field("request_id", &self.request_id)
            .field("payload_length", &self.payload_length)
            .field("checksum", &self.checksum)
            .finish()
    }
}
