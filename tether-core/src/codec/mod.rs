//! Length-framed packet codec for `tokio_util::codec::Framed`.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::TetherError;
use crate::header::{HEADER_LENGTH, PacketHeader};
use crate::packet::{MAX_PAYLOAD_SIZE, Packet};

#[derive(Debug, Default, Clone, Copy)]
pub struct TetherCodec;

impl Decoder for TetherCodec {
    type Item = Packet;
    type Error = TetherError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < HEADER_LENGTH {
            return Ok(None);
        }

        let header = PacketHeader::from_bytes(&src[..HEADER_LENGTH])?;
        if header.payload_length() > MAX_PAYLOAD_SIZE as u64 {
            return Err(TetherError::PayloadTooLarge {
                size: header.payload_length() as usize,
                max: MAX_PAYLOAD_SIZE,
            });
        }

        let payload_len = header.payload_length() as usize;
        let total = HEADER_LENGTH + payload_len;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        if payload_len > 0 && header.checksum() == 0 {
            return Err(TetherError::ProtocolViolation(
                "non-empty payload with zero checksum",
            ));
        }

        src.advance(HEADER_LENGTH);
        let payload = src.split_to(payload_len).to_vec();
        let packet = Packet::from_parts(header, payload);

        if !packet.validate() {
            return Err(TetherError::ChecksumMismatch);
        }

        Ok(Some(packet))
    }
}

impl Encoder<Packet> for TetherCodec {
    type Error = TetherError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if item.payload().len() > MAX_PAYLOAD_SIZE {
            return Err(TetherError::PayloadTooLarge {
                size: item.payload().len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }
        dst.reserve(HEADER_LENGTH + item.payload().len());
        dst.extend_from_slice(&item.header().to_bytes());
        dst.extend_from_slice(item.payload());
        Ok(())
    }
}
