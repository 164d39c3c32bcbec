use bitflags::bitflags;

bitflags! {
    /// Per-packet protocol flags carried in the header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ProtocolFlags: u64 {
        /// The response reports a fault; the payload is a `RemoteFault`.
        const ERROR = 0x1;
    }
}
