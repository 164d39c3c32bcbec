mod connection;

pub use connection::{Connection, ConnectionInfo, ConnectionSender, HEARTBEAT_INTERVAL};
