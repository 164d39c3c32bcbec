//! # tether-viewer: remote desktop viewer
//!
//! Connects to a `tether-host`, registers the session identity, and then
//! keeps the host display on screen while forwarding local input and
//! exchanging files on request.

pub mod config;
pub mod connection;
pub mod console;
pub mod display;
pub mod input;
pub mod transfer;
