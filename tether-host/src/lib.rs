//! # tether-host: Desktop Sharing Host
//!
//! Serves the local display to a remote viewer: answers capture and
//! geometry requests, replays forwarded input, and exchanges whole
//! files with the viewer.
//!
//! The host owns one session identity, chosen by the operator at
//! startup. Screen capture is only served once a viewer registers with
//! that identity.

pub mod config;
pub mod picker;
pub mod service;
