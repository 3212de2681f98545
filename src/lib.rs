//! Client SDK for the newswire realtime announcement feed.
//!
//! The crate is organized by layer:
//! - `proto`: wire messages shared with the feed service.
//! - `client`: websocket transport and connection worker.
//! - `feed`: room subscription with verbatim payload logging.

/// Websocket connection and configuration.
pub mod client;
/// Room subscription and typed feed events.
pub mod feed;
/// Feed protocol messages.
pub mod proto;
