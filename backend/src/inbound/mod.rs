//! Inbound adapters that translate HTTP requests into domain service calls,
//! and domain events into WebSocket frames, keeping framework details at the
//! edge.

pub mod http;
pub mod ws;
