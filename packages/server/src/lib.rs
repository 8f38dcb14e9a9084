//! Real-time messaging core for the irori chat service.
//!
//! This library implements the authenticated connection lifecycle, room
//! membership, message broadcast and ephemeral typing presence over a
//! durable message log, exposed through a WebSocket server.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
