//! Data Transfer Objects (DTOs) for the chat service.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket wire events and payloads
//!
//! Conversion logic between DTOs and domain entities lives in `conversion`.

pub mod conversion;
pub mod websocket;
