//! Types library for the pairing and room-lifecycle engine
//!
//! This library provides the entity definitions shared by the persistence
//! layer, the matching engine, and the gateway.
//!
//! # Modules
//! - `ids`: Identifiers (UserId, RoomId)
//! - `user`: User records and the derived pairing state
//! - `room`: Room records
//! - `search`: The FIFO search queue

pub mod ids;
pub mod user;
pub mod room;
pub mod search;
