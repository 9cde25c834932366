//! Gateway
//!
//! User-facing side of the lobby: command parsing, configuration and the
//! flows that turn commands into matching-engine calls.

pub mod command;
pub mod config;
pub mod error;
pub mod lobby;

pub use command::Command;
pub use config::GatewayConfig;
pub use error::{ConfigError, GatewayError};
pub use lobby::{Lobby, Notice, NoticeKind, Reply, Route};
