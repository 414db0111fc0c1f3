// Public API for integration tests and the binary

pub mod chat;
pub mod clock;
pub mod command;
pub mod config;
pub mod processor;
pub mod publish;
pub mod resolver;
pub mod server;
pub mod state;
pub mod types;
