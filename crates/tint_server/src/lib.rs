//! # TintHealth Server
//!
//! A self-contained game host for exercising the TintHealth plugin without
//! a real game server. It keeps players in memory, renders world borders
//! into an inspectable store, and accepts operator commands on stdin.

pub mod cli;
pub mod config;
pub mod console;
pub mod logging;
pub mod renderer;
pub mod server;
pub mod signals;
pub mod world;

pub use cli::CliArgs;
pub use config::AppConfig;
pub use renderer::InMemoryBorderRenderer;
pub use server::{ConsoleFlow, TintServer};
pub use world::{SimulatedWorld, WorldError};
