//! Text command registration and dispatch.
//!
//! Plugins register a [`CommandExecutor`] under a command name; the host
//! splits each operator line into a label and arguments and hands them to the
//! matching executor.

use crate::{PlayerId, ServerContext};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Who issued a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandSender {
    /// The server console; always privileged, never a live player
    Console,
    /// A connected player
    Player(PlayerId),
}

impl CommandSender {
    /// Returns the player id for player senders.
    pub fn player_id(&self) -> Option<PlayerId> {
        match self {
            CommandSender::Console => None,
            CommandSender::Player(id) => Some(*id),
        }
    }
}

impl std::fmt::Display for CommandSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandSender::Console => write!(f, "console"),
            CommandSender::Player(id) => write!(f, "player {}", id),
        }
    }
}

/// Handler for one registered text command.
pub trait CommandExecutor: Send + Sync {
    /// Executes the command.
    ///
    /// # Arguments
    ///
    /// * `context` - Host context for replies and player access
    /// * `sender` - Who issued the command
    /// * `label` - The command name as typed
    /// * `args` - Whitespace-separated arguments after the label
    ///
    /// # Returns
    ///
    /// `true` if the command was recognized and handled, `false` if the host
    /// should show the usage text instead.
    fn execute(
        &self,
        context: &dyn ServerContext,
        sender: &CommandSender,
        label: &str,
        args: &[&str],
    ) -> bool;
}

struct RegisteredCommand {
    usage: String,
    executor: Arc<dyn CommandExecutor>,
}

/// Errors produced while routing a command line.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The line contained no command label
    #[error("Empty command")]
    EmptyCommand,
    /// No executor is registered under the label
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

/// Registry of text commands, keyed by lowercase label.
#[derive(Default)]
pub struct CommandRegistry {
    commands: DashMap<String, RegisteredCommand>,
}

impl CommandRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an executor under `name`, replacing any previous one.
    ///
    /// # Arguments
    ///
    /// * `name` - Command label, matched case-insensitively
    /// * `usage` - Usage text shown when the executor returns `false`
    /// * `executor` - Handler invoked for matching lines
    pub fn register(&self, name: &str, usage: &str, executor: Arc<dyn CommandExecutor>) {
        let key = name.to_lowercase();
        info!("⌨️ Registered command /{}", key);
        self.commands.insert(
            key,
            RegisteredCommand {
                usage: usage.to_string(),
                executor,
            },
        );
    }

    /// Returns the usage text of a registered command.
    pub fn usage(&self, name: &str) -> Option<String> {
        self.commands
            .get(&name.to_lowercase())
            .map(|entry| entry.usage.clone())
    }

    /// Whether a command is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(&name.to_lowercase())
    }

    /// Parses `line` and runs the matching executor.
    ///
    /// A leading `/` is ignored.
    ///
    /// # Returns
    ///
    /// The executor's handled flag, or a `DispatchError` if no executor
    /// matches the label.
    pub fn dispatch(
        &self,
        context: &dyn ServerContext,
        sender: &CommandSender,
        line: &str,
    ) -> Result<bool, DispatchError> {
        let line = line.trim();
        let line = line.strip_prefix('/').unwrap_or(line);
        let mut parts = line.split_whitespace();
        let label = parts.next().ok_or(DispatchError::EmptyCommand)?;
        let args: Vec<&str> = parts.collect();

        // Clone the executor out so the map shard is not held while it runs.
        let executor = self
            .commands
            .get(&label.to_lowercase())
            .map(|entry| Arc::clone(&entry.executor))
            .ok_or_else(|| DispatchError::UnknownCommand(label.to_string()))?;

        debug!("⌨️ {} issued /{} {:?}", sender, label, args);
        Ok(executor.execute(context, sender, label, &args))
    }
}
