//! # TintHealth Event System
//!
//! The host-facing API shared between the TintHealth server host and the
//! plugins it loads. It provides a typed, async event bus, the plugin
//! lifecycle trait, and the `ServerContext` trait through which a plugin
//! reaches live player state, registered services and the command registry.
//!
//! ## Architecture Overview
//!
//! ### Core Events (`core:*`)
//! Server infrastructure events: player connections, disconnections and
//! world changes. Emitted by the host, consumed by plugins.
//!
//! ### Plugin Events (`plugin:plugin_name:event`)
//! Inter-plugin announcements that let plugins observe each other without
//! a compile-time dependency.
//!
//! ### Services
//! Long-lived capabilities (such as the world-border renderer) that one
//! extension registers in the [`ServiceRegistry`] and another looks up at
//! startup.
//!
//! ## Quick Start Example
//!
//! ```rust,no_run
//! use tint_event_system::*;
//!
//! # async fn demo() -> Result<(), EventError> {
//! let events = create_tint_event_system();
//!
//! events.on_core("player_connected", |event: PlayerConnectedEvent| {
//!     println!("Player {} connected", event.player_id);
//!     Ok(())
//! }).await?;
//!
//! events.emit_core("player_connected", &PlayerConnectedEvent {
//!     player_id: PlayerId::new(),
//!     world: "overworld".to_string(),
//!     timestamp: current_timestamp(),
//! }).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::any::Any;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info, trace};
use uuid::Uuid;

pub mod border;
pub mod commands;
pub mod services;

pub use border::{BorderLerp, BorderPosition, WorldBorder, WorldBorderAction, WorldBorderApi};
pub use commands::{CommandExecutor, CommandRegistry, CommandSender, DispatchError};
pub use services::ServiceRegistry;

// ============================================================================
// Core Types
// ============================================================================

/// Unique identifier for a player connected to the server.
///
/// Wraps a UUID so player ids cannot be confused with other kinds of ids.
///
/// # Examples
///
/// ```rust
/// use tint_event_system::PlayerId;
///
/// let player_id = PlayerId::new();
/// let parsed = PlayerId::from_str(&player_id.to_string()).unwrap();
/// assert_eq!(player_id, parsed);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    /// Creates a new random player ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a player ID from its string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - A string slice containing a valid UUID
    ///
    /// # Returns
    ///
    /// `Ok(PlayerId)` if the string is a valid UUID, otherwise `Err(uuid::Error)`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 3D position in the game world.
///
/// `y` is the vertical axis; world borders only care about the horizontal
/// `x`/`z` plane, see [`Position::horizontal`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate (east-west axis)
    pub x: f64,
    /// Y coordinate (vertical axis)
    pub y: f64,
    /// Z coordinate (north-south axis)
    pub z: f64,
}

impl Position {
    /// Creates a new position with the specified coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Projects this position onto the horizontal plane.
    pub fn horizontal(&self) -> BorderPosition {
        BorderPosition::new(self.x, self.z)
    }
}

/// Point-in-time view of a connected player, as exposed by the host.
///
/// Snapshots are cheap copies; plugins never hold a live reference to host
/// player objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Identity of the player
    pub id: PlayerId,
    /// Display name
    pub name: String,
    /// Name of the world the player is currently in
    pub world: String,
    /// Current health points
    pub health: f64,
    /// Maximum health attribute, if the host exposes one for this player
    pub max_health: Option<f64>,
    /// Current position
    pub position: Position,
    /// Whether the player holds operator privileges
    pub is_operator: bool,
}

// ============================================================================
// Event Traits and Core Infrastructure
// ============================================================================

/// Core trait that all events must implement.
///
/// Most types get this through the blanket implementation below by deriving
/// `Serialize`, `Deserialize` and `Debug`.
pub trait Event: Send + Sync + Any + std::fmt::Debug {
    /// Returns the type name of this event for debugging and routing.
    fn type_name() -> &'static str
    where
        Self: Sized;

    /// Serializes the event to bytes.
    fn serialize(&self) -> Result<Vec<u8>, EventError>;

    /// Deserializes an event from bytes.
    fn deserialize(data: &[u8]) -> Result<Self, EventError>
    where
        Self: Sized;
}

impl<T> Event for T
where
    T: Serialize + DeserializeOwned + Send + Sync + Any + std::fmt::Debug + 'static,
{
    fn type_name() -> &'static str {
        std::any::type_name::<T>()
    }

    fn serialize(&self) -> Result<Vec<u8>, EventError> {
        serde_json::to_vec(self).map_err(EventError::Serialization)
    }

    fn deserialize(data: &[u8]) -> Result<Self, EventError> {
        serde_json::from_slice(data).map_err(EventError::Deserialization)
    }
}

/// Handler trait for processing serialized events.
///
/// Plugins normally register closures through [`EventSystem::on_core`] and
/// friends instead of implementing this directly.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handles an event from serialized data.
    async fn handle(&self, data: &[u8]) -> Result<(), EventError>;

    /// Returns a human-readable name for this handler.
    fn handler_name(&self) -> &str;
}

/// Type-safe wrapper that deserializes into `T` before calling the closure.
pub struct TypedEventHandler<T, F>
where
    T: Event,
    F: Fn(T) -> Result<(), EventError> + Send + Sync,
{
    handler: F,
    name: String,
    _phantom: std::marker::PhantomData<T>,
}

impl<T, F> TypedEventHandler<T, F>
where
    T: Event,
    F: Fn(T) -> Result<(), EventError> + Send + Sync,
{
    /// Creates a new typed event handler.
    pub fn new(name: String, handler: F) -> Self {
        Self {
            handler,
            name,
            _phantom: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<T, F> EventHandler for TypedEventHandler<T, F>
where
    T: Event,
    F: Fn(T) -> Result<(), EventError> + Send + Sync,
{
    async fn handle(&self, data: &[u8]) -> Result<(), EventError> {
        let event = T::deserialize(data)?;
        (self.handler)(event)
    }

    fn handler_name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Event System
// ============================================================================

/// The event bus that routes core and plugin events to registered handlers.
///
/// # Thread Safety
///
/// Share it as `Arc<EventSystem>`. Handlers for one key run sequentially in
/// registration order; a failing handler is logged and does not stop the
/// remaining handlers.
pub struct EventSystem {
    /// Map of event keys to their registered handlers
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
    /// System statistics for monitoring
    stats: RwLock<EventSystemStats>,
}

impl EventSystem {
    /// Creates a new event system with no registered handlers.
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
            stats: RwLock::new(EventSystemStats::default()),
        }
    }

    /// Registers a handler for core server events.
    ///
    /// # Arguments
    ///
    /// * `event_name` - Name of the core event (e.g., "player_connected")
    /// * `handler` - Function to handle events of type T
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use tint_event_system::*;
    /// # async fn demo(events: std::sync::Arc<EventSystem>) -> Result<(), EventError> {
    /// events.on_core("player_changed_world", |event: PlayerChangedWorldEvent| {
    ///     println!("{} moved to {}", event.player_id, event.to_world);
    ///     Ok(())
    /// }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn on_core<T, F>(&self, event_name: &str, handler: F) -> Result<(), EventError>
    where
        T: Event + 'static,
        F: Fn(T) -> Result<(), EventError> + Send + Sync + 'static,
    {
        let event_key = format!("core:{}", event_name);
        self.register_typed_handler(event_key, handler).await
    }

    /// Registers a handler for plugin-to-plugin events.
    ///
    /// # Arguments
    ///
    /// * `plugin_name` - Name of the plugin emitting the event
    /// * `event_name` - Name of the event being emitted
    /// * `handler` - Function to handle events of type T
    pub async fn on_plugin<T, F>(
        &self,
        plugin_name: &str,
        event_name: &str,
        handler: F,
    ) -> Result<(), EventError>
    where
        T: Event + 'static,
        F: Fn(T) -> Result<(), EventError> + Send + Sync + 'static,
    {
        let event_key = format!("plugin:{}:{}", plugin_name, event_name);
        self.register_typed_handler(event_key, handler).await
    }

    async fn register_typed_handler<T, F>(
        &self,
        event_key: String,
        handler: F,
    ) -> Result<(), EventError>
    where
        T: Event + 'static,
        F: Fn(T) -> Result<(), EventError> + Send + Sync + 'static,
    {
        let handler_name = format!("{}::{}", event_key, T::type_name());
        let typed_handler = TypedEventHandler::new(handler_name, handler);
        let handler_arc: Arc<dyn EventHandler> = Arc::new(typed_handler);

        let mut handlers = self.handlers.write().await;
        handlers
            .entry(event_key.clone())
            .or_insert_with(Vec::new)
            .push(handler_arc);

        let mut stats = self.stats.write().await;
        stats.total_handlers += 1;

        info!("📝 Registered handler for {}", event_key);
        Ok(())
    }

    /// Emits a core server event to all registered handlers.
    ///
    /// # Returns
    ///
    /// `Ok(())` if emission succeeds, or `Err(EventError)` if serialization
    /// fails. Individual handler failures are logged but don't fail the emit.
    pub async fn emit_core<T>(&self, event_name: &str, event: &T) -> Result<(), EventError>
    where
        T: Event,
    {
        let event_key = format!("core:{}", event_name);
        self.emit_event(&event_key, event).await
    }

    /// Emits a plugin event to all registered handlers.
    pub async fn emit_plugin<T>(
        &self,
        plugin_name: &str,
        event_name: &str,
        event: &T,
    ) -> Result<(), EventError>
    where
        T: Event,
    {
        let event_key = format!("plugin:{}:{}", plugin_name, event_name);
        self.emit_event(&event_key, event).await
    }

    async fn emit_event<T>(&self, event_key: &str, event: &T) -> Result<(), EventError>
    where
        T: Event,
    {
        let data = event.serialize()?;

        // Clone the handler list so handlers may register further handlers
        // without deadlocking on the map lock.
        let event_handlers = {
            let handlers = self.handlers.read().await;
            handlers.get(event_key).cloned()
        };

        match event_handlers {
            Some(event_handlers) => {
                debug!(
                    "📤 Emitting {} to {} handlers",
                    event_key,
                    event_handlers.len()
                );

                for handler in &event_handlers {
                    if let Err(e) = handler.handle(&data).await {
                        error!("❌ Handler {} failed: {}", handler.handler_name(), e);
                    }
                }

                let mut stats = self.stats.write().await;
                stats.events_emitted += 1;
            }
            None => trace!("No handlers for event: {}", event_key),
        }

        Ok(())
    }

    /// Returns a copy of the current system statistics.
    pub async fn get_stats(&self) -> EventSystemStats {
        let stats = self.stats.read().await;
        stats.clone()
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Core Server Events
// ============================================================================

/// Event emitted when a player connects to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConnectedEvent {
    /// Unique identifier for the player
    pub player_id: PlayerId,
    /// World the player spawned into
    pub world: String,
    /// Unix timestamp when the connection was established
    pub timestamp: u64,
}

/// Event emitted when a player disconnects from the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerDisconnectedEvent {
    /// Unique identifier for the player
    pub player_id: PlayerId,
    /// Reason for the disconnection
    pub reason: DisconnectReason,
    /// Unix timestamp when the disconnection occurred
    pub timestamp: u64,
}

/// Why a player left the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisconnectReason {
    /// Player initiated disconnection (normal logout)
    ClientDisconnect,
    /// Server is shutting down
    ServerShutdown,
    /// Player was removed by an operator
    Kicked(String),
}

/// Event emitted after a player moved from one world to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerChangedWorldEvent {
    /// Unique identifier for the player
    pub player_id: PlayerId,
    /// World the player left
    pub from_world: String,
    /// World the player is now in
    pub to_world: String,
    /// Unix timestamp of the change
    pub timestamp: u64,
}

/// Statistics about event system usage.
#[derive(Debug, Default, Clone)]
pub struct EventSystemStats {
    /// Total number of registered event handlers
    pub total_handlers: usize,
    /// Total number of events delivered to at least one handler
    pub events_emitted: u64,
}

/// Errors that can occur during event system operations.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// Serialization failed when converting event to bytes
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Deserialization failed when converting bytes to event
    #[error("Deserialization error: {0}")]
    Deserialization(serde_json::Error),
    /// Handler execution failed during event processing
    #[error("Handler execution error: {0}")]
    HandlerExecution(String),
}

// ============================================================================
// Plugin Lifecycle
// ============================================================================

/// Plugin trait implemented by every extension the host loads.
///
/// # Lifecycle
///
/// 1. **Creation**: the host constructs the plugin value
/// 2. **Handler Registration**: `register_handlers()` wires event handlers
///    and resolves required services; failing here keeps the plugin unloaded
/// 3. **Initialization**: `on_init()` loads configuration and starts tasks
/// 4. **Operation**: the plugin receives events and commands
/// 5. **Shutdown**: `on_shutdown()` stops tasks and persists state
#[async_trait]
pub trait SimplePlugin: Send + Sync + 'static {
    /// Returns the unique, stable name of this plugin.
    fn name(&self) -> &str;

    /// Returns the semantic version string of this plugin.
    fn version(&self) -> &str;

    /// Registers event handlers before initialization.
    ///
    /// # Arguments
    ///
    /// * `events` - Event system for handler registration
    /// * `context` - Server context for service lookups and logging
    async fn register_handlers(
        &mut self,
        events: Arc<EventSystem>,
        context: Arc<dyn ServerContext>,
    ) -> Result<(), PluginError>;

    /// Initialize the plugin with server context.
    ///
    /// Failed initialization prevents the plugin from becoming active.
    async fn on_init(&mut self, _context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        Ok(())
    }

    /// Shutdown the plugin gracefully.
    ///
    /// Shutdown errors are logged by the host but don't prevent unloading.
    async fn on_shutdown(&mut self, _context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Server context interface giving plugins access to host state.
///
/// All methods are synchronous: the host serializes plugin callbacks, so a
/// plugin observes a consistent view of players for the duration of a call.
pub trait ServerContext: Send + Sync {
    /// Returns the event system shared with the host.
    fn events(&self) -> Arc<EventSystem>;

    /// Returns the registry of services provided by other extensions.
    fn services(&self) -> Arc<ServiceRegistry>;

    /// Returns the registry plugins add their text commands to.
    fn commands(&self) -> Arc<CommandRegistry>;

    /// Logs a message through the host's logging system.
    fn log(&self, level: LogLevel, message: &str);

    /// Snapshots every currently connected player.
    fn online_players(&self) -> Vec<PlayerSnapshot>;

    /// Snapshots a single connected player, or `None` if offline.
    fn player(&self, player_id: PlayerId) -> Option<PlayerSnapshot>;

    /// Sets a connected player's live health.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::PlayerNotFound` if the player is offline and
    /// `ServerError::InvalidArgument` if the host rejects the value.
    fn set_player_health(&self, player_id: PlayerId, health: f64) -> Result<(), ServerError>;

    /// Returns whether the given command sender holds operator privileges.
    fn is_operator(&self, sender: &CommandSender) -> bool;

    /// Delivers a text message to a command sender.
    fn send_message(&self, target: &CommandSender, message: &str);

    /// Returns the root directory plugins keep their data folders in.
    fn data_dir(&self) -> PathBuf;
}

/// Log levels for [`ServerContext::log`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Critical errors that may affect system stability
    Error,
    /// Warning conditions that should be investigated
    Warn,
    /// General informational messages
    Info,
    /// Detailed information for debugging
    Debug,
    /// Very detailed trace information
    Trace,
}

/// Errors that can occur during plugin operations.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// Plugin initialization failed during startup
    #[error("Plugin initialization failed: {0}")]
    InitializationFailed(String),
    /// Error occurred during plugin execution
    #[error("Plugin execution error: {0}")]
    ExecutionError(String),
    /// Requested plugin or dependency was not found
    #[error("Plugin not found: {0}")]
    NotFound(String),
}

/// Errors that can occur when plugins call into the host.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The addressed player is not connected
    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),
    /// The host rejected an argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Returns the current Unix timestamp in seconds.
///
/// A clock set before the epoch yields `0` rather than panicking.
pub fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Creates a new event system instance ready for handler registration.
pub fn create_tint_event_system() -> Arc<EventSystem> {
    Arc::new(EventSystem::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_player_id_round_trips_through_string() {
        let id = PlayerId::new();
        let parsed = PlayerId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
        assert!(PlayerId::from_str("not-a-uuid").is_err());
    }

    #[test]
    fn test_position_horizontal_drops_height() {
        let position = Position::new(12.5, 64.0, -3.0);
        assert_eq!(position.horizontal(), BorderPosition::new(12.5, -3.0));
    }

    #[tokio::test]
    async fn test_core_event_reaches_handler() {
        let events = create_tint_event_system();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);

        events
            .on_core("player_connected", move |event: PlayerConnectedEvent| {
                assert_eq!(event.world, "overworld");
                seen_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap();

        events
            .emit_core(
                "player_connected",
                &PlayerConnectedEvent {
                    player_id: PlayerId::new(),
                    world: "overworld".to_string(),
                    timestamp: current_timestamp(),
                },
            )
            .await
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        let stats = events.get_stats().await;
        assert_eq!(stats.total_handlers, 1);
        assert_eq!(stats.events_emitted, 1);
    }

    #[tokio::test]
    async fn test_failing_handler_does_not_block_others() {
        let events = create_tint_event_system();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);

        events
            .on_plugin("tinthealth", "status", |_event: serde_json::Value| {
                Err(EventError::HandlerExecution("boom".to_string()))
            })
            .await
            .unwrap();
        events
            .on_plugin("tinthealth", "status", move |_event: serde_json::Value| {
                seen_clone.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap();

        events
            .emit_plugin("tinthealth", "status", &serde_json::json!({"enabled": true}))
            .await
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_emit_without_handlers_is_ok() {
        let events = create_tint_event_system();
        let result = events
            .emit_core(
                "player_disconnected",
                &PlayerDisconnectedEvent {
                    player_id: PlayerId::new(),
                    reason: DisconnectReason::ClientDisconnect,
                    timestamp: current_timestamp(),
                },
            )
            .await;
        assert!(result.is_ok());
        assert_eq!(events.get_stats().await.events_emitted, 0);
    }

    #[tokio::test]
    async fn test_mismatched_payload_is_logged_not_returned() {
        let events = create_tint_event_system();
        events
            .on_core("player_changed_world", |_event: PlayerChangedWorldEvent| Ok(()))
            .await
            .unwrap();

        let result = events
            .emit_core("player_changed_world", &serde_json::json!({"unexpected": 1}))
            .await;
        assert!(result.is_ok());
    }
}
