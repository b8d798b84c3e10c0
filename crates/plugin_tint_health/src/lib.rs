//! # TintHealth
//!
//! Tints each player's screen red as their health drops by abusing the
//! world-border warning vignette. Every player gets a private border
//! centered on them; its warning distance widens as health falls so the
//! vignette strengthens, without a border wall ever coming into view.
//!
//! The plugin requires a `WorldBorderApi` provider in the host's
//! [`ServiceRegistry`](tint_event_system::ServiceRegistry) and refuses to
//! start without one.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tint_event_system::{
    current_timestamp, EventSystem, LogLevel, PlayerChangedWorldEvent, PlayerConnectedEvent,
    PluginError, ServerContext, SimplePlugin,
};
use tracing::{error, info, warn};

pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod formula;
pub mod gateway;
pub mod lifecycle;
pub mod state;
pub mod tick;

#[cfg(test)]
mod test_support;

pub use cache::HealthCache;
pub use commands::{TintHealthCommand, COMMAND_NAME, MESSAGE_PREFIX};
pub use config::TintHealthConfig;
pub use error::{CommandError, ConfigError, TintHealthError};
pub use formula::{compute_border, BorderParams};
pub use gateway::BorderGateway;
pub use lifecycle::{LifecycleController, Transition};
pub use state::{SharedState, TintHealthState};
pub use tick::{BorderTask, RepeatingTask, TickReport};

pub const PLUGIN_NAME: &str = "TintHealth";
pub const PLUGIN_VERSION: &str = "1.0.0";

/// Name of the recurring health polling task
pub const BORDER_TASK_NAME: &str = "tinthealth-border";

// ============================================================================
// Plugin
// ============================================================================

pub struct TintHealthPlugin {
    state: SharedState,
    lifecycle: Option<LifecycleController>,
    task: Option<RepeatingTask>,
    config: TintHealthConfig,
    config_path: Option<PathBuf>,
}

impl TintHealthPlugin {
    pub fn new() -> Self {
        Self {
            state: state::shared_state(true),
            lifecycle: None,
            task: None,
            config: TintHealthConfig::default(),
            config_path: None,
        }
    }

    /// Handle to the plugin's runtime state.
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Whether the border task is currently scheduled.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(RepeatingTask::is_running)
    }

    fn lifecycle(&self) -> Result<LifecycleController, PluginError> {
        self.lifecycle.clone().ok_or_else(|| {
            PluginError::InitializationFailed(
                "register_handlers must succeed before on_init".to_string(),
            )
        })
    }
}

impl Default for TintHealthPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SimplePlugin for TintHealthPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn version(&self) -> &str {
        PLUGIN_VERSION
    }

    async fn register_handlers(
        &mut self,
        events: Arc<EventSystem>,
        context: Arc<dyn ServerContext>,
    ) -> Result<(), PluginError> {
        let gateway = match BorderGateway::from_services(&context.services()) {
            Ok(gateway) => gateway,
            Err(e) => {
                error!("❌ {}", e);
                context.log(LogLevel::Error, &format!("TintHealth: {}", e));
                return Err(e.into());
            }
        };
        let lifecycle = LifecycleController::new(gateway);

        {
            let state = self.state.clone();
            let lifecycle = lifecycle.clone();
            let context = context.clone();
            events
                .on_core("player_connected", move |event: PlayerConnectedEvent| {
                    let Some(player) = context.player(event.player_id) else {
                        warn!("⚠️ Joined player {} is no longer online", event.player_id);
                        return Ok(());
                    };
                    let _guard = state.lock();
                    lifecycle.on_player_connected(&player);
                    Ok(())
                })
                .await
                .map_err(|e| PluginError::InitializationFailed(e.to_string()))?;
        }

        {
            let state = self.state.clone();
            let lifecycle = lifecycle.clone();
            let context = context.clone();
            events
                .on_core("player_changed_world", move |event: PlayerChangedWorldEvent| {
                    let Some(player) = context.player(event.player_id) else {
                        warn!("⚠️ Player {} changed world but is offline", event.player_id);
                        return Ok(());
                    };
                    let _guard = state.lock();
                    lifecycle.on_player_changed_world(&player);
                    Ok(())
                })
                .await
                .map_err(|e| PluginError::InitializationFailed(e.to_string()))?;
        }

        self.lifecycle = Some(lifecycle);
        info!("🟥 TintHealth: handlers registered");
        Ok(())
    }

    async fn on_init(&mut self, context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        let lifecycle = self.lifecycle()?;

        let config_path = TintHealthConfig::path_in(&context.data_dir());
        let config = TintHealthConfig::load_or_create(&config_path)
            .await
            .map_err(|e| PluginError::from(TintHealthError::from(e)))?;
        {
            let mut state = self.state.lock();
            state.border_enabled = config.border_enabled;
            lifecycle.adopt_online(&mut state, &context.online_players());
        }

        context.commands().register(
            COMMAND_NAME,
            commands::COMMAND_USAGE,
            Arc::new(TintHealthCommand::new(self.state.clone(), lifecycle.clone())),
        );

        let border_task = BorderTask::new(
            self.state.clone(),
            lifecycle.gateway().clone(),
            context.clone(),
        );
        self.task = Some(RepeatingTask::spawn(
            BORDER_TASK_NAME,
            Duration::from_millis(config.tick_interval_ms),
            move || {
                border_task.run();
            },
        ));

        context.log(
            LogLevel::Info,
            &format!(
                "TintHealth {} started (border {})",
                PLUGIN_VERSION,
                if config.border_enabled { "enabled" } else { "disabled" }
            ),
        );

        context
            .events()
            .emit_plugin(
                "tinthealth",
                "startup",
                &serde_json::json!({
                    "plugin": PLUGIN_NAME,
                    "version": PLUGIN_VERSION,
                    "border_enabled": config.border_enabled,
                    "timestamp": current_timestamp()
                }),
            )
            .await
            .map_err(|e| PluginError::ExecutionError(e.to_string()))?;

        self.config = config;
        self.config_path = Some(config_path);
        Ok(())
    }

    async fn on_shutdown(&mut self, context: Arc<dyn ServerContext>) -> Result<(), PluginError> {
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }

        let Some(path) = self.config_path.take() else {
            return Ok(());
        };
        self.config.border_enabled = self.state.lock().border_enabled;

        if let Err(e) = self.config.save(&path).await {
            error!("❌ Failed to persist TintHealth config: {}", e);
            context.log(LogLevel::Error, &format!("TintHealth: {}", e));
            return Err(PluginError::ExecutionError(e.to_string()));
        }

        context.log(LogLevel::Info, "TintHealth stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{player, FakeServer, RecordingBorderApi};
    use tint_event_system::{CommandSender, PlayerId, WorldBorderAction, WorldBorderApi};

    fn server_with_border(dir: &tempfile::TempDir) -> (Arc<FakeServer>, Arc<RecordingBorderApi>) {
        let server = Arc::new(FakeServer::with_data_dir(dir.path().to_path_buf()));
        let api = Arc::new(RecordingBorderApi::default());
        server
            .services()
            .register::<dyn WorldBorderApi>(api.clone());
        (server, api)
    }

    async fn start(plugin: &mut TintHealthPlugin, server: &Arc<FakeServer>) {
        let context: Arc<dyn ServerContext> = server.clone();
        plugin
            .register_handlers(server.events(), context.clone())
            .await
            .unwrap();
        plugin.on_init(context).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_border_service_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let server = Arc::new(FakeServer::with_data_dir(dir.path().to_path_buf()));
        let mut plugin = TintHealthPlugin::new();

        let result = plugin.register_handlers(server.events(), server.clone()).await;

        assert!(matches!(result, Err(PluginError::NotFound(_))));
        assert_eq!(server.logs_at(LogLevel::Error).len(), 1);
        assert!(plugin.on_init(server.clone()).await.is_err());
        assert!(!server.commands().contains(COMMAND_NAME));
    }

    #[tokio::test]
    async fn test_init_seeds_config_and_registers_command() {
        let dir = tempfile::tempdir().unwrap();
        let (server, _api) = server_with_border(&dir);
        let mut plugin = TintHealthPlugin::new();

        start(&mut plugin, &server).await;

        assert!(plugin.is_running());
        assert!(server.commands().contains(COMMAND_NAME));
        assert!(TintHealthConfig::path_in(dir.path()).exists());

        plugin.on_shutdown(server.clone()).await.unwrap();
        assert!(!plugin.is_running());
    }

    #[tokio::test]
    async fn test_join_event_initializes_border() {
        let dir = tempfile::tempdir().unwrap();
        let (server, api) = server_with_border(&dir);
        let mut plugin = TintHealthPlugin::new();
        start(&mut plugin, &server).await;

        let alice = server.add_player(player("alice", 20.0));
        server
            .events()
            .emit_core(
                "player_connected",
                &PlayerConnectedEvent {
                    player_id: alice,
                    world: "overworld".to_string(),
                    timestamp: current_timestamp(),
                },
            )
            .await
            .unwrap();

        assert_eq!(api.count_action(alice, WorldBorderAction::Initialize), 1);
        assert_eq!(api.current(alice).unwrap().warning_blocks, 100_000);

        plugin.on_shutdown(server.clone()).await.unwrap();
    }

    #[tokio::test]
    async fn test_world_change_initializes_even_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let (server, api) = server_with_border(&dir);
        let mut plugin = TintHealthPlugin::new();
        start(&mut plugin, &server).await;
        plugin.state().lock().border_enabled = false;

        let bob = server.add_player(player("bob", 10.0));
        server.set_world(bob, "nether");
        server
            .events()
            .emit_core(
                "player_changed_world",
                &PlayerChangedWorldEvent {
                    player_id: bob,
                    from_world: "overworld".to_string(),
                    to_world: "nether".to_string(),
                    timestamp: current_timestamp(),
                },
            )
            .await
            .unwrap();

        assert_eq!(api.count_action(bob, WorldBorderAction::Initialize), 1);

        plugin.on_shutdown(server.clone()).await.unwrap();
    }

    #[tokio::test]
    async fn test_event_for_offline_player_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let (server, api) = server_with_border(&dir);
        let mut plugin = TintHealthPlugin::new();
        start(&mut plugin, &server).await;

        server
            .events()
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

        assert!(api.calls().is_empty());
        plugin.on_shutdown(server.clone()).await.unwrap();
    }

    #[tokio::test]
    async fn test_flag_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let (server, _api) = server_with_border(&dir);

        let mut first = TintHealthPlugin::new();
        start(&mut first, &server).await;
        let handled = server
            .commands()
            .dispatch(server.as_ref(), &CommandSender::Console, "/tinthealth disable")
            .unwrap();
        assert!(handled);
        first.on_shutdown(server.clone()).await.unwrap();

        let saved = TintHealthConfig::load_or_create(&TintHealthConfig::path_in(dir.path()))
            .await
            .unwrap();
        assert!(!saved.border_enabled);

        let (second_server, _api) = server_with_border(&dir);
        let mut second = TintHealthPlugin::new();
        start(&mut second, &second_server).await;
        assert!(!second.state().lock().border_enabled);
        second.on_shutdown(second_server.clone()).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_running_task_tracks_health_changes() {
        let dir = tempfile::tempdir().unwrap();
        let (server, api) = server_with_border(&dir);
        std::fs::create_dir_all(dir.path().join(config::DATA_FOLDER)).unwrap();
        std::fs::write(
            TintHealthConfig::path_in(dir.path()),
            "border_enabled = true\ntick_interval_ms = 5\n",
        )
        .unwrap();

        let alice = server.add_player(player("alice", 20.0));
        let mut plugin = TintHealthPlugin::new();
        start(&mut plugin, &server).await;

        // Already online at startup: bordered before the first tick.
        assert_eq!(api.actions_for(alice)[0], WorldBorderAction::Initialize);
        assert_eq!(api.count_action(alice, WorldBorderAction::SetWarningBlocks), 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(api.count_action(alice, WorldBorderAction::SetWarningBlocks), 1);

        server.set_health(alice, 10.0);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(api.current(alice).unwrap().warning_blocks, 400_000);
        assert_eq!(api.count_action(alice, WorldBorderAction::SetWarningBlocks), 2);
        assert_eq!(plugin.state().lock().health_cache.get(alice), Some(10.0));

        plugin.on_shutdown(server.clone()).await.unwrap();
    }

    #[tokio::test]
    async fn test_online_players_left_alone_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let (server, api) = server_with_border(&dir);
        TintHealthConfig {
            border_enabled: false,
            tick_interval_ms: 50,
        }
        .save(&TintHealthConfig::path_in(dir.path()))
        .await
        .unwrap();

        let alice = server.add_player(player("alice", 20.0));
        let mut plugin = TintHealthPlugin::new();
        start(&mut plugin, &server).await;

        assert!(api.actions_for(alice).is_empty());
        plugin.on_shutdown(server.clone()).await.unwrap();
    }
}
