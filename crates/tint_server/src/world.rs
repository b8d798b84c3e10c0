//! The simulated game world.
//!
//! Holds the connected players and implements [`ServerContext`] for the
//! plugins the host loads. Operations that a real server would report as
//! events (joins, leaves, world changes) emit the matching core event after
//! the player table has been updated.

use dashmap::DashMap;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use tint_event_system::{
    current_timestamp, CommandRegistry, CommandSender, DisconnectReason, EventError, EventSystem,
    LogLevel, PlayerChangedWorldEvent, PlayerConnectedEvent, PlayerDisconnectedEvent, PlayerId,
    PlayerSnapshot, Position, ServerContext, ServerError, ServiceRegistry,
};
use tracing::{debug, error, info, trace, warn};

/// Health new players spawn with
pub const SPAWN_HEALTH: f64 = 20.0;

/// Messages kept per recipient; older ones are discarded first.
pub const MESSAGE_LOG_LIMIT: usize = 100;

/// Errors raised by world operations
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("A player named {0} is already online")]
    NameTaken(String),

    #[error("Event emission failed: {0}")]
    Event(#[from] EventError),
}

pub struct SimulatedWorld {
    events: Arc<EventSystem>,
    services: Arc<ServiceRegistry>,
    commands: Arc<CommandRegistry>,
    data_dir: PathBuf,
    default_world: String,
    players: DashMap<PlayerId, PlayerSnapshot>,
    messages: DashMap<CommandSender, VecDeque<String>>,
}

impl SimulatedWorld {
    pub fn new(data_dir: PathBuf, default_world: &str) -> Self {
        Self {
            events: tint_event_system::create_tint_event_system(),
            services: Arc::new(ServiceRegistry::new()),
            commands: Arc::new(CommandRegistry::new()),
            data_dir,
            default_world: default_world.to_string(),
            players: DashMap::new(),
            messages: DashMap::new(),
        }
    }

    /// Connects a new player and emits `core:player_connected`.
    ///
    /// # Errors
    ///
    /// `WorldError::NameTaken` if a player with that name (case-insensitive)
    /// is already online.
    pub async fn join(&self, name: &str, operator: bool) -> Result<PlayerId, WorldError> {
        if self.find_by_name(name).is_some() {
            return Err(WorldError::NameTaken(name.to_string()));
        }

        let snapshot = PlayerSnapshot {
            id: PlayerId::new(),
            name: name.to_string(),
            world: self.default_world.clone(),
            health: SPAWN_HEALTH,
            max_health: Some(SPAWN_HEALTH),
            position: Position::new(0.0, 64.0, 0.0),
            is_operator: operator,
        };
        let player_id = snapshot.id;
        self.players.insert(player_id, snapshot);
        info!("🟢 {} joined {} ({})", name, self.default_world, player_id);

        self.events
            .emit_core(
                "player_connected",
                &PlayerConnectedEvent {
                    player_id,
                    world: self.default_world.clone(),
                    timestamp: current_timestamp(),
                },
            )
            .await?;
        Ok(player_id)
    }

    /// Disconnects a player and emits `core:player_disconnected`.
    pub async fn leave(&self, player_id: PlayerId, reason: DisconnectReason) -> Result<(), WorldError> {
        let (_, player) = self
            .players
            .remove(&player_id)
            .ok_or(ServerError::PlayerNotFound(player_id))?;
        info!("🔴 {} left ({:?})", player.name, reason);
        self.messages.remove(&CommandSender::Player(player_id));

        self.events
            .emit_core(
                "player_disconnected",
                &PlayerDisconnectedEvent {
                    player_id,
                    reason,
                    timestamp: current_timestamp(),
                },
            )
            .await?;
        Ok(())
    }

    /// Moves a player into another world and emits `core:player_changed_world`.
    ///
    /// # Errors
    ///
    /// `ServerError::InvalidArgument` if the player is already in `world`.
    pub async fn change_world(&self, player_id: PlayerId, world: &str) -> Result<(), WorldError> {
        let from_world = {
            let mut player = self
                .players
                .get_mut(&player_id)
                .ok_or(ServerError::PlayerNotFound(player_id))?;
            if player.world == world {
                return Err(ServerError::InvalidArgument(format!(
                    "{} is already in {}",
                    player.name, world
                ))
                .into());
            }
            std::mem::replace(&mut player.world, world.to_string())
        };
        info!("🌍 {} moved from {} to {}", player_id, from_world, world);

        self.events
            .emit_core(
                "player_changed_world",
                &PlayerChangedWorldEvent {
                    player_id,
                    from_world,
                    to_world: world.to_string(),
                    timestamp: current_timestamp(),
                },
            )
            .await?;
        Ok(())
    }

    /// Removes health, never going below zero.
    ///
    /// # Returns
    ///
    /// The player's new health.
    pub fn damage(&self, player_id: PlayerId, amount: f64) -> Result<f64, ServerError> {
        self.adjust_health(player_id, -amount.abs())
    }

    /// Restores health, never going above the player's max.
    pub fn heal(&self, player_id: PlayerId, amount: f64) -> Result<f64, ServerError> {
        self.adjust_health(player_id, amount.abs())
    }

    fn adjust_health(&self, player_id: PlayerId, delta: f64) -> Result<f64, ServerError> {
        if !delta.is_finite() {
            return Err(ServerError::InvalidArgument(format!("{} is not a finite amount", delta)));
        }
        let mut player = self
            .players
            .get_mut(&player_id)
            .ok_or(ServerError::PlayerNotFound(player_id))?;
        let max = player.max_health.unwrap_or(SPAWN_HEALTH);
        player.health = (player.health + delta).clamp(0.0, max);
        trace!("❤️ {} now at {}/{}", player.name, player.health, max);
        Ok(player.health)
    }

    pub fn move_to(&self, player_id: PlayerId, position: Position) -> Result<(), ServerError> {
        let mut player = self
            .players
            .get_mut(&player_id)
            .ok_or(ServerError::PlayerNotFound(player_id))?;
        player.position = position;
        Ok(())
    }

    pub fn set_operator(&self, player_id: PlayerId, operator: bool) -> Result<(), ServerError> {
        let mut player = self
            .players
            .get_mut(&player_id)
            .ok_or(ServerError::PlayerNotFound(player_id))?;
        player.is_operator = operator;
        Ok(())
    }

    /// Looks up an online player by name, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
            .map(|entry| *entry.key())
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// The most recent messages delivered to `target`, oldest first.
    pub fn messages_for(&self, target: &CommandSender) -> Vec<String> {
        self.messages
            .get(target)
            .map(|entry| entry.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Disconnects everyone with `DisconnectReason::ServerShutdown`.
    pub async fn disconnect_all(&self) {
        let ids: Vec<PlayerId> = self.players.iter().map(|entry| *entry.key()).collect();
        for player_id in ids {
            if let Err(e) = self.leave(player_id, DisconnectReason::ServerShutdown).await {
                warn!("⚠️ Failed to disconnect {}: {}", player_id, e);
            }
        }
    }
}

impl ServerContext for SimulatedWorld {
    fn events(&self) -> Arc<EventSystem> {
        self.events.clone()
    }

    fn services(&self) -> Arc<ServiceRegistry> {
        self.services.clone()
    }

    fn commands(&self) -> Arc<CommandRegistry> {
        self.commands.clone()
    }

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error => error!("{}", message),
            LogLevel::Warn => warn!("{}", message),
            LogLevel::Info => info!("{}", message),
            LogLevel::Debug => debug!("{}", message),
            LogLevel::Trace => trace!("{}", message),
        }
    }

    fn online_players(&self) -> Vec<PlayerSnapshot> {
        self.players
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn player(&self, player_id: PlayerId) -> Option<PlayerSnapshot> {
        self.players
            .get(&player_id)
            .map(|entry| entry.value().clone())
    }

    fn set_player_health(&self, player_id: PlayerId, health: f64) -> Result<(), ServerError> {
        let mut player = self
            .players
            .get_mut(&player_id)
            .ok_or(ServerError::PlayerNotFound(player_id))?;
        let max = player.max_health.unwrap_or(SPAWN_HEALTH);
        if !health.is_finite() || health < 0.0 || health > max {
            return Err(ServerError::InvalidArgument(format!(
                "health must be within 0..={}, got {}",
                max, health
            )));
        }
        player.health = health;
        Ok(())
    }

    fn is_operator(&self, sender: &CommandSender) -> bool {
        match sender {
            CommandSender::Console => true,
            CommandSender::Player(player_id) => self
                .players
                .get(player_id)
                .map(|entry| entry.is_operator)
                .unwrap_or(false),
        }
    }

    fn send_message(&self, target: &CommandSender, message: &str) {
        match target {
            CommandSender::Console => info!("💬 {}", message),
            CommandSender::Player(player_id) => match self.players.get(player_id) {
                Some(player) => info!("💬 [to {}] {}", player.name, message),
                None => {
                    debug!("Dropped message for offline player {}", player_id);
                    return;
                }
            },
        }
        let mut log = self.messages.entry(*target).or_default();
        if log.len() == MESSAGE_LOG_LIMIT {
            log.pop_front();
        }
        log.push_back(message.to_string());
    }

    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn world() -> SimulatedWorld {
        SimulatedWorld::new(std::env::temp_dir(), "overworld")
    }

    #[tokio::test]
    async fn test_join_emits_connected_event_after_insert() {
        let world = Arc::new(world());
        let seen = Arc::new(AtomicUsize::new(0));
        {
            let seen = seen.clone();
            let observer = world.clone();
            world
                .events()
                .on_core("player_connected", move |event: PlayerConnectedEvent| {
                    assert!(observer.player(event.player_id).is_some());
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .await
                .unwrap();
        }

        let id = world.join("Alice", false).await.unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(world.find_by_name("alice"), Some(id));
        assert!(matches!(
            world.join("ALICE", false).await,
            Err(WorldError::NameTaken(_))
        ));
    }

    #[tokio::test]
    async fn test_change_world_reports_both_worlds() {
        let world = Arc::new(world());
        let to_world = Arc::new(Mutex::new(None::<String>));
        {
            let slot = to_world.clone();
            world
                .events()
                .on_core("player_changed_world", move |event: PlayerChangedWorldEvent| {
                    assert_eq!(event.from_world, "overworld");
                    *slot.lock().unwrap() = Some(event.to_world);
                    Ok(())
                })
                .await
                .unwrap();
        }
        let id = world.join("bob", false).await.unwrap();

        world.change_world(id, "nether").await.unwrap();

        assert_eq!(to_world.lock().unwrap().as_deref(), Some("nether"));
        assert_eq!(world.player(id).unwrap().world, "nether");
        assert!(world.change_world(id, "nether").await.is_err());
    }

    #[tokio::test]
    async fn test_health_is_clamped() {
        let world = world();
        let id = world.join("carol", false).await.unwrap();

        assert_eq!(world.damage(id, 5.0).unwrap(), 15.0);
        assert_eq!(world.damage(id, 50.0).unwrap(), 0.0);
        assert_eq!(world.heal(id, 7.5).unwrap(), 7.5);
        assert_eq!(world.heal(id, 100.0).unwrap(), 20.0);
        assert!(world.damage(PlayerId::new(), 1.0).is_err());
    }

    #[tokio::test]
    async fn test_set_player_health_rejects_out_of_range() {
        let world = world();
        let id = world.join("dave", false).await.unwrap();

        assert!(world.set_player_health(id, 12.0).is_ok());
        assert!(world.set_player_health(id, 21.0).is_err());
        assert!(world.set_player_health(id, -1.0).is_err());
        assert!(world.set_player_health(id, f64::NAN).is_err());
        assert_eq!(world.player(id).unwrap().health, 12.0);
    }

    #[tokio::test]
    async fn test_operator_and_messages() {
        let world = world();
        let op = world.join("op", true).await.unwrap();
        let guest = world.join("guest", false).await.unwrap();

        assert!(world.is_operator(&CommandSender::Console));
        assert!(world.is_operator(&CommandSender::Player(op)));
        assert!(!world.is_operator(&CommandSender::Player(guest)));

        world.send_message(&CommandSender::Player(guest), "hello");
        assert_eq!(world.messages_for(&CommandSender::Player(guest)), vec!["hello"]);

        world.leave(guest, DisconnectReason::Kicked("test".into())).await.unwrap();
        assert!(world.messages_for(&CommandSender::Player(guest)).is_empty());
        assert_eq!(world.player_count(), 1);

        world.disconnect_all().await;
        assert_eq!(world.player_count(), 0);
    }

    #[tokio::test]
    async fn test_console_message_log_is_bounded() {
        let world = world();
        for n in 0..MESSAGE_LOG_LIMIT + 5 {
            world.send_message(&CommandSender::Console, &format!("line {}", n));
        }

        let messages = world.messages_for(&CommandSender::Console);
        assert_eq!(messages.len(), MESSAGE_LOG_LIMIT);
        assert_eq!(messages[0], "line 5");
        assert_eq!(
            messages.last().map(String::as_str),
            Some(format!("line {}", MESSAGE_LOG_LIMIT + 4).as_str())
        );
    }

    #[tokio::test]
    async fn test_move_and_operator_updates() {
        let world = world();
        let id = world.join("erin", false).await.unwrap();

        world.move_to(id, Position::new(30.0, 70.0, -12.0)).unwrap();
        world.set_operator(id, true).unwrap();

        let player = world.player(id).unwrap();
        assert_eq!(player.position, Position::new(30.0, 70.0, -12.0));
        assert!(world.is_operator(&CommandSender::Player(id)));
        assert!(world.move_to(PlayerId::new(), Position::new(0.0, 0.0, 0.0)).is_err());
    }
}
