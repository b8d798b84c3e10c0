//! Recording fakes for the host and the border service.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tint_event_system::{
    create_tint_event_system, CommandRegistry, CommandSender, EventSystem, LogLevel, PlayerId,
    PlayerSnapshot, Position, ServerContext, ServerError, ServiceRegistry, WorldBorder,
    WorldBorderAction, WorldBorderApi,
};

/// A healthy-looking non-operator in the overworld.
pub fn player(name: &str, health: f64) -> PlayerSnapshot {
    PlayerSnapshot {
        id: PlayerId::new(),
        name: name.to_string(),
        world: "overworld".to_string(),
        health,
        max_health: Some(20.0),
        position: Position::new(0.0, 64.0, 0.0),
        is_operator: false,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BorderCall {
    Send {
        player_id: PlayerId,
        action: WorldBorderAction,
        border: WorldBorder,
    },
    Reset {
        player_id: PlayerId,
    },
}

/// Border service that remembers every call it receives.
#[derive(Default)]
pub struct RecordingBorderApi {
    calls: Mutex<Vec<BorderCall>>,
    borders: Mutex<HashMap<PlayerId, WorldBorder>>,
}

impl RecordingBorderApi {
    pub fn calls(&self) -> Vec<BorderCall> {
        self.calls.lock().clone()
    }

    /// Forgets recorded calls; stored borders are kept.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn actions_for(&self, player_id: PlayerId) -> Vec<WorldBorderAction> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                BorderCall::Send {
                    player_id: id,
                    action,
                    ..
                } if *id == player_id => Some(*action),
                _ => None,
            })
            .collect()
    }

    pub fn count_action(&self, player_id: PlayerId, action: WorldBorderAction) -> usize {
        self.actions_for(player_id)
            .into_iter()
            .filter(|a| *a == action)
            .count()
    }

    /// The player's stored override, if any.
    pub fn current(&self, player_id: PlayerId) -> Option<WorldBorder> {
        self.borders.lock().get(&player_id).cloned()
    }
}

impl WorldBorderApi for RecordingBorderApi {
    fn world_border(&self, player_id: PlayerId) -> WorldBorder {
        self.current(player_id).unwrap_or_default()
    }

    fn send(&self, player_id: PlayerId, border: &WorldBorder, action: WorldBorderAction) {
        self.borders.lock().insert(player_id, border.clone());
        self.calls.lock().push(BorderCall::Send {
            player_id,
            action,
            border: border.clone(),
        });
    }

    fn reset_world_border_to_global(&self, player_id: PlayerId) {
        self.borders.lock().remove(&player_id);
        self.calls.lock().push(BorderCall::Reset { player_id });
    }
}

/// In-memory host that records messages and logs.
pub struct FakeServer {
    events: Arc<EventSystem>,
    services: Arc<ServiceRegistry>,
    commands: Arc<CommandRegistry>,
    data_dir: PathBuf,
    players: Mutex<Vec<PlayerSnapshot>>,
    messages: Mutex<Vec<(CommandSender, String)>>,
    logs: Mutex<Vec<(LogLevel, String)>>,
}

impl FakeServer {
    pub fn new() -> Self {
        Self::with_data_dir(std::env::temp_dir().join("tinthealth-fake-server"))
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            events: create_tint_event_system(),
            services: Arc::new(ServiceRegistry::new()),
            commands: Arc::new(CommandRegistry::new()),
            data_dir,
            players: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            logs: Mutex::new(Vec::new()),
        }
    }

    pub fn add_player(&self, snapshot: PlayerSnapshot) -> PlayerId {
        let id = snapshot.id;
        self.players.lock().push(snapshot);
        id
    }

    pub fn remove_player(&self, player_id: PlayerId) {
        self.players.lock().retain(|p| p.id != player_id);
    }

    pub fn set_health(&self, player_id: PlayerId, health: f64) {
        if let Some(p) = self.players.lock().iter_mut().find(|p| p.id == player_id) {
            p.health = health;
        }
    }

    pub fn move_player(&self, player_id: PlayerId, position: Position) {
        if let Some(p) = self.players.lock().iter_mut().find(|p| p.id == player_id) {
            p.position = position;
        }
    }

    pub fn set_world(&self, player_id: PlayerId, world: &str) {
        if let Some(p) = self.players.lock().iter_mut().find(|p| p.id == player_id) {
            p.world = world.to_string();
        }
    }

    pub fn health_of(&self, player_id: PlayerId) -> Option<f64> {
        self.player(player_id).map(|p| p.health)
    }

    pub fn messages_for(&self, target: &CommandSender) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(to, _)| to == target)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn logs_at(&self, level: LogLevel) -> Vec<String> {
        self.logs
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

impl ServerContext for FakeServer {
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
        self.logs.lock().push((level, message.to_string()));
    }

    fn online_players(&self) -> Vec<PlayerSnapshot> {
        self.players.lock().clone()
    }

    fn player(&self, player_id: PlayerId) -> Option<PlayerSnapshot> {
        self.players
            .lock()
            .iter()
            .find(|p| p.id == player_id)
            .cloned()
    }

    fn set_player_health(&self, player_id: PlayerId, health: f64) -> Result<(), ServerError> {
        let mut players = self.players.lock();
        let p = players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or(ServerError::PlayerNotFound(player_id))?;
        p.health = health;
        Ok(())
    }

    fn is_operator(&self, sender: &CommandSender) -> bool {
        match sender {
            CommandSender::Console => true,
            CommandSender::Player(id) => self.player(*id).map(|p| p.is_operator).unwrap_or(false),
        }
    }

    fn send_message(&self, target: &CommandSender, message: &str) {
        self.messages.lock().push((*target, message.to_string()));
    }

    fn data_dir(&self) -> PathBuf {
        self.data_dir.clone()
    }
}
