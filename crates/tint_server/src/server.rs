//! The simulation host: owns the world, the border provider and the plugin.

use crate::config::AppConfig;
use crate::console::{self, ConsoleCommand};
use crate::renderer::InMemoryBorderRenderer;
use crate::signals::wait_for_shutdown_signal;
use crate::world::SimulatedWorld;
use plugin_tint_health::{SharedState, TintHealthPlugin};
use std::sync::Arc;
use std::time::Duration;
use tint_event_system::{
    CommandSender, DispatchError, DisconnectReason, PlayerDisconnectedEvent, PlayerId,
    PluginError, Position, ServerContext, SimplePlugin, WorldBorderApi,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{error, info, trace, warn};

/// Whether the console loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleFlow {
    Continue,
    Stop,
}

pub struct TintServer {
    config: AppConfig,
    world: Arc<SimulatedWorld>,
    renderer: Arc<InMemoryBorderRenderer>,
    plugin: TintHealthPlugin,
    demo: Option<JoinHandle<()>>,
    started: bool,
}

impl TintServer {
    /// Builds the world and registers the border provider service.
    pub fn new(config: AppConfig) -> Self {
        let world = Arc::new(SimulatedWorld::new(
            config.data_dir(),
            &config.server.default_world,
        ));
        let renderer = Arc::new(InMemoryBorderRenderer::new());
        world
            .services()
            .register::<dyn WorldBorderApi>(renderer.clone());

        Self {
            config,
            world,
            renderer,
            plugin: TintHealthPlugin::new(),
            demo: None,
            started: false,
        }
    }

    pub fn world(&self) -> Arc<SimulatedWorld> {
        self.world.clone()
    }

    pub fn renderer(&self) -> Arc<InMemoryBorderRenderer> {
        self.renderer.clone()
    }

    pub fn plugin_state(&self) -> SharedState {
        self.plugin.state()
    }

    /// Loads the plugin: handler registration, then initialization.
    ///
    /// The renderer forgets a player's border state once they disconnect.
    pub async fn start(&mut self) -> Result<(), PluginError> {
        let context: Arc<dyn ServerContext> = self.world.clone();

        let renderer = self.renderer.clone();
        self.world
            .events()
            .on_core("player_disconnected", move |event: PlayerDisconnectedEvent| {
                renderer.forget(event.player_id);
                Ok(())
            })
            .await
            .map_err(|e| PluginError::InitializationFailed(e.to_string()))?;

        info!("🔌 Loading plugin {} v{}", self.plugin.name(), self.plugin.version());
        self.plugin
            .register_handlers(self.world.events(), context.clone())
            .await?;
        self.plugin.on_init(context).await?;
        self.started = true;

        info!("✅ Plugin {} is active", self.plugin.name());
        Ok(())
    }

    /// Spawns the configured demo players and their damage cycle.
    ///
    /// Each cycle removes `damage_amount` from every demo player; a player
    /// that reaches zero health is healed back to full.
    pub async fn spawn_demo_players(&mut self) -> anyhow::Result<()> {
        let settings = self.config.simulation.clone();
        if settings.demo_players == 0 {
            return Ok(());
        }

        let mut ids = Vec::with_capacity(settings.demo_players);
        for n in 1..=settings.demo_players {
            ids.push(self.world.join(&format!("demo{}", n), false).await?);
        }
        info!("🤖 Spawned {} demo players", ids.len());

        let world = self.world.clone();
        self.demo = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(settings.damage_interval_ms));
            ticker.tick().await;
            loop {
                ticker.tick().await;
                for id in &ids {
                    match world.damage(*id, settings.damage_amount) {
                        Ok(health) if health <= 0.0 => {
                            if let Err(e) = world.heal(*id, f64::MAX) {
                                warn!("⚠️ Could not respawn demo player: {}", e);
                            }
                        }
                        Ok(_) => {}
                        // left via the console
                        Err(e) => trace!("Skipping demo player: {}", e),
                    }
                }
            }
        }));
        Ok(())
    }

    /// Executes one console line.
    pub async fn handle_console_line(&self, line: &str) -> ConsoleFlow {
        let command = match console::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return ConsoleFlow::Continue,
            Err(e) => {
                warn!("{}", e);
                return ConsoleFlow::Continue;
            }
        };

        match command {
            ConsoleCommand::Plugin { as_player, line } => {
                let sender = match as_player {
                    None => CommandSender::Console,
                    Some(name) => match self.world.find_by_name(&name) {
                        Some(id) => CommandSender::Player(id),
                        None => {
                            warn!("No player named {}", name);
                            return ConsoleFlow::Continue;
                        }
                    },
                };
                self.dispatch(&sender, &line);
            }
            ConsoleCommand::Join { name, operator } => {
                if let Err(e) = self.world.join(&name, operator).await {
                    warn!("{}", e);
                }
            }
            ConsoleCommand::Leave { name } => {
                if let Some(id) = self.lookup(&name) {
                    if let Err(e) = self.world.leave(id, DisconnectReason::ClientDisconnect).await {
                        warn!("{}", e);
                    }
                }
            }
            ConsoleCommand::World { name, world } => {
                if let Some(id) = self.lookup(&name) {
                    if let Err(e) = self.world.change_world(id, &world).await {
                        warn!("{}", e);
                    }
                }
            }
            ConsoleCommand::Move { name, x, z } => {
                if let Some(player) = self.lookup(&name).and_then(|id| self.world.player(id)) {
                    let position = Position::new(x, player.position.y, z);
                    match self.world.move_to(player.id, position) {
                        Ok(()) => info!("📍 {} moved to {:.1}/{:.1}", name, x, z),
                        Err(e) => warn!("{}", e),
                    }
                }
            }
            ConsoleCommand::Operator { name, operator } => {
                if let Some(id) = self.lookup(&name) {
                    match self.world.set_operator(id, operator) {
                        Ok(()) if operator => info!("🛡️ {} is now an operator", name),
                        Ok(()) => info!("🛡️ {} is no longer an operator", name),
                        Err(e) => warn!("{}", e),
                    }
                }
            }
            ConsoleCommand::Damage { name, amount } => {
                if let Some(id) = self.lookup(&name) {
                    match self.world.damage(id, amount) {
                        Ok(health) => info!("❤️ {} is at {} HP", name, health),
                        Err(e) => warn!("{}", e),
                    }
                }
            }
            ConsoleCommand::Heal { name, amount } => {
                if let Some(id) = self.lookup(&name) {
                    match self.world.heal(id, amount) {
                        Ok(health) => info!("❤️ {} is at {} HP", name, health),
                        Err(e) => warn!("{}", e),
                    }
                }
            }
            ConsoleCommand::List => self.list_players(),
            ConsoleCommand::Help => info!("{}", console::HELP),
            ConsoleCommand::Stop => return ConsoleFlow::Stop,
        }
        ConsoleFlow::Continue
    }

    fn dispatch(&self, sender: &CommandSender, line: &str) {
        let commands = self.world.commands();
        match commands.dispatch(self.world.as_ref(), sender, line) {
            Ok(true) => {}
            Ok(false) => {
                let label = line.trim_start_matches('/').split_whitespace().next().unwrap_or("");
                let usage = commands.usage(label).unwrap_or_default();
                self.world.send_message(sender, &format!("Usage: {}", usage));
            }
            Err(DispatchError::EmptyCommand) => {}
            Err(e @ DispatchError::UnknownCommand(_)) => self.world.send_message(sender, &e.to_string()),
        }
    }

    fn lookup(&self, name: &str) -> Option<PlayerId> {
        let id = self.world.find_by_name(name);
        if id.is_none() {
            warn!("No player named {}", name);
        }
        id
    }

    fn list_players(&self) {
        let mut players = self.world.online_players();
        players.sort_by(|a, b| a.name.cmp(&b.name));
        info!("👥 {} players online", players.len());
        for player in players {
            let warning = self
                .renderer
                .border_of(player.id)
                .map(|border| border.warning_blocks.to_string())
                .unwrap_or_else(|| "global".to_string());
            info!(
                "  {}{} in {} at {}/{} HP, border warning {}",
                player.name,
                if player.is_operator { " (op)" } else { "" },
                player.world,
                player.health,
                player.max_health.unwrap_or(crate::world::SPAWN_HEALTH),
                warning
            );
        }
    }

    /// Stops the demo, shuts the plugin down and disconnects everyone.
    pub async fn shutdown(&mut self) -> Result<(), PluginError> {
        if let Some(demo) = self.demo.take() {
            demo.abort();
        }

        let result = if self.started {
            self.started = false;
            let context: Arc<dyn ServerContext> = self.world.clone();
            self.plugin.on_shutdown(context).await
        } else {
            Ok(())
        };

        self.world.disconnect_all().await;
        result
    }

    /// Runs until `stop`, end of input, or a termination signal.
    pub async fn run(mut self) -> anyhow::Result<()> {
        self.start().await?;
        self.spawn_demo_players().await?;

        info!("✅ {} is now running", self.config.server.name);
        info!("⌨️ Type 'help' for console commands, 'stop' or Ctrl+C to exit");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let shutdown = wait_for_shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                result = &mut shutdown => {
                    if let Err(e) = result {
                        error!("❌ Signal handling failed: {}", e);
                    }
                    break;
                }
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if self.handle_console_line(&line).await == ConsoleFlow::Stop {
                            break;
                        }
                    }
                    Ok(None) => {
                        info!("Console closed");
                        // Keep serving until a signal arrives.
                        if let Err(e) = (&mut shutdown).await {
                            error!("❌ Signal handling failed: {}", e);
                        }
                        break;
                    }
                    Err(e) => {
                        error!("❌ Failed to read console input: {}", e);
                        break;
                    }
                },
            }
        }

        info!("🛑 Shutting down...");
        self.shutdown().await?;
        info!("👋 Shutdown complete");
        Ok(())
    }
}
