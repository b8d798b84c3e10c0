//! The `/tinthealth` operator command.
//!
//! ```text
//! /tinthealth enable       turn the health border on for everyone
//! /tinthealth disable      restore everyone's global border
//! /tinthealth sethp <hp>   set your own health (testing aid)
//! ```

use crate::error::CommandError;
use crate::formula::effective_max_health;
use crate::lifecycle::{LifecycleController, Transition};
use crate::state::SharedState;
use tint_event_system::{CommandExecutor, CommandSender, ServerContext};
use tracing::{info, warn};

pub const COMMAND_NAME: &str = "tinthealth";
pub const COMMAND_USAGE: &str = "/tinthealth <enable|disable|sethp <hp>>";

/// Prefix of every reply the command sends
pub const MESSAGE_PREFIX: &str = "[TintHealth] ";

/// Executor registered under [`COMMAND_NAME`].
pub struct TintHealthCommand {
    state: SharedState,
    lifecycle: LifecycleController,
}

impl TintHealthCommand {
    pub fn new(state: SharedState, lifecycle: LifecycleController) -> Self {
        Self { state, lifecycle }
    }

    fn enable(&self, context: &dyn ServerContext, sender: &CommandSender) {
        let transition = {
            let mut state = self.state.lock();
            let players = context.online_players();
            self.lifecycle.enable(&mut state, &players)
        };

        match transition {
            Transition::Enabled => {
                info!("🟥 {} enabled the health border", sender);
                reply(context, sender, "Enabled TintHealth Border");
                reply(
                    context,
                    sender,
                    "This means that some worldborder features of other plugins may be broken.",
                );
            }
            _ => reply(context, sender, "The Border is already enabled!"),
        }
    }

    fn disable(&self, context: &dyn ServerContext, sender: &CommandSender) {
        let transition = {
            let mut state = self.state.lock();
            let players = context.online_players();
            self.lifecycle.disable(&mut state, &players)
        };

        match transition {
            Transition::Disabled => {
                info!("⬜ {} disabled the health border", sender);
                reply(context, sender, "Disabled TintHealth Border");
            }
            _ => reply(context, sender, "The Border is already disabled!"),
        }
    }

    fn set_health(
        &self,
        context: &dyn ServerContext,
        sender: &CommandSender,
        raw: Option<&str>,
    ) -> Result<f64, CommandError> {
        let player = sender
            .player_id()
            .and_then(|id| context.player(id))
            .ok_or(CommandError::NotAPlayer)?;
        let raw = raw.ok_or(CommandError::MissingHealthValue)?;

        let health = parse_health(raw)?;
        validate_health(health, raw, player.max_health)?;

        context
            .set_player_health(player.id, health)
            .map_err(|e| CommandError::HostRejected(e.to_string()))?;
        Ok(health)
    }
}

impl CommandExecutor for TintHealthCommand {
    fn execute(
        &self,
        context: &dyn ServerContext,
        sender: &CommandSender,
        _label: &str,
        args: &[&str],
    ) -> bool {
        if !context.is_operator(sender) {
            return false;
        }
        let Some(subcommand) = args.first() else {
            return false;
        };

        match subcommand.to_lowercase().as_str() {
            "enable" => self.enable(context, sender),
            "disable" => self.disable(context, sender),
            "sethp" => match self.set_health(context, sender, args.get(1).copied()) {
                Ok(health) => reply(context, sender, &format!("Set your health to {} HP.", health)),
                Err(e) => {
                    warn!("sethp from {} rejected: {}", sender, e);
                    reply(context, sender, &e.to_string());
                }
            },
            _ => return false,
        }
        true
    }
}

/// Parses an operator-supplied health value.
///
/// # Errors
///
/// `NotANumber` for anything that is not a finite real number,
/// `NegativeHealth` for values below zero.
pub fn parse_health(raw: &str) -> Result<f64, CommandError> {
    let health: f64 = raw
        .parse()
        .map_err(|_| CommandError::NotANumber(raw.to_string()))?;

    if !health.is_finite() {
        return Err(CommandError::NotANumber(raw.to_string()));
    }
    if health < 0.0 {
        return Err(CommandError::NegativeHealth(raw.to_string()));
    }
    Ok(health)
}

/// Rejects values at or above the player's (default-substituted) max health.
pub fn validate_health(health: f64, raw: &str, max_health: Option<f64>) -> Result<(), CommandError> {
    let max = effective_max_health(max_health);
    if health >= max {
        return Err(CommandError::ExceedsMaxHealth {
            requested: raw.to_string(),
            max,
        });
    }
    Ok(())
}

fn reply(context: &dyn ServerContext, sender: &CommandSender, text: &str) {
    context.send_message(sender, &format!("{}{}", MESSAGE_PREFIX, text));
}
