//! The per-tick health polling loop.

use crate::formula::health_percentage;
use crate::gateway::BorderGateway;
use crate::state::{SharedState, TintHealthState};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tint_event_system::{PlayerSnapshot, ServerContext};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, trace};

/// What one enabled cycle did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Cache entries dropped for players no longer online
    pub pruned: usize,
    /// Players whose border was pushed this cycle
    pub updated: usize,
    /// Players whose health matched the cache
    pub unchanged: usize,
}

/// Runs one cycle over a snapshot of the online players.
///
/// Returns `None` without touching anything when the feature is disabled.
/// Otherwise prunes the cache to `players`, then pushes a border update
/// for every player whose health differs from the cached value (an absent
/// entry always differs) and records the new value.
pub fn run_cycle(
    state: &mut TintHealthState,
    players: &[PlayerSnapshot],
    gateway: &BorderGateway,
) -> Option<TickReport> {
    if !state.border_enabled {
        return None;
    }

    let online: HashSet<_> = players.iter().map(|player| player.id).collect();
    let mut report = TickReport {
        pruned: state.health_cache.prune(&online),
        ..TickReport::default()
    };

    for player in players {
        if state.health_cache.get(player.id) == Some(player.health) {
            report.unchanged += 1;
            continue;
        }

        gateway.update(player, health_percentage(player.health, player.max_health));
        state.health_cache.set(player.id, player.health);
        report.updated += 1;
    }

    Some(report)
}

/// The recurring border task: snapshots the host and runs a cycle.
#[derive(Clone)]
pub struct BorderTask {
    state: SharedState,
    gateway: BorderGateway,
    context: Arc<dyn ServerContext>,
}

impl BorderTask {
    pub fn new(state: SharedState, gateway: BorderGateway, context: Arc<dyn ServerContext>) -> Self {
        Self {
            state,
            gateway,
            context,
        }
    }

    /// Runs a single cycle against the live host state.
    pub fn run(&self) -> Option<TickReport> {
        let mut state = self.state.lock();
        let players = self.context.online_players();
        let report = run_cycle(&mut state, &players, &self.gateway);

        if let Some(report) = report {
            if report.updated > 0 || report.pruned > 0 {
                trace!(
                    "🕒 Border tick: {} updated, {} unchanged, {} pruned",
                    report.updated,
                    report.unchanged,
                    report.pruned
                );
            }
        }
        report
    }
}

/// A named task re-run at a fixed period until cancelled.
///
/// Cancellation happens at most once; later calls are no-ops.
pub struct RepeatingTask {
    name: String,
    handle: Option<JoinHandle<()>>,
}

impl RepeatingTask {
    /// Spawns `job` on the current tokio runtime, first run immediately.
    ///
    /// A zero `period` is raised to one millisecond.
    pub fn spawn<F>(name: &str, period: Duration, mut job: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                job();
            }
        });

        debug!("🕒 Started repeating task '{}' every {:?}", name, period);
        Self {
            name: name.to_string(),
            handle: Some(handle),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the task has been started and not cancelled.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stops the task.
    ///
    /// # Returns
    ///
    /// `true` if this call cancelled it, `false` if it was already cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                handle.abort();
                debug!("🛑 Cancelled repeating task '{}'", self.name);
                true
            }
            None => false,
        }
    }
}

impl Drop for RepeatingTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
