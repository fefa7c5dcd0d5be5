//! Reverse Top-k sparsification (RTkS) controller.
//!
//! The controller maps per-client telemetry into a rung of a sparsity ladder
//! and then adjusts that rung to a per-round byte envelope. Both decisions are
//! delegated to a [`LevelPolicy`], the controller owns the per-client state and
//! keeps every stored level inside the ladder.

mod actor;
mod policy;
mod state;

use std::collections::HashMap;

use log::{debug, info};

pub use actor::{ApplyEnvelope, ChooseLevel, ControllerActor, GetClientState, GetLevels};
pub use policy::{ByteEnvelopePolicy, IdentityPolicy, LevelPolicy};
pub use state::ClientState;

use crate::{
    error::{Result, RtksError},
    telemetry::TelemetryStats,
};

/// Chooses a sparsity level per client over a fixed ladder of fractions.
///
/// Not synchronized, wrap it in a [`ControllerActor`] to share it between tasks.
#[derive(Debug)]
pub struct RtksController<P = IdentityPolicy> {
    levels: Vec<f64>,
    clients: HashMap<u64, ClientState>,
    policy: P,
}

impl RtksController<IdentityPolicy> {
    /// Creates a new controller that keeps every client at its current level.
    ///
    /// # Arguments
    /// * `levels` - Sparsity fractions ordered from densest to sparsest.
    ///
    /// # Returns
    /// A new `RtksController` or an `InvalidConfig` error if `levels` is empty.
    pub fn new(levels: Vec<f64>) -> Result<Self> {
        Self::with_policy(levels, IdentityPolicy)
    }
}

impl<P: LevelPolicy> RtksController<P> {
    /// Creates a new controller driven by `policy`.
    ///
    /// # Arguments
    /// * `levels` - Sparsity fractions ordered from densest to sparsest.
    /// * `policy` - The level selection strategy.
    ///
    /// # Returns
    /// A new `RtksController` or an `InvalidConfig` error if `levels` is empty.
    pub fn with_policy(levels: Vec<f64>, policy: P) -> Result<Self> {
        if levels.is_empty() {
            return Err(RtksError::InvalidConfig(
                "sparsity ladder must have at least one level".into(),
            ));
        }

        Ok(Self {
            levels,
            clients: HashMap::new(),
            policy,
        })
    }

    /// Returns the configured ladder, densest first.
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// Returns the fraction kept at `index`, if it is a valid ladder index.
    pub fn level_fraction(&self, index: usize) -> Option<f64> {
        self.levels.get(index).copied()
    }

    /// Returns the level selection strategy driving this controller.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Returns the state of a client, if the controller has seen it.
    pub fn state(&self, client_id: u64) -> Option<&ClientState> {
        self.clients.get(&client_id)
    }

    /// Returns how many clients the controller is tracking.
    pub fn num_clients(&self) -> usize {
        self.clients.len()
    }

    /// Chooses the sparsity level for a client in the round described by `telemetry`.
    ///
    /// Clients seen for the first time start at the densest level.
    ///
    /// # Arguments
    /// * `client_id` - The client being scheduled.
    /// * `telemetry` - The client's measurements for this round.
    ///
    /// # Returns
    /// An index into `levels()`.
    pub fn choose_level(&mut self, client_id: u64, telemetry: &TelemetryStats) -> usize {
        let round = telemetry.round_index;
        let last = self.levels.len() - 1;

        let state = self.clients.entry(client_id).or_insert_with(|| {
            debug!(client_id = client_id, round = round; "tracking new client at the densest level");
            ClientState::densest(round)
        });

        let wanted = self
            .policy
            .choose(client_id, state, &self.levels, telemetry)
            .min(last);

        if state.transition(wanted, round) {
            info!(client_id = client_id, round = round; "moved to sparsity level {wanted}");
        }

        state.level_index()
    }

    /// Adjusts `base_level_index` so the client's update respects a byte envelope.
    ///
    /// # Arguments
    /// * `client_id` - The client being scheduled.
    /// * `base_level_index` - The index returned by `choose_level`.
    /// * `envelope_bytes` - Maximum bytes allowed for this round's update.
    /// * `estimated_bytes_per_level` - Estimated update size per level, indexed like `levels()`.
    ///
    /// # Returns
    /// The level index decided by the policy. With the `IdentityPolicy` this is
    /// always `base_level_index`.
    pub fn apply_envelope(
        &self,
        client_id: u64,
        base_level_index: usize,
        envelope_bytes: u64,
        estimated_bytes_per_level: &[u64],
    ) -> usize {
        self.policy.envelope(
            client_id,
            base_level_index,
            &self.levels,
            envelope_bytes,
            estimated_bytes_per_level,
        )
    }
}
