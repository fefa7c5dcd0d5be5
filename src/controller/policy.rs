use log::warn;

use super::ClientState;
use crate::telemetry::TelemetryStats;

/// A `LevelPolicy` decides which rung of the sparsity ladder a client should use.
///
/// Index `0` is the densest level and `levels.len() - 1` the sparsest.
pub trait LevelPolicy {
    /// Should pick the level for a client given this round's telemetry.
    ///
    /// # Arguments
    /// * `client_id` - The client being scheduled.
    /// * `state` - The client's current state.
    /// * `levels` - The configured ladder, densest first.
    /// * `telemetry` - The client's measurements for this round.
    ///
    /// # Returns
    /// The desired ladder index, the controller clamps it into the ladder.
    fn choose(
        &mut self,
        client_id: u64,
        state: &ClientState,
        levels: &[f64],
        telemetry: &TelemetryStats,
    ) -> usize;

    /// Should adjust a chosen level so the client's update fits a byte budget.
    ///
    /// # Arguments
    /// * `client_id` - The client being scheduled.
    /// * `base_level_index` - The index previously returned by `choose`.
    /// * `levels` - The configured ladder, densest first.
    /// * `envelope_bytes` - The maximum bytes allowed for this round's update.
    /// * `estimated_bytes_per_level` - The estimated update size at each level.
    ///
    /// # Returns
    /// The possibly adjusted ladder index.
    fn envelope(
        &self,
        client_id: u64,
        base_level_index: usize,
        levels: &[f64],
        envelope_bytes: u64,
        estimated_bytes_per_level: &[u64],
    ) -> usize;
}

impl<P: LevelPolicy + ?Sized> LevelPolicy for Box<P> {
    fn choose(
        &mut self,
        client_id: u64,
        state: &ClientState,
        levels: &[f64],
        telemetry: &TelemetryStats,
    ) -> usize {
        (**self).choose(client_id, state, levels, telemetry)
    }

    fn envelope(
        &self,
        client_id: u64,
        base_level_index: usize,
        levels: &[f64],
        envelope_bytes: u64,
        estimated_bytes_per_level: &[u64],
    ) -> usize {
        (**self).envelope(
            client_id,
            base_level_index,
            levels,
            envelope_bytes,
            estimated_bytes_per_level,
        )
    }
}

/// Keeps every client where it is and ignores the byte envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityPolicy;

impl LevelPolicy for IdentityPolicy {
    fn choose(&mut self, _: u64, state: &ClientState, _: &[f64], _: &TelemetryStats) -> usize {
        state.level_index()
    }

    fn envelope(&self, _: u64, base_level_index: usize, _: &[f64], _: u64, _: &[u64]) -> usize {
        base_level_index
    }
}

/// Keeps the chosen level unless its estimated size exceeds the envelope, in
/// which case it walks toward sparser levels until one fits.
///
/// When not even the sparsest level fits, the sparsest level is returned. A
/// base index past the end of the ladder is treated as the sparsest level, and
/// estimates that don't cover the ladder leave the base where it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteEnvelopePolicy;

impl LevelPolicy for ByteEnvelopePolicy {
    fn choose(&mut self, _: u64, state: &ClientState, _: &[f64], _: &TelemetryStats) -> usize {
        state.level_index()
    }

    fn envelope(
        &self,
        client_id: u64,
        base_level_index: usize,
        levels: &[f64],
        envelope_bytes: u64,
        estimated_bytes_per_level: &[u64],
    ) -> usize {
        let sparsest = levels.len().saturating_sub(1);
        let start = base_level_index.min(sparsest);

        if estimated_bytes_per_level.len() != levels.len() {
            warn!(
                client_id = client_id;
                "byte estimates cover {} levels but the ladder has {}, keeping level {start}",
                estimated_bytes_per_level.len(),
                levels.len()
            );
            return start;
        }

        match estimated_bytes_per_level[start..]
            .iter()
            .position(|&bytes| bytes <= envelope_bytes)
        {
            Some(offset) => start + offset,
            None => {
                warn!(
                    client_id = client_id, envelope_bytes = envelope_bytes;
                    "no level fits the byte envelope, falling back to the sparsest level"
                );
                sparsest
            }
        }
    }
}
