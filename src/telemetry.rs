use serde::{Deserialize, Serialize};

/// Per-client, per-round measurements consumed by the sparsification controller.
///
/// `delay_inflation`, `delivery_rate` and `loss_pulse` are endpoint-network
/// readings that no producer fills in yet, they stay at zero until the
/// transport hooks report them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryStats {
    pub round_index: u64,
    pub client_id: u64,
    /// Total time spent by the client in this round, in seconds.
    pub duration: f64,
    pub local_compute_time: f64,
    pub upload_time: f64,
    /// Size of the model delta sent this round.
    pub bytes_uploaded: u64,
    /// Seconds per sample as reported by the learner.
    pub speed_per_sample: f64,
    pub num_samples: u64,

    #[serde(default)]
    pub delay_inflation: f64,
    #[serde(default)]
    pub delivery_rate: f64,
    #[serde(default)]
    pub loss_pulse: u64,
}

impl TelemetryStats {
    /// Creates a new `TelemetryStats` with the network readings zeroed.
    ///
    /// # Arguments
    /// * `round_index` - The round these measurements belong to.
    /// * `client_id` - The client that produced them.
    /// * `duration` - Total round time for the client.
    /// * `local_compute_time` - Time spent training locally.
    /// * `upload_time` - Time spent uploading the update.
    /// * `bytes_uploaded` - Bytes in the uploaded model delta.
    /// * `speed_per_sample` - Seconds per processed sample.
    /// * `num_samples` - Samples processed in this round.
    ///
    /// # Returns
    /// A new `TelemetryStats` instance.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        round_index: u64,
        client_id: u64,
        duration: f64,
        local_compute_time: f64,
        upload_time: f64,
        bytes_uploaded: u64,
        speed_per_sample: f64,
        num_samples: u64,
    ) -> Self {
        Self {
            round_index,
            client_id,
            duration,
            local_compute_time,
            upload_time,
            bytes_uploaded,
            speed_per_sample,
            num_samples,
            ..Default::default()
        }
    }

    /// Attaches endpoint-network readings to this record.
    pub fn with_network(mut self, delay_inflation: f64, delivery_rate: f64, loss_pulse: u64) -> Self {
        self.delay_inflation = delay_inflation;
        self.delivery_rate = delivery_rate;
        self.loss_pulse = loss_pulse;
        self
    }
}
