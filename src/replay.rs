//! Replays a recorded round log through a controller actor.

use actix::{Actor, Addr};
use futures::future::try_join_all;
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    controller::{ApplyEnvelope, ChooseLevel, ControllerActor, LevelPolicy, RtksController},
    error::Result,
    telemetry::TelemetryStats,
    utility::{build_client_utility, estimate_simple_cost, ClientUtility},
};

/// One client's report for one round, as found in a round log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub telemetry: TelemetryStats,
    pub loss: f64,
    pub gradient_l2_norm: f64,
    #[serde(default)]
    pub data_diversity_score: Option<f64>,
    /// Byte budget for this update, the envelope stage is skipped without one.
    #[serde(default)]
    pub envelope_bytes: Option<u64>,
    #[serde(default)]
    pub estimated_bytes_per_level: Vec<u64>,
}

/// What the controller decided for one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub round_index: u64,
    pub utility: ClientUtility,
    pub cost: f64,
    pub level_index: usize,
    pub level_fraction: Option<f64>,
}

/// Parses a JSON array of `RoundRecord`s.
pub fn parse_round_log(json: &str) -> Result<Vec<RoundRecord>> {
    Ok(serde_json::from_str(json)?)
}

/// Replays `records` through `controller`, one round at a time.
///
/// Records are grouped by round index in ascending order, keeping the log's
/// order inside a round. The records of a round are dispatched to the
/// controller actor concurrently.
///
/// # Arguments
/// * `controller` - The controller to drive, it's moved into a new actor.
/// * `records` - The round log, in any order.
///
/// # Returns
/// One decision per record, ordered by round, or a `Mailbox` error if the
/// actor stopped answering.
pub async fn replay<P>(
    controller: RtksController<P>,
    mut records: Vec<RoundRecord>,
) -> Result<Vec<Decision>>
where
    P: LevelPolicy + Unpin + 'static,
{
    records.sort_by_key(|r| r.telemetry.round_index);

    let levels = controller.levels().to_vec();
    let addr = ControllerActor::new(controller).start();
    let mut decisions = Vec::with_capacity(records.len());

    for round in records.chunk_by(|a, b| a.telemetry.round_index == b.telemetry.round_index) {
        info!("replaying round {} with {} clients", round[0].telemetry.round_index, round.len());

        let round_decisions =
            try_join_all(round.iter().map(|record| decide(&addr, &levels, record))).await?;
        decisions.extend(round_decisions);
    }

    Ok(decisions)
}

async fn decide<P>(
    addr: &Addr<ControllerActor<P>>,
    levels: &[f64],
    record: &RoundRecord,
) -> Result<Decision>
where
    P: LevelPolicy + Unpin + 'static,
{
    let telemetry = &record.telemetry;
    let client_id = telemetry.client_id;

    let utility = build_client_utility(
        client_id.to_string(),
        record.loss,
        telemetry.num_samples,
        record.gradient_l2_norm,
        telemetry.duration,
        record.data_diversity_score,
    );

    let base = addr
        .send(ChooseLevel {
            client_id,
            telemetry: telemetry.clone(),
        })
        .await?;

    let level_index = match record.envelope_bytes {
        Some(envelope_bytes) => {
            addr.send(ApplyEnvelope {
                client_id,
                base_level_index: base,
                envelope_bytes,
                estimated_bytes_per_level: record.estimated_bytes_per_level.clone(),
            })
            .await?
        }
        None => base,
    };

    Ok(Decision {
        round_index: telemetry.round_index,
        cost: estimate_simple_cost(&utility),
        utility,
        level_index,
        level_fraction: levels.get(level_index).copied(),
    })
}
