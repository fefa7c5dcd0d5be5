//! Client-side signals for a federated learning parameter server: Oort-style
//! client utilities, per-round client telemetry, and the reverse Top-k
//! sparsification (RTkS) level controller.

pub mod config;
pub mod controller;
pub mod error;
pub mod replay;
pub mod telemetry;
pub mod utility;

pub use config::{
    geometric_ladder, ControllerConfig, DynController, LadderConfig, PolicyConfig, MAX_LADDER_STEPS,
};
pub use controller::{
    ApplyEnvelope, ByteEnvelopePolicy, ChooseLevel, ClientState, ControllerActor, GetClientState,
    GetLevels, IdentityPolicy, LevelPolicy, RtksController,
};
pub use error::{Result, RtksError};
pub use replay::{parse_round_log, replay, Decision, RoundRecord};
pub use telemetry::TelemetryStats;
pub use utility::{build_client_utility, estimate_simple_cost, ClientUtility};
