use actix::prelude::*;
use log::debug;

use super::{ClientState, LevelPolicy, RtksController};
use crate::telemetry::TelemetryStats;

/* -------------------------------------------------------------------------- */
/*                               Actix messages                               */
/* -------------------------------------------------------------------------- */

/// Asks the controller for a client's level this round.
#[derive(Debug, Message)]
#[rtype(result = "usize")]
pub struct ChooseLevel {
    pub client_id: u64,
    pub telemetry: TelemetryStats,
}

/// Asks the controller to fit a chosen level into a byte envelope.
#[derive(Debug, Message)]
#[rtype(result = "usize")]
pub struct ApplyEnvelope {
    pub client_id: u64,
    pub base_level_index: usize,
    pub envelope_bytes: u64,
    pub estimated_bytes_per_level: Vec<u64>,
}

/// Asks for a copy of the configured ladder.
#[derive(Debug, Message)]
#[rtype(result = "Vec<f64>")]
pub struct GetLevels;

/// Asks for a snapshot of a client's state.
#[derive(Debug, Message)]
#[rtype(result = "Option<ClientState>")]
pub struct GetClientState(pub u64);

/* -------------------------------------------------------------------------- */
/*                              Controller actor                              */
/* -------------------------------------------------------------------------- */

/// Owns an `RtksController` and serializes every request through its mailbox,
/// so many round workers can schedule clients concurrently.
pub struct ControllerActor<P> {
    controller: RtksController<P>,
}

impl<P> ControllerActor<P>
where
    P: LevelPolicy + Unpin + 'static,
{
    /// Creates a new `ControllerActor`, start it with `Actor::start`.
    pub fn new(controller: RtksController<P>) -> Self {
        Self { controller }
    }
}

impl<P> Actor for ControllerActor<P>
where
    P: LevelPolicy + Unpin + 'static,
{
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        debug!("controller actor started with {} levels", self.controller.levels().len());
    }
}

impl<P> Handler<ChooseLevel> for ControllerActor<P>
where
    P: LevelPolicy + Unpin + 'static,
{
    type Result = usize;

    fn handle(&mut self, msg: ChooseLevel, _ctx: &mut Self::Context) -> usize {
        self.controller.choose_level(msg.client_id, &msg.telemetry)
    }
}

impl<P> Handler<ApplyEnvelope> for ControllerActor<P>
where
    P: LevelPolicy + Unpin + 'static,
{
    type Result = usize;

    fn handle(&mut self, msg: ApplyEnvelope, _ctx: &mut Self::Context) -> usize {
        self.controller.apply_envelope(
            msg.client_id,
            msg.base_level_index,
            msg.envelope_bytes,
            &msg.estimated_bytes_per_level,
        )
    }
}

impl<P> Handler<GetLevels> for ControllerActor<P>
where
    P: LevelPolicy + Unpin + 'static,
{
    type Result = MessageResult<GetLevels>;

    fn handle(&mut self, _msg: GetLevels, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.controller.levels().to_vec())
    }
}

impl<P> Handler<GetClientState> for ControllerActor<P>
where
    P: LevelPolicy + Unpin + 'static,
{
    type Result = MessageResult<GetClientState>;

    fn handle(&mut self, msg: GetClientState, _ctx: &mut Self::Context) -> Self::Result {
        MessageResult(self.controller.state(msg.0).copied())
    }
}
