use std::{env, process};

use actix::System;
use anyhow::Context;

use rtks::{parse_round_log, replay, ControllerConfig, DynController};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <controller.json> <rounds.json>", args[0]);
        process::exit(1);
    }

    let config = ControllerConfig::from_json_file(&args[1])
        .with_context(|| format!("cannot load controller config '{}'", args[1]))?;
    let controller = config.build()?;
    let rounds_path = args[2].clone();

    System::new().block_on(run(controller, rounds_path))
}

/// Replays the round log at `path` and prints one JSON line per decision.
async fn run(controller: DynController, path: String) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("cannot read '{path}'"))?;

    let records = parse_round_log(&content).with_context(|| format!("invalid round log '{path}'"))?;

    for decision in replay(controller, records).await? {
        println!("{}", serde_json::to_string(&decision)?);
    }

    Ok(())
}
