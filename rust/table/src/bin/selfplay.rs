//! Plays a full match at one table with the baseline strategy in the human
//! seat, then prints the final snapshot as JSON.
//!
//! Usage: cargo run -p mille-table --bin mille-selfplay
//!
//! Settings come from `MILLE_CONFIG`, `MILLE_SEED`, `MILLE_AI`,
//! `MILLE_THINK_MS` and `MILLE_MATCH_TARGET`.

use mille_ai::baseline::BaselineAI;
use mille_ai::{seat_to_act, Decision, Strategy};
use mille_engine::game::Phase;
use mille_engine::player::Seat;
use mille_table::{init_logging, settings, LogFormat, SessionManager, Table};
use std::sync::Arc;

// A round that runs this long has stopped making progress
const MAX_STEPS_PER_ROUND: usize = 2_000;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LogFormat::from_env())?;

    let resolved = settings::load_with_sources()?;
    tracing::info!(settings = ?resolved.settings, sources = ?resolved.sources, "settings loaded");

    let manager = SessionManager::new(resolved.settings);
    let table = manager.create_table()?;
    let human = BaselineAI::new();

    loop {
        play_round(&table, &human).await?;
        let summary = table.finish_round()?;
        println!(
            "Round {}: Player 1 {} ({}), AI Opponent {} ({})",
            summary.round,
            summary.player.total(),
            summary.player_total,
            summary.ai.total(),
            summary.ai_total
        );
        if table.read(|game| game.is_match_over())? {
            break;
        }
        table.start_round()?;
    }

    println!("{}", serde_json::to_string_pretty(&table.snapshot()?)?);
    manager.close_table(table.id(), "match finished")?;
    Ok(())
}

async fn play_round(table: &Arc<Table>, human: &BaselineAI) -> Result<(), Box<dyn std::error::Error>> {
    for _ in 0..MAX_STEPS_PER_ROUND {
        table.settle().await;
        let (to_act, awaiting, phase, decision) = table.read(|game| {
            let to_act = seat_to_act(game);
            let decision = match (to_act, game.phase()) {
                (Some(Seat::Player), Phase::Play) if !game.is_awaiting_coup_fourre() => {
                    Some(human.decide(game, Seat::Player))
                }
                _ => None,
            };
            (to_act, game.is_awaiting_coup_fourre(), game.phase(), decision)
        })?;

        match to_act {
            None => return Ok(()),
            Some(Seat::Ai) => continue,
            Some(Seat::Player) if awaiting => {
                table.coup_fourre()?;
            }
            Some(Seat::Player) if phase == Phase::Draw => {
                table.draw()?;
            }
            Some(Seat::Player) => match decision {
                Some(Ok(Decision::Play { card, target })) => {
                    table.submit_move(card, target)?;
                }
                Some(Ok(Decision::Discard(card))) => table.discard(card)?,
                Some(Err(err)) => return Err(err.into()),
                None => continue,
            },
        }
    }
    Err("round did not finish".into())
}
