//! Syntax Brawlers - Entry Point
//!
//! Runs one match in real time and narrates it on stdout. Fighters ask the
//! configured LLM for their moves; without credentials they fight on local
//! tactics alone.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use syntax_brawlers::ai::DecisionSource;
use syntax_brawlers::arena::{Corner, MatchController, MatchOutcome, MatchSnapshot, RoundPhase};
use syntax_brawlers::combat::CombatEvent;
use syntax_brawlers::core::error::Result;
use syntax_brawlers::core::{FighterId, GameConfig};
use syntax_brawlers::llm::{LlmClient, LlmDecisionSource};
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "syntax-brawlers")]
#[command(about = "Real-time boxing between LLM-driven fighters")]
struct Args {
    /// Red corner personality
    #[arg(long, default_value = "destroyer")]
    red: String,

    /// Blue corner personality
    #[arg(long, default_value = "tactician")]
    blue: String,

    /// Optional TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for crits and trash talk
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the LLM and fight on local tactics
    #[arg(long)]
    offline: bool,

    /// Simulation speed multiplier
    #[arg(long, default_value_t = 1.0)]
    speed: f32,
}

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "syntax_brawlers=info".into()),
        )
        .init();

    tracing::info!("Syntax Brawlers starting...");

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if args.seed.is_some() {
        config.rng_seed = args.seed;
    }

    // Create the async runtime for LLM calls
    let rt = Runtime::new()?;

    // Try to create LLM client (optional - works without it)
    let source: Option<Arc<dyn DecisionSource>> = if args.offline {
        None
    } else {
        match LlmClient::from_env() {
            Ok(client) => {
                let client = client
                    .with_timeout(config.decision.timeout())
                    .with_max_retries(config.decision.max_retries);
                let llm: Arc<dyn DecisionSource> =
                    Arc::new(LlmDecisionSource::new(client, rt.handle().clone()));
                Some(llm)
            }
            Err(_) => {
                tracing::warn!("LLM_API_KEY not set - fighters will use local tactics");
                None
            }
        }
    };

    let corners = [
        Corner::from_personality(&args.red)?,
        Corner::from_personality(&args.blue)?,
    ];
    let tick_rate = config.timing.tick_rate;
    let mut controller = MatchController::new(config, corners, source)?;

    println!("\n=== SYNTAX BRAWLERS ===");
    println!(
        "{} ({}) vs {} ({})",
        controller.fighters()[0].name,
        controller.fighters()[0].personality.style.label(),
        controller.fighters()[1].name,
        controller.fighters()[1].personality.style.label(),
    );
    println!();

    let step = Duration::from_secs_f32(1.0 / (tick_rate as f32 * args.speed.max(0.01)));
    let mut next_tick = Instant::now();
    let mut last_phase = controller.phase();
    let mut last_lines: [Option<String>; 2] = [None, None];

    while !controller.is_finished() {
        let snapshot = controller.tick();
        narrate(&snapshot, last_phase, &mut last_lines);
        last_phase = snapshot.phase;

        next_tick += step;
        let now = Instant::now();
        if next_tick > now {
            thread::sleep(next_tick - now);
        } else {
            // Fell behind; don't try to catch up in a burst
            next_tick = now;
        }
    }

    let final_state = controller.snapshot();
    match final_state.outcome {
        Some(MatchOutcome::Winner(id)) => {
            println!("\nWINNER: {}", final_state.fighter(id).name);
        }
        _ => println!("\nThe match is a draw."),
    }
    println!("Score: {} - {}", final_state.score[0], final_state.score[1]);
    let stats = controller.decision_stats();
    println!(
        "Decisions: {} from the model, {} local ({} timeouts, {} failures)",
        stats.external_decisions, stats.fallback_decisions, stats.timeouts, stats.failures
    );
    Ok(())
}

/// Print what happened this tick
fn narrate(snapshot: &MatchSnapshot, last_phase: RoundPhase, last_lines: &mut [Option<String>; 2]) {
    if snapshot.phase != last_phase {
        match snapshot.phase {
            RoundPhase::InProgress => println!("--- Round {}: FIGHT! ---", snapshot.round),
            RoundPhase::RoundEnd => println!(
                "--- End of round {} | {} - {} | {} ---",
                snapshot.round,
                snapshot.score[0],
                snapshot.score[1],
                snapshot.momentum_label()
            ),
            _ => {}
        }
    }

    for notice in &snapshot.diagnostics {
        println!("[{}] {}", snapshot.fighter(notice.fighter).name, notice.message);
    }

    for event in &snapshot.events {
        match event {
            CombatEvent::Hit(hit) => {
                let attacker = &snapshot.fighter(hit.attacker).name;
                let defender = snapshot.fighter(hit.defender);
                let mut line = format!("{} lands a {} for {}", attacker, hit.action, hit.damage);
                if hit.was_blocked {
                    line.push_str(" (blocked)");
                }
                if hit.was_countered {
                    line.push_str(" COUNTER");
                }
                if hit.is_critical {
                    line.push_str(" CRITICAL");
                }
                if let Some(name) = &hit.combo_name {
                    line.push_str(&format!(" [{}]", name));
                }
                line.push_str(&format!(" | {} at {}/{}", defender.name, defender.health, defender.max_health));
                println!("{}", line);
                if hit.knocked_out {
                    println!("*** {} IS DOWN! ***", defender.name);
                }
            }
            CombatEvent::Dodged { attacker, defender, action, .. } => println!(
                "{} slips {}'s {}",
                snapshot.fighter(*defender).name,
                snapshot.fighter(*attacker).name,
                action
            ),
            CombatEvent::Clinch { initiator, .. } => {
                println!("{} ties them up in a clinch", snapshot.fighter(*initiator).name)
            }
            CombatEvent::Whiffed { .. } => {}
        }
    }

    for id in FighterId::both() {
        let line = &snapshot.narrative[id.index()];
        if line.is_some() && *line != last_lines[id.index()] {
            if let Some(text) = line {
                println!("  {}: \"{}\"", snapshot.fighter(id).name, text);
            }
            last_lines[id.index()] = line.clone();
        }
    }
}
