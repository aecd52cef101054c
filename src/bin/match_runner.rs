//! Headless Match Runner
//!
//! Runs fallback-vs-fallback matches as fast as possible and prints a JSON
//! report. Useful for tuning personalities and combat numbers.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use syntax_brawlers::ai::BrokerStats;
use syntax_brawlers::arena::{Corner, MatchController, MatchOutcome, RoundResult};
use syntax_brawlers::combat::CombatEvent;
use syntax_brawlers::core::error::Result;
use syntax_brawlers::core::GameConfig;
use syntax_brawlers::fighter::FightStats;

/// Headless Match Runner - local tactics only, no provider calls
#[derive(Parser, Debug)]
#[command(name = "match_runner")]
#[command(about = "Run a fallback-vs-fallback boxing match and output the result")]
struct Args {
    /// Red corner personality (data/personalities/ or a built-in preset)
    #[arg(long, default_value = "destroyer")]
    red: String,

    /// Blue corner personality
    #[arg(long, default_value = "ghost")]
    blue: String,

    /// Optional TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Override round length in seconds
    #[arg(long)]
    round_secs: Option<u32>,

    /// Maximum ticks before giving up
    #[arg(long, default_value_t = 200_000)]
    max_ticks: u64,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Print every hit to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Serialize)]
struct CornerReport {
    name: String,
    personality: String,
    health: u32,
    best_combo: u32,
    style_points: u32,
    stats: FightStats,
}

#[derive(Serialize)]
struct MatchReport {
    outcome: String,
    winner: Option<String>,
    score: [u32; 2],
    rounds: Vec<RoundResult>,
    ticks: u64,
    seed: u64,
    red: CornerReport,
    blue: CornerReport,
    decisions: BrokerStats,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "syntax_brawlers=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let seed = args.seed.or(config.rng_seed).unwrap_or_else(rand::random);
    config.rng_seed = Some(seed);
    if let Some(secs) = args.round_secs {
        config.timing.round_duration_secs = secs;
    }
    // Nobody is watching the intros
    config.timing.pre_round_ticks = 1;
    config.timing.round_end_ticks = 1;

    let corners = [
        Corner::from_personality(&args.red)?,
        Corner::from_personality(&args.blue)?,
    ];
    let mut controller = MatchController::new(config, corners, None)?;

    while !controller.is_finished() && controller.tick_count() < args.max_ticks {
        let snapshot = controller.tick();
        if args.verbose {
            for event in &snapshot.events {
                if let CombatEvent::Hit(hit) = event {
                    eprintln!(
                        "  [{}] {} {} -> {} dmg{}{}{}",
                        hit.tick,
                        hit.attacker,
                        hit.action,
                        hit.damage,
                        if hit.was_blocked { " (blocked)" } else { "" },
                        if hit.is_critical { " CRIT" } else { "" },
                        hit.combo_name
                            .as_ref()
                            .map(|n| format!(" [{}]", n))
                            .unwrap_or_default(),
                    );
                }
            }
        }
    }

    let report = build_report(&controller, seed);
    match args.format.as_str() {
        "text" => print_text(&report),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        other => {
            eprintln!("Unknown format '{}', defaulting to json", other);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn build_report(controller: &MatchController, seed: u64) -> MatchReport {
    let corner = |idx: usize| {
        let f = &controller.fighters()[idx];
        CornerReport {
            name: f.name.clone(),
            personality: f.personality.name.clone(),
            health: f.health,
            best_combo: f.combo.best(),
            style_points: f.combo.style_points(),
            stats: f.stats.clone(),
        }
    };

    let (outcome, winner) = match controller.outcome().filter(|_| controller.is_finished()) {
        Some(MatchOutcome::Winner(id)) => ("winner", Some(controller.fighter(id).name.clone())),
        Some(MatchOutcome::Draw) => ("draw", None),
        None => ("unfinished", None),
    };

    MatchReport {
        outcome: outcome.to_string(),
        winner,
        score: controller.scorecard().wins,
        rounds: controller.scorecard().results.clone(),
        ticks: controller.tick_count(),
        seed,
        red: corner(0),
        blue: corner(1),
        decisions: controller.decision_stats().clone(),
    }
}

fn print_text(report: &MatchReport) {
    println!("Match Result");
    println!("============");
    println!("Outcome: {}", report.outcome);
    if let Some(winner) = &report.winner {
        println!("Winner: {}", winner);
    }
    println!("Score: {} - {}", report.score[0], report.score[1]);
    for round in &report.rounds {
        println!(
            "  Round {}: {:?} ({:?}) health {} / {}",
            round.round, round.winner, round.reason, round.health[0], round.health[1]
        );
    }
    println!();
    for corner in [&report.red, &report.blue] {
        println!(
            "{} ({}): landed {}/{} ({:.0}%), damage {}, best combo {}",
            corner.name,
            corner.personality,
            corner.stats.punches_landed,
            corner.stats.punches_thrown,
            corner.stats.accuracy() * 100.0,
            corner.stats.damage_dealt,
            corner.best_combo,
        );
    }
    println!();
    println!("Ticks: {}", report.ticks);
    println!("Seed: {}", report.seed);
}
