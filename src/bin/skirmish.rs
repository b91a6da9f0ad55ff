//! Headless skirmish runner
//!
//! Plays a scenario to the end with every seat driven by the greedy AI. Human
//! seats go through the session host exactly like client commands would; AI
//! seats run inside end-turn. Prints a JSON or text result.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;

use hexfront::ai::{AiAction, AiController, GreedyAi};
use hexfront::core::types::ParticipantId;
use hexfront::game::{Command, CommandOutcome, GameState, Ruleset, Scenario};
use hexfront::session::SessionHost;

#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(about = "Play a hexfront scenario headless, greedy AI on every seat")]
struct Args {
    /// Scenario file
    #[arg(long, default_value = "data/scenarios/crossing.toml")]
    scenario: PathBuf,

    /// Rules file (built-in standard rules when omitted)
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Override the scenario's RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many rounds (draw)
    #[arg(long, default_value_t = 150)]
    max_turns: u32,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Log every command
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Serialize)]
struct CityResult {
    name: String,
    owner: String,
    hp: u32,
    territory: usize,
}

#[derive(Serialize)]
struct SkirmishResult {
    scenario: String,
    seed: u64,
    turns: u32,
    finished: bool,
    winner: Option<String>,
    commands_submitted: u32,
    commands_rejected: u32,
    units_alive: usize,
    cities: Vec<CityResult>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let default_filter = if args.verbose { "hexfront=debug" } else { "hexfront=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let rules = match &args.rules {
        Some(path) => Ruleset::load(path)?,
        None => Ruleset::standard(),
    };
    let mut scenario = Scenario::load(&args.scenario)?;
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }

    let host = SessionHost::new(rules);
    let game = host.create_game(&scenario)?;
    tracing::info!(scenario = %scenario.name, seed = scenario.seed, "Skirmish started");

    let mut submitted = 0u32;
    let mut rejected = 0u32;
    let mut token = 0u64;
    let mut submit = |actor: ParticipantId, command: Command| {
        token += 1;
        submitted += 1;
        let result = host.submit(game, actor, &format!("skirmish-{}", token), command);
        if let Err(err) = &result {
            rejected += 1;
            tracing::debug!(participant = %actor, error = %err, "Command rejected");
        }
        result
    };

    loop {
        let state = host.state(game)?;
        if state.is_finished() || state.turn > args.max_turns {
            break;
        }
        let actor = state.active;

        for command in plan_commands(&state, &host)? {
            submit(actor, command).ok();
        }

        if let Ok(CommandOutcome::TurnEnded(report)) = submit(actor, Command::EndTurn) {
            if report.ai_pending {
                host.resume_ai(game)?;
            }
        }
    }

    let state = host.state(game)?;
    let name_of = |id: ParticipantId| {
        state
            .participant(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|_| id.to_string())
    };
    let result = SkirmishResult {
        scenario: scenario.name.clone(),
        seed: scenario.seed,
        turns: state.turn,
        finished: state.is_finished(),
        winner: state.winner().map(name_of),
        commands_submitted: submitted,
        commands_rejected: rejected,
        units_alive: state.units.len(),
        cities: state
            .cities
            .values()
            .map(|c| CityResult {
                name: c.name.clone(),
                owner: name_of(c.owner),
                hp: c.hp,
                territory: c.territory.len(),
            })
            .collect(),
    };

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => {
            println!("Skirmish Result");
            println!("===============");
            println!("Scenario: {} (seed {})", result.scenario, result.seed);
            println!("Turns: {}", result.turns);
            match &result.winner {
                Some(winner) => println!("Winner: {}", winner),
                None => println!("Winner: none (turn limit)"),
            }
            println!(
                "Commands: {} submitted, {} rejected",
                result.commands_submitted, result.commands_rejected
            );
            for city in &result.cities {
                println!(
                    "  {:<12} owner={:<10} hp={:>3} tiles={}",
                    city.name, city.owner, city.hp, city.territory
                );
            }
            println!();
            println!("{}", host.board(game)?.render_ascii());
        }
    }

    Ok(())
}

/// Let the greedy AI decide on a scratch copy, then replay its unit decisions
/// as client commands. Production is left to end-turn.
fn plan_commands(state: &GameState, host: &SessionHost) -> Result<Vec<Command>, Box<dyn Error>> {
    let board = host.board(state.id)?;
    let mut scratch = state.clone();
    let actions = GreedyAi.take_turn(&mut scratch, &board, host.rules(), state.active)?;

    Ok(actions
        .into_iter()
        .filter_map(|action| match action {
            AiAction::AttackUnit { unit, target, .. } => Some(Command::Attack {
                attacker: unit,
                target,
            }),
            AiAction::AttackCity { unit, city, .. } => Some(Command::AttackCity {
                attacker: unit,
                city,
            }),
            AiAction::Capture { unit, city } => state.city(city).ok().map(|c| Command::MoveUnit {
                unit,
                to: c.coord,
            }),
            AiAction::Move { unit, to, .. } => Some(Command::MoveUnit { unit, to }),
            AiAction::Hold { .. }
            | AiAction::Produce { .. }
            | AiAction::ProductionDelayed { .. } => None,
        })
        .collect())
}
