use std::fs;
use std::path::PathBuf;

use anyhow::{anyhow, bail, Context};
use clap::Parser;
use log::info;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use seabattle::{
    init_logging, Command, MatchConfig, MatchId, MatchRegistry, MatchStatus, PlayerId, Reply,
};
use serde_json::json;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Play complete random-vs-random matches and print a JSON line per match.
    Sim {
        #[arg(long, help = "Fix RNG seed for reproducible games (e.g., --seed 12345)")]
        seed: Option<u64>,
        #[arg(long, help = "Match configuration as JSON")]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = 1)]
        games: u32,
    },
    /// Print one randomly generated board.
    Layout {
        #[arg(long, help = "Fix RNG seed for reproducible layouts")]
        seed: Option<u64>,
        #[arg(long, help = "Match configuration as JSON")]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Sim {
            seed,
            config,
            games,
        } => {
            let config = load_config(config)?;
            let (mut registry, mut shooter) = match seed {
                Some(s) => (
                    MatchRegistry::seeded(s),
                    SmallRng::seed_from_u64(s.wrapping_add(1)),
                ),
                None => (
                    MatchRegistry::new(),
                    SmallRng::from_rng(&mut rand::rng()),
                ),
            };
            for game in 0..games {
                let mut line = play(&mut registry, &mut shooter, config.clone())?;
                line["game"] = json!(game);
                println!("{}", serde_json::to_string(&line)?);
            }
        }
        Commands::Layout { seed, config } => {
            let config = load_config(config)?;
            let mut rng = match seed {
                Some(s) => SmallRng::seed_from_u64(s),
                None => SmallRng::from_rng(&mut rand::rng()),
            };
            let board = config
                .generator()
                .generate(&config.fleet, config.board_size, &mut rng)?;
            println!("{}", board);
        }
    }
    Ok(())
}

/// The reference configuration, or one read from a JSON file.
fn load_config(path: Option<PathBuf>) -> anyhow::Result<MatchConfig> {
    let Some(path) = path else {
        return Ok(MatchConfig::default());
    };
    let text = fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: MatchConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// One full match through the command interface. Both players place at
/// random and fire at random unfired cells.
fn play(
    registry: &mut MatchRegistry,
    shooter: &mut SmallRng,
    config: MatchConfig,
) -> anyhow::Result<serde_json::Value> {
    let players = [PlayerId::from("player1"), PlayerId::from("player2")];
    let cells = config.board_size as usize * config.board_size as usize;
    let created = registry.dispatch(Command::CreateMatch {
        config,
        players: players.clone(),
    });
    let id = match created.reply? {
        Reply::Created(id) => id,
        other => bail!("unexpected reply {:?}", other),
    };
    for player in &players {
        registry
            .dispatch(Command::RequestRandomPlacement {
                match_id: id,
                player: player.clone(),
            })
            .reply?;
        registry
            .dispatch(Command::MarkReady {
                match_id: id,
                player: player.clone(),
            })
            .reply?;
    }

    // every shot lands on a fresh cell of one of two boards
    for _ in 0..2 * cells {
        let (player, target) = {
            let m = current(registry, id)?;
            if m.status() != MatchStatus::Battle {
                break;
            }
            let player = m
                .current_turn()
                .cloned()
                .ok_or_else(|| anyhow!("battle without a turn"))?;
            let opponent = m
                .opponent_of(&player)
                .and_then(|o| m.board(o))
                .ok_or_else(|| anyhow!("missing opponent board"))?;
            let target = *opponent
                .unfired_cells()
                .choose(shooter)
                .ok_or_else(|| anyhow!("no cells left to fire at"))?;
            (player, target)
        };
        registry
            .dispatch(Command::FireShot {
                match_id: id,
                player,
                target,
            })
            .reply?;
    }

    let m = current(registry, id)?;
    let winner = m
        .winner()
        .cloned()
        .ok_or_else(|| anyhow!("match {} did not finish", id))?;
    info!("match {} won by {}", id, winner);
    let stats = |p: &PlayerId| {
        let sunk = m
            .opponent_of(p)
            .and_then(|o| m.board(o))
            .map(|b| b.sunk_ships().count())
            .unwrap_or(0);
        json!({"shots": m.shots_fired(p), "sunk": sunk})
    };
    let summary = json!({
        "winner": winner.as_str(),
        "player1": stats(&players[0]),
        "player2": stats(&players[1]),
    });
    registry.remove(id);
    Ok(summary)
}

fn current(registry: &MatchRegistry, id: MatchId) -> anyhow::Result<&seabattle::Match> {
    registry
        .get(id)
        .ok_or_else(|| anyhow!("match {} disappeared", id))
}
