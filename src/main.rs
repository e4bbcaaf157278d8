//! Card Duel - Main Binary
//!
//! Headless battle driver: runs AI-vs-AI battles, records battle logs,
//! and replays recorded battles deterministically.

use anyhow::Context;
use card_duel_rs::{
    core::{BoardState, CardFamily, CardRegistry},
    game::{EngineMode, GameAction, GameActionEngine, GreedyPolicy, TurnPlan, VerbosityLevel},
    replay::{BattleDeserializer, BattleSerializer},
};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Cards each player draws before the first turn
const OPENING_HAND_SIZE: usize = 4;

/// Stock deck choices, one pool per card family
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DeckArg {
    Insects,
    Rodents,
    Reptiles,
    Titans,
}

impl From<DeckArg> for CardFamily {
    fn from(arg: DeckArg) -> Self {
        match arg {
            DeckArg::Insects => CardFamily::Insects,
            DeckArg::Rodents => CardFamily::Rodents,
            DeckArg::Reptiles => CardFamily::Reptiles,
            DeckArg::Titans => CardFamily::Titans,
        }
    }
}

/// Verbosity level (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

#[derive(Parser)]
#[command(name = "duel")]
#[command(about = "Card Duel - deterministic card battle engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an AI-vs-AI battle headlessly
    Run {
        /// RNG seed for the battle
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Deck pool for the top player
        #[arg(long, value_enum, default_value = "insects")]
        top_deck: DeckArg,

        /// Deck pool for the bottom player
        #[arg(long, value_enum, default_value = "rodents")]
        bot_deck: DeckArg,

        /// Write the battle log here when the battle ends
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,

        /// Output verbosity (silent/minimal/normal/verbose)
        #[arg(long, default_value = "normal")]
        verbosity: VerbosityArg,

        /// Stop undecided battles after this many turns
        #[arg(long, default_value_t = 200)]
        max_turns: u32,
    },

    /// Replay a recorded battle log and print the final board
    Replay {
        /// Battle log file written by `duel run --save`
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output verbosity (silent/minimal/normal/verbose)
        #[arg(long, default_value = "minimal")]
        verbosity: VerbosityArg,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            seed,
            top_deck,
            bot_deck,
            save,
            verbosity,
            max_turns,
        } => run_battle(seed, top_deck.into(), bot_deck.into(), save, verbosity.0, max_turns),
        Commands::Replay { file, verbosity } => replay_battle(&file, verbosity.0),
    }
}

fn run_battle(
    seed: u64,
    top_family: CardFamily,
    bot_family: CardFamily,
    save: Option<PathBuf>,
    verbosity: VerbosityLevel,
    max_turns: u32,
) -> anyhow::Result<()> {
    let registry = CardRegistry::standard();
    let top_deck = registry.family_deck(top_family);
    let bot_deck = registry.family_deck(bot_family);

    let board = BoardState::new_battle(top_deck.clone(), bot_deck.clone());
    let mut engine = GameActionEngine::new(EngineMode::Headless, seed, board, registry);
    engine.logger_mut().set_verbosity(verbosity);
    if save.is_some() {
        engine.attach_recorder(BattleSerializer::new(seed, top_deck, bot_deck));
    }

    drive_battle(&mut engine, max_turns);

    println!("{}", engine.board());
    match engine.board().victor_index() {
        Some(victor) => println!("Player {} wins after {} turns", victor, engine.board().turn_counter),
        None => println!("No victor after {} turns", engine.board().turn_counter),
    }

    if let Some(path) = save {
        let recorder = engine
            .take_recorder()
            .expect("recorder was attached before the battle");
        recorder
            .flush(&path)
            .with_context(|| format!("writing battle log to {}", path.display()))?;
        println!(
            "Saved battle log ({} actions) to {}",
            recorder.recorded_count(),
            path.display()
        );
    }

    Ok(())
}

/// Drive a full battle: opening hands, then alternating greedy turns
fn drive_battle(engine: &mut GameActionEngine, max_turns: u32) {
    // Opening hand for the bottom player, who is nominally active
    // before the first turn advance
    for _ in 0..OPENING_HAND_SIZE {
        engine.enqueue(GameAction::DrawCard);
    }
    // First turn advance: the top player's turn begins
    engine.enqueue(GameAction::NextPlayer);
    engine.run_until_idle(0.0);
    // Opening hand for the top player
    for _ in 0..OPENING_HAND_SIZE {
        engine.enqueue(GameAction::DrawCard);
    }
    engine.run_until_idle(0.0);

    let policy = GreedyPolicy::new();
    let mut turns = 0;
    while !engine.board().is_terminal() && turns < max_turns {
        // Turn draw
        engine.enqueue(GameAction::DrawCard);
        engine.run_until_idle(0.0);

        // Play until the policy ends the turn (draw spells pause
        // planning until their chained draws resolve)
        loop {
            let plan = policy.decide_and_enqueue(engine);
            engine.run_until_idle(0.0);
            if engine.board().is_terminal() || plan == TurnPlan::TurnEnded {
                break;
            }
        }
        turns += 1;
    }
}

fn replay_battle(file: &PathBuf, verbosity: VerbosityLevel) -> anyhow::Result<()> {
    let deserializer = BattleDeserializer::load(file)
        .with_context(|| format!("loading battle log from {}", file.display()))?;

    let registry = CardRegistry::standard();
    let board = BoardState::new_battle(
        deserializer.top_deck().to_vec(),
        deserializer.bot_deck().to_vec(),
    );
    let mut engine = GameActionEngine::new(EngineMode::Headless, deserializer.seed(), board, registry);
    engine.logger_mut().set_verbosity(verbosity);

    deserializer.replay_into(&mut engine);

    println!(
        "Replayed {} actions from {}",
        deserializer.log().actions.len(),
        file.display()
    );
    println!("{}", engine.board());
    match engine.board().victor_index() {
        Some(victor) => println!("Player {} wins after {} turns", victor, engine.board().turn_counter),
        None => println!("Battle is undecided after {} turns", engine.board().turn_counter),
    }

    Ok(())
}
