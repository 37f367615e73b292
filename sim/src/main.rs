use anyhow::{Context, Result, bail};
use clap::Parser;
use gemswap_core::*;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Plays gem swap rounds headless and prints a JSON summary",
    long_about = None
)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Seed for the gem generator
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value_t = DEFAULT_SIZE.0)]
    rows: Coord,

    #[arg(long, default_value_t = DEFAULT_SIZE.1)]
    cols: Coord,

    /// Frames to simulate at 60 per second
    #[arg(short, long, default_value_t = 36_000)]
    frames: u32,

    /// Rounds to play, a round ends once a player has no health left
    #[arg(long, default_value_t = 1)]
    rounds: u32,

    /// Finish every animation immediately
    #[arg(long)]
    instant: bool,

    /// Swap by dragging instead of clicking both gems
    #[arg(long)]
    drag: bool,

    /// Scores to resume from, as the JSON of a saved row
    #[arg(long)]
    resume: Option<String>,

    #[arg(long)]
    pretty: bool,
}

/// Scoreboard plus counters for the summary.
#[derive(Clone, Debug, Default, Serialize)]
struct Tally {
    scores: Scoreboard,
    runs: u32,
    commits: u32,
    reshuffles: u32,
    regenerations: u32,
}

impl ScoreSink for Tally {
    fn on_match(&mut self, gem: GemType, run_length: u8) {
        self.runs += 1;
        self.scores.on_match(gem, run_length);
    }

    fn on_move_committed(&mut self) {
        self.commits += 1;
        self.scores.on_move_committed();
    }

    fn on_no_moves_available(&mut self) {
        self.reshuffles += 1;
        self.scores.on_no_moves_available();
    }

    fn on_board_regenerated(&mut self) {
        self.regenerations += 1;
        self.scores.on_board_regenerated();
    }
}

#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    frames: u64,
    rounds_played: u32,
    winners: Vec<PlayerId>,
    moves_reverted: u32,
    tally: Tally,
    save: SaveData,
    board: Vec<String>,
}

/// One line per row, `.` for empty cells.
fn board_rows(board: &Board) -> Vec<String> {
    (0..board.rows())
        .map(|row| {
            (0..board.cols())
                .map(|col| {
                    board.gem_at((row, col)).map_or('.', GemType::symbol)
                })
                .collect()
        })
        .collect()
}

fn play<G: GemSource>(
    game: &mut GameState<Tally, G>,
    a: Coord2,
    b: Coord2,
    drag: bool,
) -> Result<()> {
    let outcome = if drag {
        game.handle_input(InputEvent::press(a))?;
        let outcome = game.handle_input(InputEvent::drag(b))?;
        game.handle_input(InputEvent::release(b))?;
        outcome
    } else {
        game.handle_input(InputEvent::hover(a))?;
        game.handle_input(InputEvent::press(a))?;
        game.handle_input(InputEvent::release(a))?;
        game.handle_input(InputEvent::hover(b))?;
        game.handle_input(InputEvent::press(b))?
    };
    if !matches!(outcome, InputOutcome::SwapQueued(_)) {
        bail!("swap {a:?} <-> {b:?} was not queued: {outcome:?}");
    }
    Ok(())
}

fn simulate(args: &Args) -> Result<Summary> {
    if args.rows == 0 || args.cols == 0 {
        bail!("board needs at least one row and one column");
    }
    let mut config = GameConfig::new((args.rows, args.cols));
    if args.instant {
        config = config.with_timings(Timings::instant());
    }

    let mut tally = Tally::default();
    if let Some(resume) = &args.resume {
        let save: SaveData = serde_json::from_str(resume).context("Could not parse saved scores")?;
        save.apply_to(&mut tally.scores);
        log::info!("Resumed scores from save: {:?}", save.health_record());
    }

    let mut game = GameState::with_parts(config, tally, RandomGemSource::new(args.seed));
    let step = FixedTimestep::DEFAULT_STEP;
    let mut winners = Vec::new();
    let mut moves_reverted = 0;
    let mut last_move = None;

    for _ in 0..args.frames {
        if game.phase() == BoardPhase::Cleared && game.board().is_settled() {
            game.restart();
        }

        if game.is_idle() && game.resolver().state() == ResolverState::Idle {
            if let Some(winner) = game.sink().scores.winner() {
                log::info!("Round {} won by {:?}", winners.len() + 1, winner);
                winners.push(winner);
                if winners.len() as u32 >= args.rounds {
                    break;
                }
                game.sink_mut().scores.restart();
                game.destroy_all_gems();
            } else if let Some((a, b)) = game.hint() {
                log::debug!("Playing {:?} <-> {:?}", a, b);
                play(&mut game, a, b, args.drag)?;
            }
        }

        game.tick(step);

        let resolved = game.last_move();
        if resolved != last_move {
            if let Some(mv) = resolved.filter(|mv| mv.outcome == MoveOutcome::Reverted) {
                log::warn!("Hinted swap {:?} <-> {:?} was reverted", mv.a, mv.b);
                moves_reverted += 1;
            }
            last_move = resolved;
        }
    }

    if (winners.len() as u32) < args.rounds {
        log::warn!(
            "Stopped after {} frames with {} of {} rounds played",
            game.frames(),
            winners.len(),
            args.rounds
        );
    }

    Ok(Summary {
        seed: args.seed,
        frames: game.frames(),
        rounds_played: winners.len() as u32,
        winners,
        moves_reverted,
        save: SaveData::from_scoreboard(&game.sink().scores),
        board: board_rows(game.board()),
        tally: game.sink().clone(),
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();
    log::debug!("{:?}", args);

    let summary = simulate(&args)?;
    let json = if args.pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    println!("{json}");
    Ok(())
}
