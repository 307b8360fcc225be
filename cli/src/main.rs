//! # play2048 CLI
//!
//! Runs the move-selection policy against simulated games, asks it for a
//! single suggestion on a given board, or lets you play in the terminal
//! with the policy available as a hint.

mod stats;

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::{debug, info};
use play2048_core::{
    Config, CyclePolicy, Direction, Game, GreedyPolicy, Grid, Policy, RandomPolicy, Snapshot,
    SnapshotSource,
};

use crate::stats::{EpisodeStats, Summary};

#[derive(Parser, Debug)]
#[command(name = "play2048")]
#[command(author, version, about = "Automated 2048 player: simulate, suggest, or play")]
struct Args {
    /// Run in interactive mode (default if no other mode specified)
    #[arg(short, long)]
    interactive: bool,

    /// Number of episodes to run in headless mode
    #[arg(short, long)]
    episodes: Option<u32>,

    /// Suggest one move for a board given as "value,row,col;..." (rows and cols 1-4)
    #[arg(short, long, value_name = "TILES")]
    tiles: Option<String>,

    /// TOML file with [weights] and [play] sections
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs (overrides config)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Maximum steps per episode, 0 = unlimited (overrides config)
    #[arg(short, long)]
    max_steps: Option<u32>,

    /// End an episode as soon as 2048 is reached
    #[arg(long)]
    stop_at_win: bool,

    /// Policy for headless mode
    #[arg(short, long, value_enum, default_value = "greedy")]
    policy: PolicyKind,

    /// Show board after each move in headless mode
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyKind {
    /// One-ply search scored by the board evaluator
    Greedy,
    /// Random valid moves
    Random,
    /// Cycle through actions: Left, Down, Right, Up
    Cycle,
}

/// Effective settings after merging the config file with CLI flags.
#[derive(Debug, Clone)]
struct Settings {
    config: Config,
    seed: u64,
    max_steps: u32,
    keep_playing: bool,
}

impl Settings {
    fn resolve(args: &Args) -> Result<Self> {
        let config = match &args.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => Config::default(),
        };
        Ok(Settings {
            seed: args.seed.unwrap_or(config.play.seed),
            max_steps: args.max_steps.unwrap_or(config.play.max_steps),
            keep_playing: config.play.keep_playing && !args.stop_at_win,
            config,
        })
    }

    fn make_policy(&self, kind: PolicyKind, seed: u64) -> Box<dyn Policy> {
        match kind {
            PolicyKind::Greedy => Box::new(GreedyPolicy::new(self.config.weights)),
            PolicyKind::Random => Box::new(RandomPolicy::new(seed)),
            PolicyKind::Cycle => Box::new(CyclePolicy::new()),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = Settings::resolve(&args)?;

    if let Some(tiles) = &args.tiles {
        run_suggest(&settings, tiles)
    } else if let Some(episodes) = args.episodes.filter(|_| !args.interactive) {
        run_headless(&args, &settings, episodes)
    } else {
        run_interactive(&settings)
    }
}

/// Print the per-direction look-ahead and the chosen move for one board.
fn run_suggest(settings: &Settings, tiles: &str) -> Result<()> {
    let snapshot =
        Snapshot::parse(tiles).with_context(|| format!("invalid tile list {tiles:?}"))?;
    let policy = GreedyPolicy::new(settings.config.weights);

    print!("{}", Grid::build(&snapshot));
    for branch in policy.branches(&snapshot) {
        match branch.score {
            Some(score) => println!(
                "{:<5} score={:.4} points={}{}",
                branch.direction.name(),
                score,
                branch.outcome.points,
                if branch.outcome.won { " (2048)" } else { "" }
            ),
            None => println!("{:<5} no change", branch.direction.name()),
        }
    }

    match policy.best_move(&snapshot) {
        Some(direction) => println!("best_move={direction}"),
        None => println!("best_move=none"),
    }
    Ok(())
}

/// Run headless simulation mode.
fn run_headless(args: &Args, settings: &Settings, episodes: u32) -> Result<()> {
    // Separate seed stream for policies that need randomness
    let mut policy = settings.make_policy(args.policy, settings.seed.wrapping_add(1000));
    info!(
        "running {episodes} episodes with the {} policy (seed={}, max_steps={})",
        policy.name(),
        settings.seed,
        settings.max_steps
    );

    let mut results = Vec::with_capacity(episodes as usize);
    for episode in 0..episodes {
        let mut game = Game::new(settings.seed.wrapping_add(episode as u64));
        let stats = play_episode(&mut game, policy.as_mut(), settings, |step, dir, game| {
            if args.verbose {
                println!("Episode {} Step {}: {}", episode + 1, step, dir);
                print!("{game}");
            }
        });
        debug!(
            "episode {}: score={} max_tile={} steps={} won={}",
            episode + 1,
            stats.score,
            stats.max_tile,
            stats.steps,
            stats.won
        );
        if args.verbose {
            println!(
                "Episode {}: Score={}, MaxTile={}, Steps={}",
                episode + 1,
                stats.score,
                stats.max_tile,
                stats.steps
            );
        }
        results.push(stats);
    }

    let summary = Summary::from_episodes(&results);

    // Output results in parseable format
    println!("=== Simulation Results ===");
    println!("episodes={}", summary.episodes);
    println!("policy={}", policy.name());
    println!("seed={}", settings.seed);
    println!("max_steps={}", settings.max_steps);
    println!("avg_score={:.2}", summary.avg_score);
    println!("median_score={:.2}", summary.median_score);
    println!("min_score={}", summary.min_score);
    println!("max_score={}", summary.max_score);
    println!("avg_steps={:.1}", summary.avg_steps);
    println!("max_tile_overall={}", summary.max_tile_overall);
    println!("wins={}", summary.wins);
    println!("tile_distribution={}", summary.distribution_line());
    Ok(())
}

/// Drive one game to completion: capture, decide, step.
fn play_episode<F>(
    game: &mut Game,
    policy: &mut dyn Policy,
    settings: &Settings,
    mut on_step: F,
) -> EpisodeStats
where
    F: FnMut(u32, Direction, &Game),
{
    let mut steps = 0;
    while !game.is_done() && (settings.max_steps == 0 || steps < settings.max_steps) {
        if game.has_won() && !settings.keep_playing {
            break;
        }
        let snapshot = game.capture().unwrap_or_else(|never| match never {});
        let Some(direction) = policy.next_move(&snapshot) else {
            break;
        };
        game.step(direction);
        steps += 1;
        on_step(steps, direction, game);
    }

    EpisodeStats {
        score: game.score(),
        max_tile: game.max_tile(),
        steps,
        won: game.has_won(),
    }
}

const CONTROLS: &str = "Controls: WASD or Arrow Keys | H hint | P auto-move | R restart | Q quit";

/// Run interactive mode where user plays with keyboard.
fn run_interactive(settings: &Settings) -> Result<()> {
    // Single-key input until the guard is dropped
    let _raw = RawMode::enable();
    interactive_loop(&mut io::stdin(), settings)
}

/// Read keys from `input` until quit or end of input.
fn interactive_loop<R: Read>(input: &mut R, settings: &Settings) -> Result<()> {
    let mut game = Game::new(settings.seed);
    let advisor = GreedyPolicy::new(settings.config.weights);
    let mut buffer = [0u8; 3];

    redraw(&game)?;

    loop {
        let bytes_read = match input.read(&mut buffer) {
            Ok(0) => {
                debug!("input closed");
                return Ok(());
            }
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err).context("failed to read keyboard input"),
        };

        match parse_input(&buffer[..bytes_read]) {
            InputAction::Move(dir) => play_move(&mut game, dir)?,
            InputAction::Hint => match advisor.best_move(&game.snapshot()) {
                Some(dir) => println!("  Hint: {dir}"),
                None => println!("  Hint: no move changes the board"),
            },
            InputAction::Auto => {
                if let Some(dir) = advisor.best_move(&game.snapshot()) {
                    play_move(&mut game, dir)?;
                    println!("  Played: {dir}");
                }
            }
            InputAction::Restart => {
                game.reset(settings.seed);
                redraw(&game)?;
            }
            InputAction::Quit => {
                println!("\nGoodbye!");
                return Ok(());
            }
            InputAction::None => {}
        }
    }
}

fn play_move(game: &mut Game, dir: Direction) -> Result<()> {
    if game.is_done() {
        return Ok(());
    }
    let already_won = game.has_won();
    let result = game.step(dir);
    redraw(game)?;

    if result.reward > 0 {
        println!("  +{} points!", result.reward);
    }
    if game.has_won() && !already_won {
        println!("\n  *** 2048! *** Keep going or press Q to quit");
    }
    if game.is_done() {
        println!("\n  *** GAME OVER ***");
        println!("  Final Score: {}", game.score());
        println!("  Max Tile: {}", game.max_tile());
        println!("\n  Press R to restart or Q to quit");
    }
    Ok(())
}

fn redraw(game: &Game) -> Result<()> {
    println!("\x1b[2J\x1b[H"); // Clear screen
    println!("=== 2048 ===");
    println!("{CONTROLS}\n");
    print!("{game}");
    io::stdout().flush().context("failed to flush stdout")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputAction {
    Move(Direction),
    Hint,
    Auto,
    Restart,
    Quit,
    None,
}

fn parse_input(bytes: &[u8]) -> InputAction {
    match bytes {
        // Arrow keys (escape sequences)
        [27, 91, 65] => InputAction::Move(Direction::Up),
        [27, 91, 66] => InputAction::Move(Direction::Down),
        [27, 91, 67] => InputAction::Move(Direction::Right),
        [27, 91, 68] => InputAction::Move(Direction::Left),

        // WASD keys
        [b'w'] | [b'W'] => InputAction::Move(Direction::Up),
        [b's'] | [b'S'] => InputAction::Move(Direction::Down),
        [b'a'] | [b'A'] => InputAction::Move(Direction::Left),
        [b'd'] | [b'D'] => InputAction::Move(Direction::Right),

        [b'h'] | [b'H'] => InputAction::Hint,
        [b'p'] | [b'P'] => InputAction::Auto,

        // Control keys
        [b'q'] | [b'Q'] | [3] | [27] => InputAction::Quit, // q, Q, Ctrl+C, Esc
        [b'r'] | [b'R'] => InputAction::Restart,

        _ => InputAction::None,
    }
}

/// Terminal raw mode, restored on drop.
struct RawMode;

impl RawMode {
    fn enable() -> Self {
        enable_raw_mode();
        RawMode
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        disable_raw_mode();
    }
}

// Platform-specific terminal raw mode handling
#[cfg(unix)]
fn enable_raw_mode() {
    use std::os::unix::io::AsRawFd;
    unsafe {
        let fd = io::stdin().as_raw_fd();
        let mut termios: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &mut termios) != 0 {
            return;
        }
        termios.c_lflag &= !(libc::ICANON | libc::ECHO);
        termios.c_cc[libc::VMIN] = 1;
        termios.c_cc[libc::VTIME] = 0;
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(unix)]
fn disable_raw_mode() {
    use std::os::unix::io::AsRawFd;
    unsafe {
        let fd = io::stdin().as_raw_fd();
        let mut termios: libc::termios = std::mem::zeroed();
        if libc::tcgetattr(fd, &mut termios) != 0 {
            return;
        }
        termios.c_lflag |= libc::ICANON | libc::ECHO;
        libc::tcsetattr(fd, libc::TCSANOW, &termios);
    }
}

#[cfg(not(unix))]
fn enable_raw_mode() {
    // Without raw mode each key needs Enter
}

#[cfg(not(unix))]
fn disable_raw_mode() {}
