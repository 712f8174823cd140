//! Chip-firing puzzle CLI.
//!
//! Provides the `chipfire` binary, a terminal front end over
//! `chipfire-core`. It plays the roles the core leaves to collaborators:
//! configuration (node/edge counts), rendering (text or JSON snapshots)
//! and interaction (clicks and drags routed through the pointer tracker).

use std::io::{self, BufRead, Write};
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, warn, Level};

use chipfire_core::{
    AssignmentStrategy, Board, CoreError, EdgeBounds, FireOutcome, GameSession, GeneratorConfig,
    Layout, NodeId, PointerAction, PointerTracker, PositionSource, Snapshot,
};

/// Highest edge count the puzzle-size controls offer.
const UI_EDGE_CAP: usize = 1000;

/// Chip-firing puzzle: make every node non-negative.
#[derive(Parser)]
#[command(name = "chipfire", about = "Chip-firing graph puzzle")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Generate one puzzle and print it.
    Generate {
        #[command(flatten)]
        puzzle: PuzzleArgs,

        /// Print the snapshot as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Play interactively, one command per line on stdin.
    Play {
        #[command(flatten)]
        puzzle: PuzzleArgs,
    },
}

/// Puzzle settings shared by every subcommand.
#[derive(Args, Debug, Clone)]
struct PuzzleArgs {
    /// Number of nodes.
    #[arg(short, long, env = "CHIPFIRE_NODES", default_value_t = 10)]
    nodes: usize,

    /// Number of edges (at least nodes - 1).
    #[arg(short, long, env = "CHIPFIRE_EDGES", default_value_t = 15)]
    edges: usize,

    /// RNG seed for reproducible puzzles (default: random).
    #[arg(short, long, env = "CHIPFIRE_SEED")]
    seed: Option<u64>,

    /// How starting values are mapped onto nodes.
    #[arg(long, value_enum, default_value_t = StrategyArg::Uniform)]
    strategy: StrategyArg,

    /// Maximum random bonus on top of the chip threshold, as a fraction in [0, 1].
    #[arg(long, default_value_t = 0.3)]
    bonus_ratio: f64,

    /// Board width used for node placement.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Board height used for node placement.
    #[arg(long, default_value_t = 720.0)]
    height: f64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    Uniform,
    DegreeWeighted,
}

impl From<StrategyArg> for AssignmentStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Uniform => AssignmentStrategy::Uniform,
            StrategyArg::DegreeWeighted => AssignmentStrategy::DegreeWeighted,
        }
    }
}

impl PuzzleArgs {
    fn config(&self) -> GeneratorConfig {
        GeneratorConfig::new(self.nodes, self.edges)
            .with_strategy(self.strategy.into())
            .with_bonus_ratio(self.bonus_ratio)
    }

    fn board(&self) -> Board {
        Board::scaled(self.width, self.height)
    }

    fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }

    /// Session and layout streams. The layout stream is seeded from the
    /// session stream so board positions never replay generator draws.
    fn split_rngs(&self) -> (ChaCha8Rng, ChaCha8Rng) {
        let mut session_rng = self.rng();
        let layout_rng = ChaCha8Rng::seed_from_u64(session_rng.gen());
        (session_rng, layout_rng)
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Generate { puzzle, json } => run_generate(&puzzle, json),
        Commands::Play { puzzle } => run_play(&puzzle),
    };
    process::exit(exit_code);
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

/// Execute the generate subcommand.
///
/// Returns exit code: 0 = success, 1 = invalid configuration, 3 = I/O error.
fn run_generate(args: &PuzzleArgs, json: bool) -> i32 {
    let (session_rng, mut layout_rng) = args.split_rngs();
    let session = match GameSession::with_rng(args.config(), session_rng) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let layout = Layout::scatter(args.board(), session.graph().node_count(), &mut layout_rng);
    let snapshot = session.snapshot(&layout);

    let mut out = io::stdout().lock();
    let written = if json {
        serde_json::to_string_pretty(&snapshot)
            .map_err(io::Error::other)
            .and_then(|text| writeln!(out, "{}", text))
    } else {
        render(&mut out, &snapshot)
    };
    match written {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("I/O error: {}", e);
            3
        }
    }
}

/// Execute the play subcommand.
///
/// Returns exit code: 0 = success, 1 = invalid configuration, 3 = I/O error.
fn run_play(args: &PuzzleArgs) -> i32 {
    let mut game = match Game::new(args) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    match game.run(stdin.lock(), &mut out) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("I/O error: {}", e);
            3
        }
    }
}

// ---------------------------------------------------------------------------
// Interactive game loop
// ---------------------------------------------------------------------------

/// A parsed line of player input.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Fire(u32),
    Click(f64, f64),
    Drag(u32, f64, f64),
    Show,
    New,
    Size(usize, usize),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Err("empty command".into());
    };
    let args: Vec<&str> = words.collect();

    fn num<T: std::str::FromStr>(word: &str) -> Result<T, String> {
        word.parse().map_err(|_| format!("'{}' is not a number", word))
    }

    match (head, args.as_slice()) {
        ("fire" | "f", [id]) => Ok(Command::Fire(num(id)?)),
        ("click" | "c", [x, y]) => Ok(Command::Click(num(x)?, num(y)?)),
        ("drag" | "d", [id, x, y]) => Ok(Command::Drag(num(id)?, num(x)?, num(y)?)),
        ("show" | "s", []) => Ok(Command::Show),
        ("new" | "n", []) => Ok(Command::New),
        ("size", [n, e]) => Ok(Command::Size(num(n)?, num(e)?)),
        ("help" | "h" | "?", []) => Ok(Command::Help),
        ("quit" | "q" | "exit", []) => Ok(Command::Quit),
        _ => Err(format!("unrecognized command '{}' (try 'help')", line.trim())),
    }
}

/// Clamps a requested size the way the puzzle-size controls do.
fn clamp_size(nodes: usize, edges: usize) -> (usize, usize) {
    let nodes = nodes.max(2);
    let bounds = EdgeBounds::for_nodes(nodes);
    let max = bounds.max.min(UI_EDGE_CAP).max(bounds.min);
    (nodes, edges.clamp(bounds.min, max))
}

const HELP: &str = "\
commands:
  fire <id>          fire a node
  click <x> <y>      click on the board (fires the node under the pointer)
  drag <id> <x> <y>  move a node without firing it
  show               print the board
  new                start a new puzzle
  size <n> <e>       change puzzle size and start over
  quit               leave";

struct Game {
    session: GameSession,
    layout: Layout,
    tracker: PointerTracker,
    layout_rng: ChaCha8Rng,
    base_config: GeneratorConfig,
}

impl Game {
    fn new(args: &PuzzleArgs) -> Result<Self, CoreError> {
        let (session_rng, mut layout_rng) = args.split_rngs();
        let base_config = args.config();
        let session = GameSession::with_rng(base_config.clone(), session_rng)?;
        let layout = Layout::scatter(args.board(), session.graph().node_count(), &mut layout_rng);
        Ok(Game {
            session,
            layout,
            tracker: PointerTracker::new(),
            layout_rng,
            base_config,
        })
    }

    fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> io::Result<()> {
        render(out, &self.session.snapshot(&self.layout))?;
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => self.apply(command, out)?,
                Err(msg) => writeln!(out, "{}", msg)?,
            }
        }
        Ok(())
    }

    fn apply<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<()> {
        debug!(?command, "command");
        match command {
            Command::Fire(id) => self.fire(NodeId(id), out),
            Command::Click(x, y) => {
                self.tracker.press(&self.layout, x, y);
                let action = self.tracker.release(&mut self.layout, x, y, self.session.is_solved());
                self.dispatch(action, out)
            }
            Command::Drag(id, x, y) => {
                if self.layout.position_of(NodeId(id)).is_none() {
                    return writeln!(out, "no node {}", id);
                }
                self.tracker.grab(NodeId(id));
                self.tracker.drag(&mut self.layout, x, y);
                let action = self.tracker.release(&mut self.layout, x, y, self.session.is_solved());
                self.dispatch(action, out)
            }
            Command::Show => render(out, &self.session.snapshot(&self.layout)),
            Command::New => self.restart(out),
            Command::Size(nodes, edges) => {
                let (nodes, edges) = clamp_size(nodes, edges);
                let config = GeneratorConfig {
                    nodes,
                    edges,
                    ..self.base_config.clone()
                };
                match self.session.reconfigure(config) {
                    Ok(()) => {
                        self.rescatter();
                        render(out, &self.session.snapshot(&self.layout))
                    }
                    Err(e) => writeln!(out, "{}", e),
                }
            }
            Command::Help => writeln!(out, "{}", HELP),
            Command::Quit => Ok(()),
        }
    }

    fn dispatch<W: Write>(&mut self, action: PointerAction, out: &mut W) -> io::Result<()> {
        match action {
            PointerAction::None => writeln!(out, "nothing there"),
            PointerAction::Fire(id) => self.fire(id, out),
            PointerAction::Moved(id) => match self.layout.position_of(id) {
                Some(p) => writeln!(out, "node {} moved to ({:.0}, {:.0})", id, p.x, p.y),
                None => Ok(()),
            },
            PointerAction::Restart => self.restart(out),
        }
    }

    fn fire<W: Write>(&mut self, id: NodeId, out: &mut W) -> io::Result<()> {
        match self.session.fire(id) {
            Ok(FireOutcome::Continue { report, moves }) => {
                writeln!(
                    out,
                    "fired {} (-{}), {} negative left, moves: {}",
                    report.node, report.shed, report.negatives_remaining, moves
                )?;
                render(out, &self.session.snapshot(&self.layout))
            }
            Ok(FireOutcome::Solved { summary, .. }) => {
                render(out, &self.session.snapshot(&self.layout))?;
                writeln!(out, "Game solved in {} moves!", summary.moves)?;
                writeln!(out, "type 'new' or click anywhere to play again")
            }
            Err(e) => {
                warn!(error = %e, "fire rejected");
                writeln!(out, "{}", e)
            }
        }
    }

    fn restart<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        match self.session.reset() {
            Ok(()) => {
                self.rescatter();
                render(out, &self.session.snapshot(&self.layout))
            }
            Err(e) => writeln!(out, "{}", e),
        }
    }

    fn rescatter(&mut self) {
        self.layout = Layout::scatter(
            *self.layout.board(),
            self.session.graph().node_count(),
            &mut self.layout_rng,
        );
        self.tracker.cancel();
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

/// Writes a snapshot as a node table followed by the edge list.
fn render<W: Write>(out: &mut W, snapshot: &Snapshot) -> io::Result<()> {
    writeln!(
        out,
        "moves: {}{}",
        snapshot.moves,
        if snapshot.solved { "  (solved)" } else { "" }
    )?;
    for node in &snapshot.nodes {
        let marker = if node.value < 0 { "!" } else { " " };
        write!(out, "{} [{:>3}] {:>5}  deg {:>2}", marker, node.id, node.value, node.degree)?;
        if let Some(p) = node.position {
            write!(out, "  @ ({:.0}, {:.0})", p.x, p.y)?;
        }
        writeln!(out)?;
    }
    let edges: Vec<String> = snapshot
        .edges
        .iter()
        .map(|edge| format!("{}-{}", edge.from, edge.to))
        .collect();
    writeln!(out, "edges: {}", edges.join(" "))
}
