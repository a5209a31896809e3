//! Tabletop benchmark driver.
//!
//! Loads a scene, feeds it natural-language commands one per line, and
//! writes every outbound message as a JSON line on stdout. Logs go to
//! stderr, filtered by `RUST_LOG` or the `-v` flag.
//!
//! # Commands
//!
//! - `desk run --scene scene.json [--script commands.txt]` - execute commands (stdin when no script)
//! - `desk graph --scene scene.json` - print the scene graph of a freshly spawned scene
//! - `desk config` - print the default configuration

mod scene;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use desk_core::{Outbound, Simulation};
use desk_types::DeskConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Tabletop manipulation benchmark
#[derive(Parser)]
#[command(name = "desk")]
#[command(about = "Drive the tabletop benchmark engine from the command line", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute commands against a scene
    Run(RunArgs),

    /// Print the scene graph of a scene without running anything
    Graph(SceneArgs),

    /// Print the default configuration as JSON
    Config,
}

#[derive(Args)]
struct SceneArgs {
    /// Scene file (JSON array of object specs)
    #[arg(long)]
    scene: PathBuf,

    /// Configuration file (JSON; missing fields take defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed for reproducible placements
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    scene: SceneArgs,

    /// Command script, one per line; reads stdin when omitted
    #[arg(long)]
    script: Option<PathBuf>,

    /// Simulated seconds to wait for each command to settle
    #[arg(long, default_value_t = 30.0)]
    timeout: f64,

    /// Also print the periodic scene-graph publications
    #[arg(long)]
    graphs: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run(args) => run(&args),
        Commands::Graph(args) => graph(&args),
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&DeskConfig::default())?);
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_scene(args: &SceneArgs) -> Result<Simulation> {
    let config = scene::load_config(args.config.as_deref())?;
    let specs = scene::load_scene(&args.scene)?;
    info!(objects = specs.len(), scene = %args.scene.display(), "loading scene");
    scene::build(config, specs, args.seed)
}

fn graph(args: &SceneArgs) -> Result<()> {
    let mut sim = open_scene(args)?;
    println!("{}", serde_json::to_string_pretty(&sim.scene_graph())?);
    Ok(())
}

fn run(args: &RunArgs) -> Result<()> {
    let mut sim = open_scene(&args.scene)?;
    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open script {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let (mut accepted, mut rejected) = (0_usize, 0_usize);
    for line in input.lines() {
        let line = line.context("failed to read command")?;
        let command = line.trim();
        if command.is_empty() || command.starts_with('#') {
            continue;
        }

        info!(command, "submitting");
        match sim.submit(command) {
            Ok(()) => {
                accepted += 1;
                if !sim.run_until_idle(args.timeout) {
                    warn!(command, timeout = args.timeout, "scene did not settle");
                }
            }
            Err(e) if e.is_rejection() => {
                rejected += 1;
                warn!(command, reason = %e, "command rejected");
            }
            Err(e) => return Err(e.into()),
        }
        emit(&mut out, &mut sim, args.graphs)?;
    }

    let final_graph = Outbound::SceneGraph(sim.scene_graph());
    writeln!(out, "{}", serde_json::to_string(&final_graph)?)?;
    info!(accepted, rejected, elapsed = sim.time(), "script finished");
    Ok(())
}

fn emit(out: &mut impl Write, sim: &mut Simulation, graphs: bool) -> Result<()> {
    for message in sim.drain_outbound() {
        if !graphs && matches!(message, Outbound::SceneGraph(_)) {
            continue;
        }
        writeln!(out, "{}", serde_json::to_string(&message)?)?;
    }
    out.flush()?;
    Ok(())
}
