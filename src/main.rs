use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hexrealm::command::Command;
use hexrealm::config::GameConfig;
use hexrealm::error::Result;
use hexrealm::game::Game;
use hexrealm::save;

#[derive(Parser, Debug)]
#[command(name = "hexrealm")]
#[command(about = "Generate a fantasy hex world with a simulated history and explore it")]
struct Args {
    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// World width in hexes (1-100)
    #[arg(short = 'W', long)]
    width: Option<usize>,

    /// World height in hexes (1-100)
    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Number of civilizations (random 5-8 if not specified)
    #[arg(short, long)]
    civilizations: Option<usize>,

    /// JSON configuration file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory with content overrides (locations.json, objects.json, ...)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Save file used by save/load
    #[arg(long)]
    save_file: Option<PathBuf>,

    /// Resume from the save file instead of generating a new world
    #[arg(long)]
    load: bool,

    /// Print a world summary and exit
    #[arg(long)]
    summary: bool,

    /// Export the generated world data as JSON and exit
    #[arg(long)]
    export_world: Option<PathBuf>,
}

impl Args {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(width) = self.width {
            config.world_width = width;
        }
        if let Some(height) = self.height {
            config.world_height = height;
        }
        if self.civilizations.is_some() {
            config.history.civilization_count = self.civilizations;
        }
        if self.data_dir.is_some() {
            config.data_dir = self.data_dir.clone();
        }
        if let Some(path) = &self.save_file {
            config.save_path = path.clone();
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hexrealm=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = args.game_config()?;

    let mut game = if args.load {
        Game::from_save(save::load_game(&config.save_path)?, &config)?
    } else {
        Game::new(&config)?
    };

    if args.summary || args.export_world.is_some() {
        if args.summary {
            println!("{}", game.world.summary());
        }
        if let Some(path) = &args.export_world {
            save::export_world(path, &game.world)?;
            println!("World exported to {}", path.display());
        }
        return Ok(());
    }

    println!("\n=== HEXREALM ===");
    println!("World seed {}. Type help for a list of commands.\n", game.world.seed());
    println!("{}", game.execute(Command::Look).message);

    loop {
        print!("\n> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let command = Command::parse(input);
        let quit = command == Command::Quit;
        let outcome = game.execute(command);
        println!("{}", outcome.message);
        if quit {
            break;
        }
    }

    tracing::info!(day = game.clock.day, "session ended");
    Ok(())
}
