//! Game session: the player, the clock and the command loop state.
//!
//! [`Game::execute`] is the only entry point the front end needs. Every
//! command produces a [`CommandOutcome`] that is also recorded in the
//! session's [`MessageLog`].

pub mod actions;
pub mod clock;
pub mod player;
pub mod research;

use std::path::PathBuf;

use chrono::Utc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::command::{Command, Direction, HELP_TEXT};
use crate::config::GameConfig;
use crate::error::Result;
use crate::grid::Coord;
use crate::location::{Area, ContentData, Exit, Location, LocationGenerator};
use crate::messages::{MessageKind, MessageLog};
use crate::save::{self, SaveFile, WorldData, SAVE_VERSION};
use crate::world::World;

use self::clock::{GameClock, Weather};
use self::player::Player;

const PLAYER_NAME: &str = "Wanderer";
/// Mixed into the world seed for the session's dice.
const SESSION_SALT: u64 = 0x5E55_1011;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    pub message: String,
}

impl CommandOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

pub struct Game {
    pub world: World,
    pub player: Player,
    pub clock: GameClock,
    pub weather: Weather,
    pub messages: MessageLog,
    locations: LocationGenerator,
    rng: ChaCha8Rng,
    save_path: PathBuf,
    debug_dir: PathBuf,
}

impl Game {
    /// Generate a fresh world and drop the player at the first capital.
    pub fn new(config: &GameConfig) -> Result<Self> {
        let world = World::generate(config)?;
        let start = starting_position(&world);
        let player = Player::new(PLAYER_NAME, start);
        Ok(Self::assemble(world, player, GameClock::default(), Weather::default(), config))
    }

    /// Resume a saved game. Content and paths come from `config`.
    pub fn from_save(save: SaveFile, config: &GameConfig) -> Result<Self> {
        let mut game = Self::assemble(
            save.world_data.clone().into_world()?,
            Player::new(PLAYER_NAME, save.position),
            save.clock,
            save.weather,
            config,
        );
        game.restore_player(save);
        Ok(game)
    }

    fn assemble(world: World, player: Player, clock: GameClock, weather: Weather, config: &GameConfig) -> Self {
        let content = match &config.data_dir {
            Some(dir) => ContentData::load_from(dir),
            None => ContentData::embedded(),
        };
        let rng = ChaCha8Rng::seed_from_u64(world.seed() ^ SESSION_SALT);
        Self {
            world,
            player,
            clock,
            weather,
            messages: MessageLog::new(),
            locations: LocationGenerator::new(content),
            rng,
            save_path: config.save_path.clone(),
            debug_dir: config.debug_dir.clone(),
        }
    }

    fn restore_player(&mut self, save: SaveFile) {
        self.player = Player {
            character: save.character,
            survival: save.survival,
            position: save.position,
            current_location: save.current_location,
        };
        self.clock = save.clock;
        self.weather = save.weather;
    }

    pub fn to_save(&self) -> SaveFile {
        SaveFile {
            version: SAVE_VERSION.to_string(),
            saved_at: Utc::now(),
            character: self.player.character.clone(),
            survival: self.player.survival,
            position: self.player.position,
            current_location: self.player.current_location.clone(),
            clock: self.clock,
            weather: self.weather,
            world_data: WorldData::from_world(&self.world),
        }
    }

    pub fn save(&self) -> Result<()> {
        save::save_game(&self.save_path, &self.to_save())
    }

    /// Replace the session state with the save at the configured path.
    pub fn load(&mut self) -> Result<()> {
        let save = save::load_game(&self.save_path)?;
        self.world = save.world_data.clone().into_world()?;
        self.restore_player(save);
        Ok(())
    }

    /// Run one command and log its outcome.
    pub fn execute(&mut self, command: Command) -> CommandOutcome {
        tracing::debug!(?command, "executing command");
        let outcome = if !self.player.character.is_alive()
            && !matches!(command, Command::Load | Command::Help | Command::Quit)
        {
            CommandOutcome::fail("You have perished. You can only load, ask for help, or quit.")
        } else {
            self.dispatch(command)
        };

        let kind = if outcome.success {
            MessageKind::Success
        } else {
            MessageKind::Failure
        };
        self.messages.push(kind, outcome.message.clone(), self.clock.day);
        outcome
    }

    fn dispatch(&mut self, command: Command) -> CommandOutcome {
        match command {
            Command::Move(direction) => self.travel(direction),
            Command::Enter(name) => self.enter(name.as_deref()),
            Command::Exit => self.exit(),
            Command::Look => self.look(),
            Command::Examine(target) => self.examine(&target),
            Command::Search(target) => self.search(target.as_deref()),
            Command::Take(item) => self.take(&item),
            Command::Use(item) => self.use_item(&item),
            Command::Forage(target) => self.forage(target.as_deref()),
            Command::Chop(target) => self.chop(target.as_deref()),
            Command::Drink(target) => self.drink(target.as_deref()),
            Command::Unlock(target) => self.unlock(&target),
            Command::Inventory => CommandOutcome::ok(self.player.character.inventory_text()),
            Command::Status => self.status(),
            Command::Rest => self.rest(),
            Command::Sleep => self.sleep(),
            Command::Save => match self.save() {
                Ok(()) => CommandOutcome::ok(format!("Game saved to {}.", self.save_path.display())),
                Err(e) => CommandOutcome::fail(format!("Could not save: {}", e)),
            },
            Command::Load => match self.load() {
                Ok(()) => CommandOutcome::ok(format!("Game loaded. {}", self.clock)),
                Err(e) => CommandOutcome::fail(format!("Could not load: {}", e)),
            },
            Command::Help => CommandOutcome::ok(HELP_TEXT),
            Command::Debug => self.debug(),
            Command::DumpLocation => self.dump_location(),
            Command::DumpHex => self.dump_report(save::dump_hex(&self.debug_dir, &self.world, self.player.position)),
            Command::DumpWorld => self.dump_report(save::dump_world(&self.debug_dir, &self.world)),
            Command::Research(topic) => {
                let (found, text) = research::research(&self.world, &topic);
                CommandOutcome { success: found, message: text }
            }
            Command::Quit => CommandOutcome::ok("Farewell."),
            Command::Unknown(_) => CommandOutcome::fail("Unknown command. Type help for a list of commands."),
        }
    }

    /// The location the player is inside, if any.
    pub fn current_location(&self) -> Option<&Location> {
        let id = self.player.current_location.as_deref()?;
        self.world.location(id)
    }

    fn current_area(&self) -> Option<&Area> {
        self.current_location()?.main_area()
    }

    /// Pass time. Needs grow and the weather moves on with every hour crossed.
    fn pass_time(&mut self, minutes: u32, resting: bool) {
        let hours = self.clock.advance(minutes);
        for _ in 0..hours {
            let damage = self.player.survival.pass_hour(resting);
            self.player.character.hurt(damage);
        }
        if let Some(hex) = self.world.hex(self.player.position) {
            self.weather = self.weather.evolve(hours, hex.biome, &mut self.rng);
        }
    }

    fn travel(&mut self, direction: Direction) -> CommandOutcome {
        if let Some(location) = self.current_location() {
            return CommandOutcome::fail(format!("You must leave {} first.", location.name));
        }
        let Some(target) = direction.step(self.player.position, self.world.width, self.world.height) else {
            return CommandOutcome::fail(format!("The world ends to the {}.", direction.name()));
        };
        let Some(hex) = self.world.hex(target) else {
            return CommandOutcome::fail(format!("The world ends to the {}.", direction.name()));
        };
        if !hex.terrain.is_land() {
            return CommandOutcome::fail(format!("Open water blocks the way {}.", direction.name()));
        }

        self.player.position = target;
        let strain = self.weather.travel_strain();
        self.pass_time(60, false);
        self.player.survival.fatigue = (self.player.survival.fatigue + strain).min(player::MAX_NEED);

        let mut text = format!("You travel {}.\n{}", direction.name(), self.world.describe_hex(target));
        if self.player.character.hit_points < self.player.character.max_hit_points / 4 {
            text.push_str("\nYou are badly weakened.");
        }
        CommandOutcome::ok(text)
    }

    fn enter(&mut self, name: Option<&str>) -> CommandOutcome {
        let position = self.player.position;
        let Some(here) = self.world.locations_at(position, &self.locations) else {
            return CommandOutcome::fail("There is nowhere to enter here.");
        };

        let current = self.player.current_location.clone();
        let target = match (name, &current) {
            (Some(query), _) => here
                .iter()
                .find(|l| crate::location::types::matches_name(&l.name, &l.id, query)),
            (None, None) => here.iter().find(|l| l.is_exit),
            (None, Some(current)) => here.iter().find(|l| &l.id != current),
        };
        let Some(target) = target else {
            return CommandOutcome::fail("You find no such place here.");
        };
        if current.as_deref() == Some(target.id.as_str()) {
            return CommandOutcome::fail(format!("You are already in {}.", target.name));
        }

        let reachable = match &current {
            None => target.is_exit,
            Some(current) => {
                let linked = |l: &Location, to: &str| {
                    l.areas
                        .iter()
                        .any(|a| a.exits.contains(&Exit::Location(to.to_string())))
                };
                linked(target, current)
                    || here.iter().any(|l| &l.id == current && linked(l, &target.id))
            }
        };
        if !reachable {
            let gate = here.iter().find(|l| l.is_exit).map_or("elsewhere", |l| l.name.as_str());
            return CommandOutcome::fail(format!("{} can only be reached from {}.", target.name, gate));
        }

        let (id, text) = (target.id.clone(), target.main_area().map(|a| a.describe()).unwrap_or_default());
        self.player.current_location = Some(id);
        self.pass_time(10, false);
        CommandOutcome::ok(text)
    }

    fn exit(&mut self) -> CommandOutcome {
        let Some(area) = self.current_area() else {
            return CommandOutcome::fail("You are not inside anywhere.");
        };
        let exit = area
            .exits
            .iter()
            .find(|e| **e == Exit::Overworld)
            .or_else(|| area.exits.first())
            .cloned();

        match exit {
            Some(Exit::Overworld) => {
                self.player.current_location = None;
                self.pass_time(10, false);
                CommandOutcome::ok(format!(
                    "You step back out into the open.\n{}",
                    self.world.describe_hex(self.player.position)
                ))
            }
            Some(Exit::Location(id)) => {
                let Some(text) = self.world.location(&id).and_then(|l| l.main_area()).map(|a| a.describe()) else {
                    return CommandOutcome::fail("The way back has vanished.");
                };
                self.player.current_location = Some(id);
                self.pass_time(10, false);
                CommandOutcome::ok(text)
            }
            None => CommandOutcome::fail("There is no way out of here."),
        }
    }

    fn look(&mut self) -> CommandOutcome {
        if let Some(area) = self.current_area() {
            return CommandOutcome::ok(area.describe());
        }

        let position = self.player.position;
        let mut text = self.world.describe_hex(position);
        text.push_str(&format!("\n{}. The weather is {}.", self.clock, self.weather));
        if let Some(here) = self.world.locations_at(position, &self.locations) {
            let names: Vec<String> = here
                .iter()
                .map(|l| if l.is_exit { l.name.clone() } else { format!("{} (inner)", l.name) })
                .collect();
            text.push_str(&format!("\nPlaces here: {}", names.join(", ")));
        }
        CommandOutcome::ok(text)
    }

    fn status(&self) -> CommandOutcome {
        let place = match self.current_location() {
            Some(location) => location.name.clone(),
            None => "the open land".to_string(),
        };
        CommandOutcome::ok(format!(
            "{}\nAt ({}, {}) in {}. {}. Weather: {}.",
            self.player.status(),
            self.player.position.0,
            self.player.position.1,
            place,
            self.clock,
            self.weather
        ))
    }

    fn debug(&self) -> CommandOutcome {
        CommandOutcome::ok(format!(
            "{}\nPlayer at {:?}, location {:?}, {} hexes with generated locations.",
            self.world.summary(),
            self.player.position,
            self.player.current_location,
            self.world.locations.len()
        ))
    }

    fn dump_location(&self) -> CommandOutcome {
        match self.current_location() {
            Some(location) => self.dump_report(save::dump_location(&self.debug_dir, location)),
            None => CommandOutcome::fail("You are not inside a location."),
        }
    }

    fn dump_report(&self, written: Result<PathBuf>) -> CommandOutcome {
        match written {
            Ok(path) => CommandOutcome::ok(format!("Wrote {}.", path.display())),
            Err(e) => CommandOutcome::fail(format!("Dump failed: {}", e)),
        }
    }
}

/// First capital, else the first land hex, else the origin.
fn starting_position(world: &World) -> Coord {
    world
        .civilizations
        .iter()
        .find_map(|c| c.territory.capital)
        .or_else(|| {
            world
                .hexes
                .iter()
                .find(|(_, _, hex)| hex.terrain.is_land())
                .map(|(x, y, _)| (x, y))
        })
        .unwrap_or((0, 0))
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_new_game_starts_on_land() {
        let dir = tempfile::tempdir().unwrap();
        let game = Game::new(&config(dir.path())).unwrap();
        let hex = game.world.hex(game.player.position).unwrap();
        assert!(hex.terrain.is_land());
        assert_eq!(game.player.current_location, None);
    }

    #[test]
    fn test_unknown_command_points_to_help() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = Game::new(&config(dir.path())).unwrap();
        let outcome = game.execute(Command::parse("juggle"));
        assert!(!outcome.success);
        assert!(outcome.message.contains("Type help"));
        assert_eq!(game.messages.last().map(|m| m.kind), Some(MessageKind::Failure));
    }

    #[test]
    fn test_enter_and_exit_follow_exits() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = Game::new(&config(dir.path())).unwrap();

        let outcome = game.execute(Command::Enter(None));
        assert!(outcome.success, "{}", outcome.message);
        let inside = game.current_location().unwrap();
        assert!(inside.is_exit);

        assert!(!game.execute(Command::Move(Direction::North)).success);

        let outcome = game.execute(Command::Exit);
        assert!(outcome.success);
        assert_eq!(game.player.current_location, None);
        assert!(!game.execute(Command::Exit).success);
    }

    #[test]
    fn test_inner_locations_need_the_gate() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = Game::new(&config(dir.path())).unwrap();
        let position = game.player.position;
        let here = game.world.locations_at(position, &game.locations).unwrap().clone();

        if let Some(inner) = here.iter().find(|l| !l.is_exit) {
            assert!(!game.execute(Command::Enter(Some(inner.id.clone()))).success);
            assert!(game.execute(Command::Enter(None)).success);
            assert!(game.execute(Command::Enter(Some(inner.id.clone()))).success);
            assert!(game.execute(Command::Exit).success);
            assert!(game.current_location().unwrap().is_exit);
        }
    }

    #[test]
    fn test_movement_blocked_at_edges_and_water() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = Game::new(&config(dir.path())).unwrap();
        game.player.position = (0, 0);
        assert!(!game.execute(Command::Move(Direction::North)).success);
        assert!(!game.execute(Command::Move(Direction::West)).success);
        assert_eq!(game.player.position, (0, 0));

        let water = game
            .world
            .hexes
            .iter()
            .find(|(x, _, h)| !h.terrain.is_land() && *x > 0)
            .map(|(x, y, _)| (x, y));
        if let Some((x, y)) = water {
            game.player.position = (x - 1, y);
            assert!(!game.execute(Command::Move(Direction::East)).success);
            assert_eq!(game.player.position, (x - 1, y));
        }
    }

    #[test]
    fn test_travel_costs_an_hour() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = Game::new(&config(dir.path())).unwrap();
        let start = game.player.position;
        let step = [Direction::North, Direction::South, Direction::East, Direction::West]
            .into_iter()
            .find(|d| {
                d.step(start, game.world.width, game.world.height)
                    .and_then(|c| game.world.hex(c))
                    .is_some_and(|h| h.terrain.is_land())
            });
        if let Some(direction) = step {
            assert!(game.execute(Command::Move(direction)).success);
            assert_eq!(game.clock.hour(), 9);
            assert!(game.player.survival.hunger > 0);
        }
    }

    #[test]
    fn test_dead_player_can_only_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = Game::new(&config(dir.path())).unwrap();
        game.player.character.hurt(1000);
        assert!(!game.execute(Command::Look).success);
        assert!(game.execute(Command::Help).success);
    }

    #[test]
    fn test_save_then_load_restores_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = Game::new(&config(dir.path())).unwrap();
        game.execute(Command::Enter(None));
        let position = game.player.position;
        let location = game.player.current_location.clone();
        assert!(game.execute(Command::Save).success);

        game.player.current_location = None;
        game.player.position = (0, 0);
        game.world.locations.clear();
        assert!(game.execute(Command::Load).success);
        assert_eq!(game.player.position, position);
        assert_eq!(game.player.current_location, location);
        assert!(game.current_location().is_some());
    }

    #[test]
    fn test_load_without_save_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = Game::new(&config(dir.path())).unwrap();
        let outcome = game.execute(Command::Load);
        assert!(!outcome.success);
        assert!(outcome.message.contains("No save file"));
    }

    #[test]
    fn test_dump_commands_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = Game::new(&config(dir.path())).unwrap();
        assert!(!game.execute(Command::DumpLocation).success);
        assert!(game.execute(Command::DumpHex).success);
        game.execute(Command::Enter(None));
        assert!(game.execute(Command::DumpLocation).success);
        assert!(!dir.path().join("debug").join("debug_world_data.json").exists());
        assert!(game.execute(Command::DumpWorld).success);
        assert!(dir.path().join("debug").join("debug_world_data.json").exists());
    }
}
