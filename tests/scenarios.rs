//! End-to-end scenarios across generation, exploration and persistence.

use hexrealm::command::Command;
use hexrealm::config::GameConfig;
use hexrealm::error::WorldError;
use hexrealm::game::Game;
use hexrealm::history::civgen::CivilizationGenerator;
use hexrealm::location::{ContentData, Exit, LocationGenerator, MAX_OBJECTS_PER_LOCATION};
use hexrealm::save;
use hexrealm::terrain::{terrain_histogram, TerrainType};
use hexrealm::world::World;

fn config(seed: u64, dir: &std::path::Path) -> GameConfig {
    GameConfig {
        seed: Some(seed),
        save_path: dir.join("save.json"),
        debug_dir: dir.to_path_buf(),
        ..GameConfig::default()
    }
}

#[test]
fn six_civilizations_on_an_empty_roster() {
    let mut generator = CivilizationGenerator::new(7);
    let civs = generator.generate_civilizations((20, 20), &mut [], Some(6));

    assert_eq!(civs.len(), 6);
    for (i, civ) in civs.iter().enumerate() {
        assert_eq!(civ.id.to_string(), format!("civ_{}", i + 1));
        assert!((852..=1252).contains(&civ.founding_year), "{}", civ.founding_year);
    }
}

#[test]
fn seed_12345_has_land_and_water() {
    let dir = tempfile::tempdir().unwrap();
    let world = World::generate(&config(12345, dir.path())).unwrap();
    let terrain = world.hexes.map(|h| h.terrain);
    let histogram = terrain_histogram(&terrain);

    assert!(histogram.get(&TerrainType::Water).copied().unwrap_or(0) > 0);
    assert!(histogram.iter().any(|(t, n)| t.is_land() && *n > 0));
    assert_eq!(histogram.values().sum::<usize>(), 400);

    let again = World::generate(&config(12345, dir.path())).unwrap();
    assert_eq!(terrain_histogram(&again.hexes.map(|h| h.terrain)), histogram);
}

#[test]
fn no_hex_is_claimed_twice() {
    let dir = tempfile::tempdir().unwrap();
    let world = World::generate(&config(808, dir.path())).unwrap();
    for (x, y, _) in world.hexes.iter() {
        let owners = world
            .civilizations
            .iter()
            .filter(|c| c.territory.contains((x, y)))
            .count();
        assert!(owners <= 1, "hex ({}, {}) has {} owners", x, y, owners);
    }
}

#[test]
fn every_hex_has_a_way_out() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(55, dir.path());
    cfg.world_width = 8;
    cfg.world_height = 8;
    let mut world = World::generate(&cfg).unwrap();
    let generator = LocationGenerator::new(ContentData::embedded());

    for y in 0..8 {
        for x in 0..8 {
            let locations = world.locations_at((x, y), &generator).unwrap();
            assert!(!locations.is_empty() && locations.len() <= 3);
            assert!(locations
                .iter()
                .any(|l| l.is_exit && l.areas[0].exits.contains(&Exit::Overworld)));
            for location in locations.iter() {
                for area in &location.areas {
                    assert_eq!(area.spawn_count(), MAX_OBJECTS_PER_LOCATION);
                }
            }
        }
    }
}

#[test]
fn revisiting_a_hex_returns_the_same_locations() {
    let dir = tempfile::tempdir().unwrap();
    let mut game = Game::new(&config(99, dir.path())).unwrap();

    assert!(game.execute(Command::parse("enter")).success);
    let first = game.current_location().cloned().unwrap();
    assert!(game.execute(Command::parse("exit")).success);
    assert!(game.execute(Command::parse("enter")).success);
    assert_eq!(game.current_location(), Some(&first));

    let mut fresh = World::generate(&config(99, dir.path())).unwrap();
    let generator = LocationGenerator::new(ContentData::embedded());
    let regenerated = fresh.locations_at(first.hex, &generator).unwrap();
    assert_eq!(regenerated[0], first);
}

#[test]
fn save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(2024, dir.path());
    let mut game = Game::new(&cfg).unwrap();
    game.execute(Command::parse("enter"));
    game.execute(Command::parse("rest"));
    assert!(game.execute(Command::parse("save")).success);

    let loaded = Game::from_save(save::load_game(&cfg.save_path).unwrap(), &cfg).unwrap();
    assert_eq!(loaded.player, game.player);
    assert_eq!(loaded.clock, game.clock);
    assert_eq!(loaded.world.hexes, game.world.hexes);
    assert_eq!(loaded.world.civilizations, game.world.civilizations);
    assert_eq!(loaded.world.events, game.world.events);
    assert_eq!(loaded.world.locations, game.world.locations);
}

#[test]
fn wrong_save_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(3, dir.path());
    let game = Game::new(&cfg).unwrap();

    let mut file = game.to_save();
    file.version = "2.0".to_string();
    save::save_game(&cfg.save_path, &file).unwrap();

    match save::load_game(&cfg.save_path) {
        Err(WorldError::IncompatibleSaveVersion { found, .. }) => assert_eq!(found, "2.0"),
        other => panic!("expected a version error, got {:?}", other.map(|s| s.version)),
    }

    let mut game = Game::new(&cfg).unwrap();
    let outcome = game.execute(Command::parse("load"));
    assert!(!outcome.success);
    assert!(outcome.message.contains("version"));
}

#[test]
fn unknown_command_answers_help() {
    let dir = tempfile::tempdir().unwrap();
    let mut game = Game::new(&config(1, dir.path())).unwrap();
    let outcome = game.execute(Command::parse("xyzzy"));
    assert!(!outcome.success);
    assert!(outcome.message.contains("Type help"));
    assert!(game.execute(Command::parse("help")).message.contains("research"));
}
