//! Procedural fantasy world generation and text exploration.
//!
//! Builds a hex world (terrain, hydrology, biomes), simulates the history of
//! its civilizations, and lets a player explore it one command at a time.

pub mod command;
pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod history;
pub mod interaction;
pub mod location;
pub mod messages;
pub mod noise_gen;
pub mod save;
pub mod seeds;
pub mod terrain;
pub mod world;
