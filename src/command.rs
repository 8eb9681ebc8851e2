//! Text command parsing.

use crate::grid::Coord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub fn parse(word: &str) -> Option<Self> {
        let dir = match word {
            "north" | "n" => Direction::North,
            "northeast" | "ne" => Direction::NorthEast,
            "east" | "e" => Direction::East,
            "southeast" | "se" => Direction::SouthEast,
            "south" | "s" => Direction::South,
            "southwest" | "sw" => Direction::SouthWest,
            "west" | "w" => Direction::West,
            "northwest" | "nw" => Direction::NorthWest,
            _ => return None,
        };
        Some(dir)
    }

    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }

    /// Step from `from`, or `None` when that leaves the map.
    pub fn step(&self, from: Coord, width: usize, height: usize) -> Option<Coord> {
        let (dx, dy) = self.offset();
        let x = from.0 as i64 + dx as i64;
        let y = from.1 as i64 + dy as i64;
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            return None;
        }
        Some((x as usize, y as usize))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::NorthEast => "northeast",
            Direction::East => "east",
            Direction::SouthEast => "southeast",
            Direction::South => "south",
            Direction::SouthWest => "southwest",
            Direction::West => "west",
            Direction::NorthWest => "northwest",
        }
    }
}

/// What `research` looks up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResearchTopic {
    Civilization(Option<String>),
    Figure(Option<String>),
    Events(Option<String>),
    Unknown(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Enter(Option<String>),
    Exit,
    Look,
    Examine(String),
    Search(Option<String>),
    Take(String),
    Use(String),
    Forage(Option<String>),
    Chop(Option<String>),
    Drink(Option<String>),
    Unlock(String),
    Inventory,
    Status,
    Rest,
    Sleep,
    Save,
    Load,
    Help,
    Debug,
    DumpLocation,
    DumpHex,
    DumpWorld,
    Research(ResearchTopic),
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let input = input.trim().to_lowercase();
        let (verb, rest) = match input.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (input.as_str(), ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        if let Some(direction) = Direction::parse(verb) {
            return Command::Move(direction);
        }
        if verb == "go" || verb == "move" {
            if let Some(direction) = Direction::parse(rest) {
                return Command::Move(direction);
            }
        }

        match verb {
            "enter" => Command::Enter(arg),
            "exit" | "leave" => Command::Exit,
            "look" | "l" => Command::Look,
            "examine" | "x" | "inspect" => match arg {
                Some(target) => Command::Examine(target),
                None => Command::Look,
            },
            "search" => Command::Search(arg),
            "take" | "get" => Command::needs_arg(arg, Command::Take, &input),
            "use" | "eat" => Command::needs_arg(arg, Command::Use, &input),
            "forage" => Command::Forage(arg),
            "chop" => Command::Chop(arg),
            "drink" => Command::Drink(arg),
            "unlock" => Command::needs_arg(arg, Command::Unlock, &input),
            "inventory" | "inv" | "i" => Command::Inventory,
            "status" => Command::Status,
            "rest" => Command::Rest,
            "sleep" => Command::Sleep,
            "save" => Command::Save,
            "load" => Command::Load,
            "help" | "?" => Command::Help,
            "debug" => Command::Debug,
            "dump_location" => Command::DumpLocation,
            "dump_hex" => Command::DumpHex,
            "dump_world" => Command::DumpWorld,
            "research" => Command::Research(parse_research(rest)),
            "quit" | "q" => Command::Quit,
            _ => Command::Unknown(input.clone()),
        }
    }

    fn needs_arg(arg: Option<String>, make: fn(String) -> Command, input: &str) -> Command {
        match arg {
            Some(target) => make(target),
            None => Command::Unknown(input.to_string()),
        }
    }
}

fn parse_research(rest: &str) -> ResearchTopic {
    let (topic, name) = match rest.split_once(char::is_whitespace) {
        Some((topic, name)) => (topic, Some(name.trim().to_string())),
        None => (rest, None),
    };
    match topic {
        "civ" | "civilization" | "civilizations" => ResearchTopic::Civilization(name),
        "figure" | "figures" | "person" => ResearchTopic::Figure(name),
        "event" | "events" | "history" => ResearchTopic::Events(name),
        other => ResearchTopic::Unknown(other.to_string()),
    }
}

pub const HELP_TEXT: &str = "\
Movement:    north/south/east/west/northeast/northwest/southeast/southwest (n/s/e/w/ne/nw/se/sw)
Locations:   enter [name], exit, look
Objects:     examine <thing>, search [thing], take <item>, use <item>,
             forage [thing], chop [tree], drink [source], unlock <container>
Character:   inventory, status, rest, sleep
Game:        save, load, help, quit
Research:    research civ [name], research figure [name], research events [civ]
Debug:       debug, dump_location, dump_hex, dump_world";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_aliases() {
        assert_eq!(Command::parse("n"), Command::Move(Direction::North));
        assert_eq!(Command::parse("  SouthWest "), Command::Move(Direction::SouthWest));
        assert_eq!(Command::parse("go ne"), Command::Move(Direction::NorthEast));
    }

    #[test]
    fn test_arguments() {
        assert_eq!(Command::parse("enter"), Command::Enter(None));
        assert_eq!(
            Command::parse("enter forest clearing"),
            Command::Enter(Some("forest clearing".to_string()))
        );
        assert_eq!(Command::parse("take berries"), Command::Take("berries".to_string()));
        assert_eq!(Command::parse("examine"), Command::Look);
        assert!(matches!(Command::parse("take"), Command::Unknown(_)));
    }

    #[test]
    fn test_research_topics() {
        assert_eq!(
            Command::parse("research civ civ_2"),
            Command::Research(ResearchTopic::Civilization(Some("civ_2".to_string())))
        );
        assert_eq!(Command::parse("research figure"), Command::Research(ResearchTopic::Figure(None)));
        assert_eq!(
            Command::parse("research dragons"),
            Command::Research(ResearchTopic::Unknown("dragons".to_string()))
        );
    }

    #[test]
    fn test_unknown_input() {
        assert_eq!(Command::parse("dance wildly"), Command::Unknown("dance wildly".to_string()));
        assert_eq!(Command::parse(""), Command::Unknown(String::new()));
    }

    #[test]
    fn test_step_stays_on_map() {
        assert_eq!(Direction::North.step((0, 0), 5, 5), None);
        assert_eq!(Direction::SouthEast.step((0, 0), 5, 5), Some((1, 1)));
        assert_eq!(Direction::East.step((4, 2), 5, 5), None);
    }
}
