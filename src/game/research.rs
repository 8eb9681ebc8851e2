//! Lookups into the generated history for the `research` command.

use crate::command::ResearchTopic;
use crate::history::events::events_involving;
use crate::history::figures::Genealogy;
use crate::world::World;

/// How many events `research events` lists.
const EVENT_LIMIT: usize = 10;

/// Answer a research query; `false` when nothing matched.
pub fn research(world: &World, topic: &ResearchTopic) -> (bool, String) {
    match topic {
        ResearchTopic::Civilization(None) => (true, list_civilizations(world)),
        ResearchTopic::Civilization(Some(query)) => civilization(world, query),
        ResearchTopic::Figure(None) => (true, list_figures(world)),
        ResearchTopic::Figure(Some(query)) => figure(world, query),
        ResearchTopic::Events(query) => events(world, query.as_deref()),
        ResearchTopic::Unknown(other) => (
            false,
            format!("Nothing to research about '{}'. Try civ, figure or events.", other),
        ),
    }
}

fn list_civilizations(world: &World) -> String {
    if world.civilizations.is_empty() {
        return "No civilizations have risen in this world.".to_string();
    }
    let mut lines = vec!["Known civilizations:".to_string()];
    for civ in &world.civilizations {
        lines.push(format!("  {} {} ({}, {})", civ.id, civ.name, civ.races, civ.government));
    }
    lines.join("\n")
}

fn civilization(world: &World, query: &str) -> (bool, String) {
    let Some(civ) = world.find_civilization(query) else {
        return (false, format!("No civilization called '{}' is recorded.", query));
    };

    let mut lines = vec![civ.summary()];
    if let Some(capital) = civ.territory.capital {
        lines.push(format!("Capital at ({}, {}).", capital.0, capital.1));
    }
    for (other, level) in &civ.faction_relationships {
        let name = world
            .civilizations
            .iter()
            .find(|c| c.id == *other)
            .map_or_else(|| other.to_string(), |c| c.name.clone());
        lines.push(format!("  {} with {}", level, name));
    }

    let events = events_involving(&world.events, civ.id);
    if !events.is_empty() {
        lines.push(format!("{} recorded events, most recent:", events.len()));
        for event in events.iter().rev().take(3) {
            lines.push(format!("  [{}] {}", event.date, event.title));
        }
    }
    (true, lines.join("\n"))
}

fn list_figures(world: &World) -> String {
    let founders: Vec<String> = world
        .figures
        .iter()
        .filter(|f| f.parents.is_empty())
        .map(|f| format!("  {} {}, {} ({})", f.id, f.name, f.title, f.race))
        .collect();
    if founders.is_empty() {
        return "No figures of note are remembered.".to_string();
    }
    format!("Founding figures:\n{}", founders.join("\n"))
}

fn figure(world: &World, query: &str) -> (bool, String) {
    let Some(figure) = world.find_figure(query) else {
        return (false, format!("No figure called '{}' is remembered.", query));
    };

    let mut tree = Genealogy::new(&world.figures);
    let descendants = tree.descendant_count(figure.id);
    let lineage = tree.deepest_lineage(figure.id);

    let mut lines = vec![format!(
        "{} ({}), {} of the {} people, {}.",
        figure.name,
        figure.id,
        figure.title,
        figure.race,
        figure.lifespan_text()
    )];
    if let Some(civ) = figure.civilization.and_then(|id| world.civilizations.iter().find(|c| c.id == id)) {
        lines.push(format!("Associated with {}.", civ.name));
    }
    lines.push(format!("{} descendants recorded.", descendants));
    if lineage.len() > 1 {
        let names: Vec<String> = lineage
            .iter()
            .filter_map(|id| world.figures.iter().find(|f| f.id == *id))
            .map(|f| f.name.clone())
            .collect();
        lines.push(format!("Longest line: {}", names.join(" > ")));
    }
    (true, lines.join("\n"))
}

fn events(world: &World, query: Option<&str>) -> (bool, String) {
    let (heading, events) = match query {
        Some(q) => {
            let Some(civ) = world.find_civilization(q) else {
                return (false, format!("No civilization called '{}' is recorded.", q));
            };
            (format!("Chronicle of {}", civ.name), events_involving(&world.events, civ.id))
        }
        None => ("Chronicle of the world".to_string(), world.events.iter().collect()),
    };

    if events.is_empty() {
        return (true, format!("{}: nothing of note.", heading));
    }
    let mut lines = vec![format!("{} ({} events, latest {}):", heading, events.len(), EVENT_LIMIT.min(events.len()))];
    let skip = events.len().saturating_sub(EVENT_LIMIT);
    lines.extend(events.iter().skip(skip).map(|e| e.summary()));
    (true, lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn world() -> World {
        World::generate(&GameConfig {
            seed: Some(31),
            ..GameConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_civilization_lookup() {
        let world = world();
        let (ok, text) = research(&world, &ResearchTopic::Civilization(Some("civ_1".into())));
        assert!(ok);
        assert!(text.contains(&world.civilizations[0].name));

        let (ok, _) = research(&world, &ResearchTopic::Civilization(Some("atlantis".into())));
        assert!(!ok);
    }

    #[test]
    fn test_figure_lookup_reports_descendants() {
        let world = world();
        let founder = world.figures.iter().find(|f| f.parents.is_empty()).unwrap();
        let (ok, text) = research(&world, &ResearchTopic::Figure(Some(founder.name.clone())));
        assert!(ok);
        assert!(text.contains("descendants recorded"));
    }

    #[test]
    fn test_unknown_topic() {
        let (ok, text) = research(&world(), &ResearchTopic::Unknown("dragons".into()));
        assert!(!ok);
        assert!(text.contains("dragons"));
    }
}
