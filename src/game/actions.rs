//! Object verbs and rest.

use crate::interaction::{InteractionRoll, InteractionTier, CHOP_DC, FORAGE_DC, SEARCH_DC};
use crate::location::types::matches_name;
use crate::location::{add_item, take_one, Area, EntityDisposition, GameItem, GameObject, ItemKind, ObjectKind};
use crate::world::World;

use super::{player, CommandOutcome, Game};

/// Thirst removed by a drink from a stream or well.
const FRESH_WATER_QUENCH: u32 = 40;
/// Chopping without a tool is this much harder.
const BARE_HANDED_PENALTY: i32 = 4;
const REST_RECOVERY: u32 = 25;
const REST_HEALING: u32 = 1;
const SLEEP_HEALING: u32 = 8;

fn area_mut<'a>(world: &'a mut World, current: &Option<String>) -> Option<&'a mut Area> {
    world.location_mut(current.as_deref()?)?.main_area_mut()
}

/// Pick the object a verb applies to: the named one, or the first fresh one of
/// the wanted kind.
fn find_target<'a>(
    area: &'a mut Area,
    target: Option<&str>,
    verb: &str,
    wanted: fn(&ObjectKind) -> bool,
) -> Result<&'a mut GameObject, String> {
    match target {
        Some(query) => {
            let object = area
                .find_object_mut(query)
                .ok_or_else(|| format!("You see no {} here.", query))?;
            if wanted(&object.kind) {
                Ok(object)
            } else {
                Err(format!("You cannot {} the {}.", verb, object.name))
            }
        }
        None => area
            .objects
            .iter_mut()
            .find(|o| wanted(&o.kind) && !o.depleted)
            .ok_or_else(|| format!("There is nothing here to {}.", verb)),
    }
}

fn item_names(items: &[GameItem]) -> String {
    items.iter().map(|i| i.label()).collect::<Vec<_>>().join(", ")
}

impl Game {
    pub(super) fn examine(&self, query: &str) -> CommandOutcome {
        if let Some(area) = self.current_area() {
            if let Some(object) = area.find_object(query) {
                let mut text = format!("{}: {}", object.name, object.description);
                match object.kind {
                    ObjectKind::Container { locked: true } => text.push_str(" It is locked."),
                    _ if object.depleted => text.push_str(" Nothing more can be had from it."),
                    _ if object.searched => text.push_str(" You have searched it already."),
                    _ => {}
                }
                return CommandOutcome::ok(text);
            }
            if let Some(entity) = area.find_entity(query) {
                return CommandOutcome::ok(format!(
                    "{} ({}): {}",
                    entity.name, entity.disposition, entity.description
                ));
            }
            if let Some(item) = area.items.iter().find(|i| matches_name(&i.name, &i.id, query)) {
                return CommandOutcome::ok(format!("{}: {}", item.name, item.description));
            }
        }
        match self
            .player
            .character
            .inventory
            .iter()
            .find(|i| matches_name(&i.name, &i.id, query))
        {
            Some(item) => CommandOutcome::ok(format!("{}: {}", item.name, item.description)),
            None => CommandOutcome::fail(format!("You see no {} here.", query)),
        }
    }

    pub(super) fn search(&mut self, target: Option<&str>) -> CommandOutcome {
        let Some(area) = area_mut(&mut self.world, &self.player.current_location) else {
            return CommandOutcome::fail("There is nothing to search out here. Enter a location first.");
        };
        let object = match target {
            Some(query) => area.find_object_mut(query),
            None => area.objects.iter_mut().find(|o| !o.searched),
        };
        let Some(object) = object else {
            return CommandOutcome::fail(match target {
                Some(query) => format!("You see no {} here.", query),
                None => "There is nothing left to search.".to_string(),
            });
        };
        if object.kind == (ObjectKind::Container { locked: true }) {
            return CommandOutcome::fail(format!("The {} is locked.", object.name));
        }
        if object.searched {
            return CommandOutcome::fail(format!("You have already searched the {}.", object.name));
        }

        let roll = InteractionRoll::roll(SEARCH_DC, &mut self.rng);
        let mut found = Vec::new();
        if roll.tier.is_success() {
            object.searched = true;
            found = std::mem::take(&mut object.items);
        } else if roll.tier == InteractionTier::NearMiss
            && !object.items.is_empty()
            && roll.loot_quantity(&mut self.rng) > 0
        {
            found.push(object.items.remove(0));
        }
        let name = object.name.clone();
        for item in found.iter().cloned() {
            add_item(&mut area.items, item);
        }

        let mut text = format!("{} ", roll.describe());
        let success = match (roll.tier, found.is_empty()) {
            (tier, false) if tier.is_success() => {
                text.push_str(&format!("You search the {} and turn up: {}.", name, item_names(&found)));
                true
            }
            (_, false) => {
                text.push_str(&format!("You nearly miss it, but something falls from the {}: {}.", name, item_names(&found)));
                true
            }
            (tier, true) if tier.is_success() => {
                text.push_str(&format!("You search the {} thoroughly and find nothing.", name));
                true
            }
            _ => {
                text.push_str(&format!("Your search of the {} turns up nothing.", name));
                false
            }
        };
        if roll.tier == InteractionTier::CriticalFailure {
            self.player.character.hurt(1);
            text.push_str(" You cut your hand on something sharp.");
        }
        self.pass_time(15, false);
        CommandOutcome { success, message: text }
    }

    pub(super) fn take(&mut self, query: &str) -> CommandOutcome {
        let Some(area) = area_mut(&mut self.world, &self.player.current_location) else {
            return CommandOutcome::fail(format!("There is no {} here.", query));
        };
        match take_one(&mut area.items, query) {
            Some(item) => {
                let text = format!("You take the {}.", item.name);
                self.player.character.give(item);
                CommandOutcome::ok(text)
            }
            None => CommandOutcome::fail(format!("There is no {} here.", query)),
        }
    }

    pub(super) fn use_item(&mut self, query: &str) -> CommandOutcome {
        let character = &mut self.player.character;
        let Some(item) = character
            .inventory
            .iter()
            .find(|i| matches_name(&i.name, &i.id, query))
            .cloned()
        else {
            return CommandOutcome::fail(format!("You have no {}.", query));
        };

        let text = match item.kind {
            ItemKind::Food { nourishment } => {
                self.player.survival.eat(u32::from(nourishment));
                format!("You eat the {}. Hunger is now {}.", item.name, self.player.survival.hunger)
            }
            ItemKind::Drink { quench } => {
                self.player.survival.drink(u32::from(quench));
                format!("You drink the {}. Thirst is now {}.", item.name, self.player.survival.thirst)
            }
            ItemKind::Healing { amount } => {
                let healed = character.heal(amount);
                format!("You use the {} and recover {} HP.", item.name, healed)
            }
            ItemKind::Key => {
                return CommandOutcome::fail(format!("Use unlock <container> to try the {}.", item.name));
            }
            _ => return CommandOutcome::fail(format!("You find no use for the {} right now.", item.name)),
        };
        take_one(&mut self.player.character.inventory, &item.id);
        CommandOutcome::ok(text)
    }

    pub(super) fn forage(&mut self, target: Option<&str>) -> CommandOutcome {
        self.harvest(target, "forage", FORAGE_DC, |k| *k == ObjectKind::Forageable, 20)
    }

    pub(super) fn chop(&mut self, target: Option<&str>) -> CommandOutcome {
        let has_tool = self
            .player
            .character
            .inventory
            .iter()
            .any(|i| i.kind == ItemKind::Tool);
        let dc = if has_tool { CHOP_DC } else { CHOP_DC + BARE_HANDED_PENALTY };
        self.harvest(target, "chop", dc, |k| *k == ObjectKind::Tree, 30)
    }

    /// Forage or chop: roll, then draw the earned quantity from the object's
    /// drop table.
    fn harvest(
        &mut self,
        target: Option<&str>,
        verb: &str,
        dc: i32,
        wanted: fn(&ObjectKind) -> bool,
        minutes: u32,
    ) -> CommandOutcome {
        let Some(area) = area_mut(&mut self.world, &self.player.current_location) else {
            return CommandOutcome::fail(format!("There is nothing to {} out here. Enter a location first.", verb));
        };
        let object = match find_target(area, target, verb, wanted) {
            Ok(object) => object,
            Err(message) => return CommandOutcome::fail(message),
        };
        if object.depleted {
            return CommandOutcome::fail(format!("The {} has nothing left to give.", object.name));
        }

        let roll = InteractionRoll::roll(dc, &mut self.rng);
        let quantity = roll.loot_quantity(&mut self.rng);
        let gathered: Vec<_> = (0..quantity)
            .filter_map(|_| self.locations.draw_item(&object.drops, &mut self.rng))
            .collect();
        if !gathered.is_empty() {
            object.depleted = true;
        }
        let name = object.name.clone();

        let mut text = format!("{} ", roll.describe());
        if gathered.is_empty() {
            text.push_str(&format!("You {} the {} but come away empty-handed.", verb, name));
        } else {
            text.push_str(&format!("From the {} you gather: {}.", name, item_names(&gathered)));
        }
        if roll.tier == InteractionTier::CriticalFailure {
            self.player.character.hurt(1);
            text.push_str(" You hurt yourself in the attempt.");
        }

        let success = !gathered.is_empty();
        for item in gathered {
            self.player.character.give(item);
        }
        self.pass_time(minutes, false);
        CommandOutcome { success, message: text }
    }

    pub(super) fn drink(&mut self, target: Option<&str>) -> CommandOutcome {
        if let Some(query) = target {
            let carried = self
                .player
                .character
                .inventory
                .iter()
                .any(|i| matches_name(&i.name, &i.id, query) && matches!(i.kind, ItemKind::Drink { .. }));
            if carried {
                return self.use_item(query);
            }
        }

        let source = self.current_area().and_then(|area| {
            area.objects
                .iter()
                .find(|o| {
                    o.kind == ObjectKind::WaterSource
                        && target.map_or(true, |q| matches_name(&o.name, &o.template, q))
                })
                .map(|o| o.name.clone())
        });
        let source = source.or_else(|| {
            self.world
                .hex(self.player.position)
                .filter(|h| h.has_fresh_water() && target.is_none())
                .map(|h| h.river_width().map_or_else(|| "lake".to_string(), |w| w.name().to_string()))
        });

        match source {
            Some(name) => {
                self.player.survival.drink(FRESH_WATER_QUENCH);
                self.pass_time(5, false);
                CommandOutcome::ok(format!(
                    "You drink from the {}. Thirst is now {}.",
                    name, self.player.survival.thirst
                ))
            }
            None => CommandOutcome::fail("There is no fresh water here."),
        }
    }

    pub(super) fn unlock(&mut self, query: &str) -> CommandOutcome {
        let Some(area) = area_mut(&mut self.world, &self.player.current_location) else {
            return CommandOutcome::fail(format!("You see no {} here.", query));
        };
        let Some(object) = area.find_object_mut(query) else {
            return CommandOutcome::fail(format!("You see no {} here.", query));
        };
        match object.kind {
            ObjectKind::Container { locked: true } => {}
            ObjectKind::Container { locked: false } => {
                return CommandOutcome::fail(format!("The {} is not locked.", object.name));
            }
            _ => return CommandOutcome::fail(format!("The {} has no lock.", object.name)),
        }

        let inventory = &mut self.player.character.inventory;
        let Some(key_id) = inventory.iter().find(|i| i.kind == ItemKind::Key).map(|i| i.id.clone()) else {
            return CommandOutcome::fail(format!("You need a key to open the {}.", object.name));
        };
        take_one(inventory, &key_id);
        object.kind = ObjectKind::Container { locked: false };
        CommandOutcome::ok(format!("The key turns and the {} opens. The key stays in the lock.", object.name))
    }

    pub(super) fn rest(&mut self) -> CommandOutcome {
        self.pass_time(60, true);
        self.player.survival.recover(REST_RECOVERY);
        let healed = self.player.character.heal(REST_HEALING);
        CommandOutcome::ok(format!(
            "You rest for an hour and recover {} HP. Fatigue is now {}.",
            healed, self.player.survival.fatigue
        ))
    }

    pub(super) fn sleep(&mut self) -> CommandOutcome {
        if let Some(threat) = self
            .current_area()
            .and_then(|a| a.entities.iter().find(|e| e.disposition == EntityDisposition::Hostile))
        {
            return CommandOutcome::fail(format!("You cannot sleep with the {} nearby.", threat.name));
        }
        self.pass_time(8 * 60, true);
        self.player.survival.fatigue = 0;
        let healed = self.player.character.heal(SLEEP_HEALING);
        let mut text = format!("You sleep through the night and recover {} HP. {}.", healed, self.clock);
        if self.player.survival.hunger >= player::MAX_NEED / 2 {
            text.push_str(" You wake up hungry.");
        }
        CommandOutcome::ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use crate::command::Command;
    use crate::location::types::DropEntry;
    use crate::location::{EntityDisposition, ItemKind, ObjectKind};

    #[test]
    fn test_unlock_consumes_key() {
        let dir = tempfile::tempdir().unwrap();
        let chest = object("old_chest", ObjectKind::Container { locked: true });
        let mut game = game_in(dir.path(), vec![chest], vec![]);

        assert!(!game.execute(Command::Search(Some("chest".into()))).success);
        let outcome = game.execute(Command::Unlock("chest".into()));
        assert!(!outcome.success);
        assert!(outcome.message.contains("need a key"));

        game.player.character.give(item("iron_key", ItemKind::Key));
        assert!(game.execute(Command::Unlock("chest".into())).success);
        assert!(game.player.character.inventory.is_empty());
        let area = game.current_location().unwrap().main_area().unwrap();
        assert_eq!(area.objects[0].kind, ObjectKind::Container { locked: false });
        assert!(!game.execute(Command::Unlock("chest".into())).success);
    }

    #[test]
    fn test_search_reveals_hidden_items() {
        let dir = tempfile::tempdir().unwrap();
        let mut cart = object("abandoned_cart", ObjectKind::Container { locked: false });
        cart.items.push(item("flint", ItemKind::Material));
        let mut game = game_in(dir.path(), vec![cart], vec![]);
        game.player.character.max_hit_points = 1000;
        game.player.character.hit_points = 1000;

        for _ in 0..100 {
            game.execute(Command::Search(Some("cart".into())));
            game.player.survival = Default::default();
            if game.current_area().unwrap().objects[0].searched {
                break;
            }
        }
        let area = game.current_area().unwrap();
        assert!(area.objects[0].searched);
        assert!(area.objects[0].items.is_empty());
        assert_eq!(area.items.len(), 1);

        assert!(game.execute(Command::Take("flint".into())).success);
        assert!(game.player.character.has_item("flint"));
        assert!(!game.execute(Command::Take("flint".into())).success);
    }

    #[test]
    fn test_forage_draws_from_drop_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut bush = object("berry_bush", ObjectKind::Forageable);
        bush.drops = vec![DropEntry {
            item: "wild_berries".to_string(),
            weight: 1,
        }];
        let rock = object("boulder", ObjectKind::Scenery);
        let mut game = game_in(dir.path(), vec![bush, rock], vec![]);
        game.player.character.max_hit_points = 1000;
        game.player.character.hit_points = 1000;

        assert!(!game.execute(Command::Forage(Some("boulder".into()))).success);
        for _ in 0..100 {
            game.player.survival = Default::default();
            if game.execute(Command::Forage(None)).success {
                break;
            }
        }
        assert!(game.player.character.has_item("wild berries"));
        assert!(game.current_area().unwrap().objects[0].depleted);
        let outcome = game.execute(Command::Forage(Some("bush".into())));
        assert!(!outcome.success);
    }

    #[test]
    fn test_chop_needs_a_tree() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = game_in(dir.path(), vec![object("boulder", ObjectKind::Scenery)], vec![]);
        let outcome = game.execute(Command::Chop(None));
        assert!(!outcome.success);
        assert!(outcome.message.contains("nothing here to chop"));
    }

    #[test]
    fn test_eating_and_drinking() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = game_in(dir.path(), vec![object("stream", ObjectKind::WaterSource)], vec![]);
        game.player.survival.hunger = 50;
        game.player.survival.thirst = 60;
        game.player.character.give(item("bread_loaf", ItemKind::Food { nourishment: 25 }));

        assert!(game.execute(Command::Use("bread".into())).success);
        assert_eq!(game.player.survival.hunger, 25);
        assert!(game.player.character.inventory.is_empty());
        assert!(!game.execute(Command::Use("bread".into())).success);

        assert!(game.execute(Command::Drink(None)).success);
        assert_eq!(game.player.survival.thirst, 20);
    }

    #[test]
    fn test_sleep_refused_near_hostiles() {
        let dir = tempfile::tempdir().unwrap();
        let wolf = entity("wolf", EntityDisposition::Hostile);
        let mut game = game_in(dir.path(), vec![], vec![wolf]);
        game.player.survival.fatigue = 80;
        assert!(!game.execute(Command::Sleep).success);

        game.execute(Command::Exit);
        assert!(game.execute(Command::Sleep).success);
        assert_eq!(game.player.survival.fatigue, 0);
        assert_eq!(game.clock.hour(), 16);
    }

    #[test]
    fn test_rest_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let mut game = game_in(dir.path(), vec![], vec![]);
        game.player.survival.fatigue = 30;
        game.player.character.hurt(3);
        assert!(game.execute(Command::Rest).success);
        assert_eq!(game.player.survival.fatigue, 5);
        assert_eq!(game.player.character.hit_points, game.player.character.max_hit_points - 2);
    }
}
