//! Notable historical figures and their family trees.

use std::collections::{HashMap, HashSet};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::calendar::{CURRENT_YEAR, MAX_CIV_AGE, MIN_CIV_AGE};
use super::naming::NameGenerator;
use super::races::Race;
use super::{CivId, FigureId, IdGenerator};

/// Generations generated below each founder, founder excluded.
const MAX_GENERATIONS: u32 = 3;

const FOUNDER_TITLES: &[&str] = &[
    "Founder",
    "Warlord",
    "High Priest",
    "Archmage",
    "Chieftain",
    "Matriarch",
    "Lawgiver",
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoricalFigure {
    pub id: FigureId,
    pub name: String,
    pub race: Race,
    pub birth_year: i32,
    pub death_year: Option<i32>,
    pub title: String,
    pub parents: Vec<FigureId>,
    pub children: Vec<FigureId>,
    pub civilization: Option<CivId>,
}

impl HistoricalFigure {
    pub fn is_alive_in(&self, year: i32) -> bool {
        self.birth_year <= year && self.death_year.map_or(true, |d| d > year)
    }

    pub fn lifespan_text(&self) -> String {
        match self.death_year {
            Some(death) => format!("{}-{}", self.birth_year, death),
            None => format!("born {}", self.birth_year),
        }
    }
}

/// Creates founders and their descendants.
pub struct FigureGenerator {
    rng: ChaCha8Rng,
    ids: IdGenerator,
}

impl FigureGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            ids: IdGenerator::new(),
        }
    }

    /// `count_per_race` founders for each race, each with up to three
    /// generations of descendants. Children are born 20-40 years after their
    /// parent and nobody is born after the present day.
    pub fn generate(&mut self, count_per_race: usize, races: &[Race]) -> Vec<HistoricalFigure> {
        let mut figures = Vec::new();

        for &race in races {
            for _ in 0..count_per_race {
                let birth = self.rng.gen_range(
                    CURRENT_YEAR - MAX_CIV_AGE - 60..=CURRENT_YEAR - MIN_CIV_AGE - 20,
                );
                let title = FOUNDER_TITLES[self.rng.gen_range(0..FOUNDER_TITLES.len())].to_string();
                let founder = self.make_figure(race, birth, title, Vec::new());
                let founder_index = figures.len();
                figures.push(founder);
                self.add_descendants(&mut figures, founder_index, 1);
            }
        }

        tracing::debug!(figures = figures.len(), "historical figures generated");
        figures
    }

    fn make_figure(&mut self, race: Race, birth_year: i32, title: String, parents: Vec<FigureId>) -> HistoricalFigure {
        let (min_life, max_life) = race.archetype().lifespan;
        let death = birth_year + self.rng.gen_range(min_life..=max_life);
        HistoricalFigure {
            id: FigureId(self.ids.next_id()),
            name: NameGenerator::personal_name(race, &mut self.rng),
            race,
            birth_year,
            death_year: (death <= CURRENT_YEAR).then_some(death),
            title,
            parents,
            children: Vec::new(),
            civilization: None,
        }
    }

    fn add_descendants(&mut self, figures: &mut Vec<HistoricalFigure>, parent_index: usize, generation: u32) {
        if generation > MAX_GENERATIONS {
            return;
        }
        let max_children = if generation == 1 { 3 } else { 2 };
        let children = self.rng.gen_range(0..=max_children);

        for _ in 0..children {
            let parent = &figures[parent_index];
            let birth = parent.birth_year + self.rng.gen_range(20..=40);
            if birth > CURRENT_YEAR {
                continue;
            }
            let title = format!("Heir of {}", parent.name);
            let parent_id = parent.id;
            let race = parent.race;

            let child = self.make_figure(race, birth, title, vec![parent_id]);
            let child_id = child.id;
            let child_index = figures.len();
            figures.push(child);
            figures[parent_index].children.push(child_id);

            self.add_descendants(figures, child_index, generation + 1);
        }
    }
}

/// Family-tree queries over a set of figures.
///
/// Results are memoized per figure. Every walk carries a visited set, so
/// malformed data with parent/child cycles still terminates.
pub struct Genealogy<'a> {
    figures: HashMap<FigureId, &'a HistoricalFigure>,
    descendant_memo: HashMap<FigureId, usize>,
    lineage_memo: HashMap<FigureId, Vec<FigureId>>,
}

impl<'a> Genealogy<'a> {
    pub fn new(figures: &'a [HistoricalFigure]) -> Self {
        Self {
            figures: figures.iter().map(|f| (f.id, f)).collect(),
            descendant_memo: HashMap::new(),
            lineage_memo: HashMap::new(),
        }
    }

    fn children_of(&self, id: FigureId) -> Vec<FigureId> {
        self.figures
            .get(&id)
            .map(|f| f.children.clone())
            .unwrap_or_default()
    }

    /// Number of distinct descendants of `id`.
    pub fn descendant_count(&mut self, id: FigureId) -> usize {
        if let Some(&count) = self.descendant_memo.get(&id) {
            return count;
        }

        let mut seen = HashSet::from([id]);
        let mut stack = self.children_of(id);
        let mut count = 0;
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            count += 1;
            stack.extend(self.children_of(next));
        }

        self.descendant_memo.insert(id, count);
        count
    }

    /// Longest parent-to-child chain starting at `id`, `id` included.
    pub fn deepest_lineage(&mut self, id: FigureId) -> Vec<FigureId> {
        let mut on_path = HashSet::new();
        self.lineage_from(id, &mut on_path)
    }

    fn lineage_from(&mut self, id: FigureId, on_path: &mut HashSet<FigureId>) -> Vec<FigureId> {
        if let Some(chain) = self.lineage_memo.get(&id) {
            return chain.clone();
        }
        if !on_path.insert(id) {
            return Vec::new();
        }

        let mut longest = Vec::new();
        for child in self.children_of(id) {
            let chain = self.lineage_from(child, on_path);
            if chain.len() > longest.len() {
                longest = chain;
            }
        }
        on_path.remove(&id);

        let mut chain = Vec::with_capacity(longest.len() + 1);
        chain.push(id);
        chain.extend(longest);
        self.lineage_memo.insert(id, chain.clone());
        chain
    }

    pub fn generations(&mut self, id: FigureId) -> usize {
        self.deepest_lineage(id).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn figure(id: u64, children: &[u64]) -> HistoricalFigure {
        HistoricalFigure {
            id: FigureId(id),
            name: format!("Figure {id}"),
            race: Race::Human,
            birth_year: 1000 + id as i32,
            death_year: None,
            title: "Founder".to_string(),
            parents: Vec::new(),
            children: children.iter().map(|&c| FigureId(c)).collect(),
            civilization: None,
        }
    }

    #[test]
    fn test_generated_parents_are_older() {
        let mut gen = FigureGenerator::new(11);
        let figures = gen.generate(2, &Race::ALL);
        let by_id: HashMap<_, _> = figures.iter().map(|f| (f.id, f)).collect();

        let founders = figures.iter().filter(|f| f.parents.is_empty()).count();
        assert_eq!(founders, 2 * Race::ALL.len());

        for f in &figures {
            assert!(f.birth_year <= CURRENT_YEAR);
            for parent in &f.parents {
                let p = by_id[parent];
                assert!(p.birth_year + 20 <= f.birth_year);
                assert!(p.children.contains(&f.id));
                assert_eq!(p.race, f.race);
            }
        }
    }

    #[test]
    fn test_descendants_and_lineage() {
        // 0 -> 1 -> 3 -> 4, 0 -> 2
        let figures = vec![
            figure(0, &[1, 2]),
            figure(1, &[3]),
            figure(2, &[]),
            figure(3, &[4]),
            figure(4, &[]),
        ];
        let mut tree = Genealogy::new(&figures);
        assert_eq!(tree.descendant_count(FigureId(0)), 4);
        assert_eq!(tree.descendant_count(FigureId(2)), 0);
        assert_eq!(
            tree.deepest_lineage(FigureId(0)),
            vec![FigureId(0), FigureId(1), FigureId(3), FigureId(4)]
        );
        assert_eq!(tree.generations(FigureId(3)), 2);
    }

    #[test]
    fn test_cycles_terminate() {
        let figures = vec![figure(0, &[1]), figure(1, &[2]), figure(2, &[0])];
        let mut tree = Genealogy::new(&figures);
        assert_eq!(tree.descendant_count(FigureId(0)), 2);
        assert_eq!(tree.deepest_lineage(FigureId(0)).len(), 3);
        assert!(tree.deepest_lineage(FigureId(1)).len() <= 3);
    }

    #[test]
    fn test_unknown_figure() {
        let figures = vec![figure(0, &[9])];
        let mut tree = Genealogy::new(&figures);
        assert_eq!(tree.descendant_count(FigureId(0)), 1);
        assert_eq!(tree.deepest_lineage(FigureId(0)).len(), 2);
    }
}
