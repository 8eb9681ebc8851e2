//! Procedural names for civilizations, figures and breakaway factions.
//!
//! Each race has its own syllable banks so names stay phonetically
//! consistent within a culture.

use rand::Rng;

use super::races::{Race, RaceArchetype};

/// Syllable banks for one race.
struct NamingStyle {
    onsets: &'static [&'static str],
    vowels: &'static [&'static str],
    codas: &'static [&'static str],
    syllables: (usize, usize),
    epithets: &'static [&'static str],
}

fn style_for(race: Race) -> &'static NamingStyle {
    match race {
        Race::Human => &NamingStyle {
            onsets: &["b", "d", "g", "h", "k", "l", "m", "r", "s", "t", "w", "br", "th", "ed"],
            vowels: &["a", "e", "i", "o", "u", "ia", "ae"],
            codas: &["n", "r", "d", "ld", "rt", "m", "s", "ck"],
            syllables: (2, 3),
            epithets: &["the Bold", "the Just", "the Wise", "the Cruel", "the Younger", "Ironhand"],
        },
        Race::Elf => &NamingStyle {
            onsets: &["l", "th", "s", "f", "n", "r", "v", "gl", "el", "ar"],
            vowels: &["a", "e", "i", "ae", "ia", "ie", "ea"],
            codas: &["l", "n", "th", "s", "r", "nd"],
            syllables: (2, 4),
            epithets: &["Starborn", "the Fair", "of the Silver Leaf", "the Farsighted", "Moonwhisper"],
        },
        Race::Dwarf => &NamingStyle {
            onsets: &["b", "d", "g", "k", "th", "dr", "gr", "br", "t"],
            vowels: &["a", "o", "u", "i", "ur", "or"],
            codas: &["k", "n", "r", "rn", "ld", "m", "rin", "dd"],
            syllables: (1, 2),
            epithets: &["Stonebeard", "Ironfist", "the Delver", "Anvilborn", "Goldhand"],
        },
        Race::Halfling => &NamingStyle {
            onsets: &["b", "p", "m", "f", "t", "w", "r", "l"],
            vowels: &["o", "i", "a", "e", "y"],
            codas: &["n", "p", "m", "ck", "ll", "by"],
            syllables: (2, 3),
            epithets: &["Goodbarrel", "Underbough", "the Lucky", "Tealeaf", "Brandyfoot"],
        },
        Race::Orc => &NamingStyle {
            onsets: &["g", "k", "z", "r", "sh", "gr", "kr", "th", "ug"],
            vowels: &["a", "u", "o", "ar", "ur"],
            codas: &["k", "g", "sh", "z", "rk", "th", "gg"],
            syllables: (1, 2),
            epithets: &["Skullsplitter", "the Red", "Bonegnawer", "Ironhide", "the Howling"],
        },
        Race::Gnome => &NamingStyle {
            onsets: &["b", "f", "n", "p", "t", "z", "w", "bl", "fl"],
            vowels: &["i", "o", "e", "a", "ee"],
            codas: &["n", "k", "p", "bble", "zz", "ck", "mble"],
            syllables: (2, 3),
            epithets: &["Cogwhistle", "the Tinkerer", "Sparkwright", "the Curious", "Gearsprocket"],
        },
    }
}

fn pick<'a>(rng: &mut impl Rng, options: &[&'a str]) -> &'a str {
    options[rng.gen_range(0..options.len())]
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub struct NameGenerator;

impl NameGenerator {
    /// A bare syllable name such as "Thaelin" or "Grukash".
    pub fn root(race: Race, rng: &mut impl Rng) -> String {
        let style = style_for(race);
        let syllables = rng.gen_range(style.syllables.0..=style.syllables.1);
        let mut name = String::new();

        for i in 0..syllables {
            name.push_str(pick(rng, style.onsets));
            name.push_str(pick(rng, style.vowels));
            let coda_chance = if i + 1 == syllables { 0.6 } else { 0.3 };
            if rng.gen_bool(coda_chance) {
                name.push_str(pick(rng, style.codas));
            }
        }

        capitalize(&name)
    }

    /// A civilization name from one of the archetype's name forms.
    pub fn civilization_name(archetype: &RaceArchetype, rng: &mut impl Rng) -> String {
        let root = Self::root(archetype.race, rng);
        pick(rng, archetype.name_forms).replace("{}", &root)
    }

    /// Personal name, sometimes with an epithet.
    pub fn personal_name(race: Race, rng: &mut impl Rng) -> String {
        let first = Self::root(race, rng);
        if rng.gen_bool(0.5) {
            format!("{} {}", first, pick(rng, style_for(race).epithets))
        } else {
            first
        }
    }

    /// Name for a splinter faction that broke away in a civil war.
    pub fn breakaway_name(race: Race, rng: &mut impl Rng) -> String {
        let adjective = pick(rng, &["Free", "True", "Loyal", "Reformed", "Northern", "Southern"]);
        let noun = pick(rng, &["Compact", "League", "Remnant", "Brotherhood", "Banner"]);
        format!("The {} {} of {}", adjective, noun, Self::root(race, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_names_are_capitalized_and_nonempty() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for race in Race::ALL {
            for _ in 0..20 {
                let name = NameGenerator::root(race, &mut rng);
                assert!(name.len() >= 2);
                assert!(name.chars().next().is_some_and(|c| c.is_uppercase()));
            }
        }
    }

    #[test]
    fn test_civilization_name_fills_form() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let name = NameGenerator::civilization_name(Race::Dwarf.archetype(), &mut rng);
        assert!(!name.contains("{}"));
    }

    #[test]
    fn test_names_are_deterministic() {
        let a = NameGenerator::personal_name(Race::Elf, &mut ChaCha8Rng::seed_from_u64(9));
        let b = NameGenerator::personal_name(Race::Elf, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
