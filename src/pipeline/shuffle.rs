//! Blind-judging shuffle and reveal.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::pipeline::types::{Label, ShuffleMap, Version};

/// Uniformly random label assignment.
pub fn shuffle<R: Rng + ?Sized>(rng: &mut R) -> ShuffleMap {
    let mut slots = Version::ALL;
    slots.shuffle(rng);
    ShuffleMap::new(slots).unwrap_or_else(ShuffleMap::identity)
}

/// Texts keyed by the label the judge will see.
pub fn anonymize(map: &ShuffleMap, v1: &str, v2: &str, v3: &str) -> BTreeMap<Label, String> {
    map.entries()
        .map(|(label, version)| {
            let text = match version {
                Version::V1 => v1,
                Version::V2 => v2,
                Version::V3 => v3,
            };
            (label, text.to_string())
        })
        .collect()
}

/// Version behind a label chosen by the judge.
pub fn reveal(map: &ShuffleMap, label: Label) -> Version {
    map.version_for(label)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn test_shuffle_is_bijection() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let map = shuffle(&mut rng);
            let versions: BTreeSet<Version> = map.entries().map(|(_, v)| v).collect();
            assert_eq!(versions.len(), 3);
        }
    }

    #[test]
    fn test_anonymize_then_reveal_round_trips() {
        let mut rng = StdRng::seed_from_u64(42);
        let map = shuffle(&mut rng);
        let texts = anonymize(&map, "one", "two", "three");

        for (label, text) in &texts {
            let expected = match reveal(&map, *label) {
                Version::V1 => "one",
                Version::V2 => "two",
                Version::V3 => "three",
            };
            assert_eq!(text, expected);
        }
    }

    #[test]
    fn test_seeded_shuffle_is_repeatable() {
        let a = shuffle(&mut StdRng::seed_from_u64(99));
        let b = shuffle(&mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_permutation_reachable() {
        let mut rng = StdRng::seed_from_u64(1);
        let seen: BTreeSet<Vec<Version>> = (0..500)
            .map(|_| shuffle(&mut rng).entries().map(|(_, v)| v).collect())
            .collect();
        assert_eq!(seen.len(), 6);
    }
}
