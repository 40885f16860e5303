use rand::{Rng, seq::IndexedRandom as _};
use serde::{Deserialize, Serialize};
use skyrunner_brain::Genome;

/// The best genome of one generation together with its fitness.
///
/// Serialized as `{"generation": .., "score": .., "weights": [[[..]]]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub generation: u64,
    pub score: i64,
    #[serde(rename = "weights")]
    pub genome: Genome,
}

/// Bounded, score-ordered collection of elite records.
///
/// Records are kept sorted by descending score. Equal scores keep their insertion
/// order, so an older record outranks a newer one with the same score.
#[derive(Debug, Clone)]
pub struct EliteArchive {
    limit: usize,
    records: Vec<ScoreRecord>,
}

impl EliteArchive {
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            records: Vec::with_capacity(limit + 1),
        }
    }

    /// Inserts `record`, then drops whatever falls below the top `limit`.
    pub fn append(&mut self, record: ScoreRecord) {
        self.records.push(record);
        // `sort_by` is stable.
        self.records.sort_by(|a, b| b.score.cmp(&a.score));
        self.records.truncate(self.limit);
    }

    /// Returns the record at rank `index`, best first.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ScoreRecord> {
        self.records.get(index)
    }

    #[must_use]
    pub fn best(&self) -> Option<&ScoreRecord> {
        self.records.first()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ScoreRecord> + '_ {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Picks a record uniformly at random.
    pub fn choose<R>(&self, rng: &mut R) -> Option<&ScoreRecord>
    where
        R: Rng + ?Sized,
    {
        self.records.choose(rng)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn record(generation: u32, score: i64) -> ScoreRecord {
        ScoreRecord {
            generation: u64::from(generation),
            score,
            genome: Genome::from_layers(vec![vec![vec![f64::from(generation)]]]),
        }
    }

    #[test]
    fn test_keeps_top_scores() {
        let mut archive = EliteArchive::new(3);
        for (generation, score) in [(1, 10), (2, 50), (3, 30), (4, 5), (5, 40)] {
            archive.append(record(generation, score));
        }
        let scores: Vec<_> = archive.iter().map(|r| r.score).collect();
        assert_eq!(scores, [50, 40, 30]);
        assert_eq!(archive.best().unwrap().generation, 2);
        assert!(archive.get(3).is_none());
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut archive = EliteArchive::new(3);
        archive.append(record(1, 7));
        archive.append(record(2, 7));
        archive.append(record(3, 9));
        archive.append(record(4, 7));
        let generations: Vec<_> = archive.iter().map(|r| r.generation).collect();
        assert_eq!(generations, [3, 1, 2]);
    }

    #[test]
    fn test_empty_archive() {
        let archive = EliteArchive::new(10);
        assert!(archive.is_empty());
        assert!(archive.get(0).is_none());
        assert!(archive.best().is_none());
        assert!(archive.choose(&mut rand::rng()).is_none());
    }

    #[test]
    fn test_record_json_schema() {
        let json = serde_json::to_value(record(3, -12)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"generation": 3, "score": -12, "weights": [[[3.0]]]})
        );
    }

    proptest! {
        #[test]
        fn archive_stays_bounded_and_sorted(
            limit in 1_usize..16,
            scores in prop::collection::vec(-1000_i64..1000, 0..64),
        ) {
            let mut archive = EliteArchive::new(limit);
            for (generation, &score) in (0_u32..).zip(&scores) {
                archive.append(record(generation, score));
                prop_assert!(archive.len() <= limit);
                prop_assert!(archive.iter().is_sorted_by(|a, b| a.score >= b.score));
            }

            let mut expected = scores.clone();
            expected.sort_unstable_by(|a, b| b.cmp(a));
            expected.truncate(limit);
            let kept: Vec<_> = archive.iter().map(|r| r.score).collect();
            prop_assert_eq!(kept, expected);
        }
    }
}
