use mongodb::bson::{Document, from_document};
use rand::seq::SliceRandom;
use serde::de::DeserializeOwned;

use crate::{
    database::StoreError,
    models::{Answer, Candidate, QUESTION_COUNT},
};

/// Shuffles in place with a fresh thread-local RNG, so repeated calls never
/// share an ordering by construction.
pub fn randomize<T>(items: &mut [T]) {
    items.shuffle(&mut rand::rng());
}

/// Decodes every document or none: the first bad document fails the batch.
pub fn decode_all<T: DeserializeOwned>(
    documents: Vec<Document>,
    target: &'static str,
) -> Result<Vec<T>, StoreError> {
    documents
        .into_iter()
        .map(|document| from_document(document).map_err(|e| StoreError::Decode(target, e)))
        .collect()
}

/// One bucket per question, each holding every candidate's answer to it.
pub fn group_answers(candidates: &[Candidate]) -> [Vec<Answer>; QUESTION_COUNT] {
    let mut buckets: [Vec<Answer>; QUESTION_COUNT] = Default::default();

    for candidate in candidates {
        for (question, bucket) in buckets.iter_mut().enumerate() {
            // older documents may hold fewer answers than there are questions
            if let Some(answer) = candidate.answer(question) {
                bucket.push(answer);
            }
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use mongodb::bson::{doc, oid::ObjectId};

    use super::{decode_all, group_answers, randomize};
    use crate::{
        database::StoreError,
        models::{Candidate, LeaderboardEntry},
    };

    fn candidate(name: &str, answers: &[&str]) -> Candidate {
        Candidate {
            id: ObjectId::new(),
            name: name.to_string(),
            votes: 0,
            answers: answers.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_randomize_is_permutation() {
        let mut items: Vec<u32> = (0..100).collect();
        randomize(&mut items);

        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..100).collect::<Vec<u32>>());
    }

    #[test]
    fn test_randomize_reorders() {
        let original: Vec<u32> = (0..100).collect();

        let orderings: HashSet<Vec<u32>> = (0..5)
            .map(|_| {
                let mut items = original.clone();
                randomize(&mut items);
                items
            })
            .collect();

        assert!(orderings.iter().any(|items| *items != original));
        assert!(orderings.len() > 1);
    }

    #[test]
    fn test_randomize_empty_and_single() {
        let mut empty: Vec<u32> = Vec::new();
        randomize(&mut empty);
        assert!(empty.is_empty());

        let mut single = vec![7];
        randomize(&mut single);
        assert_eq!(single, vec![7]);
    }

    #[test]
    fn test_group_answers() {
        let alice = candidate("Alice", &["a1", "a2", "a3", "a4"]);
        let bob = candidate("Bob", &["b1", "b2", "b3", "b4"]);

        let buckets = group_answers(&[alice.clone(), bob.clone()]);

        assert_eq!(buckets.len(), 4);
        let mut pairs = HashSet::new();
        for (question, bucket) in buckets.iter().enumerate() {
            assert_eq!(bucket.len(), 2);
            for answer in bucket {
                let source = if answer.id == alice.id { &alice } else { &bob };
                assert_eq!(answer.answer, source.answers[question]);
                pairs.insert((answer.id, question));
            }
        }
        assert_eq!(pairs.len(), 8);
    }

    #[test]
    fn test_group_answers_short_candidate() {
        let short = candidate("Short", &["only"]);

        let buckets = group_answers(&[short]);

        assert_eq!(buckets[0].len(), 1);
        assert!(buckets[1..].iter().all(Vec::is_empty));
    }

    #[test]
    fn test_decode_all_projects_leaderboard_fields() {
        let id = ObjectId::new();
        let documents = vec![doc! { "_id": id, "name": "Alice", "votes": 4, "answers": ["a"] }];

        let entries: Vec<LeaderboardEntry> = decode_all(documents, "leaderboard entry").unwrap();

        assert_eq!(entries[0].id, id);
        assert_eq!(entries[0].votes, 4);
    }

    #[test]
    fn test_decode_all_fails_whole_batch() {
        let documents = vec![
            doc! { "_id": ObjectId::new(), "name": "Alice", "votes": 0, "answers": [] },
            doc! { "_id": ObjectId::new(), "name": 12, "votes": 0 },
        ];

        let err = decode_all::<Candidate>(documents, "candidate").unwrap_err();

        assert!(matches!(err, StoreError::Decode("candidate", _)));
        assert_eq!(err.to_string(), "Could not decode into candidate");
    }
}
