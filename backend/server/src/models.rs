//! # Models
//!
//! Stored shape of a candidate document:
//!
//! ```json
//! { "_id": ObjectId, "name": "Alice", "votes": 0, "answers": ["a", "b", "c", "d"] }
//! ```
//!
//! [`Answer`] and [`LeaderboardEntry`] are views derived at read time, never stored.
//! `_id` always goes out to clients as its 24 character hex string.
use mongodb::bson::{Document, doc, oid::ObjectId};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

pub const QUESTION_COUNT: usize = 4;
pub const ANSWER_MAX_LENGTH: usize = 280;

fn hex_id<S: Serializer>(id: &ObjectId, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&id.to_hex())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(rename = "_id", serialize_with = "hex_id")]
    pub id: ObjectId,
    pub name: String,
    pub votes: i32,
    #[serde(default)]
    pub answers: Vec<String>,
}

impl Candidate {
    /// View of this candidate's answer to one question, if it gave one.
    pub fn answer(&self, question: usize) -> Option<Answer> {
        self.answers.get(question).map(|answer| Answer {
            id: self.id,
            name: self.name.clone(),
            votes: self.votes,
            answer: answer.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    #[serde(rename = "_id", serialize_with = "hex_id")]
    pub id: ObjectId,
    pub name: String,
    pub votes: i32,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(rename = "_id", serialize_with = "hex_id")]
    pub id: ObjectId,
    pub name: String,
    pub votes: i32,
}

/// Body of `POST /api/{branch}/candidates`.
///
/// `answers` stays an `Option` so a missing field is told apart from `[]`.
#[derive(Debug, Default, Deserialize)]
pub struct CandidateRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub answers: Option<Vec<String>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing name")]
    MissingName,

    #[error("missing answers")]
    MissingAnswers,

    #[error("one or more answers are too long")]
    AnswersTooLong,

    #[error("expected {count} answers", count = QUESTION_COUNT)]
    WrongAnswerCount,
}

impl ValidationError {
    /// Request field the failure is reported under.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingName => "name",
            ValidationError::MissingAnswers
            | ValidationError::AnswersTooLong
            | ValidationError::WrongAnswerCount => "answers",
        }
    }
}

/// A submission that passed validation and is ready to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCandidate {
    pub id: ObjectId,
    pub name: String,
    pub answers: Vec<String>,
}

impl CandidateRequest {
    /// Checks run in order and stop at the first failure.
    pub fn validate(self) -> Result<NewCandidate, ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let Some(answers) = self.answers else {
            return Err(ValidationError::MissingAnswers);
        };

        if answers
            .iter()
            .any(|answer| answer.chars().count() > ANSWER_MAX_LENGTH)
        {
            return Err(ValidationError::AnswersTooLong);
        }

        if answers.len() != QUESTION_COUNT {
            return Err(ValidationError::WrongAnswerCount);
        }

        Ok(NewCandidate {
            id: ObjectId::new(),
            name: self.name,
            answers,
        })
    }
}

impl NewCandidate {
    pub fn into_document(self) -> Document {
        doc! {
            "_id": self.id,
            "name": self.name,
            "answers": self.answers,
            "votes": 0_i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use mongodb::bson::{from_document, oid::ObjectId};
    use serde_json::{json, to_value};

    use super::*;

    fn request(name: &str, answers: Option<Vec<&str>>) -> CandidateRequest {
        CandidateRequest {
            name: name.to_string(),
            answers: answers.map(|answers| answers.into_iter().map(String::from).collect()),
        }
    }

    #[test]
    fn test_valid_request() {
        let candidate = request("Alice", Some(vec!["a", "b", "c", "d"]))
            .validate()
            .unwrap();

        assert_eq!(candidate.name, "Alice");
        assert_eq!(candidate.answers, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_missing_name_wins() {
        let err = request("", None).validate().unwrap_err();

        assert_eq!(err, ValidationError::MissingName);
        assert_eq!(err.field(), "name");
        assert_eq!(err.to_string(), "missing name");
    }

    #[test]
    fn test_absent_answers() {
        let err = request("Alice", None).validate().unwrap_err();

        assert_eq!(err, ValidationError::MissingAnswers);
        assert_eq!(err.field(), "answers");
    }

    #[test]
    fn test_empty_answers_are_present() {
        let err = request("Alice", Some(vec![])).validate().unwrap_err();

        assert_eq!(err, ValidationError::WrongAnswerCount);
        assert_eq!(err.field(), "answers");
        assert_eq!(err.to_string(), "expected 4 answers");
    }

    #[test]
    fn test_answer_length_bound() {
        let at_limit = "x".repeat(ANSWER_MAX_LENGTH);
        let over_limit = "x".repeat(ANSWER_MAX_LENGTH + 1);

        assert!(
            request("Alice", Some(vec![at_limit.as_str(), "b", "c", "d"]))
                .validate()
                .is_ok()
        );

        let err = request("Alice", Some(vec!["a", over_limit.as_str()]))
            .validate()
            .unwrap_err();
        assert_eq!(err, ValidationError::AnswersTooLong);
        assert_eq!(err.field(), "answers");
    }

    #[test]
    fn test_answer_length_counts_characters() {
        let accents = "é".repeat(ANSWER_MAX_LENGTH);

        assert!(
            request("Alice", Some(vec![accents.as_str(), "b", "c", "d"]))
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_missing_fields_deserialize() {
        let request: CandidateRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.name, "");
        assert_eq!(request.answers, None);

        let request: CandidateRequest =
            serde_json::from_str(r#"{"name": "Bob", "answers": null}"#).unwrap();
        assert_eq!(request.answers, None);
    }

    #[test]
    fn test_new_document_starts_at_zero_votes() {
        let candidate = request("Alice", Some(vec!["a", "b", "c", "d"]))
            .validate()
            .unwrap();
        let id = candidate.id;

        let stored: Candidate = from_document(candidate.into_document()).unwrap();

        assert_eq!(stored.id, id);
        assert_eq!(stored.votes, 0);
        assert_eq!(stored.answers.len(), QUESTION_COUNT);
    }

    #[test]
    fn test_id_serializes_as_hex() {
        let id = ObjectId::parse_str("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
        let entry = LeaderboardEntry {
            id,
            name: "Alice".to_string(),
            votes: 3,
        };

        assert_eq!(
            to_value(entry).unwrap(),
            json!({ "_id": "65a1f0c2e4b0a1b2c3d4e5f6", "name": "Alice", "votes": 3 })
        );
    }

    #[test]
    fn test_answer_view() {
        let candidate = Candidate {
            id: ObjectId::new(),
            name: "Alice".to_string(),
            votes: 2,
            answers: vec!["a".to_string(), "b".to_string()],
        };

        let answer = candidate.answer(1).unwrap();
        assert_eq!(answer.id, candidate.id);
        assert_eq!(answer.votes, 2);
        assert_eq!(answer.answer, "b");
        assert!(candidate.answer(2).is_none());
    }
}
