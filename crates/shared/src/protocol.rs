use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Answer, CurrentQuestion, FeatureKey, FeatureValue, SessionId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartResponse {
    pub session_id: SessionId,
    pub text: String,
    pub feature: FeatureKey,
    pub value: FeatureValue,
}

impl StartResponse {
    pub fn question(&self) -> CurrentQuestion {
        CurrentQuestion {
            text: self.text.clone(),
            feature: self.feature.clone(),
            value: self.value.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub session_id: SessionId,
    pub feature: FeatureKey,
    pub value: FeatureValue,
    pub answer: Answer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum TaggedReply {
    Result {
        song: Song,
        confidence: f64,
    },
    Question {
        text: String,
        feature: FeatureKey,
        value: FeatureValue,
    },
}

/// Reply to `POST /answer`, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerReply {
    Result { song: Song, confidence: f64 },
    Question(CurrentQuestion),
    /// Any body that is valid JSON but matches neither known shape.
    Uncertain,
}

impl AnswerReply {
    pub fn from_json(value: Value) -> Self {
        match serde_json::from_value::<TaggedReply>(value) {
            Ok(TaggedReply::Result { song, confidence }) => AnswerReply::Result { song, confidence },
            Ok(TaggedReply::Question {
                text,
                feature,
                value,
            }) => AnswerReply::Question(CurrentQuestion {
                text,
                feature,
                value,
            }),
            Err(_) => AnswerReply::Uncertain,
        }
    }
}

pub fn confidence_percent(confidence: f64) -> u8 {
    if !confidence.is_finite() {
        return 0;
    }
    (confidence * 100.0).round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
