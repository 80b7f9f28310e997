use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque message identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        };
        f.write_str(s)
    }
}

/// A place suggestion attached to an assistant reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub place_name: String,
    /// `(longitude, latitude)`.
    pub coordinates: (f64, f64),
    /// Suitability score, 0–100.
    pub score: u8,
    pub reasons: Vec<String>,
}

impl Recommendation {
    pub fn new(place_name: impl Into<String>, coordinates: (f64, f64), score: u8) -> Self {
        Self {
            place_name: place_name.into(),
            coordinates,
            score: score.min(100),
            reasons: Vec::new(),
        }
    }

    pub fn with_reasons<I, S>(mut self, reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reasons = reasons.into_iter().map(Into::into).collect();
        self
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates.0
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates.1
    }
}

/// One entry in a session's message log. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
}

impl Message {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            text: text.into(),
            created_at: Utc::now(),
            suggestions: Vec::new(),
            recommendation: None,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions = suggestions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_recommendation(mut self, recommendation: Recommendation) -> Self {
        self.recommendation = Some(recommendation);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_builders() {
        let msg = Message::assistant("hi")
            .with_suggestions(["a", "b"])
            .with_recommendation(Recommendation::new("Park", (-73.9, 40.7), 88));
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.suggestions, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(msg.recommendation.unwrap().score, 88);
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(Message::user("x").id, Message::user("x").id);
    }

    #[test]
    fn test_score_is_capped() {
        let rec = Recommendation::new("Somewhere", (0.0, 0.0), 140);
        assert_eq!(rec.score, 100);
        assert_eq!(rec.longitude(), 0.0);
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::system("welcome");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "system");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("recommendation").is_none());

        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back.text, "welcome");
    }
}
