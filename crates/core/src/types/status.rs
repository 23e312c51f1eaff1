//! Enumerations carried as strings by the backend.

use serde::{Deserialize, Serialize};

/// Account role.
///
/// The backend stores roles as free-form strings; anything other than
/// `user` or `admin` deserializes to [`Role::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular storefront customer.
    #[default]
    User,
    /// Store administrator (may manage catalog resources).
    Admin,
    /// A role this client does not know about.
    #[serde(other)]
    Other,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
            Self::Other => write!(f, "other"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

/// Sentiment label computed by the backend for a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    #[serde(alias = "POSITIVE")]
    Positive,
    #[serde(alias = "NEUTRAL")]
    Neutral,
    #[serde(alias = "NEGATIVE")]
    Negative,
    #[serde(other)]
    Unknown,
}

impl SentimentLabel {
    /// Contribution of this label to the backend's average sentiment score.
    #[must_use]
    pub const fn polarity(self) -> i8 {
        match self {
            Self::Positive => 1,
            Self::Negative => -1,
            Self::Neutral | Self::Unknown => 0,
        }
    }

    /// Lowercase label as shown in the UI.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_through_str() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::User.to_string(), "user");
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_unknown_role_deserializes_to_other() {
        let role: Role = serde_json::from_str("\"moderator\"").unwrap();
        assert_eq!(role, Role::Other);
    }

    #[test]
    fn test_sentiment_accepts_model_casing() {
        let label: SentimentLabel = serde_json::from_str("\"POSITIVE\"").unwrap();
        assert_eq!(label, SentimentLabel::Positive);

        let label: SentimentLabel = serde_json::from_str("\"negative\"").unwrap();
        assert_eq!(label.polarity(), -1);
    }

    #[test]
    fn test_sentiment_unknown_label() {
        let label: SentimentLabel = serde_json::from_str("\"mixed\"").unwrap();
        assert_eq!(label, SentimentLabel::Unknown);
        assert_eq!(label.polarity(), 0);
    }
}
