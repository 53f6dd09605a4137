//! The vibe session record
//!
//! A client-side, non-authoritative copy of the record owned by the API.
//! The three visibility flags drive which components are rendered; they are
//! kept exactly as the server sent them and never normalised.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Delay between two fortunes (24 hours), in milliseconds
pub const NEXT_ORACLE_DELAY_MS: i64 = 86_400_000;

/// Current wall clock as epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Which component the session currently leads with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStage {
    /// Waiting for the reveal button
    Button,
    /// Fortune revealed, question input open
    Fortune,
    /// Answer shown with countdown
    Clarity,
    /// No component visible
    Hidden,
}

impl RevealStage {
    /// Short human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            RevealStage::Button => "awaiting",
            RevealStage::Fortune => "revealed",
            RevealStage::Clarity => "clarified",
            RevealStage::Hidden => "hidden",
        }
    }
}

/// One user's vibe session, as exchanged with `get_initial_vibe` and `update_state`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VibeSession {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub fortune: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub question: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub answer: String,

    #[serde(default = "default_true")]
    pub is_button_shown: bool,

    #[serde(default)]
    pub is_fortune_shown: bool,

    #[serde(default)]
    pub is_clarity_shown: bool,

    /// Epoch milliseconds at which the next fortune may be requested
    #[serde(default, deserialize_with = "deserialize_millis")]
    pub time_to_next_oracle: Option<i64>,
}

fn default_true() -> bool {
    true
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept integer, float or numeric-string timestamps; null and "" mean unset
fn deserialize_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Millis {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Option::<Millis>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Millis::Int(v)) => Ok(Some(v)),
        Some(Millis::Float(v)) => Ok(Some(v.floor() as i64)),
        Some(Millis::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Millis::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(|v| Some(v.floor() as i64))
            .map_err(|_| de::Error::custom(format!("invalid timeToNextOracle: {}", s))),
    }
}

impl Default for VibeSession {
    fn default() -> Self {
        Self {
            fortune: String::new(),
            question: String::new(),
            answer: String::new(),
            is_button_shown: true,
            is_fortune_shown: false,
            is_clarity_shown: false,
            time_to_next_oracle: None,
        }
    }
}

impl VibeSession {
    /// Leading stage derived from the visibility flags
    pub fn stage(&self) -> RevealStage {
        if self.is_clarity_shown {
            RevealStage::Clarity
        } else if self.is_fortune_shown {
            RevealStage::Fortune
        } else if self.is_button_shown {
            RevealStage::Button
        } else {
            RevealStage::Hidden
        }
    }

    /// Press the reveal button: hide it, show the fortune view and start the
    /// 24h timer. Returns the new deadline.
    pub fn begin_reveal(&mut self, now_ms: i64) -> i64 {
        let deadline = now_ms + NEXT_ORACLE_DELAY_MS;
        self.is_button_shown = false;
        self.is_fortune_shown = true;
        self.time_to_next_oracle = Some(deadline);
        deadline
    }

    /// Store the fetched fortune. The question starts over with each fortune.
    pub fn complete_reveal(&mut self, fortune: String) {
        self.fortune = fortune;
        self.question.clear();
    }

    /// Submit a question: hide the fortune view, show the clarity view
    pub fn begin_clarify(&mut self, question: impl Into<String>) {
        self.question = question.into();
        self.is_fortune_shown = false;
        self.is_clarity_shown = true;
    }

    /// Store the answer to the submitted question
    pub fn complete_clarify(&mut self, answer: String) {
        self.answer = answer;
    }

    /// Deadline of the next fortune as a UTC timestamp
    pub fn next_oracle_at(&self) -> Option<DateTime<Utc>> {
        self.time_to_next_oracle
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    /// Whether the 24h timer is set and has run out
    pub fn is_expired(&self, now_ms: i64) -> bool {
        self.time_to_next_oracle
            .map(|deadline| now_ms > deadline)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_flags_are_mirrored() {
        let payload = json!({
            "fortune": "The river remembers.",
            "question": "Which river?",
            "isButtonShown": false,
            "isFortuneShown": true,
            "isClarityShown": true,
            "timeToNextOracle": 1_700_000_000_000i64,
            "answer": "All of them."
        });

        let session: VibeSession = serde_json::from_value(payload).unwrap();
        assert!(!session.is_button_shown);
        assert!(session.is_fortune_shown);
        assert!(session.is_clarity_shown);
        assert_eq!(session.time_to_next_oracle, Some(1_700_000_000_000));
        assert_eq!(session.answer, "All of them.");
        // Both flags stay set; the stage only picks the leading component
        assert_eq!(session.stage(), RevealStage::Clarity);
    }

    #[test]
    fn test_fresh_server_record_with_nulls() {
        let payload = json!({
            "fortune": null,
            "answer": null,
            "isButtonShown": true,
            "isFortuneShown": false,
            "isClarityShown": false,
            "timeToNextOracle": null
        });

        let session: VibeSession = serde_json::from_value(payload).unwrap();
        assert_eq!(session, VibeSession::default());
        assert_eq!(session.stage(), RevealStage::Button);
    }

    #[test]
    fn test_timestamp_formats() {
        let float: VibeSession =
            serde_json::from_value(json!({ "timeToNextOracle": 1700000000123.7 })).unwrap();
        assert_eq!(float.time_to_next_oracle, Some(1_700_000_000_123));

        let text: VibeSession =
            serde_json::from_value(json!({ "timeToNextOracle": "1700000000123" })).unwrap();
        assert_eq!(text.time_to_next_oracle, Some(1_700_000_000_123));

        let empty: VibeSession =
            serde_json::from_value(json!({ "timeToNextOracle": "" })).unwrap();
        assert_eq!(empty.time_to_next_oracle, None);

        let bad = serde_json::from_value::<VibeSession>(json!({ "timeToNextOracle": "soon" }));
        assert!(bad.is_err());
    }

    #[test]
    fn test_serializes_camel_case_keys() {
        let value = serde_json::to_value(VibeSession::default()).unwrap();
        assert_eq!(value["isButtonShown"], json!(true));
        assert_eq!(value["isFortuneShown"], json!(false));
        assert_eq!(value["isClarityShown"], json!(false));
        assert_eq!(value["timeToNextOracle"], json!(null));
        assert_eq!(value["question"], json!(""));
    }

    #[test]
    fn test_reveal_sets_deadline_one_day_ahead() {
        let mut session = VibeSession::default();
        let now = 1_700_000_000_000;

        let deadline = session.begin_reveal(now);

        assert_eq!(deadline - now, 86_400_000);
        assert_eq!(session.time_to_next_oracle, Some(now + 86_400_000));
        assert!(!session.is_button_shown);
        assert!(session.is_fortune_shown);
        assert!(!session.is_clarity_shown);
    }

    #[test]
    fn test_clarify_flow() {
        let mut session = VibeSession::default();
        session.begin_reveal(0);
        session.question = "left over".into();
        session.complete_reveal("A door opens.".into());
        assert_eq!(session.question, "");

        session.begin_clarify("Which door?");
        assert_eq!(session.question, "Which door?");
        assert!(!session.is_fortune_shown);
        assert!(session.is_clarity_shown);

        session.complete_clarify("The one you avoid.".into());
        assert_eq!(session.answer, "The one you avoid.");
        assert_eq!(session.stage(), RevealStage::Clarity);
    }

    #[test]
    fn test_expiry() {
        let mut session = VibeSession::default();
        assert!(!session.is_expired(i64::MAX));

        session.time_to_next_oracle = Some(1_000);
        assert!(!session.is_expired(1_000));
        assert!(session.is_expired(1_001));
        assert_eq!(session.next_oracle_at().unwrap().timestamp_millis(), 1_000);
    }
}
