//! Prompt material for the oracle

use rand::seq::SliceRandom;
use rand::Rng;

/// Fortune returned by the canned oracle
pub const EXAMPLE_FORTUNE: &str = "Take the experience of yesterday and transform it into an opportunity for growth, allowing your intuition to guide you towards a new understanding of your path forward.";

/// Answer returned by the canned oracle
pub const EXAMPLE_ANSWER: &str = "The path to the horizon is unique for every individual, and often requires effort and perseverance. The universe encourages you to trust your intuition and explore new opportunities with an open mind. Embrace change, let go of fear, and take action towards your goals. Remember, the journey is just as important as the destination, so enjoy each step along the way.";

/// Persona given to the model on every call
pub const BASE_INSTRUCTION: &str = "You are a mystical oracle, your responses are never specific but instead vague and abstract, you should always simply respond with an abstract statement of prediction";

pub const EMOTIONS: &[&str] = &[
    "anger",
    "anxiety",
    "boredom",
    "calm",
    "confusion",
    "contempt",
    "curiosity",
    "disappointment",
    "disgust",
    "embarrassment",
    "envy",
    "excitement",
    "fear",
    "frustration",
    "gratitude",
    "guilt",
    "happiness",
    "hope",
    "hostility",
    "interest",
    "jealousy",
    "loneliness",
    "love",
    "pleasure",
    "pride",
    "regret",
    "relief",
    "sadness",
    "shame",
    "surprise",
];

/// One of these is appended to each fortune request
pub const ADDITIONAL_INSTRUCTIONS: &[&str] = &[
    "What is the weather likely to be today in London?",
    "What is my fortune today?",
    "What lesson should I take from yesterday and apply today?",
    "What is my tarot reading?",
    "Should I or Shouldn't I?",
];

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
        }
    }
}

/// A single prompt message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn mood_message<R: Rng + ?Sized>(rng: &mut R) -> PromptMessage {
    PromptMessage::user(format!(
        "Make the prediction {} and {}",
        pick(rng, EMOTIONS),
        pick(rng, EMOTIONS)
    ))
}

/// Messages asking for a new fortune
pub fn fortune_messages<R: Rng + ?Sized>(rng: &mut R) -> Vec<PromptMessage> {
    vec![
        PromptMessage::user(BASE_INSTRUCTION),
        mood_message(rng),
        PromptMessage::user(pick(rng, ADDITIONAL_INSTRUCTIONS)),
    ]
}

/// Messages asking the oracle to answer `question` about `fortune`
pub fn clarify_messages<R: Rng + ?Sized>(
    rng: &mut R,
    fortune: &str,
    question: &str,
) -> Vec<PromptMessage> {
    vec![
        PromptMessage::user(BASE_INSTRUCTION),
        mood_message(rng),
        PromptMessage::system(fortune),
        PromptMessage::user(question),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_fortune_messages_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let messages = fortune_messages(&mut rng);

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, BASE_INSTRUCTION);
        assert!(messages[1].content.starts_with("Make the prediction "));
        assert!(ADDITIONAL_INSTRUCTIONS.contains(&messages[2].content.as_str()));
        assert!(messages.iter().all(|m| m.role == Role::User));
    }

    #[test]
    fn test_clarify_messages_carry_fortune_and_question() {
        let mut rng = StdRng::seed_from_u64(7);
        let messages = clarify_messages(&mut rng, "The tide turns.", "When?");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[2].role, Role::System);
        assert_eq!(messages[2].content, "The tide turns.");
        assert_eq!(messages[3].role, Role::User);
        assert_eq!(messages[3].content, "When?");
    }

    #[test]
    fn test_mood_uses_known_emotions() {
        let mut rng = StdRng::seed_from_u64(42);
        let mood = mood_message(&mut rng).content;
        let rest = mood.trim_start_matches("Make the prediction ");
        let (first, second) = rest.split_once(" and ").unwrap();
        assert!(EMOTIONS.contains(&first));
        assert!(EMOTIONS.contains(&second));
    }
}
