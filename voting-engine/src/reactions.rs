//! Static palettes of the named reactions and emojis users can place.

/// Names of every reaction in the reaction palette.
pub const REACTION_NAMES: &[&str] = &[
    "agree",
    "disagree",
    "important",
    "insightful",
    "changemind",
    "thanks",
    "support",
    "verified",
    "verifiedFalse",
    "betTrue",
    "betFalse",
    "surprise",
    "roll",
    "yeswhatimean",
    "miss",
    "elaborate",
    "offtopic",
    "shakyPremise",
    "locallyInvalid",
    "coveredAlready",
    "unnecessarily-combative",
    "muddled",
    "strawman",
    "dontUnderstand",
    "locallyValid",
    "notPlanningToRespond",
    "seen",
    "empathy",
    "heart",
    "crux",
    "notacrux",
    "prediction",
    "examples",
    "additionalQuestions",
    "taboo",
    "discussedAlready",
    "unnecessarily-harsh",
    "handshake",
    "scout",
    "scholarship",
    "concrete",
    "key",
    "shrug",
    "scales",
    "thinking",
    "obtuse",
    "nonSequitur",
    "tooManyAssumptions",
    "hitsTheMark",
    "timecost",
    "excitement",
    "paperclip",
    "clear",
    "typo",
    "laugh",
    "disappointed",
    "sad",
    "confused",
    "smile",
    "facilitation",
    "soldier",
    "thumbs-up",
    "thumbs-down",
    "1percent",
    "10percent",
    "25percent",
    "40percent",
    "50percent",
    "60percent",
    "75percent",
    "90percent",
    "99percent",
    "why",
];

/// Emojis of the emoji voting system.
pub const EMOJI_NAMES: &[&str] = &["agree", "disagree", "love", "helpful", "insightful", "changed-mind", "laugh"];

pub fn is_reaction(name: &str) -> bool {
    REACTION_NAMES.contains(&name)
}

pub fn is_emoji(name: &str) -> bool {
    EMOJI_NAMES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_palette_has_no_duplicates() {
        let unique: HashSet<_> = REACTION_NAMES.iter().collect();
        assert_eq!(unique.len(), REACTION_NAMES.len());
    }

    #[test]
    fn test_lookup() {
        assert!(is_reaction("crux"));
        assert!(is_reaction("thumbs-up"));
        assert!(!is_reaction("Crux"));
        assert!(is_emoji("laugh"));
        assert!(!is_emoji("crux"));
    }
}
