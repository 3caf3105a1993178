use crate::models::{Participant, UserData};

pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Conversation key for two accounts: the sorted uids joined by `-`
pub fn conversation_id(uid_a: &str, uid_b: &str) -> String {
    let (first, second) = ordered(uid_a, uid_b);
    format!("{}-{}", first, second)
}

/// Participants ordered so that participant 1 has the smaller uid
pub fn ordered_participants(a: &UserData, b: &UserData) -> (Participant, Participant) {
    if a.uid <= b.uid {
        (Participant::from_user(a), Participant::from_user(b))
    } else {
        (Participant::from_user(b), Participant::from_user(a))
    }
}

/// Trimmed message text, or `None` if empty or too long
pub fn validate_message_text(text: &str) -> Option<&str> {
    let text = text.trim();
    if text.is_empty() || text.chars().count() > MAX_MESSAGE_LENGTH {
        None
    } else {
        Some(text)
    }
}

#[inline]
fn ordered<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
