use crate::models::AnswerData;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::Rng;

/// Characters used in public codes; 0, I and O are left out as ambiguous
pub const CODE_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZ";

pub const CODE_LENGTH: usize = 8;

/// Draw a fresh public code
pub fn generate_user_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Trim and uppercase user input; `None` when nothing is left
pub fn normalize_code(input: &str) -> Option<String> {
    let code = input.trim().to_uppercase();
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

/// Check the shape of a generated code
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| CODE_ALPHABET.contains(&b))
}

/// Shareable token carrying a code and its answers
pub fn encode_answers(data: &AnswerData) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(data)?;
    Ok(STANDARD.encode(json))
}

/// Decode a share token; rejects tokens whose answers do not fit the question set
pub fn decode_answers(token: &str, question_count: usize) -> Option<AnswerData> {
    let bytes = STANDARD.decode(token.trim()).ok()?;
    let data: AnswerData = serde_json::from_slice(&bytes).ok()?;
    if data.code.is_empty() || data.answers.len() != question_count {
        return None;
    }
    Some(data)
}
