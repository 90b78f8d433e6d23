//! Join codes for rooms.
//!
//! Codes are 6 characters of Crockford base32. Input is normalized the
//! Crockford way so players can type `o` for `0` or `l` for `1`.

use rand::Rng;

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ"; // no I, L, O, U

pub const JOIN_CODE_LEN: usize = 6;

/// Generate a fresh join code.
///
/// ```
/// use backend::utils::join_code::{generate_join_code, JOIN_CODE_LEN};
///
/// let code = generate_join_code();
/// assert_eq!(code.len(), JOIN_CODE_LEN);
/// ```
pub fn generate_join_code() -> String {
    let mut rng = rand::rng();
    (0..JOIN_CODE_LEN)
        .map(|_| CROCKFORD[rng.random_range(0..CROCKFORD.len())] as char)
        .collect()
}

/// Canonical form of a user-typed code, or `None` if it can't be one.
pub fn normalize_join_code(input: &str) -> Option<String> {
    let mut out = String::with_capacity(JOIN_CODE_LEN);
    for ch in input.chars().filter(|c| *c != '-' && !c.is_whitespace()) {
        let mapped = match ch.to_ascii_uppercase() {
            'O' => '0',
            'I' | 'L' => '1',
            c => c,
        };
        if !CROCKFORD.contains(&(mapped as u8)) || !mapped.is_ascii() {
            return None;
        }
        out.push(mapped);
    }
    (out.len() == JOIN_CODE_LEN).then_some(out)
}
