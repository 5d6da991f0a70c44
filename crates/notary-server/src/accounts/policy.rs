//! Password strength policy and generation.

use rand::Rng;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS_AND_SYMBOLS: &[u8] = b"0123456789*?@";

/// Characters that satisfy the digit-or-symbol rule.
const ACCEPTED_DIGITS_AND_SYMBOLS: &str = "0123456789!@#$%^&*()_+-=[]{};':\"|,.<>?~";

pub const MIN_PASSWORD_LEN: usize = 8;
pub const GENERATED_PASSWORD_LEN: usize = 16;

/// Check a password against the strength policy.
///
/// At least 8 characters, with an uppercase letter, a lowercase letter, and
/// a digit or symbol.
pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password
            .chars()
            .any(|c| ACCEPTED_DIGITS_AND_SYMBOLS.contains(c))
}

fn pick(rng: &mut OsRng, charset: &[u8], count: usize, out: &mut Vec<u8>) {
    out.extend((0..count).map(|_| charset[rng.gen_range(0..charset.len())]));
}

/// Generate a random password that satisfies [`validate_password`].
///
/// Two characters each come from the uppercase, lowercase, and
/// digit/symbol sets, the rest from their union, and the whole is shuffled.
pub fn generate_password() -> String {
    let mut rng = OsRng;
    let all: Vec<u8> = [UPPERCASE, LOWERCASE, DIGITS_AND_SYMBOLS].concat();

    let mut chars = Vec::with_capacity(GENERATED_PASSWORD_LEN);
    pick(&mut rng, UPPERCASE, 2, &mut chars);
    pick(&mut rng, LOWERCASE, 2, &mut chars);
    pick(&mut rng, DIGITS_AND_SYMBOLS, 2, &mut chars);
    pick(&mut rng, &all, GENERATED_PASSWORD_LEN - 6, &mut chars);
    chars.shuffle(&mut rng);

    chars.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_accepts_strong_passwords() {
        assert!(validate_password("Admin123"));
        assert!(validate_password("Passw*rd"));
        assert!(validate_password("correctHorse~"));
    }

    #[test]
    fn policy_rejects_weak_passwords() {
        assert!(!validate_password(""));
        assert!(!validate_password("Ab1"));
        assert!(!validate_password("alllowercase1"));
        assert!(!validate_password("ALLUPPERCASE1"));
        assert!(!validate_password("NoDigitsOrSymbols"));
    }

    #[test]
    fn generated_password_has_fixed_length_and_passes_policy() {
        for _ in 0..50 {
            let password = generate_password();
            assert_eq!(password.len(), GENERATED_PASSWORD_LEN);
            assert!(validate_password(&password), "{password}");
        }
    }

    #[test]
    fn generated_passwords_differ() {
        assert_ne!(generate_password(), generate_password());
    }
}
