//! Join code generation.
//!
//! Codes are six characters drawn uniformly from an alphabet without glyphs
//! that are easy to confuse when read aloud or copied by hand (`0 O 1 I L`).
//! 31 symbols at length 6 give roughly 8.9e8 distinct codes.

use rand::Rng;

/// Symbols a join code may contain.
pub const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

/// Number of symbols in every join code.
pub const JOIN_CODE_LENGTH: usize = 6;

lazy_static::lazy_static! {
    static ref JOIN_CODE_REGEX: regex::Regex =
        regex::Regex::new(r"^[ABCDEFGHJKMNPQRSTUVWXYZ2-9]{6}$").unwrap();
}

/// Draws a fresh candidate code.
pub fn generate_join_code() -> String {
    generate_join_code_with(&mut rand::thread_rng())
}

/// Draws a candidate code from the given source of randomness.
pub fn generate_join_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..JOIN_CODE_LENGTH)
        .map(|_| JOIN_CODE_ALPHABET[rng.gen_range(0..JOIN_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Whether `code` has the shape of a generated join code.
pub fn is_valid_join_code(code: &str) -> bool {
    JOIN_CODE_REGEX.is_match(code)
}

/// Normalizes user input (surrounding whitespace, lowercase) into a code.
pub fn normalize_join_code(input: &str) -> Option<String> {
    let code = input.trim().to_ascii_uppercase();
    if is_valid_join_code(&code) {
        Some(code)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_alphabet_excludes_ambiguous_glyphs() {
        for c in [b'0', b'O', b'1', b'I', b'L'] {
            assert!(!JOIN_CODE_ALPHABET.contains(&c), "{} is ambiguous", c as char);
        }
        let unique: HashSet<&u8> = JOIN_CODE_ALPHABET.iter().collect();
        assert_eq!(unique.len(), JOIN_CODE_ALPHABET.len());
        assert_eq!(JOIN_CODE_ALPHABET.len(), 31);
    }

    #[test]
    fn test_generated_codes_conform() {
        for _ in 0..1000 {
            let code = generate_join_code();
            assert_eq!(code.len(), JOIN_CODE_LENGTH);
            assert!(code.bytes().all(|b| JOIN_CODE_ALPHABET.contains(&b)), "{}", code);
            assert!(is_valid_join_code(&code));
        }
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = generate_join_code_with(&mut StdRng::seed_from_u64(7));
        let b = generate_join_code_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_symbol_is_reachable() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();
        for _ in 0..2000 {
            seen.extend(generate_join_code_with(&mut rng).into_bytes());
        }
        assert_eq!(seen.len(), JOIN_CODE_ALPHABET.len());
    }

    #[test]
    fn test_regex_matches_alphabet() {
        for &c in JOIN_CODE_ALPHABET {
            let code: String = std::iter::repeat(c as char).take(JOIN_CODE_LENGTH).collect();
            assert!(is_valid_join_code(&code), "{}", code);
        }
    }

    #[test]
    fn test_is_valid_join_code_rejects() {
        assert!(!is_valid_join_code("ABCDE"));
        assert!(!is_valid_join_code("ABCDEFG"));
        assert!(!is_valid_join_code("ABCDE0"));
        assert!(!is_valid_join_code("ABCDEI"));
        assert!(!is_valid_join_code("ABCDEL"));
        assert!(!is_valid_join_code("abcdef"));
        assert!(!is_valid_join_code("ABC-DE"));
    }

    #[test]
    fn test_normalize_join_code() {
        assert_eq!(normalize_join_code("  abc234 "), Some("ABC234".to_string()));
        assert_eq!(normalize_join_code("ABC234"), Some("ABC234".to_string()));
        assert_eq!(normalize_join_code("abc10o"), None);
        assert_eq!(normalize_join_code(""), None);
    }
}
