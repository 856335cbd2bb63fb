//! TON mnemonic generation and key derivation.

use std::fmt;

use bip39::Language;
use ed25519_dalek::SigningKey;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::Rng;
use sha2::Sha512;

use super::DerivationError;

/// Number of words in a TON mnemonic.
pub const WORD_COUNT: usize = 24;

const PBKDF_ITERATIONS: u32 = 100_000;
const SEED_VERSION_SALT: &[u8] = b"TON seed version";
const DEFAULT_SEED_SALT: &[u8] = b"TON default seed";

/// A 24-word TON mnemonic (no password).
#[derive(Clone, PartialEq, Eq)]
pub struct Mnemonic {
    words: Vec<&'static str>,
}

impl Mnemonic {
    /// Generates a new random mnemonic.
    ///
    /// Words are drawn from the OS CSPRNG until the phrase passes the TON
    /// basic-seed check, which takes 256 draws on average.
    pub fn generate() -> Self {
        let list = Language::English.word_list();

        loop {
            let words = (0..WORD_COUNT)
                .map(|_| list[OsRng.gen_range(0..list.len())])
                .collect();
            let candidate = Self { words };

            if let Ok(entropy) = candidate.entropy() {
                if is_basic_seed(&entropy) {
                    return candidate;
                }
            }
        }
    }

    /// Parses a space-separated phrase, rejecting phrases a TON wallet would not accept.
    pub fn from_phrase(phrase: &str) -> Result<Self, DerivationError> {
        let language = Language::English;
        let list = language.word_list();

        let words = phrase
            .split_whitespace()
            .map(|word| {
                language
                    .find_word(word)
                    .map(|index| list[index as usize])
                    .ok_or_else(|| DerivationError::UnknownWord(word.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if words.len() != WORD_COUNT {
            return Err(DerivationError::WordCount {
                expected: WORD_COUNT,
                actual: words.len(),
            });
        }

        let mnemonic = Self { words };
        if !is_basic_seed(&mnemonic.entropy()?) {
            return Err(DerivationError::NotBasicSeed);
        }
        Ok(mnemonic)
    }

    /// Returns the mnemonic words.
    pub fn words(&self) -> &[&'static str] {
        &self.words
    }

    /// Returns the words joined by single spaces.
    pub fn phrase(&self) -> String {
        self.words.join(" ")
    }

    /// HMAC-SHA512 keyed by the phrase over the (empty) password.
    fn entropy(&self) -> Result<[u8; 64], DerivationError> {
        let mut mac = Hmac::<Sha512>::new_from_slice(self.phrase().as_bytes())
            .map_err(|e| DerivationError::Key(e.to_string()))?;
        mac.update(b"");

        let mut entropy = [0u8; 64];
        entropy.copy_from_slice(&mac.finalize().into_bytes());
        Ok(entropy)
    }

    /// Derives the ed25519 signing key used by the wallet contract.
    pub fn to_signing_key(&self) -> Result<SigningKey, DerivationError> {
        let entropy = self.entropy()?;
        let mut secret = [0u8; 32];
        pbkdf2::pbkdf2_hmac::<Sha512>(&entropy, DEFAULT_SEED_SALT, PBKDF_ITERATIONS, &mut secret);
        Ok(SigningKey::from_bytes(&secret))
    }

    /// Derives the raw ed25519 public key.
    pub fn public_key(&self) -> Result<[u8; 32], DerivationError> {
        Ok(self.to_signing_key()?.verifying_key().to_bytes())
    }
}

fn is_basic_seed(entropy: &[u8; 64]) -> bool {
    let mut seed = [0u8; 64];
    pbkdf2::pbkdf2_hmac::<Sha512>(
        entropy,
        SEED_VERSION_SALT,
        (PBKDF_ITERATIONS / 256).max(1),
        &mut seed,
    );
    seed[0] == 0
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.phrase())
    }
}

// Keeps phrases out of debug logs.
impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mnemonic({} words)", self.words.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_mnemonic_shape() {
        let mnemonic = Mnemonic::generate();
        let list = Language::English.word_list();

        assert_eq!(mnemonic.words().len(), WORD_COUNT);
        assert!(mnemonic.words().iter().all(|w| list.contains(w)));
        assert!(is_basic_seed(&mnemonic.entropy().unwrap()));
    }

    #[test]
    fn test_generated_mnemonics_differ() {
        assert_ne!(Mnemonic::generate(), Mnemonic::generate());
    }

    #[test]
    fn test_phrase_roundtrip() {
        let mnemonic = Mnemonic::generate();
        let parsed = Mnemonic::from_phrase(&mnemonic.phrase()).unwrap();
        assert_eq!(parsed, mnemonic);
    }

    #[test]
    fn test_unknown_word_rejected() {
        let phrase = ["abandon"; 23].join(" ") + " notaword";
        assert!(matches!(
            Mnemonic::from_phrase(&phrase),
            Err(DerivationError::UnknownWord(w)) if w == "notaword"
        ));
    }

    #[test]
    fn test_word_count_rejected() {
        let phrase = ["abandon"; 12].join(" ");
        assert!(matches!(
            Mnemonic::from_phrase(&phrase),
            Err(DerivationError::WordCount { expected: 24, actual: 12 })
        ));
    }

    #[test]
    fn test_signing_key_is_deterministic() {
        let mnemonic = Mnemonic::generate();
        assert_eq!(
            mnemonic.public_key().unwrap(),
            mnemonic.clone().public_key().unwrap()
        );
    }

    #[test]
    fn test_debug_hides_words() {
        let mnemonic = Mnemonic::generate();
        assert_eq!(format!("{:?}", mnemonic), "Mnemonic(24 words)");
    }
}
