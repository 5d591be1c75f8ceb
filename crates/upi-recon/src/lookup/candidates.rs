use std::fmt;

use serde::{Deserialize, Serialize};

use super::dictionary::SuffixDictionary;

const SEED_DIGITS: usize = 10;
const COUNTRY_PREFIX: &str = "91";

/// A validated, prefix-stripped ten digit mobile number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Seed(String);

impl Seed {
    /// Accepts `9876543210` or the prefixed `919876543210`.
    pub fn parse(raw: &str) -> Result<Self, InvalidSeed> {
        let trimmed = raw.trim();
        let digits = match trimmed.strip_prefix(COUNTRY_PREFIX) {
            Some(rest) if trimmed.len() > SEED_DIGITS => rest,
            _ => trimmed,
        };

        if digits.len() == SEED_DIGITS && digits.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(digits.to_string()))
        } else {
            Err(InvalidSeed {
                raw: raw.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{raw}' is not a 10-digit number (optionally starting with 91)")]
pub struct InvalidSeed {
    pub raw: String,
}

/// One derived address to be checked against the oracle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Candidate(String);

impl Candidate {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Candidate {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Expands a seed into `seed@handle` for every dictionary entry, in order.
pub fn generate(seed: &Seed, dictionary: &SuffixDictionary) -> Vec<Candidate> {
    dictionary
        .entries()
        .iter()
        .map(|handle| Candidate(format!("{}@{}", seed.as_str(), handle)))
        .collect()
}
