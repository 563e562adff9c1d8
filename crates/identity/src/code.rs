//! Short numeric verification codes.

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Number of digits in a rendered code.
pub const CODE_DIGITS: usize = 4;

/// Size of the code space (`0000`..=`9999`).
pub const CODE_SPACE: u16 = 10_000;

/// A four digit single-use verification code. Doubles as the pending entry key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "CodeRepr", into = "String")]
pub struct VerificationCode(u16);

#[derive(Deserialize)]
#[serde(untagged)]
enum CodeRepr {
    Number(u64),
    Text(String),
}

/// Error parsing a verification code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("verification code must be 1 to 4 digits, got '{0}'")]
pub struct InvalidCode(pub String);

impl VerificationCode {
    /// Build a code from its numeric value.
    pub fn new(value: u16) -> Result<Self, InvalidCode> {
        if value < CODE_SPACE {
            Ok(Self(value))
        } else {
            Err(InvalidCode(value.to_string()))
        }
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// Individual digits, most significant first.
    pub fn digits(self) -> [char; CODE_DIGITS] {
        let mut out = ['0'; CODE_DIGITS];
        for (slot, ch) in out.iter_mut().zip(self.to_string().chars()) {
            *slot = ch;
        }
        out
    }
}

impl fmt::Display for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = CODE_DIGITS)
    }
}

impl FromStr for VerificationCode {
    type Err = InvalidCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty()
            || trimmed.len() > CODE_DIGITS
            || !trimmed.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(InvalidCode(s.to_string()));
        }
        let value = trimmed
            .parse::<u16>()
            .map_err(|_| InvalidCode(s.to_string()))?;
        Self::new(value)
    }
}

impl TryFrom<CodeRepr> for VerificationCode {
    type Error = InvalidCode;

    fn try_from(repr: CodeRepr) -> Result<Self, Self::Error> {
        match repr {
            CodeRepr::Number(n) => u16::try_from(n)
                .map_err(|_| InvalidCode(n.to_string()))
                .and_then(Self::new),
            CodeRepr::Text(s) => s.parse(),
        }
    }
}

impl From<VerificationCode> for String {
    fn from(code: VerificationCode) -> Self {
        code.to_string()
    }
}

/// Source of verification codes.
///
/// Generators make no uniqueness promise; the ledger rejects codes that
/// collide with a live entry and the workflow asks for another.
pub trait CodeGenerator: Send + Sync {
    fn issue(&self) -> VerificationCode;
}

/// Uniformly random codes from a generator seeded per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomCodeGenerator;

impl CodeGenerator for RandomCodeGenerator {
    fn issue(&self) -> VerificationCode {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        let mut rng = StdRng::seed_from_u64(nanos ^ OsRng.next_u64());
        VerificationCode(rng.gen_range(0..CODE_SPACE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_zero_pads() {
        assert_eq!(VerificationCode::new(7).unwrap().to_string(), "0007");
        assert_eq!(VerificationCode::new(4821).unwrap().to_string(), "4821");
        assert_eq!(VerificationCode::new(482).unwrap().digits(), ['0', '4', '8', '2']);
    }

    #[test]
    fn test_parse() {
        assert_eq!("0482".parse::<VerificationCode>().unwrap().value(), 482);
        assert_eq!("482".parse::<VerificationCode>().unwrap().value(), 482);
        assert!("12345".parse::<VerificationCode>().is_err());
        assert!("12a4".parse::<VerificationCode>().is_err());
        assert!("".parse::<VerificationCode>().is_err());
        assert!("-1".parse::<VerificationCode>().is_err());
        assert!(VerificationCode::new(10_000).is_err());
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let a: VerificationCode = serde_json::from_str("4821").unwrap();
        let b: VerificationCode = serde_json::from_str("\"4821\"").unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_str::<VerificationCode>("99999").is_err());
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"4821\"");
    }

    #[test]
    fn test_random_codes_in_range() {
        let generator = RandomCodeGenerator;
        for _ in 0..1_000 {
            let code = generator.issue();
            assert!(code.value() < CODE_SPACE);
            assert_eq!(code.to_string().len(), CODE_DIGITS);
        }
    }
}
