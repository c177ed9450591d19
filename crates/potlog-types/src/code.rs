use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Human-facing 6-digit session code.
///
/// Codes are drawn uniformly from `100000..=999999`, so they never start
/// with a zero and always render as exactly six digits. Uniqueness is not a
/// property of the type: the session store enforces it on insert.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NumericCode(u32);

impl NumericCode {
    pub const MIN: u32 = 100_000;
    pub const MAX: u32 = 999_999;

    /// Draw a random code from the valid range.
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        Self(rng.gen_range(Self::MIN..=Self::MAX))
    }

    /// Create from a raw number, rejecting values outside the 6-digit range.
    pub fn new(value: u32) -> Result<Self, TypeError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TypeError::InvalidNumericCode(value.to_string()))
        }
    }

    pub fn value(&self) -> u32 {
        self.0
    }
}

impl FromStr for NumericCode {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TypeError::InvalidNumericCode(s.to_string()));
        }
        let value: u32 = s
            .parse()
            .map_err(|_| TypeError::InvalidNumericCode(s.to_string()))?;
        Self::new(value).map_err(|_| TypeError::InvalidNumericCode(s.to_string()))
    }
}

impl TryFrom<String> for NumericCode {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NumericCode> for String {
    fn from(code: NumericCode) -> Self {
        code.to_string()
    }
}

impl fmt::Debug for NumericCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NumericCode({})", self.0)
    }
}

impl fmt::Display for NumericCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}
