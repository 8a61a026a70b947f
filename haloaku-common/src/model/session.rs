use rand::Rng;
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};
use thiserror::Error;
use time::OffsetDateTime;

pub const SESSION_ID_MAX_LEN: usize = 128;
pub const SESSION_ID_PREFIX: &str = "user_";
pub const SESSION_ID_RANDOM_LEN: usize = 7;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque per-browser token that likes are attributed to.
///
/// This is not a credential. Anyone presenting the same token is treated as
/// the same liker.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionId(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The session id is invalid: {0:?}")]
pub struct InvalidSessionIdError(String);

impl SessionId {
    pub fn new(id: String) -> Result<Self, InvalidSessionIdError> {
        let valid = !id.is_empty()
            && id.chars().count() <= SESSION_ID_MAX_LEN
            && !id.chars().any(char::is_whitespace);

        if valid {
            Ok(Self(id))
        } else {
            Err(InvalidSessionIdError(id))
        }
    }

    /// Generates `user_<unix millis>_<7 base-36 chars>`.
    #[must_use]
    pub fn generate() -> Self {
        Self::generate_at(OffsetDateTime::now_utc(), &mut rand::rng())
    }

    pub fn generate_at<R: Rng + ?Sized>(time: OffsetDateTime, rng: &mut R) -> Self {
        let millis = time.unix_timestamp_nanos() / 1_000_000;
        let suffix: String = (0..SESSION_ID_RANDOM_LEN)
            .map(|_| char::from(BASE36_DIGITS[rng.random_range(0..BASE36_DIGITS.len())]))
            .collect();

        Self(format!("{SESSION_ID_PREFIX}{millis}_{suffix}"))
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = InvalidSessionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_owned())
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        SessionId::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"SessionId"))
    }
}
