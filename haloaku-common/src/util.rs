use std::{num::NonZeroU64, time::Duration as StdDuration};
use thiserror::Error;
use time::Duration;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Debug, Hash)]
pub struct PositiveDuration(StdDuration);

impl PositiveDuration {
    #[must_use]
    pub const fn from_millis(millis: NonZeroU64) -> Self {
        Self(StdDuration::from_millis(millis.get()))
    }

    #[must_use]
    pub fn new(duration: StdDuration) -> Option<Self> {
        (!duration.is_zero()).then_some(Self(duration))
    }

    #[must_use]
    pub fn get(self) -> StdDuration {
        self.0
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The duration is not positive: {0}")]
pub struct NonPositiveDurationError(Duration);

impl TryFrom<Duration> for PositiveDuration {
    type Error = NonPositiveDurationError;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        StdDuration::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(NonPositiveDurationError(value))
    }
}
