use crate::moc::errors::{FiringError, Side};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Tokens read from or written to each channel of a unit in one firing,
/// one entry per channel in the unit's channel order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RateVector(Vec<usize>);

impl RateVector {
    pub fn new(rates: Vec<usize>) -> Self {
        Self(rates)
    }

    /// Total tokens moved across all channels in one firing.
    #[inline]
    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Fails with `ArityMismatch` unless there is one rate per channel.
    pub fn check_arity(&self, channels: usize, side: Side) -> Result<(), FiringError> {
        if self.0.len() != channels {
            return Err(FiringError::ArityMismatch {
                side,
                rates: self.0.len(),
                channels,
            });
        }
        Ok(())
    }
}

impl Deref for RateVector {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for RateVector {
    fn from(rates: Vec<usize>) -> Self {
        Self(rates)
    }
}

impl<const N: usize> From<[usize; N]> for RateVector {
    fn from(rates: [usize; N]) -> Self {
        Self(rates.to_vec())
    }
}

impl From<&[usize]> for RateVector {
    fn from(rates: &[usize]) -> Self {
        Self(rates.to_vec())
    }
}

impl FromIterator<usize> for RateVector {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
