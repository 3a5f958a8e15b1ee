use crate::moc::rates::RateVector;
use std::fmt;
use std::sync::Arc;

/// One token list per channel, in channel order.
pub type Tokens<T> = Vec<Vec<T>>;

/// Firing function of an actor or kernel.
///
/// Gets one token list per input and must return one token list per output,
/// the i-th holding exactly the production rate of output i. Must not touch
/// channels. Any `Fn(Tokens<I>) -> Tokens<O> + Send + Sync` closure is one.
pub trait Firing<I, O>: Send + Sync {
    fn fire(&self, inputs: Tokens<I>) -> Tokens<O>;
}

impl<I, O, F> Firing<I, O> for F
where
    F: Fn(Tokens<I>) -> Tokens<O> + Send + Sync,
{
    #[inline]
    fn fire(&self, inputs: Tokens<I>) -> Tokens<O> {
        self(inputs)
    }
}

/// Shared handle to a firing function.
pub type FiringFn<I, O> = Arc<dyn Firing<I, O>>;

/// Rates and function governing exactly one kernel firing.
///
/// Built by a detector's decoder each cycle and consumed by the kernel that
/// reads it from its control channel.
pub struct Scenario<I, O> {
    consumption: RateVector,
    production: RateVector,
    function: FiringFn<I, O>,
}

impl<I, O> Scenario<I, O> {
    pub fn new<F>(
        consumption: impl Into<RateVector>,
        production: impl Into<RateVector>,
        function: F,
    ) -> Self
    where
        F: Firing<I, O> + 'static,
    {
        Self::shared(consumption, production, Arc::new(function))
    }

    /// Same as [`new`](Self::new) but reuses an already shared function,
    /// so decoders emitting many scenarios per cycle do not reallocate it.
    pub fn shared(
        consumption: impl Into<RateVector>,
        production: impl Into<RateVector>,
        function: FiringFn<I, O>,
    ) -> Self {
        Self {
            consumption: consumption.into(),
            production: production.into(),
            function,
        }
    }

    #[inline]
    pub fn consumption(&self) -> &RateVector {
        &self.consumption
    }

    #[inline]
    pub fn production(&self) -> &RateVector {
        &self.production
    }

    #[inline]
    pub fn function(&self) -> &FiringFn<I, O> {
        &self.function
    }

    #[inline]
    pub fn fire(&self, inputs: Tokens<I>) -> Tokens<O> {
        self.function.fire(inputs)
    }
}

impl<I, O> Clone for Scenario<I, O> {
    fn clone(&self) -> Self {
        Self {
            consumption: self.consumption.clone(),
            production: self.production.clone(),
            function: self.function.clone(),
        }
    }
}

impl<I, O> fmt::Debug for Scenario<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("consumption", &self.consumption)
            .field("production", &self.production)
            .finish_non_exhaustive()
    }
}
