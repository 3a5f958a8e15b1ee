use crate::io::channel::{ChannelRx, ChannelTx};
use crate::moc::errors::{ConstructError, Side, UnitResult};
use crate::moc::rates::RateVector;
use crate::moc::reader::{check_production, read_inputs, write_outputs};
use crate::moc::scenario::{Firing, FiringFn};
use crate::moc::unit::{Unit, UnitKind};
use crate::utils::CancelToken;
use std::sync::Arc;

/// Static-rate SDF actor.
///
/// Every firing reads `consumption[i]` tokens from input i, applies the
/// function and writes `production[j]` tokens to output j.
pub struct Actor<I, O> {
    name: String,
    consumption: RateVector,
    production: RateVector,
    function: FiringFn<I, O>,
    inputs: Vec<ChannelRx<I>>,
    outputs: Vec<ChannelTx<O>>,
}

impl<I: Send + 'static, O: Send + 'static> Actor<I, O> {
    /// Fails with `ArityMismatch` when a channel list does not match its
    /// rate vector. The channels come back inside the error, unread.
    pub fn new<F>(
        consumption: impl Into<RateVector>,
        production: impl Into<RateVector>,
        function: F,
        inputs: Vec<ChannelRx<I>>,
        outputs: Vec<ChannelTx<O>>,
    ) -> Result<Self, ConstructError<I, O>>
    where
        F: Firing<I, O> + 'static,
    {
        let consumption = consumption.into();
        let production = production.into();
        let checked = consumption
            .check_arity(inputs.len(), Side::Input)
            .and_then(|()| production.check_arity(outputs.len(), Side::Output));
        if let Err(error) = checked {
            return Err(ConstructError::new(error, inputs, outputs));
        }

        Ok(Self {
            name: "actor".to_string(),
            consumption,
            production,
            function: Arc::new(function),
            inputs,
            outputs,
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn consumption(&self) -> &RateVector {
        &self.consumption
    }

    pub fn production(&self) -> &RateVector {
        &self.production
    }
}

impl<I: Send + 'static, O: Send + 'static> Unit for Actor<I, O> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> UnitKind {
        UnitKind::Actor
    }

    fn fire(&mut self, cancel: &CancelToken) -> UnitResult<()> {
        let tokens = read_inputs(&self.consumption, &mut self.inputs, cancel)?;
        let outputs = self.function.fire(tokens);
        check_production(&self.production, &outputs)?;
        write_outputs(outputs, &mut self.outputs, cancel)?;
        Ok(())
    }
}
