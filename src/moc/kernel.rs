use crate::io::base::BaseRx;
use crate::io::channel::{ChannelRx, ChannelTx};
use crate::moc::errors::{Port, Side, UnitError, UnitResult};
use crate::moc::reader::{check_production, read_inputs, write_outputs};
use crate::moc::scenario::Scenario;
use crate::moc::unit::{Unit, UnitKind};
use crate::utils::CancelToken;

/// Scenario-controlled SADF kernel.
///
/// Rates and function are not fixed: each firing starts by reading one
/// [`Scenario`] from the control channel, and that scenario alone governs
/// the data reads and writes of the same firing.
pub struct Kernel<I, O> {
    name: String,
    control: ChannelRx<Scenario<I, O>>,
    inputs: Vec<ChannelRx<I>>,
    outputs: Vec<ChannelTx<O>>,
}

impl<I: Send + 'static, O: Send + 'static> Kernel<I, O> {
    pub fn new(
        control: ChannelRx<Scenario<I, O>>,
        inputs: Vec<ChannelRx<I>>,
        outputs: Vec<ChannelTx<O>>,
    ) -> Self {
        Self {
            name: "kernel".to_string(),
            control,
            inputs,
            outputs,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<I: Send + 'static, O: Send + 'static> Unit for Kernel<I, O> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> UnitKind {
        UnitKind::Kernel
    }

    fn fire(&mut self, cancel: &CancelToken) -> UnitResult<()> {
        let scenario = self
            .control
            .get(cancel)
            .map_err(|e| UnitError::from_recv(e, Port::Control))?;

        scenario
            .production()
            .check_arity(self.outputs.len(), Side::Output)?;

        let tokens = read_inputs(scenario.consumption(), &mut self.inputs, cancel)?;
        let outputs = scenario.fire(tokens);
        check_production(scenario.production(), &outputs)?;
        write_outputs(outputs, &mut self.outputs, cancel)?;
        Ok(())
    }
}
