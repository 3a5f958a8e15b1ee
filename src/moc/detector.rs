use crate::io::channel::{ChannelRx, ChannelTx};
use crate::moc::errors::{ConstructError, Side, UnitResult};
use crate::moc::rates::RateVector;
use crate::moc::reader::{read_inputs, write_outputs};
use crate::moc::scenario::Tokens;
use crate::moc::unit::{Unit, UnitKind};
use crate::utils::CancelToken;

type TransitionFn<S, I> = Box<dyn FnMut(&S, Tokens<I>) -> S + Send>;
type DecodeFn<S, C> = Box<dyn FnMut(&S) -> Tokens<C> + Send>;

/// SADF detector: a state machine driving one or more kernels.
///
/// Each firing reads its fixed-rate inputs, computes the next state with the
/// transition function, then decodes that state into one token list per
/// control output. Control outputs carry no production rate: output i gets
/// exactly as many tokens as the decoder put in list i, which lets a single
/// firing schedule several kernel firings.
///
/// `C` is normally a [`Scenario`](crate::moc::Scenario); networks whose
/// kernels differ in token types use an application enum instead.
pub struct Detector<I, S, C> {
    name: String,
    consumption: RateVector,
    transition: TransitionFn<S, I>,
    decode: DecodeFn<S, C>,
    state: S,
    inputs: Vec<ChannelRx<I>>,
    outputs: Vec<ChannelTx<C>>,
}

impl<I, S, C> Detector<I, S, C>
where
    I: Send + 'static,
    S: Send + 'static,
    C: Send + 'static,
{
    /// `initial` is the state before the first firing. Fails with
    /// `ArityMismatch` when `consumption` does not match `inputs`.
    pub fn new<F, G>(
        consumption: impl Into<RateVector>,
        transition: F,
        decode: G,
        initial: S,
        inputs: Vec<ChannelRx<I>>,
        outputs: Vec<ChannelTx<C>>,
    ) -> Result<Self, ConstructError<I, C>>
    where
        F: FnMut(&S, Tokens<I>) -> S + Send + 'static,
        G: FnMut(&S) -> Tokens<C> + Send + 'static,
    {
        let consumption = consumption.into();
        if let Err(error) = consumption.check_arity(inputs.len(), Side::Input) {
            return Err(ConstructError::new(error, inputs, outputs));
        }

        Ok(Self {
            name: "detector".to_string(),
            consumption,
            transition: Box::new(transition),
            decode: Box::new(decode),
            state: initial,
            inputs,
            outputs,
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn state(&self) -> &S {
        &self.state
    }
}

impl<I, S, C> Unit for Detector<I, S, C>
where
    I: Send + 'static,
    S: Send + 'static,
    C: Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> UnitKind {
        UnitKind::Detector
    }

    fn fire(&mut self, cancel: &CancelToken) -> UnitResult<()> {
        let tokens = read_inputs(&self.consumption, &mut self.inputs, cancel)?;
        self.state = (self.transition)(&self.state, tokens);

        let controls = (self.decode)(&self.state);
        let written = write_outputs(controls, &mut self.outputs, cancel)?;
        tracing::trace!("[{}] emitted {} control tokens", self.name, written);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::base::{BaseRx, BaseTx};
    use crate::io::channel::Channel;
    use crate::moc::errors::{FiringError, UnitError};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Low,
        High,
    }

    fn threshold(s: &Mode, x: Tokens<i64>) -> Mode {
        match s {
            Mode::Low if x[0][0] > 100 => Mode::High,
            Mode::Low => Mode::Low,
            Mode::High if x[0][0] < 0 => Mode::Low,
            Mode::High => Mode::High,
        }
    }

    #[test]
    fn switches_on_the_first_input_over_threshold() {
        let cancel = CancelToken::new_root();
        let (mut in_tx, in_rx) = Channel::unbounded::<i64>();
        let (ctrl_tx, mut ctrl_rx) = Channel::unbounded::<Mode>();

        let mut det = Detector::new(
            [1],
            threshold,
            |s: &Mode| vec![vec![*s]],
            Mode::Low,
            vec![in_rx],
            vec![ctrl_tx],
        )
        .unwrap();

        in_tx.put_all([50, 100, 101, 7, -1], &cancel).unwrap();
        for _ in 0..5 {
            det.fire(&cancel).unwrap();
        }
        assert_eq!(
            ctrl_rx.drain(10),
            vec![Mode::Low, Mode::Low, Mode::High, Mode::High, Mode::Low]
        );
        assert_eq!(*det.state(), Mode::Low);
    }

    #[test]
    fn emits_a_state_dependent_number_of_controls() {
        let cancel = CancelToken::new_root();
        let (mut in_tx, in_rx) = Channel::unbounded::<usize>();
        let (a_tx, mut a_rx) = Channel::unbounded::<usize>();
        let (b_tx, mut b_rx) = Channel::unbounded::<usize>();

        let mut det = Detector::new(
            [1],
            |_s: &usize, x: Tokens<usize>| x[0][0],
            |s: &usize| vec![vec![*s; *s], vec![0]],
            0,
            vec![in_rx],
            vec![a_tx, b_tx],
        )
        .unwrap();

        in_tx.put_all([3, 1], &cancel).unwrap();
        det.fire(&cancel).unwrap();
        det.fire(&cancel).unwrap();

        assert_eq!(a_rx.drain(10), vec![3, 3, 3, 1]);
        assert_eq!(b_rx.drain(10), vec![0, 0]);
    }

    #[test]
    fn decoder_must_cover_every_control_output() {
        let cancel = CancelToken::new_root();
        let (mut in_tx, in_rx) = Channel::unbounded::<u8>();
        let (a_tx, _a_rx) = Channel::unbounded::<u8>();
        let (b_tx, _b_rx) = Channel::unbounded::<u8>();

        let mut det = Detector::new(
            [1],
            |s: &u8, _x: Tokens<u8>| *s,
            |s: &u8| vec![vec![*s]],
            0u8,
            vec![in_rx],
            vec![a_tx, b_tx],
        )
        .unwrap();
        in_tx.put(1, &cancel).unwrap();

        assert_eq!(
            det.fire(&cancel),
            Err(UnitError::Firing(FiringError::OutputCountMismatch {
                expected: 2,
                got: 1
            }))
        );
    }

    #[test]
    fn construction_checks_input_arity() {
        let err = Detector::<u8, u8, u8>::new(
            [1, 1],
            |s: &u8, _x: Tokens<u8>| *s,
            |_s: &u8| vec![],
            0,
            vec![],
            vec![],
        )
        .err()
        .unwrap();
        assert_eq!(
            err.error,
            FiringError::ArityMismatch {
                side: Side::Input,
                rates: 2,
                channels: 0
            }
        );
    }
}
