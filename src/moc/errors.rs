use crate::error::{RecvError, SendFailReason};
use crate::io::channel::{ChannelRx, ChannelTx};
use std::error::Error;
use std::fmt;

pub type UnitResult<T> = Result<T, UnitError>;

/// Which side of a unit a rate vector or channel list belongs to.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Side {
    Input,
    Output,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Input => write!(f, "input"),
            Side::Output => write!(f, "output"),
        }
    }
}

/// A channel position on a unit.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Port {
    Input(usize),
    Output(usize),
    Control,
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Port::Input(i) => write!(f, "input #{i}"),
            Port::Output(i) => write!(f, "output #{i}"),
            Port::Control => write!(f, "control"),
        }
    }
}

/// Contract violations between rate vectors, channel lists and what a
/// firing or decoding function returned.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum FiringError {
    /// Declared channel count disagrees with a rate vector's length.
    ArityMismatch {
        side: Side,
        rates: usize,
        channels: usize,
    },
    /// Consumption vector length disagrees with the input channels at read time.
    RateMismatch { rates: usize, channels: usize },
    /// Function returned a different number of output groups.
    OutputCountMismatch { expected: usize, got: usize },
    /// One output group does not hold the declared number of tokens.
    ProductionCountMismatch {
        output: usize,
        expected: usize,
        got: usize,
    },
}

impl fmt::Display for FiringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArityMismatch {
                side,
                rates,
                channels,
            } => write!(
                f,
                "arity mismatch: {rates} {side} rates for {channels} {side} channels"
            ),
            Self::RateMismatch { rates, channels } => write!(
                f,
                "rate mismatch: {rates} consumption rates for {channels} input channels"
            ),
            Self::OutputCountMismatch { expected, got } => write!(
                f,
                "function returned {got} output groups, expected {expected}"
            ),
            Self::ProductionCountMismatch {
                output,
                expected,
                got,
            } => write!(
                f,
                "output #{output} carries {got} tokens, expected {expected}"
            ),
        }
    }
}

impl Error for FiringError {}

/// Rejected unit construction. Carries the channels back untouched, so the
/// caller keeps their backlog and their peers stay connected.
pub struct ConstructError<I, O> {
    pub error: FiringError,
    pub inputs: Vec<ChannelRx<I>>,
    pub outputs: Vec<ChannelTx<O>>,
}

impl<I, O> ConstructError<I, O> {
    pub(crate) fn new(error: FiringError, inputs: Vec<ChannelRx<I>>, outputs: Vec<ChannelTx<O>>) -> Self {
        Self {
            error,
            inputs,
            outputs,
        }
    }

    pub fn into_parts(self) -> (FiringError, Vec<ChannelRx<I>>, Vec<ChannelTx<O>>) {
        (self.error, self.inputs, self.outputs)
    }
}

impl<I, O> fmt::Debug for ConstructError<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructError")
            .field("error", &self.error)
            .field("inputs", &self.inputs.len())
            .field("outputs", &self.outputs.len())
            .finish()
    }
}

impl<I, O> fmt::Display for ConstructError<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit rejected: {}", self.error)
    }
}

impl<I, O> Error for ConstructError<I, O> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

impl<I, O> From<ConstructError<I, O>> for FiringError {
    fn from(e: ConstructError<I, O>) -> Self {
        e.error
    }
}

/// Why a unit left its firing loop.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum UnitError {
    Firing(FiringError),
    /// Stop requested through the unit's cancel token.
    Cancelled,
    /// A channel lost its peer: no senders left on an input, or no
    /// receivers left on an output.
    Disconnected(Port),
    /// User code panicked inside the unit thread.
    Panicked(String),
}

impl UnitError {
    pub(crate) fn from_recv(err: RecvError, port: Port) -> Self {
        match err {
            RecvError::Disconnected => UnitError::Disconnected(port),
            // Units never read with a timeout.
            RecvError::Cancelled | RecvError::Timeout => UnitError::Cancelled,
        }
    }

    pub(crate) fn from_send(reason: SendFailReason, port: Port) -> Self {
        match reason {
            SendFailReason::Closed => UnitError::Disconnected(port),
            // Units put with a blocking call, so `Full` only surfaces on stop.
            SendFailReason::Cancelled | SendFailReason::Full => UnitError::Cancelled,
        }
    }
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Firing(e) => write!(f, "firing failed: {e}"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Disconnected(port) => write!(f, "{port} disconnected"),
            Self::Panicked(msg) => write!(f, "unit panicked: {msg}"),
        }
    }
}

impl Error for UnitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            UnitError::Firing(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FiringError> for UnitError {
    fn from(err: FiringError) -> Self {
        UnitError::Firing(err)
    }
}
