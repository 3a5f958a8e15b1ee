pub use crate::config::{ChannelConfig, NetworkConfig, UnitConfig};
pub use crate::error::{RecvError, SendError, SendFailReason, TryRecvError};
pub use crate::io::{BaseRx, BaseTx, Channel, ChannelRx, ChannelTx};
pub use crate::moc::{
    Actor, Broadcast, ConstructError, Detector, Firing, FiringError, FiringFn, Fork, Kernel, Port, RateVector,
    Scenario, Side, Tokens, Unit, UnitError, UnitExit, UnitKind, UnitResult,
};
pub use crate::network::{Network, UnitFailure, UnitHandle, UnitId, UnitReport};
pub use crate::utils::CancelToken;
pub use crate::utils::logger::LoggerConfig;
