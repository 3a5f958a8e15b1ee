pub mod base;
pub mod channel;

pub use base::{BaseRx, BaseTx};
pub use channel::{Channel, ChannelRx, ChannelTx};
