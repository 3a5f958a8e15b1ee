use crate::io::base::{BaseRx, BaseTx};
use crate::io::channel::{ChannelRx, ChannelTx};
use crate::moc::errors::{Port, UnitError, UnitResult};
use crate::moc::unit::{Unit, UnitKind};
use crate::utils::CancelToken;

/// Channel junction: copies every token of one input, in arrival order, to
/// each of its outputs.
///
/// Each output is its own channel with its own backlog, so downstream
/// readers may consume at different paces without losing tokens.
pub struct Broadcast<T> {
    name: String,
    input: ChannelRx<T>,
    outputs: Vec<ChannelTx<T>>,
}

/// The dataflow literature's name for the same junction.
pub type Fork<T> = Broadcast<T>;

impl<T: Clone + Send + 'static> Broadcast<T> {
    pub fn new(input: ChannelRx<T>, outputs: Vec<ChannelTx<T>>) -> Self {
        Self {
            name: "broadcast".to_string(),
            input,
            outputs,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<T: Clone + Send + 'static> Unit for Broadcast<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> UnitKind {
        UnitKind::Broadcast
    }

    fn fire(&mut self, cancel: &CancelToken) -> UnitResult<()> {
        let token = self
            .input
            .get(cancel)
            .map_err(|e| UnitError::from_recv(e, Port::Input(0)))?;

        let Some((last, rest)) = self.outputs.split_last_mut() else {
            return Ok(());
        };
        for (i, tx) in rest.iter_mut().enumerate() {
            tx.put(token.clone(), cancel)
                .map_err(|e| UnitError::from_send(e.into_reason(), Port::Output(i)))?;
        }
        last.put(token, cancel)
            .map_err(|e| UnitError::from_send(e.into_reason(), Port::Output(rest.len())))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::channel::Channel;

    #[test]
    fn every_output_sees_the_whole_stream() {
        let cancel = CancelToken::new_root();
        let (mut in_tx, in_rx) = Channel::unbounded::<char>();
        let (a_tx, mut a_rx) = Channel::unbounded::<char>();
        let (b_tx, mut b_rx) = Channel::unbounded::<char>();

        let mut fork = Fork::new(in_rx, vec![a_tx, b_tx]);
        in_tx.put_all(['a', 'b', 'c'], &cancel).unwrap();
        for _ in 0..3 {
            fork.fire(&cancel).unwrap();
        }

        assert_eq!(b_rx.drain(10), vec!['a', 'b', 'c']);
        assert_eq!(a_rx.drain(10), vec!['a', 'b', 'c']);
    }

    #[test]
    fn no_outputs_discards_tokens() {
        let cancel = CancelToken::new_root();
        let (mut in_tx, in_rx) = Channel::unbounded::<u8>();
        let mut sink = Broadcast::new(in_rx, vec![]);
        in_tx.put(1, &cancel).unwrap();

        sink.fire(&cancel).unwrap();
        assert_eq!(in_tx.backlog(), 0);
    }

    #[test]
    fn dropped_reader_is_reported_by_port() {
        let cancel = CancelToken::new_root();
        let (mut in_tx, in_rx) = Channel::unbounded::<u8>();
        let (a_tx, _a_rx) = Channel::unbounded::<u8>();
        let (b_tx, b_rx) = Channel::unbounded::<u8>();
        drop(b_rx);

        let mut fork = Broadcast::new(in_rx, vec![a_tx, b_tx]);
        in_tx.put(1, &cancel).unwrap();
        assert_eq!(
            fork.fire(&cancel),
            Err(UnitError::Disconnected(Port::Output(1)))
        );
    }
}
