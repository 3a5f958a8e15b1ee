use crate::io::base::{BaseRx, BaseTx};
use crate::moc::errors::{FiringError, Port, UnitError, UnitResult};
use crate::moc::scenario::Tokens;
use crate::utils::CancelToken;

/// Reads exactly `rates[i]` tokens from `inputs[i]` for every i.
///
/// Channels are drained one after the other in channel order; per-channel
/// arrival order is preserved. Blocks as long as a channel is short of
/// tokens. Fails with `RateMismatch` before touching any channel when the
/// lengths disagree.
pub fn read_inputs<R: BaseRx>(
    rates: &[usize],
    inputs: &mut [R],
    cancel: &CancelToken,
) -> UnitResult<Tokens<R::Token>> {
    if rates.len() != inputs.len() {
        return Err(FiringError::RateMismatch {
            rates: rates.len(),
            channels: inputs.len(),
        }
        .into());
    }

    let mut tokens = Vec::with_capacity(inputs.len());
    for (i, (&rate, rx)) in rates.iter().zip(inputs.iter_mut()).enumerate() {
        let mut group = Vec::with_capacity(rate);
        for _ in 0..rate {
            let token = rx
                .get(cancel)
                .map_err(|e| UnitError::from_recv(e, Port::Input(i)))?;
            group.push(token);
        }
        tokens.push(group);
    }
    Ok(tokens)
}

/// Checks a firing result against the production rates: one group per
/// output, `production[i]` tokens in group i.
pub fn check_production<T>(production: &[usize], outputs: &Tokens<T>) -> Result<(), FiringError> {
    if outputs.len() != production.len() {
        return Err(FiringError::OutputCountMismatch {
            expected: production.len(),
            got: outputs.len(),
        });
    }
    for (output, (group, &expected)) in outputs.iter().zip(production).enumerate() {
        if group.len() != expected {
            return Err(FiringError::ProductionCountMismatch {
                output,
                expected,
                got: group.len(),
            });
        }
    }
    Ok(())
}

/// Writes group i to `channels[i]`, in list order. Returns the number of
/// tokens written.
///
/// Fails with `OutputCountMismatch` before writing anything when the group
/// count differs from the channel count.
pub fn write_outputs<W: BaseTx>(
    outputs: Tokens<W::Token>,
    channels: &mut [W],
    cancel: &CancelToken,
) -> UnitResult<usize> {
    if outputs.len() != channels.len() {
        return Err(FiringError::OutputCountMismatch {
            expected: channels.len(),
            got: outputs.len(),
        }
        .into());
    }

    let mut written = 0;
    for (i, (group, tx)) in outputs.into_iter().zip(channels.iter_mut()).enumerate() {
        for token in group {
            tx.put(token, cancel)
                .map_err(|e| UnitError::from_send(e.into_reason(), Port::Output(i)))?;
            written += 1;
        }
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::channel::{Channel, ChannelRx, ChannelTx};

    fn channels(n: usize) -> (Vec<ChannelTx<u32>>, Vec<ChannelRx<u32>>) {
        (0..n).map(|_| Channel::unbounded::<u32>()).unzip()
    }

    #[test]
    fn reads_exact_rates_in_arrival_order() {
        let cancel = CancelToken::new_root();
        let (mut txs, mut rxs) = channels(3);
        txs[0].put_all([1, 2, 3, 4], &cancel).unwrap();
        txs[1].put_all([10], &cancel).unwrap();
        txs[2].put_all([20, 21], &cancel).unwrap();

        let got = read_inputs(&[3, 0, 2], &mut rxs, &cancel).unwrap();
        assert_eq!(got, vec![vec![1, 2, 3], vec![], vec![20, 21]]);

        // Leftovers stay queued for the next firing.
        let next = read_inputs(&[1, 1, 0], &mut rxs, &cancel).unwrap();
        assert_eq!(next, vec![vec![4], vec![10], vec![]]);
    }

    #[test]
    fn rate_length_must_match_channel_count() {
        let cancel = CancelToken::new_root();
        let (mut txs, mut rxs) = channels(2);
        txs[0].put(1, &cancel).unwrap();

        let err = read_inputs(&[1], &mut rxs, &cancel).unwrap_err();
        assert_eq!(
            err,
            UnitError::Firing(FiringError::RateMismatch {
                rates: 1,
                channels: 2
            })
        );
        // Nothing was consumed.
        assert_eq!(rxs[0].backlog(), 1);
    }

    #[test]
    fn disconnected_input_names_the_port() {
        let cancel = CancelToken::new_root();
        let (mut txs, mut rxs) = channels(2);
        txs[0].put(1, &cancel).unwrap();
        txs.truncate(0);

        let err = read_inputs(&[1, 1], &mut rxs, &cancel).unwrap_err();
        assert_eq!(err, UnitError::Disconnected(Port::Input(1)));
    }

    #[test]
    fn production_is_checked_per_output() {
        assert!(check_production(&[2, 0], &vec![vec![1, 2], vec![]]).is_ok());
        assert_eq!(
            check_production(&[2], &vec![vec![1, 2], vec![3]]),
            Err(FiringError::OutputCountMismatch {
                expected: 1,
                got: 2
            })
        );
        assert_eq!(
            check_production(&[2, 1], &vec![vec![1, 2], vec![]]),
            Err(FiringError::ProductionCountMismatch {
                output: 1,
                expected: 1,
                got: 0
            })
        );
    }

    #[test]
    fn writes_groups_to_matching_channels() {
        let cancel = CancelToken::new_root();
        let (mut txs, mut rxs) = channels(2);

        let n = write_outputs(vec![vec![5, 6], vec![7]], &mut txs, &cancel).unwrap();
        assert_eq!(n, 3);
        assert_eq!(rxs[0].drain(10), vec![5, 6]);
        assert_eq!(rxs[1].drain(10), vec![7]);

        let err = write_outputs(vec![vec![1]], &mut txs, &cancel).unwrap_err();
        assert_eq!(
            err,
            UnitError::Firing(FiringError::OutputCountMismatch {
                expected: 2,
                got: 1
            })
        );
        assert_eq!(rxs[0].backlog(), 0);
    }
}
