use crate::config::ChannelConfig;
use crate::error::{RecvError, SendError, TryRecvError};
use crate::io::base::{BaseRx, BaseTx};
use crate::utils::CancelToken;
use crate::warn_throttled;
use crossbeam::channel as cbchan;
use crossbeam::utils::Backoff;
use std::time::{Duration, Instant};

/// Factory for point-to-point, order-preserving token channels.
///
/// Unbounded by default, so `put` never waits and a slow consumer only grows
/// the backlog. Bounded channels are an explicit opt-in to exercise
/// backpressure.
pub struct Channel;

impl Channel {
    #[inline]
    pub fn unbounded<T: Send + 'static>() -> (ChannelTx<T>, ChannelRx<T>) {
        Self::from_config(&ChannelConfig::default())
    }

    #[inline]
    pub fn bounded<T: Send + 'static>(capacity: usize) -> (ChannelTx<T>, ChannelRx<T>) {
        Self::from_config(&ChannelConfig {
            capacity: Some(capacity),
            ..ChannelConfig::default()
        })
    }

    pub fn from_config<T: Send + 'static>(cfg: &ChannelConfig) -> (ChannelTx<T>, ChannelRx<T>) {
        let (tx, rx) = match cfg.capacity {
            Some(cap) => cbchan::bounded::<T>(cap),
            None => cbchan::unbounded::<T>(),
        };
        let poll = cfg.poll_interval();
        (ChannelTx { tx, poll }, ChannelRx { rx, poll })
    }
}

pub struct ChannelTx<T> {
    tx: cbchan::Sender<T>,
    poll: Duration,
}

impl<T> Clone for ChannelTx<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            poll: self.poll,
        }
    }
}

impl<T> ChannelTx<T> {
    /// Number of tokens currently queued.
    #[inline]
    pub fn backlog(&self) -> usize {
        self.tx.len()
    }
}

impl<T: Send + 'static> BaseTx for ChannelTx<T> {
    type Token = T;

    #[inline]
    fn try_put(&mut self, token: T) -> Result<(), SendError<T>> {
        match self.tx.try_send(token) {
            Ok(()) => Ok(()),
            Err(cbchan::TrySendError::Full(v)) => Err(SendError::full(Some(v))),
            Err(cbchan::TrySendError::Disconnected(v)) => Err(SendError::closed(Some(v))),
        }
    }

    fn put(&mut self, token: T, cancel: &CancelToken) -> Result<(), SendError<T>> {
        let mut token = match self.tx.try_send(token) {
            Ok(()) => return Ok(()),
            Err(cbchan::TrySendError::Full(v)) => v,
            Err(cbchan::TrySendError::Disconnected(v)) => return Err(SendError::closed(Some(v))),
        };

        // Only bounded channels get here.
        let stalled_at = Instant::now();
        loop {
            if cancel.is_cancelled() {
                return Err(SendError::cancelled(Some(token)));
            }

            match self.tx.send_timeout(token, self.poll) {
                Ok(()) => return Ok(()),
                Err(cbchan::SendTimeoutError::Timeout(v)) => {
                    token = v;
                    warn_throttled!(
                        Duration::from_secs(5),
                        "producer stalled on full channel for {:?}",
                        stalled_at.elapsed()
                    );
                }
                Err(cbchan::SendTimeoutError::Disconnected(v)) => {
                    return Err(SendError::closed(Some(v)));
                }
            }
        }
    }
}

pub struct ChannelRx<T> {
    rx: cbchan::Receiver<T>,
    poll: Duration,
}

impl<T> Clone for ChannelRx<T> {
    fn clone(&self) -> Self {
        Self {
            rx: self.rx.clone(),
            poll: self.poll,
        }
    }
}

impl<T> ChannelRx<T> {
    /// Number of tokens currently queued.
    #[inline]
    pub fn backlog(&self) -> usize {
        self.rx.len()
    }
}

impl<T: Send + 'static> BaseRx for ChannelRx<T> {
    type Token = T;

    #[inline]
    fn try_get(&mut self) -> Result<T, TryRecvError> {
        match self.rx.try_recv() {
            Ok(v) => Ok(v),
            Err(cbchan::TryRecvError::Empty) => Err(TryRecvError::Empty),
            Err(cbchan::TryRecvError::Disconnected) => Err(TryRecvError::Disconnected),
        }
    }

    fn get(&mut self, cancel: &CancelToken) -> Result<T, RecvError> {
        let backoff = Backoff::new();

        loop {
            if cancel.is_cancelled() {
                return Err(RecvError::Cancelled);
            }

            // Short spin first: in a busy network the token is usually
            // already in flight.
            if !backoff.is_completed() {
                match self.rx.try_recv() {
                    Ok(v) => return Ok(v),
                    Err(cbchan::TryRecvError::Empty) => {
                        backoff.snooze();
                        continue;
                    }
                    Err(cbchan::TryRecvError::Disconnected) => return Err(RecvError::Disconnected),
                }
            }

            match self.rx.recv_timeout(self.poll) {
                Ok(v) => return Ok(v),
                Err(cbchan::RecvTimeoutError::Timeout) => {}
                Err(cbchan::RecvTimeoutError::Disconnected) => return Err(RecvError::Disconnected),
            }
        }
    }

    fn get_timeout(&mut self, timeout: Duration) -> Result<T, RecvError> {
        match self.rx.recv_timeout(timeout) {
            Ok(v) => Ok(v),
            Err(cbchan::RecvTimeoutError::Timeout) => Err(RecvError::Timeout),
            Err(cbchan::RecvTimeoutError::Disconnected) => Err(RecvError::Disconnected),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn tokens_leave_in_arrival_order() {
        let (mut tx, mut rx) = Channel::unbounded::<u32>();
        let cancel = CancelToken::new_root();
        tx.put_all(1..=5, &cancel).unwrap();

        let got: Vec<u32> = (0..5).map(|_| rx.get(&cancel).unwrap()).collect();
        assert_eq!(got, vec![1, 2, 3, 4, 5]);
        assert_eq!(rx.try_get(), Err(TryRecvError::Empty));
    }

    #[test]
    fn get_waits_for_a_late_producer() {
        let (mut tx, mut rx) = Channel::unbounded::<&'static str>();
        let cancel = CancelToken::new_root();

        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            tx.put("late", &CancelToken::new_root()).unwrap();
        });

        assert_eq!(rx.get(&cancel).unwrap(), "late");
        producer.join().unwrap();
    }

    #[test]
    fn cancel_interrupts_a_blocked_get() {
        let (_tx, mut rx) = Channel::unbounded::<u8>();
        let cancel = CancelToken::new_root();

        let waiter = {
            let cancel = cancel.clone();
            thread::spawn(move || rx.get(&cancel))
        };
        thread::sleep(Duration::from_millis(20));
        cancel.cancel();

        assert_eq!(waiter.join().unwrap(), Err(RecvError::Cancelled));
    }

    #[test]
    fn drained_channel_without_senders_reports_disconnect() {
        let (mut tx, mut rx) = Channel::unbounded::<u8>();
        let cancel = CancelToken::new_root();
        tx.put(7, &cancel).unwrap();
        drop(tx);

        assert_eq!(rx.get(&cancel), Ok(7));
        assert_eq!(rx.get(&cancel), Err(RecvError::Disconnected));
    }

    #[test]
    fn bounded_put_waits_for_space() {
        let (mut tx, mut rx) = Channel::bounded::<u8>(1);
        let cancel = CancelToken::new_root();
        tx.put(1, &cancel).unwrap();
        assert_eq!(
            tx.try_put(2).unwrap_err().into_reason(),
            crate::error::SendFailReason::Full
        );

        let producer = thread::spawn(move || {
            tx.put(2, &CancelToken::new_root()).unwrap();
        });
        thread::sleep(Duration::from_millis(20));
        assert_eq!(rx.get(&cancel), Ok(1));
        producer.join().unwrap();
        assert_eq!(rx.get(&cancel), Ok(2));
    }

    #[test]
    fn cancel_interrupts_a_stalled_put() {
        let (mut tx, _rx) = Channel::bounded::<u8>(1);
        let cancel = CancelToken::new_root();
        tx.put(1, &cancel).unwrap();
        cancel.cancel();

        let err = tx.put(2, &cancel).unwrap_err();
        assert_eq!(err.reason, crate::error::SendFailReason::Cancelled);
        assert_eq!(err.value, Some(2));
    }
}
