use crate::error::{RecvError, SendError, TryRecvError};
use crate::utils::CancelToken;
use std::time::Duration;

/// Producer half of a token channel.
pub trait BaseTx: Send + 'static {
    /// Token type carried by this channel.
    type Token: Send + 'static;

    /// Non-blocking put. Fails with `Full` on a saturated bounded channel
    /// or `Closed` once every receiver is gone.
    fn try_put(&mut self, token: Self::Token) -> Result<(), SendError<Self::Token>>;

    /// Appends a token to the tail.
    ///
    /// Never waits on an unbounded channel. On a bounded channel it waits for
    /// a free slot until `cancel` trips.
    fn put(
        &mut self,
        token: Self::Token,
        cancel: &CancelToken,
    ) -> Result<(), SendError<Self::Token>>;

    /// Puts every token of `tokens` in iteration order.
    fn put_all<I>(&mut self, tokens: I, cancel: &CancelToken) -> Result<(), SendError<Self::Token>>
    where
        I: IntoIterator<Item = Self::Token>,
        Self: Sized,
    {
        for token in tokens {
            self.put(token, cancel)?;
        }
        Ok(())
    }
}

/// Consumer half of a token channel.
pub trait BaseRx: Send + 'static {
    /// Token type carried by this channel.
    type Token: Send + 'static;

    /// Non-blocking get.
    fn try_get(&mut self) -> Result<Self::Token, TryRecvError>;

    /// Removes and returns the head, waiting as long as it takes.
    ///
    /// The only ways out without a token are `cancel` tripping or the channel
    /// losing every sender with an empty backlog.
    fn get(&mut self, cancel: &CancelToken) -> Result<Self::Token, RecvError>;

    /// Like [`get`](Self::get) but gives up after `timeout`.
    /// Meant for driver code collecting network outputs.
    fn get_timeout(&mut self, timeout: Duration) -> Result<Self::Token, RecvError>;

    /// Drain up to `max` tokens that are already queued.
    fn drain(&mut self, max: usize) -> Vec<Self::Token> {
        let mut out = Vec::new();

        for _ in 0..max {
            match self.try_get() {
                Ok(t) => out.push(t),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        out
    }

    /// Collect exactly `n` tokens, each within `per_token`.
    /// Returns what was collected so far on the first timeout.
    fn collect(&mut self, n: usize, per_token: Duration) -> Result<Vec<Self::Token>, Vec<Self::Token>> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            match self.get_timeout(per_token) {
                Ok(t) => out.push(t),
                Err(_) => return Err(out),
            }
        }
        Ok(out)
    }
}
