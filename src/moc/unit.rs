use crate::moc::errors::{Port, UnitError, UnitResult};
use crate::utils::{CancelToken, FiringGauge};
use std::fmt;

/// Kind of a concurrent unit, for logs and reports.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UnitKind {
    Actor,
    Kernel,
    Detector,
    Broadcast,
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitKind::Actor => write!(f, "actor"),
            UnitKind::Kernel => write!(f, "kernel"),
            UnitKind::Detector => write!(f, "detector"),
            UnitKind::Broadcast => write!(f, "broadcast"),
        }
    }
}

/// A concurrent unit of a process network.
///
/// `fire` runs exactly one read/compute/write cycle, blocking on its input
/// channels as long as needed. The surrounding loop, firing bound and
/// thread belong to the network.
pub trait Unit: Send + 'static {
    fn name(&self) -> &str;

    fn kind(&self) -> UnitKind;

    fn fire(&mut self, cancel: &CancelToken) -> UnitResult<()>;
}

/// How a unit left its loop without a fault.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UnitExit {
    /// The configured number of firings completed.
    BoundReached,
    Cancelled,
    /// A peer channel went away.
    Disconnected(Port),
}

impl fmt::Display for UnitExit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitExit::BoundReached => write!(f, "firing bound reached"),
            UnitExit::Cancelled => write!(f, "cancelled"),
            UnitExit::Disconnected(port) => write!(f, "{port} disconnected"),
        }
    }
}

/// Cycle counter against a firing bound. A bound of 0 never runs out.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct FiringCounter {
    count: u64,
    max: u64,
}

impl FiringCounter {
    pub fn new(max: u64) -> Self {
        Self { count: 0, max }
    }

    /// Claims the next cycle; false once `max` cycles have been claimed.
    #[inline]
    pub fn try_advance(&mut self) -> bool {
        if self.max != 0 && self.count >= self.max {
            return false;
        }
        self.count += 1;
        true
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    #[inline]
    pub fn is_unbounded(&self) -> bool {
        self.max == 0
    }
}

/// Fires `unit` until its bound is reached, its token is cancelled, a peer
/// channel disconnects or a firing fails.
pub fn run_unit<U: Unit + ?Sized>(
    unit: &mut U,
    max_firings: u64,
    cancel: &CancelToken,
    gauge: &FiringGauge,
) -> UnitResult<UnitExit> {
    let mut counter = FiringCounter::new(max_firings);

    loop {
        if cancel.is_cancelled() {
            return Ok(UnitExit::Cancelled);
        }
        if !counter.try_advance() {
            return Ok(UnitExit::BoundReached);
        }

        match unit.fire(cancel) {
            Ok(()) => {
                let n = gauge.record();
                tracing::trace!("[{}] firing #{} done", unit.name(), n);
            }
            Err(UnitError::Cancelled) => return Ok(UnitExit::Cancelled),
            Err(UnitError::Disconnected(port)) => return Ok(UnitExit::Disconnected(port)),
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moc::errors::FiringError;

    #[test]
    fn bounded_counter_allows_exactly_max_cycles() {
        let mut c = FiringCounter::new(3);
        assert!(c.try_advance());
        assert!(c.try_advance());
        assert!(c.try_advance());
        assert!(!c.try_advance());
        assert_eq!(c.count(), 3);
    }

    #[test]
    fn zero_bound_runs_forever() {
        let mut c = FiringCounter::new(0);
        assert!(c.is_unbounded());
        for _ in 0..10_000 {
            assert!(c.try_advance());
        }
    }

    struct Scripted {
        left: Vec<UnitResult<()>>,
    }

    impl Unit for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn kind(&self) -> UnitKind {
            UnitKind::Actor
        }

        fn fire(&mut self, _cancel: &CancelToken) -> UnitResult<()> {
            self.left.pop().unwrap_or(Ok(()))
        }
    }

    #[test]
    fn loop_stops_at_bound() {
        let gauge = FiringGauge::default();
        let mut unit = Scripted { left: vec![] };
        let exit = run_unit(&mut unit, 5, &CancelToken::new_root(), &gauge);
        assert_eq!(exit, Ok(UnitExit::BoundReached));
        assert_eq!(gauge.get(), 5);
    }

    #[test]
    fn loop_maps_disconnect_to_clean_exit() {
        let gauge = FiringGauge::default();
        let mut unit = Scripted {
            left: vec![Err(UnitError::Disconnected(Port::Input(0))), Ok(())],
        };
        let exit = run_unit(&mut unit, 0, &CancelToken::new_root(), &gauge);
        assert_eq!(exit, Ok(UnitExit::Disconnected(Port::Input(0))));
        assert_eq!(gauge.get(), 1);
    }

    #[test]
    fn loop_surfaces_firing_errors() {
        let gauge = FiringGauge::default();
        let err = UnitError::Firing(FiringError::OutputCountMismatch {
            expected: 1,
            got: 0,
        });
        let mut unit = Scripted {
            left: vec![Err(err.clone())],
        };
        assert_eq!(
            run_unit(&mut unit, 0, &CancelToken::new_root(), &gauge),
            Err(err)
        );
        assert_eq!(gauge.get(), 0);
    }

    #[test]
    fn cancelled_token_prevents_any_firing() {
        let gauge = FiringGauge::default();
        let cancel = CancelToken::new_root();
        cancel.cancel();
        let mut unit = Scripted { left: vec![] };
        assert_eq!(run_unit(&mut unit, 0, &cancel, &gauge), Ok(UnitExit::Cancelled));
        assert_eq!(gauge.get(), 0);
    }
}
