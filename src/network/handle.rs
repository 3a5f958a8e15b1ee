use crate::moc::UnitKind;
use crate::utils::{CancelToken, FiringGauge, HealthFlag};
use std::fmt::{self, Display};
use std::thread::JoinHandle;
use uuid::Uuid;
use uuid::fmt::Simple;

/// Unique identifier of a spawned unit.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct UnitId {
    raw: Simple,
}

impl Default for UnitId {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitId {
    pub fn new() -> Self {
        Self {
            raw: Uuid::new_v4().simple(),
        }
    }

    #[inline]
    pub fn raw(&self) -> Simple {
        self.raw
    }
}

impl Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Handle to a running unit thread.
pub struct UnitHandle {
    id: UnitId,
    name: String,
    kind: UnitKind,
    join: Option<JoinHandle<()>>,
    cancel: CancelToken,
    health: HealthFlag,
    firings: FiringGauge,
}

impl UnitHandle {
    pub(crate) fn new(
        id: UnitId,
        name: String,
        kind: UnitKind,
        join: JoinHandle<()>,
        cancel: CancelToken,
        health: HealthFlag,
        firings: FiringGauge,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            join: Some(join),
            cancel,
            health,
            firings,
        }
    }

    #[inline]
    pub fn id(&self) -> UnitId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    /// True from spawn until the unit leaves its firing loop.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.health.get()
    }

    /// True once the thread has returned.
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(|j| j.is_finished())
    }

    #[inline]
    pub fn firings(&self) -> u64 {
        self.firings.get()
    }

    #[inline]
    pub fn token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Cooperative stop: the unit exits at its next cycle or blocked read.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Waits for the thread. Returns false if it had already been joined or
    /// panicked outside the unit loop.
    pub fn join(&mut self) -> bool {
        match self.join.take() {
            Some(j) => j.join().is_ok(),
            None => false,
        }
    }
}

impl fmt::Debug for UnitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("running", &self.is_running())
            .field("firings", &self.firings())
            .finish()
    }
}
