pub mod handle;
pub mod report;
pub mod spawner;

pub use handle::{UnitHandle, UnitId};
pub use report::{UnitFailure, UnitReport};
pub use spawner::spawn_unit;

use crate::config::{NetworkConfig, UnitConfig};
use crate::error::RecvError;
use crate::io::base::BaseRx;
use crate::io::channel::{Channel, ChannelRx, ChannelTx};
use crate::moc::Unit;
use crate::utils::CancelToken;
use signal_hook::consts::TERM_SIGNALS;
use signal_hook::{flag, low_level};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Supervisor owning every unit of a process network.
///
/// Units run independently; the network never restarts or reroutes around
/// a failed unit. What it adds is visibility: each unit reports how it
/// ended, and the first fault is kept together with the unit that raised
/// it. Dropping the network cancels every unit.
pub struct Network {
    cfg: NetworkConfig,
    root: CancelToken,
    units: Vec<UnitHandle>,
    report_tx: ChannelTx<UnitReport>,
    report_rx: ChannelRx<UnitReport>,
    reports: Vec<UnitReport>,
    first_failure: Option<UnitFailure>,
}

impl Default for Network {
    fn default() -> Self {
        Self::new(NetworkConfig::default())
    }
}

impl Network {
    pub fn new(cfg: NetworkConfig) -> Self {
        let (report_tx, report_rx) = Channel::unbounded();
        Self {
            cfg,
            root: CancelToken::new_root(),
            units: Vec::new(),
            report_tx,
            report_rx,
            reports: Vec::new(),
            first_failure: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &NetworkConfig {
        &self.cfg
    }

    /// A channel with the network's buffering policy.
    pub fn channel<T: Send + 'static>(&self) -> (ChannelTx<T>, ChannelRx<T>) {
        Channel::from_config(&self.cfg.channel)
    }

    /// Token for boundary code feeding or draining the network; tripped by
    /// [`stop`](Self::stop).
    pub fn token(&self) -> CancelToken {
        self.root.new_child()
    }

    /// Starts a unit with the network defaults.
    pub fn spawn<U: Unit>(&mut self, unit: U) -> anyhow::Result<UnitId> {
        self.spawn_with(unit, UnitConfig::default())
    }

    pub fn spawn_with<U: Unit>(&mut self, unit: U, cfg: UnitConfig) -> anyhow::Result<UnitId> {
        let handle = spawn_unit(
            unit,
            &cfg,
            self.cfg.default_max_firings,
            self.root.new_child(),
            self.report_tx.clone(),
        )?;
        let id = handle.id();
        tracing::debug!("[Network] spawned {} {} ({})", handle.kind(), handle.name(), id);
        self.units.push(handle);
        Ok(id)
    }

    pub fn unit(&self, id: UnitId) -> Option<&UnitHandle> {
        self.units.iter().find(|u| u.id() == id)
    }

    pub fn units(&self) -> &[UnitHandle] {
        &self.units
    }

    pub fn is_running(&self, id: UnitId) -> bool {
        self.unit(id).is_some_and(|u| u.is_running())
    }

    pub fn firings(&self, id: UnitId) -> Option<u64> {
        self.unit(id).map(|u| u.firings())
    }

    pub fn running_units(&self) -> usize {
        self.units.iter().filter(|u| u.is_running()).count()
    }

    /// Asks one unit to stop. Its peers keep running.
    pub fn stop_unit(&self, id: UnitId) -> bool {
        match self.unit(id) {
            Some(u) => {
                u.cancel();
                true
            }
            None => false,
        }
    }

    /// Moves reports that arrived since the last call into the log.
    /// Returns how many were new.
    pub fn poll_reports(&mut self) -> usize {
        let mut n = 0;
        for report in self.report_rx.drain(usize::MAX) {
            self.record(report);
            n += 1;
        }
        n
    }

    /// Every report received so far, in arrival order.
    pub fn reports(&self) -> &[UnitReport] {
        &self.reports
    }

    pub fn first_failure(&mut self) -> Option<&UnitFailure> {
        self.poll_reports();
        self.first_failure.as_ref()
    }

    /// Waits up to `timeout` for any unit to fail. Returns `None` early
    /// once every unit has reported without a fault.
    pub fn wait_failure(&mut self, timeout: Duration) -> Option<UnitFailure> {
        let deadline = Instant::now() + timeout;
        loop {
            self.poll_reports();
            if let Some(f) = &self.first_failure {
                return Some(f.clone());
            }
            if self.all_reported() {
                return None;
            }
            match self.next_report(deadline) {
                Ok(report) => self.record(report),
                Err(_) => return None,
            }
        }
    }

    /// Waits up to `timeout` for the report of one unit.
    pub fn wait_unit(&mut self, id: UnitId, timeout: Duration) -> Option<UnitReport> {
        let deadline = Instant::now() + timeout;
        loop {
            self.poll_reports();
            if let Some(r) = self.reports.iter().find(|r| r.id == id) {
                return Some(r.clone());
            }
            match self.next_report(deadline) {
                Ok(report) => self.record(report),
                Err(_) => return None,
            }
        }
    }

    /// Waits for every unit to leave its loop on its own, with no timeout.
    pub fn join(&mut self) -> &[UnitReport] {
        for unit in self.units.iter_mut() {
            unit.join();
        }
        self.poll_reports();
        &self.reports
    }

    /// Cancels every unit and waits up to the configured stop timeout for
    /// their threads. Units still blocked past the deadline are left
    /// detached and logged.
    pub fn stop(&mut self) -> &[UnitReport] {
        self.root.cancel();

        let timeout = self.cfg.stop_timeout();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline && !self.units.iter().all(|u| u.is_finished()) {
            thread::sleep(Duration::from_millis(1));
        }

        for unit in self.units.iter_mut() {
            if unit.is_finished() {
                unit.join();
            } else {
                tracing::warn!(
                    "[Network] {} {} did not stop within {:?}",
                    unit.kind(),
                    unit.name(),
                    timeout
                );
            }
        }

        self.poll_reports();
        &self.reports
    }

    /// Blocks until every unit has exited or a termination signal arrives,
    /// then stops the network.
    pub fn run_until_signal(&mut self) -> anyhow::Result<&[UnitReport]> {
        let term_flag = Arc::new(AtomicBool::new(false));
        let mut sig_ids = Vec::with_capacity(TERM_SIGNALS.len());
        for sig in TERM_SIGNALS {
            match flag::register(*sig, term_flag.clone()) {
                Ok(id) => sig_ids.push(id),
                Err(err) => {
                    for id in sig_ids {
                        low_level::unregister(id);
                    }
                    return Err(err.into());
                }
            }
        }

        loop {
            if term_flag.load(Ordering::Relaxed) {
                tracing::warn!("[Network] termination signal received");
                break;
            }
            if self.units.iter().all(|u| u.is_finished()) {
                break;
            }
            self.poll_reports();
            if !self.root.sleep_cancellable(Duration::from_millis(10)) {
                break;
            }
        }

        // Handlers belong to this call only.
        for id in sig_ids {
            low_level::unregister(id);
        }
        Ok(self.stop())
    }

    /// Each unit sends exactly one report, so a full log means nothing is
    /// left to wait for.
    fn all_reported(&self) -> bool {
        self.reports.len() >= self.units.len()
    }

    fn next_report(&mut self, deadline: Instant) -> Result<UnitReport, RecvError> {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(RecvError::Timeout);
        }
        self.report_rx.get_timeout(left)
    }

    fn record(&mut self, report: UnitReport) {
        if self.first_failure.is_none()
            && let Some(failure) = report.failure()
        {
            tracing::error!("[Network] first failure: {}", failure);
            self.first_failure = Some(failure);
        }
        self.reports.push(report);
    }
}

impl Drop for Network {
    fn drop(&mut self) {
        self.root.cancel();
    }
}
