use crate::config::UnitConfig;
use crate::io::base::BaseTx;
use crate::io::channel::ChannelTx;
use crate::moc::{Unit, UnitError, UnitExit, run_unit};
use crate::network::handle::{UnitHandle, UnitId};
use crate::network::report::UnitReport;
use crate::utils::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

/// Starts `unit` on its own named OS thread.
///
/// The thread runs the firing loop until the bound, a stop request, a
/// disconnected peer or a fault, then lowers the health flag and sends
/// exactly one [`UnitReport`] on `reports`. Panics in user functions are
/// caught and reported as [`UnitError::Panicked`].
pub fn spawn_unit<U: Unit>(
    mut unit: U,
    cfg: &UnitConfig,
    default_max_firings: u64,
    cancel: CancelToken,
    mut reports: ChannelTx<UnitReport>,
) -> anyhow::Result<UnitHandle> {
    let id = UnitId::new();
    let kind = unit.kind();
    let name = cfg.name.clone().unwrap_or_else(|| unit.name().to_string());
    let max_firings = cfg.max_firings.unwrap_or(default_max_firings);
    let core_id = cfg.core_id;

    let health = HealthFlag::new(true);
    let gauge = FiringGauge::default();

    let join = thread::Builder::new()
        .name(thread_name(&name, id))
        .spawn({
            let name = name.clone();
            let cancel = cancel.clone();
            let health = health.clone();
            let gauge = gauge.clone();

            move || {
                let _span = tracing::info_span!("unit", %name, %kind).entered();

                if let Some(core_id) = core_id {
                    match try_pin_core(core_id) {
                        Ok(core_id) => tracing::info!("[{}] pinned to core {}", name, core_id),
                        Err(err) => tracing::error!(
                            "[{}] cannot pin core: {} ({} available)",
                            name,
                            err,
                            available_cores()
                        ),
                    }
                }

                tracing::info!(
                    "[{}] {} started (max firings: {})",
                    name,
                    kind,
                    if max_firings == 0 {
                        "unbounded".to_string()
                    } else {
                        max_firings.to_string()
                    }
                );

                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    run_unit(&mut unit, max_firings, &cancel, &gauge)
                }))
                .unwrap_or_else(|payload| Err(UnitError::Panicked(panic_message(payload))));

                let firings = gauge.get();
                match &outcome {
                    Ok(UnitExit::Disconnected(port)) => {
                        tracing::info!("[{}] stopped after {} firings: {} closed", name, firings, port)
                    }
                    Ok(exit) => tracing::info!("[{}] stopped after {} firings: {}", name, firings, exit),
                    Err(err) => tracing::error!("[{}] failed after {} firings: {}", name, firings, err),
                }

                // Close the unit's channels before anyone learns it ended.
                drop(unit);
                health.down();

                let report = UnitReport {
                    id,
                    name,
                    kind,
                    firings,
                    outcome,
                };
                // Unbounded, so this never waits; a dropped network is not an error.
                if reports.put(report, &CancelToken::new_root()).is_err() {
                    tracing::debug!("unit report dropped: supervisor is gone");
                }
            }
        })?;

    Ok(UnitHandle::new(id, name, kind, join, cancel, health, gauge))
}

/// OS thread names cannot carry NUL bytes.
fn thread_name(name: &str, id: UnitId) -> String {
    format!("{}-{}", name.replace('\0', ""), id)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
