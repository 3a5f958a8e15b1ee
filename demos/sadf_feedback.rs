//! Scenario-aware feedback loop.
//!
//! A kernel either accumulates an input stream or counts its own output
//! down by a fixed step. A detector watching the output switches between
//! the two once it rises past `upper` or drops below `lower`.
//!
//! ```text
//! cargo run --example sadf_feedback -- demo.json
//! SADF__OUTPUTS=60 cargo run --example sadf_feedback
//! SADF__OUTPUTS=0 cargo run --example sadf_feedback   # until Ctrl-C
//! ```

use sadfrt::prelude::*;
use sadfrt::utils::params_io::load_cfg_merge;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct FeedbackConfig {
    network: NetworkConfig,
    /// Input stream is 1..=inputs.
    inputs: i64,
    /// Tokens to collect before stopping; 0 prints until SIGINT/SIGTERM.
    outputs: usize,
    upper: i64,
    lower: i64,
    step: i64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            inputs: 50,
            outputs: 40,
            upper: 100,
            lower: 0,
            step: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Accumulate,
    CountDown,
}

fn main() -> anyhow::Result<()> {
    let _guard = LoggerConfig::from_env().init()?;

    let cfg: FeedbackConfig = load_cfg_merge(std::env::args().skip(1), None)?;
    tracing::info!("[Demo] config: {:?}", cfg);

    let mut net = Network::new(cfg.network.clone());
    let cancel = net.token();

    let (mut si_tx, si_rx) = net.channel::<i64>();
    let (so_tx, mut so_rx) = net.channel::<i64>();
    let (fb_tx, fb_rx) = net.channel::<i64>();
    let (sd_tx, sd_rx) = net.channel::<i64>();
    let (ctrl_tx, ctrl_rx) = net.channel::<Scenario<i64, i64>>();
    let (mut ko_tx, ko_rx) = net.channel::<i64>();

    let step = cfg.step;
    let accumulate: FiringFn<i64, i64> =
        Arc::new(|x: Tokens<i64>| vec![vec![x[0][0] + x[1][0]]]);
    let count_down: FiringFn<i64, i64> =
        Arc::new(move |x: Tokens<i64>| vec![vec![x[0][0] - step]]);

    let (upper, lower) = (cfg.upper, cfg.lower);
    let detector = Detector::new(
        [1],
        move |mode: &Mode, x: Tokens<i64>| match *mode {
            Mode::Accumulate if x[0][0] > upper => Mode::CountDown,
            Mode::CountDown if x[0][0] < lower => Mode::Accumulate,
            m => m,
        },
        move |mode: &Mode| match *mode {
            Mode::Accumulate => vec![vec![Scenario::shared([1, 1], [1], accumulate.clone())]],
            Mode::CountDown => vec![vec![Scenario::shared([1, 0], [1], count_down.clone())]],
        },
        Mode::Accumulate,
        vec![sd_rx],
        vec![ctrl_tx],
    )?
    .named("detector");

    net.spawn(Kernel::new(ctrl_rx, vec![fb_rx, si_rx], vec![ko_tx.clone()]).named("kernel"))?;
    net.spawn(Fork::new(ko_rx, vec![fb_tx, so_tx, sd_tx]).named("fork"))?;
    net.spawn(detector)?;

    // Initial token on the feedback path.
    ko_tx.put(0, &cancel)?;
    drop(ko_tx);
    si_tx.put_all(1..=cfg.inputs, &cancel)?;

    if cfg.outputs == 0 {
        let token = net.token();
        let printer = std::thread::spawn(move || {
            while let Ok(v) = so_rx.get(&token) {
                println!("{v}");
            }
        });
        net.run_until_signal()?;
        let _ = printer.join();
    } else {
        let out = so_rx
            .collect(cfg.outputs, Duration::from_secs(1))
            .unwrap_or_else(|partial| {
                tracing::warn!("[Demo] network went quiet after {} tokens", partial.len());
                partial
            });
        println!("{out:?}");
        net.stop();
    }

    if let Some(failure) = net.first_failure() {
        tracing::error!("[Demo] {}", failure);
    }
    for report in net.reports() {
        tracing::info!(
            "[Demo] {} {}: {} firings, {:?}",
            report.kind,
            report.name,
            report.firings,
            report.outcome
        );
    }

    Ok(())
}
