use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::{Duration, Instant};

use sadfrt::prelude::{
    Actor, BaseRx, BaseTx, ChannelConfig, Kernel, Network, NetworkConfig, Scenario, Tokens,
};

fn network(capacity: Option<usize>) -> Network {
    Network::new(NetworkConfig {
        channel: ChannelConfig {
            capacity,
            ..ChannelConfig::default()
        },
        ..NetworkConfig::default()
    })
}

/// `stages` identity actors in a line; time to push `tokens` through.
fn run_pipeline(stages: usize, tokens: u64, capacity: Option<usize>) -> Duration {
    let mut net = network(capacity);
    let cancel = net.token();

    let (mut head_tx, mut rx) = net.channel::<u64>();
    for _ in 0..stages {
        let (tx, next_rx) = net.channel::<u64>();
        let actor = Actor::new([1], [1], |x: Tokens<u64>| x, vec![rx], vec![tx]).unwrap();
        net.spawn(actor).unwrap();
        rx = next_rx;
    }

    let feeder = std::thread::spawn(move || head_tx.put_all(0..tokens, &cancel).unwrap());

    let start = Instant::now();
    let mut got = 0;
    while got < tokens {
        black_box(rx.get_timeout(Duration::from_secs(5)).unwrap());
        got += 1;
    }
    let elapsed = start.elapsed();

    feeder.join().unwrap();
    net.stop();
    elapsed
}

/// Kernel alternating between two scenarios, fed from the bench thread.
fn run_kernel(firings: u64) -> Duration {
    let mut net = network(None);
    let cancel = net.token();

    let (mut ctrl_tx, ctrl_rx) = net.channel::<Scenario<u64, u64>>();
    let (mut in_tx, in_rx) = net.channel::<u64>();
    let (out_tx, mut out_rx) = net.channel::<u64>();
    net.spawn(Kernel::new(ctrl_rx, vec![in_rx], vec![out_tx]))
        .unwrap();

    let pair = Scenario::new([2], [1], |x: Tokens<u64>| vec![vec![x[0][0] + x[0][1]]]);
    let single = Scenario::new([1], [1], |x: Tokens<u64>| x);
    for i in 0..firings {
        let s = if i % 2 == 0 { &pair } else { &single };
        ctrl_tx.put(s.clone(), &cancel).unwrap();
    }

    let start = Instant::now();
    in_tx.put_all(0..firings / 2 * 3, &cancel).unwrap();
    for _ in 0..firings / 2 * 2 {
        black_box(out_rx.get_timeout(Duration::from_secs(5)).unwrap());
    }
    let elapsed = start.elapsed();

    net.stop();
    elapsed
}

pub fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("actor_pipeline");

    for &(stages, capacity) in &[(1, None), (4, None), (4, Some(64))] {
        let id = format!(
            "{}x{}",
            stages,
            capacity.map_or("unbounded".to_string(), |c: usize| c.to_string())
        );
        group.bench_function(BenchmarkId::from_parameter(id), |b| {
            b.iter_custom(|n| {
                let mut total = Duration::ZERO;
                for _ in 0..n {
                    total += run_pipeline(stages, 100_000, capacity);
                }
                total
            });
        });
    }

    group.finish();
}

pub fn bench_kernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("kernel_scenarios");

    for &firings in &[10_000_u64, 100_000_u64] {
        group.bench_function(BenchmarkId::from_parameter(firings), |b| {
            b.iter_custom(|n| {
                let mut total = Duration::ZERO;
                for _ in 0..n {
                    total += run_kernel(firings);
                }
                total
            });
        });
    }

    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .warm_up_time(Duration::from_millis(500))
        .measurement_time(Duration::from_secs(3))
        .sample_size(12);
    targets = bench_pipeline, bench_kernel
}
criterion_main!(benches);
