//! Store runtime benchmarks
//!
//! - Reducer execution in isolation
//! - Store throughput with and without effects
//! - Cost of action broadcasting with live observers
//!
//! Run with: `cargo bench -p storefront-runtime`

#![allow(missing_docs)] // Benchmarks don't need extensive docs
#![allow(clippy::expect_used)] // Benchmarks can use expect for setup

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use storefront_core::{SmallVec, effect::Effect, reducer::Reducer, smallvec};
use storefront_runtime::{Store, StoreConfig};

#[derive(Clone, Debug, Default)]
struct TallyState {
    lines: u64,
    total: i64,
}

#[derive(Clone, Debug)]
enum TallyAction {
    AddLine(i64),
    Reprice(i64),
    Settled,
}

#[derive(Clone, Debug)]
struct TallyEnv;

#[derive(Clone)]
struct TallyReducer;

impl Reducer for TallyReducer {
    type State = TallyState;
    type Action = TallyAction;
    type Environment = TallyEnv;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TallyAction::AddLine(cents) => {
                state.lines += 1;
                state.total += cents;
                smallvec![Effect::None]
            },
            TallyAction::Reprice(cents) => {
                state.total = cents;
                smallvec![Effect::Future(Box::pin(async {
                    Some(TallyAction::Settled)
                }))]
            },
            TallyAction::Settled => smallvec![Effect::None],
        }
    }
}

fn benchmark_reducer(c: &mut Criterion) {
    let mut group = c.benchmark_group("reducer");
    group.throughput(Throughput::Elements(1));

    group.bench_function("add_line", |b| {
        let mut state = TallyState::default();
        b.iter(|| {
            let _effects =
                TallyReducer.reduce(&mut state, black_box(TallyAction::AddLine(109)), &TallyEnv);
        });
    });

    group.finish();
}

fn benchmark_store_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_throughput");
    group.throughput(Throughput::Elements(1));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime");

    group.bench_function("send_action", |b| {
        let store = Store::new(TallyState::default(), TallyReducer, TallyEnv);

        b.to_async(&runtime).iter(|| async {
            let _ = store.send(black_box(TallyAction::AddLine(109))).await;
        });
    });

    group.bench_function("send_with_future_effect", |b| {
        let store = Store::new(TallyState::default(), TallyReducer, TallyEnv);

        b.to_async(&runtime).iter(|| async {
            if let Ok(mut handle) = store.send(black_box(TallyAction::Reprice(999))).await {
                handle.wait().await;
            }
        });
    });

    group.bench_function("send_and_read_state", |b| {
        let store = Store::new(TallyState::default(), TallyReducer, TallyEnv);

        b.to_async(&runtime).iter(|| async {
            let _ = store.send(black_box(TallyAction::AddLine(109))).await;
            let _total = store.state(|s| s.total).await;
        });
    });

    group.finish();
}

fn benchmark_broadcasting(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcasting");
    group.throughput(Throughput::Elements(1));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime");

    for observers in [0usize, 1, 10] {
        group.bench_with_input(
            BenchmarkId::new("observers", observers),
            &observers,
            |b, &observers| {
                let store = Store::with_config(
                    TallyState::default(),
                    TallyReducer,
                    TallyEnv,
                    StoreConfig::default().with_broadcast_capacity(64),
                );
                // Receivers are never drained; lagging is part of the measured path
                let _receivers: Vec<_> =
                    (0..observers).map(|_| store.subscribe_actions()).collect();

                b.to_async(&runtime).iter(|| async {
                    let _ = store.send(black_box(TallyAction::AddLine(1))).await;
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_reducer,
    benchmark_store_throughput,
    benchmark_broadcasting
);
criterion_main!(benches);
