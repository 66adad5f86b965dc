// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Benchmarks for the booking engine.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Single-threaded operation costs
//! - The modification request lifecycle
//! - Multi-threaded concurrent operations
//! - Contention and search scaling

use booking_engine_rs::{
    Actor, ApprovalChanges, BookingId, BookingStatus, CustomerRef, Engine, ModificationKind,
    NewBooking, SearchCriteria, SortKey,
};
use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rayon::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;

// =============================================================================
// Helper Functions
// =============================================================================

fn make_booking(id: &str, amount: i64) -> NewBooking {
    NewBooking {
        id: BookingId::from(id),
        customer: CustomerRef {
            name: "Bench Tester".to_owned(),
            email: "bench@example.com".to_owned(),
            phone: None,
        },
        package_ref: "PKG-BENCH".to_owned(),
        destination: "Lisbon".to_owned(),
        start_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2026, 9, 8).unwrap(),
        guests: 2,
        amount: Decimal::new(amount, 2),
    }
}

fn seeded_engine(count: usize) -> Engine {
    let engine = Engine::new();
    for i in 0..count {
        engine
            .create(make_booking(&format!("B-{i}"), (i as i64 + 1) * 100), Actor::Customer)
            .unwrap();
    }
    engine
}

// =============================================================================
// Single-Threaded Benchmarks
// =============================================================================

fn bench_single_create(c: &mut Criterion) {
    c.bench_function("single_create", |b| {
        b.iter(|| {
            let engine = Engine::new();
            engine
                .create(black_box(make_booking("B-1", 10000)), Actor::Customer)
                .unwrap();
        })
    });
}

fn bench_single_confirm(c: &mut Criterion) {
    c.bench_function("single_confirm", |b| {
        b.iter(|| {
            let engine = Engine::new();
            engine
                .create(make_booking("B-1", 10000), Actor::Customer)
                .unwrap();
            engine
                .confirm(black_box(&BookingId::from("B-1")), Actor::Admin)
                .unwrap();
        })
    });
}

fn bench_create_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_throughput");

    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let engine = Engine::new();
                for i in 0..count {
                    engine
                        .create(make_booking(&format!("B-{i}"), 10000), Actor::Customer)
                        .unwrap();
                }
                black_box(&engine);
            })
        });
    }
    group.finish();
}

// =============================================================================
// Modification Lifecycle Benchmarks
// =============================================================================

fn bench_modification_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("modification_lifecycle");

    // Benchmark request only
    group.bench_function("request", |b| {
        b.iter(|| {
            let engine = Engine::new();
            engine
                .create(make_booking("B-1", 10000), Actor::Customer)
                .unwrap();
            engine
                .request_modification(
                    black_box(&BookingId::from("B-1")),
                    ModificationKind::DateChange,
                    "move one week",
                )
                .unwrap();
        })
    });

    // Benchmark request + approve
    group.bench_function("request_approve", |b| {
        b.iter(|| {
            let engine = Engine::new();
            let id = BookingId::from("B-1");
            engine
                .create(make_booking("B-1", 10000), Actor::Customer)
                .unwrap();
            engine
                .request_modification(&id, ModificationKind::GuestCountChange, "one more")
                .unwrap();
            engine
                .approve_modification(
                    black_box(&id),
                    ApprovalChanges::Guests { guests: 3 },
                    None,
                )
                .unwrap();
        })
    });

    // Benchmark request + deny
    group.bench_function("request_deny", |b| {
        b.iter(|| {
            let engine = Engine::new();
            let id = BookingId::from("B-1");
            engine
                .create(make_booking("B-1", 10000), Actor::Customer)
                .unwrap();
            engine
                .request_modification(&id, ModificationKind::DateChange, "move one week")
                .unwrap();
            engine
                .deny_modification(black_box(&id), None)
                .unwrap();
        })
    });

    group.finish();
}

// =============================================================================
// Multi-Threaded Benchmarks
// =============================================================================

fn bench_parallel_messages_same_booking(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_messages_same_booking");

    for count in [1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let engine = Arc::new(seeded_engine(1));
                let id = BookingId::from("B-0");

                (0..count).into_par_iter().for_each(|i| {
                    engine
                        .add_message(&id, Actor::Customer, format!("m{i}"))
                        .unwrap();
                });

                black_box(&engine);
            })
        });
    }
    group.finish();
}

fn bench_parallel_creates_different_bookings(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_creates_different_bookings");

    for count in [1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                let engine = Arc::new(Engine::new());

                (0..count).into_par_iter().for_each(|i| {
                    engine
                        .create(make_booking(&format!("B-{i}"), 10000), Actor::Customer)
                        .unwrap();
                });

                black_box(&engine);
            })
        });
    }
    group.finish();
}

fn bench_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("contention");
    let total_ops = 10_000usize;

    // Benchmark with varying number of bookings to measure contention
    // effects; fewer bookings = more threads competing for the same lock
    for num_bookings in [1, 10, 100, 1_000].iter() {
        group.throughput(Throughput::Elements(total_ops as u64));
        group.bench_with_input(
            BenchmarkId::new("bookings", num_bookings),
            num_bookings,
            |b, &num_bookings| {
                b.iter_batched(
                    || Arc::new(seeded_engine(num_bookings)),
                    |engine| {
                        (0..total_ops).into_par_iter().for_each(|i| {
                            let id = BookingId::from(format!("B-{}", i % num_bookings).as_str());
                            engine
                                .add_message(&id, Actor::Customer, "contention")
                                .unwrap();
                        });
                        black_box(&engine);
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }
    group.finish();
}

// =============================================================================
// Search Benchmarks
// =============================================================================

fn bench_search_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("search_scaling");

    for store_size in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*store_size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(store_size),
            store_size,
            |b, &store_size| {
                b.iter_batched(
                    || {
                        let engine = seeded_engine(store_size);
                        for i in (0..store_size).step_by(2) {
                            engine
                                .confirm(
                                    &BookingId::from(format!("B-{i}").as_str()),
                                    Actor::Admin,
                                )
                                .unwrap();
                        }
                        engine
                    },
                    |engine| {
                        let criteria = SearchCriteria {
                            status: Some(BookingStatus::Confirmed),
                            sort: Some(SortKey::Amount),
                            ..Default::default()
                        };
                        black_box(engine.search(&criteria));
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }
    group.finish();
}

fn bench_search_during_writes(c: &mut Criterion) {
    c.bench_function("search_during_writes", |b| {
        b.iter_batched(
            || Arc::new(seeded_engine(1_000)),
            |engine| {
                let criteria = SearchCriteria {
                    sort: Some(SortKey::Name),
                    ..Default::default()
                };
                rayon::join(
                    || {
                        for _ in 0..10 {
                            black_box(engine.search(&criteria));
                        }
                    },
                    || {
                        for i in 0..100 {
                            let id = BookingId::from(format!("B-{}", i % 1_000).as_str());
                            let _ = engine.add_message(&id, Actor::Admin, "note");
                        }
                    },
                );
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

// =============================================================================
// Criterion Groups
// =============================================================================

criterion_group!(
    single_threaded,
    bench_single_create,
    bench_single_confirm,
    bench_create_throughput,
);

criterion_group!(modifications, bench_modification_lifecycle,);

criterion_group!(
    multi_threaded,
    bench_parallel_messages_same_booking,
    bench_parallel_creates_different_bookings,
    bench_contention,
);

criterion_group!(search, bench_search_scaling, bench_search_during_writes,);

criterion_main!(single_threaded, modifications, multi_threaded, search);
