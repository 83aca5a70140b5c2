//! # Process-Group Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | Clock | tick, observe |
//! | Mailbox | deposit + take, selective take behind a backlog |
//! | Delivery | directed send through bus and router to a mailbox |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use group_com::{GroupCommunication, LogicalClock, Mailbox};
use group_tests::support::full_group;
use shared_types::{DeliveryMode, GroupMessage};
use std::time::Duration;

fn bench_clock(c: &mut Criterion) {
    let mut group = c.benchmark_group("clock");
    let clock = LogicalClock::new();

    group.bench_function("tick", |b| b.iter(|| black_box(clock.tick())));
    group.bench_function("observe", |b| {
        let mut remote = 0u64;
        b.iter(|| {
            remote += 2;
            black_box(clock.observe(remote))
        })
    });
    group.finish();
}

fn bench_mailbox(c: &mut Criterion) {
    let mut group = c.benchmark_group("mailbox");

    let mailbox = Mailbox::new(0);
    let message = GroupMessage::directed(1, 1, 0, DeliveryMode::Async, "payload");
    group.bench_function("deposit_take", |b| {
        b.iter(|| {
            mailbox.deposit(message.clone());
            black_box(mailbox.try_take())
        })
    });

    for backlog in [10usize, 100, 1000] {
        let mailbox = Mailbox::new(0);
        for ts in 0..backlog as u64 {
            mailbox.deposit(GroupMessage::broadcast(ts, 2, DeliveryMode::Async, "noise"));
        }
        let wanted = GroupMessage::directed(1, 1, 0, DeliveryMode::Synchronous, "wanted");

        group.throughput(Throughput::Elements(backlog as u64));
        group.bench_with_input(
            BenchmarkId::new("selective_take", backlog),
            &backlog,
            |b, _| {
                b.iter(|| {
                    mailbox.deposit(wanted.clone());
                    black_box(mailbox.try_take_where(|m| m.sender() == 1))
                })
            },
        );
    }
    group.finish();
}

fn bench_delivery(c: &mut Criterion) {
    let mut group = c.benchmark_group("delivery");
    group.measurement_time(Duration::from_secs(5));

    let (_group, members) = full_group(2);
    group.bench_function("send_to_receive", |b| {
        b.iter(|| {
            members[0].send_to("ping", 1).ok();
            black_box(members[1].wait_for_message(Duration::from_secs(1)))
        })
    });
    group.finish();
}

criterion_group!(benches, bench_clock, bench_mailbox, bench_delivery);
criterion_main!(benches);
