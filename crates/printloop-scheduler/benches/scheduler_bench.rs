//! Benchmarks for the scheduler crate.

use criterion::{Criterion, criterion_group, criterion_main};
use printloop_scheduler::{
    EventProducer, EventScheduler, IntervalHint, LatenessMetrics, LoopControl, ManualClock,
    PendingSlot, TimedEvent,
};
use std::hint::black_box;
use std::time::{Duration, Instant};

/// Keeps the slot full with already-due events and stops after `budget` idle calls.
struct Saturating {
    origin: Instant,
    budget: u64,
    calls: u64,
}

impl EventProducer for Saturating {
    type Time = Duration;
    type Payload = u64;

    fn execute(&mut self, payload: u64) {
        black_box(payload);
    }

    fn on_idle(&mut self, _hint: IntervalHint, ctl: &mut LoopControl<'_, Duration, u64>) -> bool {
        self.calls += 1;
        if ctl.has_room() {
            let _ = ctl.try_schedule(TimedEvent::new(Duration::ZERO, self.calls));
        }
        if self.calls >= self.budget {
            ctl.request_exit();
        }
        true
    }

    fn map_to_absolute_time(&self, offset: &Duration) -> Instant {
        self.origin + *offset
    }
}

fn bench_loop_iterations(c: &mut Criterion) {
    let clock = ManualClock::new();
    let producer = Saturating {
        origin: clock.origin(),
        budget: 0,
        calls: 0,
    };
    let mut scheduler = EventScheduler::with_clock(producer, &clock);

    c.bench_function("event_loop_1000_iterations", |b| {
        b.iter(|| {
            scheduler.producer_mut().budget += 1000;
            scheduler.event_loop();
            black_box(scheduler.stats().dispatched);
        });
    });
}

fn bench_slot_fill_take(c: &mut Criterion) {
    let mut slot = PendingSlot::new();

    c.bench_function("slot_fill_take", |b| {
        b.iter(|| {
            let _ = slot.try_fill(black_box(42u64));
            black_box(slot.take());
        });
    });
}

fn bench_lateness_record(c: &mut Criterion) {
    let mut metrics = LatenessMetrics::new();

    c.bench_function("lateness_record_dispatch", |b| {
        b.iter(|| {
            metrics.record_dispatch(black_box(12_000));
        });
    });
}

fn bench_lateness_percentiles(c: &mut Criterion) {
    let mut metrics = LatenessMetrics::with_window(4_096);
    for i in 0..4_096u64 {
        metrics.record_dispatch(i % 500_000);
    }

    c.bench_function("lateness_percentiles", |b| {
        b.iter(|| {
            black_box(metrics.percentiles());
        });
    });
}

criterion_group!(
    benches,
    bench_loop_iterations,
    bench_slot_fill_take,
    bench_lateness_record,
    bench_lateness_percentiles,
);

criterion_main!(benches);
