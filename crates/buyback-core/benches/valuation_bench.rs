//! Benchmarks for the Valuation Engine.

#![allow(clippy::unwrap_used)]

use buyback_core::{Condition, DeviceDescription, DeviceType, PricingPolicy, ValuationEngine};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn sample() -> DeviceDescription {
    DeviceDescription::new(
        DeviceType::Smartphone,
        "apple",
        "256GB",
        "2023",
        Condition::Used,
    )
    .with_defect("screen crack")
    .with_defect("battery issue")
}

fn bench_estimate(c: &mut Criterion) {
    let device = sample();
    let literal = ValuationEngine::default();
    let normalized = ValuationEngine::new(PricingPolicy::normalized());

    c.bench_function("estimate_literal", |b| {
        b.iter(|| literal.estimate(black_box(&device), black_box(2026)));
    });
    c.bench_function("estimate_normalized", |b| {
        b.iter(|| normalized.estimate(black_box(&device), black_box(2026)));
    });
    c.bench_function("appraise_with_breakdown", |b| {
        b.iter(|| literal.appraise(black_box(&device), black_box(2026)));
    });
}

criterion_group!(benches, bench_estimate);
criterion_main!(benches);
