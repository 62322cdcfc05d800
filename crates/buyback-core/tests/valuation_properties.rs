//! Property tests for the Valuation Engine.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use buyback_core::{
    Condition, DeviceDescription, DeviceType, Price, PricingPolicy, ValuationEngine, FLOOR_PRICE,
};
use proptest::prelude::*;

const REFERENCE_YEAR: i64 = 2026;

// =============================================================================
// STRATEGIES
// =============================================================================

fn known_type() -> impl Strategy<Value = DeviceType> {
    prop_oneof![
        Just(DeviceType::Smartphone),
        Just(DeviceType::Laptop),
        Just(DeviceType::Tablet),
    ]
}

fn brand() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("apple".to_string()),
        Just("samsung".to_string()),
        Just("Apple".to_string()),
        "[a-z]{0,8}",
    ]
}

fn storage() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..2048).prop_map(|gb| format!("{gb}GB")),
        "[A-Za-z ]{0,6}",
    ]
}

fn defects() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(
        prop_oneof![
            Just("screen crack".to_string()),
            Just("battery issue".to_string()),
            Just("malfunctioning buttons".to_string()),
            Just("Screen cracks".to_string()),
            "[a-z ]{0,12}",
        ],
        0..4,
    )
}

fn devices() -> impl Strategy<Value = DeviceDescription> {
    (
        known_type(),
        brand(),
        storage(),
        1990i64..2030,
        prop_oneof![Just(Condition::New), Just(Condition::Used), Just(Condition::Damaged)],
        defects(),
    )
        .prop_map(|(device_type, brand, storage, year, condition, defects)| {
            let mut device =
                DeviceDescription::new(device_type, brand, storage, year.to_string(), condition);
            device.defects = defects;
            device
        })
}

fn engines() -> impl Strategy<Value = ValuationEngine> {
    prop_oneof![
        Just(ValuationEngine::new(PricingPolicy::literal())),
        Just(ValuationEngine::new(PricingPolicy::normalized())),
    ]
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn recognized_types_never_go_below_floor(engine in engines(), device in devices()) {
        prop_assert!(engine.estimate(&device, REFERENCE_YEAR) >= FLOOR_PRICE);
    }

    #[test]
    fn unrecognized_types_are_zero(
        engine in engines(),
        device in devices(),
        raw in "[A-Za-z]{0,10}",
    ) {
        prop_assume!(!["smartphone", "laptop", "tablet"].contains(&raw.as_str()));
        let device = DeviceDescription { device_type: DeviceType::parse(&raw), ..device };
        prop_assert_eq!(engine.estimate(&device, REFERENCE_YEAR), Price::ZERO);
    }

    #[test]
    fn worse_condition_never_pays_more(engine in engines(), device in devices()) {
        let priced = |condition: Condition| {
            let device = DeviceDescription { condition, ..device.clone() };
            engine.estimate(&device, REFERENCE_YEAR)
        };
        let new = priced(Condition::New);
        let used = priced(Condition::Used);
        let damaged = priced(Condition::Damaged);
        prop_assert!(damaged <= used);
        prop_assert!(used <= new);
    }

    #[test]
    fn older_never_pays_more(engine in engines(), device in devices(), age in 0i64..20) {
        let at_age = |age: i64| {
            let device = DeviceDescription {
                year_of_purchase: (REFERENCE_YEAR - age).to_string(),
                ..device.clone()
            };
            engine.estimate(&device, REFERENCE_YEAR)
        };
        prop_assert!(at_age(age + 1) <= at_age(age));
    }

    #[test]
    fn defects_stack_multiplicatively(
        device_type in known_type(),
        year in 2015i64..2027,
    ) {
        let engine = ValuationEngine::default();
        let base = DeviceDescription::new(
            device_type,
            "samsung",
            "512GB",
            year.to_string(),
            Condition::New,
        );
        let one = base.clone().with_defect("screen crack");
        let two = one.clone().with_defect("battery issue");

        let single = engine.appraise(&one, REFERENCE_YEAR);
        let double = engine.appraise(&two, REFERENCE_YEAR);

        // single × 0.85, compared in cents; both sides were rounded once
        let expected = single.computed.cents() * 85;
        let actual = double.computed.cents() * 100;
        prop_assert!(expected.abs_diff(actual) <= 100, "{} vs {}", expected, actual);
    }
}

// =============================================================================
// CONCRETE SCENARIOS
// =============================================================================

#[test]
fn new_samsung_phone_this_year() {
    let device = DeviceDescription::new(
        DeviceType::Smartphone,
        "samsung",
        "128GB",
        REFERENCE_YEAR.to_string(),
        Condition::New,
    );
    assert_eq!(
        buyback_core::estimate(&device, REFERENCE_YEAR),
        Price::from_cents(50160)
    );
}

#[test]
fn old_damaged_cracked_laptop() {
    let device = DeviceDescription::new(
        DeviceType::Laptop,
        "dell",
        "64GB",
        (REFERENCE_YEAR - 6).to_string(),
        Condition::Damaged,
    )
    .with_defect("screen crack");
    assert_eq!(
        buyback_core::estimate(&device, REFERENCE_YEAR),
        Price::from_cents(12250)
    );
}

#[test]
fn desktop_is_zero() {
    let device = DeviceDescription::new(
        DeviceType::parse("desktop"),
        "apple",
        "1TB",
        "2026",
        Condition::New,
    );
    assert_eq!(buyback_core::estimate(&device, REFERENCE_YEAR), Price::ZERO);
}

#[test]
fn old_damaged_budget_tablet_hits_floor() {
    let device = DeviceDescription::new(
        DeviceType::Tablet,
        "generic",
        "16GB",
        "2012",
        Condition::Damaged,
    )
    .with_defect("screen crack")
    .with_defect("battery issue");
    // 300 × 0.50 × 0.50 × 0.70 × 0.85 = 44.625
    assert_eq!(buyback_core::estimate(&device, REFERENCE_YEAR), FLOOR_PRICE);
}
