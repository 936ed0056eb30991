//! Cage lifecycle tests
//!
//! Covers the growth engine shared between backend and WASM:
//! - Progress toward the 500g harvest target
//! - Farming day counting and the growth stage ladder
//! - Update transactions and the entries they append
//! - Creation form validation

use chrono::{Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use shared::lifecycle::{compute_progress, farming_days, GrowthStage, LifecycleError, UpdateInput};
use shared::models::{Cage, LogEntryType, TARGET_WEIGHT_GRAMS};
use shared::validation::{validate_cage_id, validate_initial_weight, validate_seed_cost};

fn new_cage(id: &str, weight: i32) -> Cage {
    Cage::new(
        id.to_string(),
        weight,
        Decimal::from(10_000),
        Utc::now() - Duration::days(20),
        Some("farmer@example.com".to_string()),
    )
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_progress_fixed_points() {
        assert_eq!(compute_progress(0, TARGET_WEIGHT_GRAMS), 0);
        assert_eq!(compute_progress(250, TARGET_WEIGHT_GRAMS), 50);
        assert_eq!(compute_progress(500, TARGET_WEIGHT_GRAMS), 100);
        // Overshooting the target still reads 100
        assert_eq!(compute_progress(900, TARGET_WEIGHT_GRAMS), 100);
    }

    #[test]
    fn test_progress_rounds_to_nearest() {
        // 25.4% rounds down, 25.6% rounds up
        assert_eq!(compute_progress(127, TARGET_WEIGHT_GRAMS), 25);
        assert_eq!(compute_progress(128, TARGET_WEIGHT_GRAMS), 26);
    }

    #[test]
    fn test_farming_days_floor_with_minimum_one() {
        let now = Utc::now();
        assert_eq!(farming_days(now, now), 1);
        assert_eq!(farming_days(now - Duration::hours(12), now), 1);
        assert_eq!(farming_days(now - Duration::hours(36), now), 1);
        assert_eq!(farming_days(now - Duration::days(10), now), 10);
    }

    #[test]
    fn test_growth_stage_ladder() {
        assert_eq!(GrowthStage::from_days(9), GrowthStage::New);
        assert_eq!(GrowthStage::from_days(10), GrowthStage::Early);
        assert_eq!(GrowthStage::from_days(19), GrowthStage::Early);
        assert_eq!(GrowthStage::from_days(20), GrowthStage::Midway);
        assert_eq!(GrowthStage::from_days(29), GrowthStage::Midway);
        assert_eq!(GrowthStage::from_days(30), GrowthStage::Mature);
        assert_eq!(GrowthStage::from_days(39), GrowthStage::Mature);
        assert_eq!(GrowthStage::from_days(40), GrowthStage::Critical);
        assert_eq!(GrowthStage::from_days(100), GrowthStage::Critical);
    }

    #[test]
    fn test_stage_colors() {
        assert_eq!(GrowthStage::New.color(), "gray");
        assert_eq!(GrowthStage::Early.color(), "purple");
        assert_eq!(GrowthStage::Midway.color(), "yellow");
        assert_eq!(GrowthStage::Mature.color(), "green");
        assert_eq!(GrowthStage::Critical.color(), "red");
    }

    #[test]
    fn test_weight_update_appends_growth_point_and_entry() {
        let cage = new_cage("A01", 120);
        let input = UpdateInput {
            new_weight_g: Some(150),
            ..Default::default()
        };

        let outcome = cage.apply_update(&input, Utc::now(), "farmer@example.com").unwrap();

        assert_eq!(outcome.cage.current_weight_g, 150);
        assert_eq!(outcome.cage.progress, 30);
        assert_eq!(outcome.cage.growth_history.len(), 2);
        assert_eq!(outcome.new_growth_point.unwrap().weight_g, 150);
        assert_eq!(outcome.new_entries.len(), 1);
        assert_eq!(
            outcome.new_entries[0].details,
            "Trọng lượng mới: 150g. Tăng 30g."
        );
    }

    #[test]
    fn test_feeding_uses_default_type_when_unnamed() {
        let cage = new_cage("A01", 120);
        let input = UpdateInput {
            new_weight_g: Some(120),
            feed_weight_g: 200,
            feed_cost: Decimal::from(50_000),
            ..Default::default()
        };

        let outcome = cage.apply_update(&input, Utc::now(), "farmer@example.com").unwrap();

        let record = outcome.new_feed_record.unwrap();
        assert_eq!(record.feed_type, "Thức ăn chung");
        assert_eq!(record.weight_g, 200);
        assert_eq!(outcome.cage.costs.feed, Decimal::from(50_000));
        assert_eq!(
            outcome.new_entries[0].details,
            "Cho ăn 200g Thức ăn chung."
        );
    }

    #[test]
    fn test_medicine_death_and_note_entries() {
        let cage = new_cage("A01", 120);
        let input = UpdateInput {
            new_weight_g: Some(120),
            medicine_cost: Decimal::from(20_000),
            dead_count: 3,
            note: Some("Thay nước buổi sáng".to_string()),
            ..Default::default()
        };

        let outcome = cage.apply_update(&input, Utc::now(), "farmer@example.com").unwrap();

        assert_eq!(outcome.cage.costs.medicine, Decimal::from(20_000));
        assert_eq!(outcome.cage.dead_crab_count, 3);
        let details: Vec<&str> = outcome
            .new_entries
            .iter()
            .map(|e| e.details.as_str())
            .collect();
        assert_eq!(
            details,
            vec!["Sử dụng thuốc.", "Ghi nhận 3 cua chết.", "Thay nước buổi sáng"]
        );
        assert_eq!(
            outcome.new_entries[2].meta.entry_type(),
            LogEntryType::Note
        );
    }

    #[test]
    fn test_unchanged_submission_is_a_no_op() {
        let cage = new_cage("A01", 120);
        let input = UpdateInput {
            new_weight_g: Some(120),
            ..Default::default()
        };

        let outcome = cage.apply_update(&input, Utc::now(), "farmer@example.com").unwrap();

        assert!(outcome.new_entries.is_empty());
        assert!(outcome.new_growth_point.is_none());
        assert!(outcome.new_feed_record.is_none());
        assert_eq!(outcome.cage, cage);
    }

    #[test]
    fn test_update_without_weight_is_rejected() {
        let cage = new_cage("A01", 120);
        let input = UpdateInput::default();
        assert_eq!(
            cage.apply_update(&input, Utc::now(), "farmer@example.com"),
            Err(LifecycleError::MissingWeight)
        );
    }

    #[test]
    fn test_negative_inputs_are_rejected() {
        let cage = new_cage("A01", 120);

        let negative_weight = UpdateInput {
            new_weight_g: Some(-1),
            ..Default::default()
        };
        assert_eq!(
            cage.apply_update(&negative_weight, Utc::now(), "x"),
            Err(LifecycleError::NegativeWeight)
        );

        let negative_feed = UpdateInput {
            new_weight_g: Some(120),
            feed_cost: Decimal::from(-1),
            ..Default::default()
        };
        assert_eq!(
            cage.apply_update(&negative_feed, Utc::now(), "x"),
            Err(LifecycleError::NegativeAmount("feed cost"))
        );

        let negative_dead = UpdateInput {
            new_weight_g: Some(120),
            dead_count: -2,
            ..Default::default()
        };
        assert_eq!(
            cage.apply_update(&negative_dead, Utc::now(), "x"),
            Err(LifecycleError::NegativeAmount("dead count"))
        );
    }

    #[test]
    fn test_backdated_entries_keep_log_sorted() {
        let cage = new_cage("A01", 120);
        let now = Utc::now();

        let first = UpdateInput {
            new_weight_g: Some(150),
            ..Default::default()
        };
        let cage = cage.apply_update(&first, now, "x").unwrap().cage;

        // Recorded after the fact with an earlier timestamp
        let backdated = UpdateInput {
            new_weight_g: Some(140),
            ..Default::default()
        };
        let cage = cage
            .apply_update(&backdated, now - Duration::days(2), "x")
            .unwrap()
            .cage;

        let dates: Vec<_> = cage.log.iter().map(|e| e.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }

    #[test]
    fn test_blank_user_attribution_is_dropped() {
        let cage = new_cage("A01", 120);
        let input = UpdateInput {
            new_weight_g: Some(130),
            ..Default::default()
        };

        let outcome = cage.apply_update(&input, Utc::now(), "   ").unwrap();
        assert_eq!(outcome.new_entries[0].user, None);
    }

    #[test]
    fn test_cage_id_validation() {
        assert!(validate_cage_id("A01").is_ok());
        assert!(validate_cage_id("CAGE123456").is_ok());
        assert!(validate_cage_id("").is_err());
        assert!(validate_cage_id("a01").is_err());
        assert!(validate_cage_id("A-01").is_err());
        assert!(validate_cage_id("CAGE1234567").is_err());
    }

    #[test]
    fn test_creation_form_validation() {
        assert!(validate_initial_weight(1).is_ok());
        assert!(validate_initial_weight(0).is_err());
        assert!(validate_initial_weight(-5).is_err());
        assert!(validate_seed_cost(Decimal::ZERO).is_ok());
        assert!(validate_seed_cost(Decimal::from(-1)).is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn update_strategy() -> impl Strategy<Value = UpdateInput> {
        (
            0i32..=1200,
            prop_oneof![
                Just(None),
                Just(Some("Cám viên".to_string())),
                Just(Some("  ".to_string())),
            ],
            0i32..=500,
            0i64..=100_000,
            0i64..=100_000,
            0i32..=5,
        )
            .prop_map(|(weight, feed_type, feed_weight, feed, medicine, dead)| UpdateInput {
                new_weight_g: Some(weight),
                feed_type,
                feed_weight_g: feed_weight,
                feed_cost: Decimal::from(feed),
                medicine_cost: Decimal::from(medicine),
                dead_count: dead,
                note: None,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Progress never leaves 0-100 whatever the scale reads
        #[test]
        fn prop_progress_stays_in_range(weight in 0i32..=5000) {
            let progress = compute_progress(weight, TARGET_WEIGHT_GRAMS);
            prop_assert!((0..=100).contains(&progress));
        }

        /// A heavier crab never reads a lower progress
        #[test]
        fn prop_progress_is_monotone(w1 in 0i32..=2000, w2 in 0i32..=2000) {
            let (lo, hi) = if w1 <= w2 { (w1, w2) } else { (w2, w1) };
            prop_assert!(
                compute_progress(lo, TARGET_WEIGHT_GRAMS)
                    <= compute_progress(hi, TARGET_WEIGHT_GRAMS)
            );
        }

        /// Farming days count at least one day
        #[test]
        fn prop_farming_days_at_least_one(hours_ago in 0i64..=24 * 400) {
            let now = Utc::now();
            let days = farming_days(now - Duration::hours(hours_ago), now);
            prop_assert!(days >= 1);
            prop_assert!(days <= hours_ago / 24 + 1);
        }

        /// An update moves exactly the money the form named
        #[test]
        fn prop_update_conserves_costs(input in update_strategy()) {
            let cage = new_cage("A01", 120);
            let before = cage.total_cost();

            let outcome = cage.apply_update(&input, Utc::now(), "farmer@example.com").unwrap();

            prop_assert_eq!(
                outcome.cage.total_cost(),
                before + input.feed_cost + input.medicine_cost
            );
            prop_assert_eq!(outcome.cage.current_weight_g, input.new_weight_g.unwrap());
            prop_assert_eq!(
                outcome.cage.progress,
                compute_progress(input.new_weight_g.unwrap(), TARGET_WEIGHT_GRAMS)
            );
        }

        /// The log never loses entries and stays date-ordered
        #[test]
        fn prop_log_grows_sorted(inputs in proptest::collection::vec(update_strategy(), 1..6)) {
            let mut cage = new_cage("A01", 120);
            let mut now = Utc::now();

            for input in &inputs {
                now += Duration::hours(6);
                let outcome = cage.apply_update(input, now, "farmer@example.com").unwrap();
                prop_assert!(outcome.cage.log.len() >= cage.log.len());
                cage = outcome.cage;
            }

            let dates: Vec<_> = cage.log.iter().map(|e| e.date).collect();
            let mut sorted = dates.clone();
            sorted.sort();
            prop_assert_eq!(dates, sorted);
        }

        /// Death counts only ever accumulate
        #[test]
        fn prop_dead_count_accumulates(counts in proptest::collection::vec(0i32..=4, 1..5)) {
            let mut cage = new_cage("A01", 120);
            let mut now = Utc::now();

            for count in &counts {
                now += Duration::hours(1);
                let input = UpdateInput {
                    new_weight_g: Some(cage.current_weight_g),
                    dead_count: *count,
                    ..Default::default()
                };
                cage = cage.apply_update(&input, now, "x").unwrap().cage;
            }

            prop_assert_eq!(cage.dead_crab_count, counts.iter().sum::<i32>());
        }
    }
}
