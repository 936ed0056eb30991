//! Financial aggregation tests
//!
//! Covers the farm-wide summary built from settled records and active cages:
//! - Totals and the current-investment figure
//! - Cost breakdown and monthly grouping
//! - Top-cage rankings
//! - VND display formatting

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

use shared::finance::FinancialSummary;
use shared::format::format_vnd;
use shared::models::{Cage, CageCosts, HarvestedCage};

fn record(id: &str, month: u32, final_weight: i32, price: i64, costs: CageCosts) -> HarvestedCage {
    let harvest_date = Utc.with_ymd_and_hms(2024, month, 15, 9, 0, 0).unwrap();
    let cage = Cage {
        id: id.to_string(),
        start_date: harvest_date - Duration::days(40),
        initial_weight_g: 100,
        current_weight_g: final_weight,
        progress: 100,
        costs,
        dead_crab_count: 0,
        ai_alert: false,
        growth_history: Vec::new(),
        feed_history: Vec::new(),
        log: Vec::new(),
    };
    HarvestedCage::settle(&cage, final_weight, Decimal::from(price), harvest_date).unwrap()
}

fn costs(seed: i64, feed: i64, medicine: i64) -> CageCosts {
    CageCosts {
        seed: Decimal::from(seed),
        feed: Decimal::from(feed),
        medicine: Decimal::from(medicine),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_summary_totals() {
        let harvested = vec![
            record("A01", 3, 600, 300_000, costs(10_000, 5_000, 0)),
            record("A02", 4, 500, 280_000, costs(12_000, 8_000, 2_000)),
        ];
        let active = vec![Cage::new(
            "B01".to_string(),
            120,
            Decimal::from(9_000),
            Utc::now(),
            None,
        )];

        let summary = FinancialSummary::compute(&harvested, &active);

        // 180,000 + 140,000 revenue against 15,000 + 22,000 cost
        assert_eq!(summary.total_revenue, Decimal::from(320_000));
        assert_eq!(summary.total_cost, Decimal::from(37_000));
        assert_eq!(summary.total_profit, Decimal::from(283_000));
        assert_eq!(summary.current_investment, Decimal::from(9_000));
    }

    #[test]
    fn test_cost_breakdown_names_and_omissions() {
        let harvested = vec![record("A01", 3, 600, 300_000, costs(10_000, 5_000, 0))];
        let summary = FinancialSummary::compute(&harvested, &[]);

        let names: Vec<&str> = summary
            .cost_breakdown
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["Giống", "Thức ăn"]);
        assert_eq!(summary.cost_breakdown[0].value, Decimal::from(10_000));
    }

    #[test]
    fn test_monthly_profit_in_calendar_order() {
        let harvested = vec![
            record("A01", 6, 600, 300_000, costs(10_000, 0, 0)),
            record("A02", 2, 550, 300_000, costs(10_000, 0, 0)),
            record("A03", 6, 500, 300_000, costs(10_000, 0, 0)),
        ];
        let summary = FinancialSummary::compute(&harvested, &[]);

        assert_eq!(summary.monthly_profit.len(), 2);
        assert_eq!(summary.monthly_profit[0].label(), "2/2024");
        assert_eq!(summary.monthly_profit[1].label(), "6/2024");
        assert_eq!(
            summary.monthly_profit[1].profit,
            Decimal::from(170_000 + 140_000)
        );
    }

    #[test]
    fn test_top_rankings() {
        let harvested: Vec<HarvestedCage> = (1..=7)
            .map(|i| {
                record(
                    &format!("A{:02}", i),
                    5,
                    400 + i * 30,
                    300_000,
                    costs(i64::from(i) * 3_000, 0, 0),
                )
            })
            .collect();
        let summary = FinancialSummary::compute(&harvested, &[]);

        assert_eq!(summary.top_profit.len(), 5);
        assert_eq!(summary.top_cost.len(), 5);
        // Heaviest cage earns the most, A07 also spent the most
        assert_eq!(summary.top_profit[0].id, "A07");
        assert_eq!(summary.top_cost[0].id, "A07");
        assert_eq!(summary.top_cost[4].id, "A03");
    }

    #[test]
    fn test_vnd_formatting() {
        assert_eq!(format_vnd(Decimal::from(0)), "0 VND");
        assert_eq!(format_vnd(Decimal::from(999)), "999 VND");
        assert_eq!(format_vnd(Decimal::from(25_000)), "25.000 VND");
        assert_eq!(format_vnd(Decimal::from(1_234_567)), "1.234.567 VND");
        assert_eq!(format_vnd(Decimal::from(-430_000)), "-430.000 VND");
        // Fractional amounts round to whole VND
        assert_eq!(format_vnd(Decimal::new(15_5, 1)), "16 VND");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn records_strategy() -> impl Strategy<Value = Vec<HarvestedCage>> {
        proptest::collection::vec(
            (1u32..=12, 200i32..=900, 50_000i64..=500_000, 0i64..=100_000, 0i64..=100_000),
            0..10,
        )
        .prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (month, weight, price, seed, feed))| {
                    record(&format!("C{:02}", i), month, weight, price, costs(seed, feed, 0))
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The headline totals obey profit = revenue - cost
        #[test]
        fn prop_totals_identity(harvested in records_strategy()) {
            let summary = FinancialSummary::compute(&harvested, &[]);
            prop_assert_eq!(
                summary.total_profit,
                summary.total_revenue - summary.total_cost
            );
        }

        /// Monthly slices add back up to the total profit
        #[test]
        fn prop_monthly_profit_partitions_total(harvested in records_strategy()) {
            let summary = FinancialSummary::compute(&harvested, &[]);

            let monthly_sum: Decimal = summary.monthly_profit.iter().map(|m| m.profit).sum();
            prop_assert_eq!(monthly_sum, summary.total_profit);

            let keys: Vec<(i32, u32)> = summary
                .monthly_profit
                .iter()
                .map(|m| (m.year, m.month))
                .collect();
            let mut sorted = keys.clone();
            sorted.sort();
            prop_assert_eq!(keys, sorted);
        }

        /// The breakdown never shows a zero slice and sums to the total cost
        #[test]
        fn prop_breakdown_covers_total_cost(harvested in records_strategy()) {
            let summary = FinancialSummary::compute(&harvested, &[]);

            let breakdown_sum: Decimal =
                summary.cost_breakdown.iter().map(|c| c.value).sum();
            prop_assert_eq!(breakdown_sum, summary.total_cost);
            prop_assert!(summary
                .cost_breakdown
                .iter()
                .all(|c| c.value > Decimal::ZERO));
        }

        /// Rankings keep at most five cages, best first
        #[test]
        fn prop_rankings_limited_and_sorted(harvested in records_strategy()) {
            let summary = FinancialSummary::compute(&harvested, &[]);

            prop_assert!(summary.top_profit.len() <= 5);
            prop_assert!(summary.top_cost.len() <= 5);
            prop_assert!(summary
                .top_profit
                .windows(2)
                .all(|w| w[0].profit >= w[1].profit));
            prop_assert!(summary
                .top_cost
                .windows(2)
                .all(|w| w[0].total_cost >= w[1].total_cost));
        }

        /// Current investment counts only active cages
        #[test]
        fn prop_investment_counts_active_costs(seeds in proptest::collection::vec(0i64..=50_000, 0..6)) {
            let active: Vec<Cage> = seeds
                .iter()
                .enumerate()
                .map(|(i, seed)| {
                    Cage::new(
                        format!("B{:02}", i),
                        100,
                        Decimal::from(*seed),
                        Utc::now(),
                        None,
                    )
                })
                .collect();

            let summary = FinancialSummary::compute(&[], &active);
            prop_assert_eq!(
                summary.current_investment,
                Decimal::from(seeds.iter().sum::<i64>())
            );
            prop_assert_eq!(summary.total_profit, Decimal::ZERO);
        }
    }
}
