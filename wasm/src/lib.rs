//! WebAssembly module for the crab farm management frontend
//!
//! Provides client-side computation for:
//! - Growth progress and stage classification
//! - Harvest revenue/profit previews
//! - Financial dashboard aggregation
//! - Offline form validation
//! - Vietnamese display formatting

use chrono::DateTime;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

use shared::finance::FinancialSummary;
use shared::format::{format_distance_to_now, format_vnd};
use shared::lifecycle::{
    compute_progress, farming_days, GrowthStage, HARVEST_READY_PROGRESS,
};
use shared::models::TARGET_WEIGHT_GRAMS;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Progress toward the 500g harvest target, clamped to 0-100
#[wasm_bindgen]
pub fn compute_growth_progress(current_weight_g: i32) -> i32 {
    compute_progress(current_weight_g, TARGET_WEIGHT_GRAMS)
}

/// Whole farming days between two JS timestamps (milliseconds), at least 1
#[wasm_bindgen]
pub fn farming_days_between(start_ms: f64, now_ms: f64) -> i32 {
    let (Some(start), Some(now)) = (
        DateTime::from_timestamp_millis(start_ms as i64),
        DateTime::from_timestamp_millis(now_ms as i64),
    ) else {
        return 1;
    };
    farming_days(start, now) as i32
}

/// Wire name of the growth stage for a cage farming this many days
#[wasm_bindgen]
pub fn growth_stage_name(days: i32) -> String {
    match GrowthStage::from_days(days as i64) {
        GrowthStage::New => "new",
        GrowthStage::Early => "early",
        GrowthStage::Midway => "midway",
        GrowthStage::Mature => "mature",
        GrowthStage::Critical => "critical",
    }
    .to_string()
}

/// Indicator color of the growth stage for a cage farming this many days
#[wasm_bindgen]
pub fn growth_stage_color(days: i32) -> String {
    GrowthStage::from_days(days as i64).color().to_string()
}

/// Whether a cage at this progress is ready to harvest
#[wasm_bindgen]
pub fn is_harvest_ready(progress: i32) -> bool {
    progress >= HARVEST_READY_PROGRESS
}

/// Revenue preview for the harvest form, in VND
#[wasm_bindgen]
pub fn estimate_revenue(final_weight_g: i32, price_per_kg: f64) -> f64 {
    if final_weight_g <= 0 || price_per_kg <= 0.0 {
        return 0.0;
    }
    f64::from(final_weight_g) / 1000.0 * price_per_kg
}

/// Profit preview for the harvest form, in VND (may be negative)
#[wasm_bindgen]
pub fn estimate_profit(final_weight_g: i32, price_per_kg: f64, total_cost: f64) -> f64 {
    estimate_revenue(final_weight_g, price_per_kg) - total_cost
}

/// Validate a cage identifier before submitting the creation form
#[wasm_bindgen]
pub fn is_valid_cage_id(id: &str) -> bool {
    validate_cage_id(id).is_ok()
}

/// Format an amount as VND with dot thousand separators
#[wasm_bindgen]
pub fn format_vnd_display(amount: f64) -> String {
    let decimal = Decimal::try_from(amount).unwrap_or(Decimal::ZERO);
    format_vnd(decimal)
}

/// Relative Vietnamese time between two JS timestamps (milliseconds)
#[wasm_bindgen]
pub fn time_ago(then_ms: f64, now_ms: f64) -> String {
    let (Some(then), Some(now)) = (
        DateTime::from_timestamp_millis(then_ms as i64),
        DateTime::from_timestamp_millis(now_ms as i64),
    ) else {
        return "vài giây trước".to_string();
    };
    format_distance_to_now(then, now)
}

/// Aggregate the financial dashboard summary from JSON-encoded records
#[wasm_bindgen]
pub fn compute_financial_summary(
    harvested_json: &str,
    active_json: &str,
) -> Result<String, JsValue> {
    let harvested: Vec<HarvestedCage> = serde_json::from_str(harvested_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid harvested JSON: {}", e)))?;
    let active: Vec<Cage> = serde_json::from_str(active_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid cage JSON: {}", e)))?;

    let summary = FinancialSummary::compute(&harvested, &active);
    serde_json::to_string(&summary)
        .map_err(|e| JsValue::from_str(&format!("Summary encoding error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_growth_progress() {
        assert_eq!(compute_growth_progress(0), 0);
        assert_eq!(compute_growth_progress(250), 50);
        assert_eq!(compute_growth_progress(500), 100);
        assert_eq!(compute_growth_progress(900), 100);
    }

    #[test]
    fn test_stage_names_follow_the_ladder() {
        assert_eq!(growth_stage_name(5), "new");
        assert_eq!(growth_stage_name(10), "early");
        assert_eq!(growth_stage_name(25), "midway");
        assert_eq!(growth_stage_name(30), "mature");
        assert_eq!(growth_stage_name(40), "critical");
        assert_eq!(growth_stage_color(40), "red");
    }

    #[test]
    fn test_harvest_ready_threshold() {
        assert!(!is_harvest_ready(94));
        assert!(is_harvest_ready(95));
        assert!(is_harvest_ready(100));
    }

    #[test]
    fn test_revenue_and_profit_preview() {
        let revenue = estimate_revenue(600, 300_000.0);
        assert!((revenue - 180_000.0).abs() < 0.001);

        let profit = estimate_profit(600, 300_000.0, 15_000.0);
        assert!((profit - 165_000.0).abs() < 0.001);

        assert_eq!(estimate_revenue(0, 300_000.0), 0.0);
        assert_eq!(estimate_revenue(600, 0.0), 0.0);
    }

    #[test]
    fn test_cage_id_validation() {
        assert!(is_valid_cage_id("A01"));
        assert!(!is_valid_cage_id(""));
        assert!(!is_valid_cage_id("a01"));
        assert!(!is_valid_cage_id("TOOLONGCAGEID"));
    }

    #[test]
    fn test_vnd_display() {
        assert_eq!(format_vnd_display(165000.0), "165.000 VND");
        assert_eq!(format_vnd_display(0.0), "0 VND");
    }

    #[test]
    fn test_financial_summary_from_json_records() {
        use chrono::{Duration, Utc};

        let harvest_date = Utc::now();
        let record = HarvestedCage {
            id: "A01".to_string(),
            start_date: harvest_date - Duration::days(30),
            harvest_date,
            initial_weight_g: 120,
            final_weight_g: 600,
            price_per_kg: Decimal::from(300_000),
            costs: CageCosts {
                seed: Decimal::from(10_000),
                feed: Decimal::from(5_000),
                medicine: Decimal::ZERO,
            },
            total_cost: Decimal::from(15_000),
            revenue: Decimal::from(180_000),
            profit: Decimal::from(165_000),
            dead_crab_count: 2,
        };

        let harvested_json = serde_json::to_string(&[record.clone()]).unwrap();
        let summary_json = compute_financial_summary(&harvested_json, "[]").unwrap();

        let summary: FinancialSummary = serde_json::from_str(&summary_json).unwrap();
        assert_eq!(summary, FinancialSummary::compute(&[record], &[]));
        assert_eq!(summary.total_profit, Decimal::from(165_000));
    }
}
