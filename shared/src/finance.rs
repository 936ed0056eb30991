//! Financial aggregation over harvested and active cages

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Cage, HarvestedCage};

/// How many cages the top-profit and top-cost rankings keep
const TOP_CAGE_LIMIT: usize = 5;

/// One slice of the cost breakdown chart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostCategory {
    pub name: String,
    pub value: Decimal,
}

/// Profit aggregated over one calendar month of harvests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyProfit {
    pub year: i32,
    pub month: u32,
    pub profit: Decimal,
}

impl MonthlyProfit {
    /// Chart label, e.g. "3/2024"
    pub fn label(&self) -> String {
        format!("{}/{}", self.month, self.year)
    }
}

/// Aggregated financial view of the whole farm
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FinancialSummary {
    /// Revenue across all harvested cages
    pub total_revenue: Decimal,
    /// Cost across all harvested cages
    pub total_cost: Decimal,
    /// Profit across all harvested cages
    pub total_profit: Decimal,
    /// Money currently tied up in active cages
    pub current_investment: Decimal,
    /// Harvested spending by category, zero categories omitted
    pub cost_breakdown: Vec<CostCategory>,
    /// Profit per harvest month in chronological order
    pub monthly_profit: Vec<MonthlyProfit>,
    /// Most profitable harvested cages, best first
    pub top_profit: Vec<HarvestedCage>,
    /// Most expensive harvested cages, costliest first
    pub top_cost: Vec<HarvestedCage>,
}

impl FinancialSummary {
    /// Aggregate the farm's finances from settled records and active cages.
    pub fn compute(harvested: &[HarvestedCage], active: &[Cage]) -> Self {
        let total_revenue: Decimal = harvested.iter().map(|h| h.revenue).sum();
        let total_cost: Decimal = harvested.iter().map(|h| h.total_cost).sum();
        let total_profit: Decimal = harvested.iter().map(|h| h.profit).sum();
        let current_investment: Decimal = active.iter().map(|c| c.costs.total()).sum();

        let seed: Decimal = harvested.iter().map(|h| h.costs.seed).sum();
        let feed: Decimal = harvested.iter().map(|h| h.costs.feed).sum();
        let medicine: Decimal = harvested.iter().map(|h| h.costs.medicine).sum();
        let cost_breakdown = [("Giống", seed), ("Thức ăn", feed), ("Thuốc", medicine)]
            .into_iter()
            .filter(|(_, value)| *value > Decimal::ZERO)
            .map(|(name, value)| CostCategory {
                name: name.to_string(),
                value,
            })
            .collect();

        let mut monthly: Vec<MonthlyProfit> = Vec::new();
        for record in harvested {
            let year = record.harvest_date.year();
            let month = record.harvest_date.month();
            match monthly.iter_mut().find(|m| m.year == year && m.month == month) {
                Some(entry) => entry.profit += record.profit,
                None => monthly.push(MonthlyProfit {
                    year,
                    month,
                    profit: record.profit,
                }),
            }
        }
        monthly.sort_by_key(|m| (m.year, m.month));

        let mut top_profit = harvested.to_vec();
        top_profit.sort_by(|a, b| b.profit.cmp(&a.profit));
        top_profit.truncate(TOP_CAGE_LIMIT);

        let mut top_cost = harvested.to_vec();
        top_cost.sort_by(|a, b| b.total_cost.cmp(&a.total_cost));
        top_cost.truncate(TOP_CAGE_LIMIT);

        Self {
            total_revenue,
            total_cost,
            total_profit,
            current_investment,
            cost_breakdown,
            monthly_profit: monthly,
            top_profit,
            top_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::models::CageCosts;

    fn harvested(id: &str, month: u32, profit: i64, total_cost: i64) -> HarvestedCage {
        let date = Utc.with_ymd_and_hms(2024, month, 15, 12, 0, 0).unwrap();
        HarvestedCage {
            id: id.to_string(),
            start_date: date - chrono::Duration::days(45),
            harvest_date: date,
            initial_weight_g: 100,
            final_weight_g: 550,
            price_per_kg: Decimal::from(300_000),
            costs: CageCosts {
                seed: Decimal::from(total_cost),
                feed: Decimal::ZERO,
                medicine: Decimal::ZERO,
            },
            total_cost: Decimal::from(total_cost),
            revenue: Decimal::from(profit + total_cost),
            profit: Decimal::from(profit),
            dead_crab_count: 0,
        }
    }

    #[test]
    fn test_empty_farm_has_zero_summary() {
        let summary = FinancialSummary::compute(&[], &[]);
        assert_eq!(summary.total_profit, Decimal::ZERO);
        assert_eq!(summary.current_investment, Decimal::ZERO);
        assert!(summary.cost_breakdown.is_empty());
        assert!(summary.monthly_profit.is_empty());
        assert!(summary.top_profit.is_empty());
    }

    #[test]
    fn test_monthly_profit_groups_and_sorts() {
        let records = vec![
            harvested("C01", 5, 80_000, 100_000),
            harvested("C02", 3, 40_000, 120_000),
            harvested("C03", 5, 20_000, 90_000),
        ];
        let summary = FinancialSummary::compute(&records, &[]);

        assert_eq!(summary.monthly_profit.len(), 2);
        assert_eq!(summary.monthly_profit[0].month, 3);
        assert_eq!(summary.monthly_profit[0].profit, Decimal::from(40_000));
        assert_eq!(summary.monthly_profit[1].month, 5);
        assert_eq!(summary.monthly_profit[1].profit, Decimal::from(100_000));
        assert_eq!(summary.monthly_profit[1].label(), "5/2024");
    }

    #[test]
    fn test_zero_cost_categories_are_omitted() {
        let records = vec![harvested("C01", 4, 50_000, 100_000)];
        let summary = FinancialSummary::compute(&records, &[]);

        // Only seed spending exists in the fixture
        assert_eq!(summary.cost_breakdown.len(), 1);
        assert_eq!(summary.cost_breakdown[0].name, "Giống");
        assert_eq!(summary.cost_breakdown[0].value, Decimal::from(100_000));
    }

    #[test]
    fn test_top_rankings_are_limited_and_ordered() {
        let records: Vec<HarvestedCage> = (1..=7)
            .map(|i| harvested(&format!("C{:02}", i), 6, i * 10_000, i * 5_000))
            .collect();
        let summary = FinancialSummary::compute(&records, &[]);

        assert_eq!(summary.top_profit.len(), 5);
        assert_eq!(summary.top_profit[0].id, "C07");
        assert_eq!(summary.top_profit[4].id, "C03");
        assert_eq!(summary.top_cost[0].id, "C07");
    }
}
