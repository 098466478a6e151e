//! Seasonal report models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AllocationType, PaymentStatus};
use crate::money::{percent_of, round_gel};

/// Harvest totals of one crop within a season
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CropHarvest {
    pub crop_id: Uuid,
    pub crop_name: String,
    pub lot_count: i64,
    pub harvested_kg: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ExpenseTotal {
    pub allocation_type: AllocationType,
    pub amount_gel: Decimal,
}

/// Sales of a season, summed per payment status
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SalesSummary {
    pub sale_count: i64,
    pub sold_kg: Decimal,
    pub revenue_gel: Decimal,
    pub paid_gel: Decimal,
    /// Revenue of sales that are unpaid or only partially paid
    pub outstanding_gel: Decimal,
}

impl SalesSummary {
    /// Fold `(weight_kg, total_gel, payment_status)` triples
    pub fn from_sales<I>(sales: I) -> Self
    where
        I: IntoIterator<Item = (Decimal, Decimal, PaymentStatus)>,
    {
        sales
            .into_iter()
            .fold(Self::default(), |mut acc, (weight_kg, total_gel, status)| {
                acc.sale_count += 1;
                acc.sold_kg += weight_kg;
                acc.revenue_gel += total_gel;
                match status {
                    PaymentStatus::Paid => acc.paid_gel += total_gel,
                    PaymentStatus::Unpaid | PaymentStatus::Partial => acc.outstanding_gel += total_gel,
                }
                acc
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonReport {
    pub season_id: Uuid,
    pub season_name: String,
    pub harvest_by_crop: Vec<CropHarvest>,
    pub harvested_kg: Decimal,
    pub sales: SalesSummary,
    pub expenses_by_allocation: Vec<ExpenseTotal>,
    pub expenses_gel: Decimal,
    /// Revenue minus expenses
    pub gross_margin_gel: Decimal,
    /// Margin as a share of revenue; absent for a season without sales
    pub margin_pct: Option<Decimal>,
    /// Stock of the season's lots still in bins
    pub stock_kg: Decimal,
}

impl SeasonReport {
    pub fn assemble(
        season_id: Uuid,
        season_name: String,
        harvest_by_crop: Vec<CropHarvest>,
        sales: SalesSummary,
        expenses_by_allocation: Vec<ExpenseTotal>,
        stock_kg: Decimal,
    ) -> Self {
        let harvested_kg = harvest_by_crop.iter().map(|c| c.harvested_kg).sum();
        let expenses_gel = round_gel(expenses_by_allocation.iter().map(|e| e.amount_gel).sum());
        let gross_margin_gel = round_gel(sales.revenue_gel - expenses_gel);
        let margin_pct = percent_of(gross_margin_gel, sales.revenue_gel);

        Self {
            season_id,
            season_name,
            harvest_by_crop,
            harvested_kg,
            sales,
            expenses_by_allocation,
            expenses_gel,
            gross_margin_gel,
            margin_pct,
            stock_kg,
        }
    }

    /// Flat `(metric, value)` pairs, one per CSV row
    pub fn summary_rows(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            ("season".to_string(), self.season_name.clone()),
            ("harvested_kg".to_string(), self.harvested_kg.to_string()),
            ("sold_kg".to_string(), self.sales.sold_kg.to_string()),
            ("sale_count".to_string(), self.sales.sale_count.to_string()),
            ("revenue_gel".to_string(), self.sales.revenue_gel.to_string()),
            ("paid_gel".to_string(), self.sales.paid_gel.to_string()),
            ("outstanding_gel".to_string(), self.sales.outstanding_gel.to_string()),
            ("expenses_gel".to_string(), self.expenses_gel.to_string()),
            ("gross_margin_gel".to_string(), self.gross_margin_gel.to_string()),
            ("stock_kg".to_string(), self.stock_kg.to_string()),
        ];
        if let Some(pct) = self.margin_pct {
            rows.push(("margin_pct".to_string(), pct.to_string()));
        }
        for crop in &self.harvest_by_crop {
            rows.push((format!("harvested_kg:{}", crop.crop_name), crop.harvested_kg.to_string()));
        }
        for expense in &self.expenses_by_allocation {
            rows.push((
                format!("expenses_gel:{}", expense.allocation_type.as_str()),
                expense.amount_gel.to_string(),
            ));
        }
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sales_split_by_payment_status() {
        let summary = SalesSummary::from_sales([
            (Decimal::from(100), Decimal::new(25000, 2), PaymentStatus::Paid),
            (Decimal::from(40), Decimal::new(10000, 2), PaymentStatus::Partial),
            (Decimal::from(10), Decimal::new(2500, 2), PaymentStatus::Unpaid),
        ]);
        assert_eq!(summary.sale_count, 3);
        assert_eq!(summary.sold_kg, Decimal::from(150));
        assert_eq!(summary.revenue_gel, Decimal::new(37500, 2));
        assert_eq!(summary.paid_gel, Decimal::new(25000, 2));
        assert_eq!(summary.outstanding_gel, Decimal::new(12500, 2));
    }

    #[test]
    fn margin_is_revenue_minus_expenses() {
        let sales = SalesSummary::from_sales([(Decimal::from(10), Decimal::new(5000, 2), PaymentStatus::Paid)]);
        let report = SeasonReport::assemble(
            Uuid::new_v4(),
            "2024".into(),
            vec![CropHarvest {
                crop_id: Uuid::new_v4(),
                crop_name: "ხორბალი".into(),
                lot_count: 2,
                harvested_kg: Decimal::from(1200),
            }],
            sales,
            vec![
                ExpenseTotal {
                    allocation_type: AllocationType::Field,
                    amount_gel: Decimal::new(1250, 2),
                },
                ExpenseTotal {
                    allocation_type: AllocationType::General,
                    amount_gel: Decimal::new(700, 2),
                },
            ],
            Decimal::from(1190),
        );

        assert_eq!(report.harvested_kg, Decimal::from(1200));
        assert_eq!(report.expenses_gel, Decimal::new(1950, 2));
        assert_eq!(report.gross_margin_gel, Decimal::new(3050, 2));
        assert_eq!(report.margin_pct, Some(Decimal::new(6100, 2)));
        assert!(report
            .summary_rows()
            .contains(&("expenses_gel:FIELD".to_string(), "12.50".to_string())));
    }

    #[test]
    fn season_without_sales_has_no_margin_share() {
        let report = SeasonReport::assemble(
            Uuid::new_v4(),
            "2025".into(),
            Vec::new(),
            SalesSummary::default(),
            Vec::new(),
            Decimal::ZERO,
        );
        assert_eq!(report.margin_pct, None);
        assert!(report.summary_rows().iter().all(|(metric, _)| metric != "margin_pct"));
    }
}
