use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use super::repo::{CategoryStat, Expense};
use crate::{
    dto::{check_len, required},
    error::{AppError, AppResult},
    ledger::{check_amount, CropRef},
};

#[derive(Debug, Serialize)]
pub struct ExpenseList {
    pub expenses: Vec<Expense>,
}

#[derive(Debug, Serialize)]
pub struct ExpenseEnvelope {
    pub expense: Expense,
}

#[derive(Debug, Serialize)]
pub struct ExpenseStats {
    pub stats: Vec<CategoryStat>,
    pub total: Decimal,
}

/// Body of both create and full-replace update.
#[derive(Debug, Deserialize)]
pub struct ExpenseInput {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub amount: Option<Decimal>,
    pub date: Option<Date>,
    pub crop_id: Option<CropRef>,
    pub payment_method: Option<String>,
}

/// Input after validation; the crop reference is still unresolved.
#[derive(Debug)]
pub struct ValidExpense {
    pub crop: Option<CropRef>,
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub date: Date,
    pub payment_method: Option<String>,
}

impl ExpenseInput {
    pub fn validate(self) -> AppResult<ValidExpense> {
        let bad = AppError::BadRequest;
        check_len(Some(self.category.trim()), 100, "Category")?;
        check_len(self.payment_method.as_deref(), 50, "Payment method")?;
        Ok(ValidExpense {
            category: required(&self.category, "Category").map_err(bad)?,
            description: required(&self.description, "Description").map_err(bad)?,
            amount: check_amount(self.amount)?,
            date: self
                .date
                .ok_or_else(|| AppError::BadRequest("Date is required".into()))?,
            crop: self.crop_id,
            payment_method: self.payment_method.filter(|m| !m.trim().is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_input_is_accepted() {
        let input: ExpenseInput = serde_json::from_str(
            r#"{"category": "Seeds", "description": "Wheat seed", "amount": 1200.5,
                "date": "2024-02-01", "crop_id": "Wheat", "payment_method": ""}"#,
        )
        .unwrap();
        let valid = input.validate().unwrap();
        assert_eq!(valid.amount, Decimal::new(12005, 1));
        assert_eq!(valid.crop, Some(CropRef::Name("Wheat".into())));
        assert_eq!(valid.payment_method, None);
    }

    #[test]
    fn missing_date_is_rejected() {
        let input: ExpenseInput = serde_json::from_str(
            r#"{"category": "Labour", "description": "Harvest", "amount": 300}"#,
        )
        .unwrap();
        assert_eq!(input.validate().unwrap_err().to_string(), "Date is required");
    }

    #[test]
    fn oversized_inputs_are_rejected() {
        let input: ExpenseInput = serde_json::from_str(
            r#"{"category": "Seeds", "description": "Bulk", "amount": 99999999999.0,
                "date": "2024-02-01"}"#,
        )
        .unwrap();
        assert!(matches!(input.validate(), Err(AppError::BadRequest(_))));

        let input = ExpenseInput {
            category: "c".repeat(101),
            description: "Bulk".into(),
            amount: Some(Decimal::ONE),
            date: Some(time::macros::date!(2024 - 02 - 01)),
            crop_id: None,
            payment_method: None,
        };
        assert_eq!(
            input.validate().unwrap_err().to_string(),
            "Category must be at most 100 characters"
        );
    }

    #[test]
    fn stats_serialize_under_category() {
        let body = ExpenseStats {
            stats: vec![CategoryStat {
                category: "Seeds".into(),
                count: 2,
                total_amount: Decimal::new(300, 0),
                average_amount: Decimal::new(150, 0),
            }],
            total: Decimal::new(300, 0),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["stats"][0]["category"], "Seeds");
        assert_eq!(json["stats"][0]["count"], 2);
    }
}
