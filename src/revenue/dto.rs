use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use super::repo::{Revenue, SourceStat};
use crate::{
    dto::{check_len, required},
    error::{AppError, AppResult},
    ledger::{check_amount, CropRef},
};

#[derive(Debug, Serialize)]
pub struct RevenueList {
    pub revenue: Vec<Revenue>,
}

#[derive(Debug, Serialize)]
pub struct RevenueEnvelope {
    pub revenue: Revenue,
}

#[derive(Debug, Serialize)]
pub struct RevenueStats {
    pub stats: Vec<SourceStat>,
    pub total: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct RevenueInput {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub product: String,
    pub quantity: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<Date>,
    pub crop_id: Option<CropRef>,
    #[serde(default)]
    pub payment_received: bool,
}

#[derive(Debug)]
pub struct ValidRevenue {
    pub crop: Option<CropRef>,
    pub source: String,
    pub product: String,
    pub quantity: Option<String>,
    pub amount: Decimal,
    pub date: Date,
    pub payment_received: bool,
}

impl RevenueInput {
    pub fn validate(self) -> AppResult<ValidRevenue> {
        check_len(Some(self.source.trim()), 255, "Source")?;
        check_len(Some(self.product.trim()), 255, "Product")?;
        check_len(self.quantity.as_deref(), 100, "Quantity")?;
        Ok(ValidRevenue {
            source: required(&self.source, "Source").map_err(AppError::BadRequest)?,
            product: required(&self.product, "Product").map_err(AppError::BadRequest)?,
            quantity: self.quantity.filter(|q| !q.trim().is_empty()),
            amount: check_amount(self.amount)?,
            date: self
                .date
                .ok_or_else(|| AppError::BadRequest("Date is required".into()))?,
            crop: self.crop_id,
            payment_received: self.payment_received,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_received_defaults_to_false() {
        let input: RevenueInput = serde_json::from_str(
            r#"{"source": "Market", "product": "Tomatoes", "amount": "4500.00", "date": "2024-07-19"}"#,
        )
        .unwrap();
        let valid = input.validate().unwrap();
        assert!(!valid.payment_received);
        assert_eq!(valid.amount, Decimal::new(450000, 2));
        assert_eq!(valid.crop, None);
    }

    #[test]
    fn product_is_required() {
        let input: RevenueInput = serde_json::from_str(
            r#"{"source": "Market", "amount": 10, "date": "2024-07-19"}"#,
        )
        .unwrap();
        assert_eq!(input.validate().unwrap_err().to_string(), "Product is required");
    }

    #[test]
    fn oversized_inputs_are_rejected() {
        let input: RevenueInput = serde_json::from_str(
            r#"{"source": "Market", "product": "Rice", "amount": 10000000000, "date": "2024-07-19"}"#,
        )
        .unwrap();
        assert!(matches!(input.validate(), Err(AppError::BadRequest(_))));

        let input: RevenueInput = serde_json::from_str(&format!(
            r#"{{"source": "Market", "product": "Rice", "quantity": "{}", "amount": 5, "date": "2024-07-19"}}"#,
            "9".repeat(101)
        ))
        .unwrap();
        assert_eq!(
            input.validate().unwrap_err().to_string(),
            "Quantity must be at most 100 characters"
        );
    }
}
