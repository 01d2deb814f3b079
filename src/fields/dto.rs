use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::repo::Field;
use crate::{
    dto::{check_len, required},
    error::{AppError, AppResult},
    patch::nullable,
};

#[derive(Debug, Serialize)]
pub struct FieldList {
    pub fields: Vec<Field>,
}

#[derive(Debug, Serialize)]
pub struct FieldEnvelope {
    pub field: Field,
}

#[derive(Debug, Deserialize)]
pub struct NewField {
    #[serde(default)]
    pub name: String,
    pub location: Option<String>,
    pub area: Option<Decimal>,
    pub area_unit: Option<String>,
    pub soil_type: Option<String>,
    pub image: Option<String>,
    pub notes: Option<String>,
}

impl NewField {
    pub fn validate(mut self) -> AppResult<Self> {
        self.name = required(&self.name, "Field name").map_err(AppError::BadRequest)?;
        self.area = check_area(self.area)?;
        check_len(Some(self.name.as_str()), 255, "Field name")?;
        check_len(self.location.as_deref(), 255, "Location")?;
        check_len(self.area_unit.as_deref(), 50, "Area unit")?;
        check_len(self.soil_type.as_deref(), 100, "Soil type")?;
        Ok(self)
    }
}

/// Columns a client may change on an existing field.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub location: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub area: Option<Option<Decimal>>,
    pub area_unit: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub soil_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub image: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

impl FieldPatch {
    pub fn validate(mut self) -> AppResult<Self> {
        if let Some(name) = self.name.as_deref() {
            self.name = Some(required(name, "Field name").map_err(AppError::BadRequest)?);
        }
        if let Some(unit) = self.area_unit.as_deref() {
            self.area_unit = Some(required(unit, "Area unit").map_err(AppError::BadRequest)?);
        }
        if let Some(area) = self.area {
            self.area = Some(check_area(area)?);
        }
        check_len(self.name.as_deref(), 255, "Field name")?;
        check_len(self.location.as_ref().and_then(|l| l.as_deref()), 255, "Location")?;
        check_len(self.area_unit.as_deref(), 50, "Area unit")?;
        check_len(self.soil_type.as_ref().and_then(|s| s.as_deref()), 100, "Soil type")?;
        Ok(self)
    }
}

/// Areas are stored as `NUMERIC(10, 2)`.
const AREA_LIMIT: i64 = 100_000_000;

fn check_area(area: Option<Decimal>) -> AppResult<Option<Decimal>> {
    let Some(area) = area else {
        return Ok(None);
    };
    let area = area.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if area.is_sign_negative() && !area.is_zero() {
        return Err(AppError::BadRequest("Area cannot be negative".into()));
    }
    if area >= Decimal::new(AREA_LIMIT, 0) {
        return Err(AppError::BadRequest("Area must be less than 100000000".into()));
    }
    Ok(Some(area.abs()))
}
