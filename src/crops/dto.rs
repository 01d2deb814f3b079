use serde::{Deserialize, Serialize};
use time::Date;

use super::records::{Schedule, Spray, Treatment};
use super::repo::{Crop, CropDetails};
use crate::{
    dto::{check_len, required},
    error::{AppError, AppResult},
    patch::nullable,
};

#[derive(Debug, Serialize)]
pub struct CropList {
    pub crops: Vec<Crop>,
}

#[derive(Debug, Serialize)]
pub struct CropEnvelope {
    pub crop: Crop,
}

#[derive(Debug, Serialize)]
pub struct CropDetailsEnvelope {
    pub crop: CropDetails,
}

#[derive(Debug, Serialize)]
pub struct ScheduleEnvelope {
    pub schedule: Schedule,
}

#[derive(Debug, Serialize)]
pub struct FertilizerEnvelope {
    pub fertilizer: Treatment,
}

#[derive(Debug, Serialize)]
pub struct PesticideEnvelope {
    pub pesticide: Treatment,
}

#[derive(Debug, Serialize)]
pub struct SprayEnvelope {
    pub spray: Spray,
}

#[derive(Debug, Deserialize)]
pub struct NewCrop {
    #[serde(default)]
    pub name: String,
    pub variety: Option<String>,
    pub field_id: Option<i64>,
    pub area: Option<String>,
    pub planted_date: Option<Date>,
    pub expected_harvest_date: Option<Date>,
    pub status: Option<String>,
    pub progress: Option<i32>,
    pub health: Option<String>,
    pub image: Option<String>,
    pub notes: Option<String>,
}

impl NewCrop {
    pub fn validate(mut self) -> AppResult<Self> {
        self.name = required(&self.name, "Crop name").map_err(AppError::BadRequest)?;
        if self.planted_date.is_none() {
            return Err(AppError::BadRequest("Planted date is required".into()));
        }
        check_progress(self.progress)?;
        // A zero id means "no field" in form submissions.
        self.field_id = self.field_id.filter(|id| *id > 0);
        self.status = non_blank(self.status);
        self.health = non_blank(self.health);
        self.image = non_blank(self.image);
        check_len(Some(self.name.as_str()), 255, "Crop name")?;
        check_len(self.variety.as_deref(), 255, "Variety")?;
        check_len(self.area.as_deref(), 100, "Area")?;
        check_text_columns(
            self.status.as_deref(),
            self.health.as_deref(),
            self.image.as_deref(),
        )?;
        Ok(self)
    }
}

/// Columns a client may change on an existing crop.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CropPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub variety: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub field_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    pub area: Option<Option<String>>,
    pub planted_date: Option<Date>,
    #[serde(default, deserialize_with = "nullable")]
    pub expected_harvest_date: Option<Option<Date>>,
    #[serde(default, deserialize_with = "nullable")]
    pub actual_harvest_date: Option<Option<Date>>,
    pub status: Option<String>,
    pub progress: Option<i32>,
    pub health: Option<String>,
    pub image: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}

impl CropPatch {
    pub fn validate(mut self) -> AppResult<Self> {
        if let Some(name) = self.name.as_deref() {
            self.name = Some(required(name, "Crop name").map_err(AppError::BadRequest)?);
        }
        check_progress(self.progress)?;
        if let Some(field_id) = self.field_id {
            self.field_id = Some(field_id.filter(|id| *id > 0));
        }
        // Blank values leave the stored ones in place.
        self.status = non_blank(self.status);
        self.health = non_blank(self.health);
        self.image = non_blank(self.image);
        check_len(self.name.as_deref(), 255, "Crop name")?;
        check_len(self.variety.as_ref().and_then(|v| v.as_deref()), 255, "Variety")?;
        check_len(self.area.as_ref().and_then(|a| a.as_deref()), 100, "Area")?;
        check_text_columns(
            self.status.as_deref(),
            self.health.as_deref(),
            self.image.as_deref(),
        )?;
        Ok(self)
    }

    /// Field the crop would be moved to, if any.
    pub fn new_field_id(&self) -> Option<i64> {
        self.field_id.flatten()
    }
}

fn check_progress(progress: Option<i32>) -> AppResult<()> {
    match progress {
        Some(p) if !(0..=100).contains(&p) => Err(AppError::BadRequest(
            "Progress must be between 0 and 100".into(),
        )),
        _ => Ok(()),
    }
}

fn check_text_columns(
    status: Option<&str>,
    health: Option<&str>,
    image: Option<&str>,
) -> AppResult<()> {
    check_len(status, 50, "Status")?;
    check_len(health, 50, "Health")?;
    check_len(image, 10, "Image")
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
