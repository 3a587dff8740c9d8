use crate::models::domain::{Vehicle, VehicleFilter, DEFAULT_STATUS, STATUS_SOLD};
use crate::models::record::parse_date;
use crate::models::{Amount, AmountError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// Errors raised while turning submitted form data into records
#[derive(Debug, Error)]
pub enum FormError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("{field} must be a whole number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("{field} is not a valid amount: {source}")]
    InvalidAmount {
        field: &'static str,
        #[source]
        source: AmountError,
    },

    #[error("{field} must be a date in YYYY-MM-DD format, got '{value}'")]
    InvalidDate { field: &'static str, value: String },

    #[error("{0} is required")]
    Missing(&'static str),
}

/// Longest piece of submitted text quoted back in an error message
const MAX_ECHOED_CHARS: usize = 32;

/// Submitted text as quoted in error messages, cut to `MAX_ECHOED_CHARS`
fn echoed(value: &str) -> String {
    match value.char_indices().nth(MAX_ECHOED_CHARS) {
        Some((end, _)) => format!("{}...", &value[..end]),
        None => value.to_string(),
    }
}

fn number<T: std::str::FromStr + Default>(field: &'static str, value: &str) -> Result<T, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(T::default());
    }
    trimmed.parse().map_err(|_| FormError::InvalidNumber {
        field,
        value: echoed(value),
    })
}

fn amount(field: &'static str, value: &str) -> Result<Amount, FormError> {
    match value.parse() {
        Ok(a) => Ok(a),
        Err(AmountError::Empty) => Ok(Amount::ZERO),
        Err(AmountError::Invalid(s)) => Err(FormError::InvalidAmount {
            field,
            source: AmountError::Invalid(echoed(&s)),
        }),
        Err(AmountError::Overflow(s)) => Err(FormError::InvalidAmount {
            field,
            source: AmountError::Overflow(echoed(&s)),
        }),
    }
}

fn date(field: &'static str, value: &str) -> Result<Option<NaiveDate>, FormError> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_date(value).map(Some).ok_or_else(|| FormError::InvalidDate {
        field,
        value: echoed(value),
    })
}

/// Add / edit vehicle form submission
///
/// Lengths mirror the fixed widths of the host's vehicle data structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct VehicleForm {
    #[validate(length(min = 1, max = 50))]
    pub make: String,
    #[validate(length(min = 1, max = 50))]
    pub model: String,
    #[validate(length(max = 50))]
    pub trim: String,
    pub year: String,
    #[validate(length(max = 17))]
    pub vin: String,
    #[validate(length(max = 30))]
    pub color: String,
    pub odometer: String,
    pub condition_rating: String,
    pub acquisition_price: String,
    pub asking_price: String,
    pub date_acquired: String,
    #[validate(length(max = 1000))]
    pub notes: String,
}

impl VehicleForm {
    /// Build a new vehicle from the form
    ///
    /// New vehicles always start `AVAILABLE`; a blank acquisition date means
    /// `today`.
    pub fn to_new_vehicle(&self, today: NaiveDate) -> Result<Vehicle, FormError> {
        let mut vehicle = Vehicle::default();
        self.apply_to(&mut vehicle)?;
        vehicle.status = DEFAULT_STATUS.to_string();
        vehicle.date_acquired = date("date_acquired", &self.date_acquired)?.or(Some(today));
        Ok(vehicle)
    }

    /// Copy the editable fields onto an existing vehicle
    ///
    /// Status, dates and identifiers are left untouched.
    pub fn apply_to(&self, vehicle: &mut Vehicle) -> Result<(), FormError> {
        self.validate()?;

        vehicle.make = self.make.trim().to_string();
        vehicle.model = self.model.trim().to_string();
        vehicle.trim = self.trim.trim().to_string();
        vehicle.year = number("year", &self.year)?;
        vehicle.vin = self.vin.trim().to_uppercase();
        vehicle.color = self.color.trim().to_string();
        vehicle.odometer = number("odometer", &self.odometer)?;
        vehicle.condition_rating = number("condition_rating", &self.condition_rating)?;
        vehicle.acquisition_price = amount("acquisition_price", &self.acquisition_price)?;
        vehicle.asking_price = amount("asking_price", &self.asking_price)?;
        vehicle.notes = self.notes.clone();
        Ok(())
    }
}

impl From<&Vehicle> for VehicleForm {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            make: vehicle.make.clone(),
            model: vehicle.model.clone(),
            trim: vehicle.trim.clone(),
            year: vehicle.year.to_string(),
            vin: vehicle.vin.clone(),
            color: vehicle.color.clone(),
            odometer: vehicle.odometer.to_string(),
            condition_rating: vehicle.condition_rating.to_string(),
            acquisition_price: vehicle.acquisition_price.to_string(),
            asking_price: vehicle.asking_price.to_string(),
            date_acquired: vehicle
                .date_acquired
                .map(|d| d.to_string())
                .unwrap_or_default(),
            notes: vehicle.notes.clone(),
        }
    }
}

/// Status change form submission
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StatusForm {
    #[validate(length(max = 10))]
    pub status: String,
    pub date_sold: String,
    #[validate(length(max = 1000))]
    pub notes: String,
}

impl StatusForm {
    /// Resolve the new status and sale date
    ///
    /// A sale date is only sent for `SOLD`; a blank one means `today`.
    pub fn resolve(&self, today: NaiveDate) -> Result<(String, Option<NaiveDate>), FormError> {
        self.validate()?;

        let status = self.status.trim().to_uppercase();
        if status.is_empty() {
            return Err(FormError::Missing("status"));
        }

        let date_sold = if status == STATUS_SOLD {
            date("date_sold", &self.date_sold)?.or(Some(today))
        } else {
            None
        };

        Ok((status, date_sold))
    }
}

/// Query string accepted by the inventory listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryQuery {
    pub make: String,
    pub model: String,
    pub year_from: String,
    pub year_to: String,
    pub status: Option<String>,
}

impl InventoryQuery {
    /// Status shown in the filter form, `AVAILABLE` unless the caller chose otherwise
    pub fn effective_status(&self) -> &str {
        self.status.as_deref().unwrap_or(DEFAULT_STATUS)
    }

    /// Translate the query into host filter criteria
    ///
    /// Years are only honored when they are all digits; an explicitly empty
    /// status means any status.
    pub fn to_filter(&self) -> VehicleFilter {
        let year = |s: &str| {
            if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
                s.parse().unwrap_or(0)
            } else {
                0
            }
        };

        VehicleFilter {
            make: self.make.clone(),
            model: self.model.clone(),
            year_from: year(&self.year_from),
            year_to: year(&self.year_to),
            status: self.effective_status().to_string(),
            ..VehicleFilter::default()
        }
    }
}

/// Single-vehicle or bulk price adjustment submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceAdjustmentForm {
    pub days_threshold: String,
    pub percentage: String,
    pub preview: Option<String>,
}

impl PriceAdjustmentForm {
    pub fn is_preview(&self) -> bool {
        self.preview.is_some()
    }

    pub fn parse(&self) -> Result<(i32, Amount), FormError> {
        if self.days_threshold.trim().is_empty() {
            return Err(FormError::Missing("days_threshold"));
        }
        if self.percentage.trim().is_empty() {
            return Err(FormError::Missing("percentage"));
        }
        let days = number("days_threshold", &self.days_threshold)?;
        let percentage = amount("percentage", &self.percentage)?;
        Ok((days, percentage))
    }
}

/// Query string accepted by the reports page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsQuery {
    pub start_date: String,
    pub end_date: String,
    pub year: String,
}

impl ReportsQuery {
    pub fn date_range(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>), FormError> {
        Ok((
            date("start_date", &self.start_date)?,
            date("end_date", &self.end_date)?,
        ))
    }

    pub fn year_or(&self, default_year: i32) -> Result<i32, FormError> {
        if self.year.trim().is_empty() {
            Ok(default_year)
        } else {
            number("year", &self.year)
        }
    }
}
