// src/forms.rs
//! Client-side validation. Everything here runs before any request is made
//! and fails with `ApiError::ValidationFailed`.

use crate::error::ApiError;
use crate::models::{Credentials, FundScheme, NewHolding};

pub const MISSING_FIELDS: &str = "Please fill in all fields";
pub const INVALID_UNITS: &str = "Please enter a valid number of units";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddHoldingForm {
    pub fund_name: String,
    pub units: String,
}

impl AddHoldingForm {
    pub fn new(fund_name: impl Into<String>, units: impl Into<String>) -> Self {
        Self {
            fund_name: fund_name.into(),
            units: units.into(),
        }
    }

    /// Form pre-filled from a scheme picked in the fund browser.
    pub fn for_scheme(scheme: &FundScheme) -> Self {
        Self::new(scheme.scheme_name.clone(), "")
    }

    pub fn validate(&self) -> Result<NewHolding, ApiError> {
        if self.fund_name.trim().is_empty() || self.units.trim().is_empty() {
            return Err(ApiError::validation(MISSING_FIELDS));
        }
        let units = parse_units(&self.units)?;
        Ok(NewHolding {
            fund_name: self.fund_name.clone(),
            units,
        })
    }
}

/// Units must be a finite number strictly greater than zero.
pub fn parse_units(raw: &str) -> Result<f64, ApiError> {
    match raw.trim().parse::<f64>() {
        Ok(units) if units.is_finite() && units > 0.0 => Ok(units),
        _ => Err(ApiError::validation(INVALID_UNITS)),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CredentialsForm {
    pub email: String,
    pub password: String,
}

impl CredentialsForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<Credentials, ApiError> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err(ApiError::validation(MISSING_FIELDS));
        }
        Ok(Credentials::new(email, self.password.clone()))
    }
}
