//! # Intake Normalization
//!
//! Validation and normalization protocol for inbound startup records.
//!
//! Historical import paths (manual entry, spreadsheet import) produced
//! inconsistent field names (`companyName` vs `name`, `founderName` vs
//! `founder`). The canonical schema is enforced here, on write: aliases are
//! accepted at the boundary, one `Profile` shape reaches the stores, and
//! readers never see a variant field again.

use crate::limits::{MAX_INTAKE_BATCH, MAX_NAME_LENGTH, MAX_PROFILE_FIELD_LENGTH};
use crate::model::Profile;
use crate::types::CradleError;
use serde::{Deserialize, Serialize};

// =============================================================================
// INTAKE FORM
// =============================================================================

/// A raw intake submission, tolerant of the field-name variants seen across
/// import paths. Everything is optional at the wire level; `normalize`
/// decides what is actually required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeForm {
    #[serde(alias = "company_name", alias = "companyName")]
    pub name: Option<String>,
    #[serde(alias = "founder_name", alias = "founderName")]
    pub founder: Option<String>,
    #[serde(alias = "founder_email", alias = "founderEmail")]
    pub email: Option<String>,
    #[serde(
        alias = "founder_mobile",
        alias = "founderMobile",
        alias = "mobile"
    )]
    pub phone: Option<String>,
    pub sector: Option<String>,
    #[serde(alias = "stageOfIdea")]
    pub stage_of_idea: Option<String>,
    #[serde(alias = "isRegistered")]
    pub is_registered: Option<bool>,
    #[serde(alias = "hasPatent")]
    pub has_patent: Option<bool>,
    pub website: Option<String>,
}

impl IntakeForm {
    /// Validate and collapse the form into the canonical profile.
    ///
    /// Required: name, founder, email (must look like an address).
    /// Optional fields fall back to documented defaults rather than
    /// persisting an absent variant.
    pub fn normalize(self) -> Result<Profile, CradleError> {
        let name = required_field("name", self.name, MAX_NAME_LENGTH)?;
        let founder = required_field("founder", self.founder, MAX_PROFILE_FIELD_LENGTH)?;
        let email = required_field("email", self.email, MAX_PROFILE_FIELD_LENGTH)?;
        if !looks_like_email(&email) {
            return Err(CradleError::InvalidField(format!(
                "email '{email}' is not a valid address"
            )));
        }

        let phone = optional_field("phone", self.phone, MAX_PROFILE_FIELD_LENGTH)?
            .unwrap_or_default();
        let sector = optional_field("sector", self.sector, MAX_PROFILE_FIELD_LENGTH)?
            .unwrap_or_else(|| "Unspecified".to_string());
        let stage_of_idea = optional_field("stage_of_idea", self.stage_of_idea, MAX_PROFILE_FIELD_LENGTH)?
            .unwrap_or_else(|| "Idea".to_string());
        let website = optional_field("website", self.website, MAX_PROFILE_FIELD_LENGTH)?;

        Ok(Profile {
            name,
            founder,
            email,
            phone,
            sector,
            stage_of_idea,
            is_registered: self.is_registered.unwrap_or(false),
            has_patent: self.has_patent.unwrap_or(false),
            website,
        })
    }

    /// Normalize a batch of forms, rejecting the whole batch if any form is
    /// invalid or the batch exceeds `MAX_INTAKE_BATCH`.
    pub fn normalize_batch(forms: Vec<IntakeForm>) -> Result<Vec<Profile>, CradleError> {
        if forms.len() > MAX_INTAKE_BATCH {
            return Err(CradleError::InvalidField(format!(
                "intake batch of {} exceeds maximum {}",
                forms.len(),
                MAX_INTAKE_BATCH
            )));
        }
        forms.into_iter().map(IntakeForm::normalize).collect()
    }
}

fn required_field(
    field: &str,
    value: Option<String>,
    max: usize,
) -> Result<String, CradleError> {
    match optional_field(field, value, max)? {
        Some(v) => Ok(v),
        None => Err(CradleError::InvalidField(format!("{field} is required"))),
    }
}

/// Trim, drop empties, and bound the length. `None` means "not provided".
fn optional_field(
    field: &str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, CradleError> {
    let Some(raw) = value else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.len() > max {
        return Err(CradleError::InvalidField(format!(
            "{field} length {} exceeds maximum {} bytes",
            trimmed.len(),
            max
        )));
    }
    Ok(Some(trimmed.to_string()))
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !value.chars().any(char::is_whitespace)
}

// =============================================================================
// TESTS
// =============================================================================
