//! Per-section payload records.
//!
//! Each section of the report has its own record type; `SectionData` is the
//! sum type the engine moves around. Fields are optional because a section
//! is filled in gradually and auto-saved long before it validates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Which record a section slot holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    BasicInfo,
    Enrollment,
    Attendance,
    Finance,
    Declaration,
}

impl SectionKind {
    /// A payload of this kind with every field empty.
    pub fn empty_payload(self) -> SectionData {
        match self {
            SectionKind::BasicInfo => SectionData::BasicInfo(BasicInfo::default()),
            SectionKind::Enrollment => SectionData::Enrollment(Enrollment::default()),
            SectionKind::Attendance => SectionData::Attendance(Attendance::default()),
            SectionKind::Finance => SectionData::Finance(Finance::default()),
            SectionKind::Declaration => SectionData::Declaration(Declaration::default()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::BasicInfo => "basic_info",
            SectionKind::Enrollment => "enrollment",
            SectionKind::Attendance => "attendance",
            SectionKind::Finance => "finance",
            SectionKind::Declaration => "declaration",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field bookkeeping shared by every payload record.
pub trait SectionFields {
    /// Names of the fields, in display order.
    fn field_names(&self) -> &'static [&'static str];

    /// How many fields currently hold a value.
    fn filled_count(&self) -> usize;

    /// Set a field from its textual form. An empty string clears it.
    fn set_field(&mut self, field: &str, value: &str) -> Result<(), ValidationError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub organisation_name: Option<String>,
    pub contact_email: Option<String>,
    pub reporting_year: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub total_enrolled: Option<u32>,
    pub early_years: Option<u32>,
    pub primary: Option<u32>,
    pub secondary: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub days_open: Option<u32>,
    pub average_attendance_percent: Option<u8>,
    pub notes: Option<String>,
}

/// Amounts are in cents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finance {
    pub income_cents: Option<i64>,
    pub expenditure_cents: Option<i64>,
    pub reserves_cents: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub signatory_name: Option<String>,
    pub signatory_role: Option<String>,
    pub confirmed: bool,
}

/// Payload of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum SectionData {
    BasicInfo(BasicInfo),
    Enrollment(Enrollment),
    Attendance(Attendance),
    Finance(Finance),
    Declaration(Declaration),
}

impl SectionData {
    pub fn kind(&self) -> SectionKind {
        match self {
            SectionData::BasicInfo(_) => SectionKind::BasicInfo,
            SectionData::Enrollment(_) => SectionKind::Enrollment,
            SectionData::Attendance(_) => SectionKind::Attendance,
            SectionData::Finance(_) => SectionKind::Finance,
            SectionData::Declaration(_) => SectionKind::Declaration,
        }
    }

    fn fields(&self) -> &dyn SectionFields {
        match self {
            SectionData::BasicInfo(p) => p,
            SectionData::Enrollment(p) => p,
            SectionData::Attendance(p) => p,
            SectionData::Finance(p) => p,
            SectionData::Declaration(p) => p,
        }
    }

    fn fields_mut(&mut self) -> &mut dyn SectionFields {
        match self {
            SectionData::BasicInfo(p) => p,
            SectionData::Enrollment(p) => p,
            SectionData::Attendance(p) => p,
            SectionData::Finance(p) => p,
            SectionData::Declaration(p) => p,
        }
    }

    pub fn field_names(&self) -> &'static [&'static str] {
        self.fields().field_names()
    }

    pub fn filled_count(&self) -> usize {
        self.fields().filled_count()
    }

    /// Rounded share of non-empty fields, 0-100.
    pub fn completion_percent(&self) -> u8 {
        let total = self.field_names().len();
        if total == 0 {
            return 100;
        }
        let filled = self.filled_count().min(total);
        ((200 * filled + total) / (2 * total)) as u8
    }

    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), ValidationError> {
        let kind = self.kind();
        self.fields_mut()
            .set_field(field, value)
            .map_err(|err| match err {
                ValidationError::UnknownField { field, .. } => ValidationError::UnknownField {
                    section: kind.to_string(),
                    field,
                },
                other => other,
            })
    }
}

// ---------------------------------------------------------------------------
// Field parsing helpers
// ---------------------------------------------------------------------------

fn parse_opt<T: std::str::FromStr>(field: &str, value: &str) -> Result<Option<T>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        })
}

fn text_opt(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn unknown(field: &str) -> ValidationError {
    ValidationError::UnknownField {
        section: String::new(),
        field: field.to_string(),
    }
}

fn count_some(flags: &[bool]) -> usize {
    flags.iter().filter(|f| **f).count()
}

// ---------------------------------------------------------------------------
// SectionFields implementations
// ---------------------------------------------------------------------------

impl SectionFields for BasicInfo {
    fn field_names(&self) -> &'static [&'static str] {
        &["organisation_name", "contact_email", "reporting_year"]
    }

    fn filled_count(&self) -> usize {
        count_some(&[
            self.organisation_name.is_some(),
            self.contact_email.is_some(),
            self.reporting_year.is_some(),
        ])
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), ValidationError> {
        match field {
            "organisation_name" => self.organisation_name = text_opt(value),
            "contact_email" => self.contact_email = text_opt(value),
            "reporting_year" => self.reporting_year = parse_opt(field, value)?,
            _ => return Err(unknown(field)),
        }
        Ok(())
    }
}

impl SectionFields for Enrollment {
    fn field_names(&self) -> &'static [&'static str] {
        &["total_enrolled", "early_years", "primary", "secondary"]
    }

    fn filled_count(&self) -> usize {
        count_some(&[
            self.total_enrolled.is_some(),
            self.early_years.is_some(),
            self.primary.is_some(),
            self.secondary.is_some(),
        ])
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), ValidationError> {
        match field {
            "total_enrolled" => self.total_enrolled = parse_opt(field, value)?,
            "early_years" => self.early_years = parse_opt(field, value)?,
            "primary" => self.primary = parse_opt(field, value)?,
            "secondary" => self.secondary = parse_opt(field, value)?,
            _ => return Err(unknown(field)),
        }
        Ok(())
    }
}

impl SectionFields for Attendance {
    fn field_names(&self) -> &'static [&'static str] {
        &["days_open", "average_attendance_percent", "notes"]
    }

    fn filled_count(&self) -> usize {
        count_some(&[
            self.days_open.is_some(),
            self.average_attendance_percent.is_some(),
            self.notes.is_some(),
        ])
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), ValidationError> {
        match field {
            "days_open" => self.days_open = parse_opt(field, value)?,
            "average_attendance_percent" => {
                self.average_attendance_percent = parse_opt(field, value)?
            }
            "notes" => self.notes = text_opt(value),
            _ => return Err(unknown(field)),
        }
        Ok(())
    }
}

impl SectionFields for Finance {
    fn field_names(&self) -> &'static [&'static str] {
        &["income_cents", "expenditure_cents", "reserves_cents"]
    }

    fn filled_count(&self) -> usize {
        count_some(&[
            self.income_cents.is_some(),
            self.expenditure_cents.is_some(),
            self.reserves_cents.is_some(),
        ])
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), ValidationError> {
        match field {
            "income_cents" => self.income_cents = parse_opt(field, value)?,
            "expenditure_cents" => self.expenditure_cents = parse_opt(field, value)?,
            "reserves_cents" => self.reserves_cents = parse_opt(field, value)?,
            _ => return Err(unknown(field)),
        }
        Ok(())
    }
}

impl SectionFields for Declaration {
    fn field_names(&self) -> &'static [&'static str] {
        &["signatory_name", "signatory_role", "confirmed"]
    }

    fn filled_count(&self) -> usize {
        count_some(&[
            self.signatory_name.is_some(),
            self.signatory_role.is_some(),
            self.confirmed,
        ])
    }

    fn set_field(&mut self, field: &str, value: &str) -> Result<(), ValidationError> {
        match field {
            "signatory_name" => self.signatory_name = text_opt(value),
            "signatory_role" => self.signatory_role = text_opt(value),
            "confirmed" => self.confirmed = parse_opt(field, value)?.unwrap_or(false),
            _ => return Err(unknown(field)),
        }
        Ok(())
    }
}
