//! Hard gates run before a section may be confirmed.
//!
//! A validator answers "is this section complete enough to save". It is
//! distinct from `SectionData::completion_percent`, which is display-only.

use folio_types::error::ValidationError;
use folio_types::section::{
    Attendance, BasicInfo, Declaration, Enrollment, Finance, SectionData, SectionKind,
};

/// Validator signature stored in the registry.
pub type Validator = fn(&SectionData) -> Result<(), ValidationError>;

/// The stock validator for a section kind.
pub fn default_validator(kind: SectionKind) -> Validator {
    match kind {
        SectionKind::BasicInfo => validate_basic_info,
        SectionKind::Enrollment => validate_enrollment,
        SectionKind::Attendance => validate_attendance,
        SectionKind::Finance => validate_finance,
        SectionKind::Declaration => validate_declaration,
    }
}

fn missing(field: &str) -> ValidationError {
    ValidationError::MissingField {
        field: field.to_string(),
    }
}

fn require<T: Copy>(value: Option<T>, field: &str) -> Result<T, ValidationError> {
    value.ok_or_else(|| missing(field))
}

fn require_text<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, ValidationError> {
    match value.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(missing(field)),
    }
}

fn out_of_range(field: &str, detail: impl Into<String>) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        detail: detail.into(),
    }
}

fn wrong_kind(expected: SectionKind, data: &SectionData) -> ValidationError {
    ValidationError::SectionMismatch {
        index: 0,
        expected: expected.to_string(),
        actual: data.kind().to_string(),
    }
}

pub fn validate_basic_info(data: &SectionData) -> Result<(), ValidationError> {
    let SectionData::BasicInfo(BasicInfo {
        organisation_name,
        contact_email,
        reporting_year,
    }) = data
    else {
        return Err(wrong_kind(SectionKind::BasicInfo, data));
    };

    require_text(organisation_name, "organisation_name")?;
    let email = require_text(contact_email, "contact_email")?;
    if !email.contains('@') {
        return Err(ValidationError::InvalidValue {
            field: "contact_email".to_string(),
            value: email.to_string(),
        });
    }
    let year = require(*reporting_year, "reporting_year")?;
    if !(2000..=2100).contains(&year) {
        return Err(out_of_range("reporting_year", "must be between 2000 and 2100"));
    }
    Ok(())
}

/// Sub-totals must add up to the declared total.
pub fn validate_enrollment(data: &SectionData) -> Result<(), ValidationError> {
    let SectionData::Enrollment(Enrollment {
        total_enrolled,
        early_years,
        primary,
        secondary,
    }) = data
    else {
        return Err(wrong_kind(SectionKind::Enrollment, data));
    };

    let total = require(*total_enrolled, "total_enrolled")?;
    let parts = [
        require(*early_years, "early_years")?,
        require(*primary, "primary")?,
        require(*secondary, "secondary")?,
    ];
    let sum: i64 = parts.iter().map(|p| i64::from(*p)).sum();
    if sum != i64::from(total) {
        return Err(ValidationError::SumMismatch {
            field: "total_enrolled".to_string(),
            expected: i64::from(total),
            actual: sum,
        });
    }
    Ok(())
}

pub fn validate_attendance(data: &SectionData) -> Result<(), ValidationError> {
    let SectionData::Attendance(Attendance {
        days_open,
        average_attendance_percent,
        ..
    }) = data
    else {
        return Err(wrong_kind(SectionKind::Attendance, data));
    };

    let days = require(*days_open, "days_open")?;
    if !(1..=366).contains(&days) {
        return Err(out_of_range("days_open", "must be between 1 and 366"));
    }
    let percent = require(*average_attendance_percent, "average_attendance_percent")?;
    if percent > 100 {
        return Err(out_of_range("average_attendance_percent", "must not exceed 100"));
    }
    Ok(())
}

pub fn validate_finance(data: &SectionData) -> Result<(), ValidationError> {
    let SectionData::Finance(Finance {
        income_cents,
        expenditure_cents,
        reserves_cents,
    }) = data
    else {
        return Err(wrong_kind(SectionKind::Finance, data));
    };

    let amounts = [
        ("income_cents", Some(require(*income_cents, "income_cents")?)),
        (
            "expenditure_cents",
            Some(require(*expenditure_cents, "expenditure_cents")?),
        ),
        ("reserves_cents", *reserves_cents),
    ];
    for (field, amount) in amounts {
        if amount.is_some_and(|a| a < 0) {
            return Err(out_of_range(field, "must not be negative"));
        }
    }
    Ok(())
}

pub fn validate_declaration(data: &SectionData) -> Result<(), ValidationError> {
    let SectionData::Declaration(Declaration {
        signatory_name,
        confirmed,
        ..
    }) = data
    else {
        return Err(wrong_kind(SectionKind::Declaration, data));
    };

    require_text(signatory_name, "signatory_name")?;
    if !confirmed {
        return Err(missing("confirmed"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enrollment(total: u32, parts: [u32; 3]) -> SectionData {
        SectionData::Enrollment(Enrollment {
            total_enrolled: Some(total),
            early_years: Some(parts[0]),
            primary: Some(parts[1]),
            secondary: Some(parts[2]),
        })
    }

    #[test]
    fn test_enrollment_sum_mismatch() {
        let err = validate_enrollment(&enrollment(10, [2, 3, 2])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::SumMismatch {
                field: "total_enrolled".to_string(),
                expected: 10,
                actual: 7,
            }
        );
    }

    #[test]
    fn test_enrollment_sum_matches() {
        assert!(validate_enrollment(&enrollment(10, [2, 5, 3])).is_ok());
    }

    #[test]
    fn test_enrollment_missing_part() {
        let data = SectionData::Enrollment(Enrollment {
            total_enrolled: Some(10),
            ..Default::default()
        });
        assert_eq!(validate_enrollment(&data).unwrap_err(), missing("early_years"));
    }

    #[test]
    fn test_basic_info_rules() {
        let mut info = BasicInfo {
            organisation_name: Some("Hillside".to_string()),
            contact_email: Some("office.hillside.org".to_string()),
            reporting_year: Some(2026),
        };
        let err = validate_basic_info(&SectionData::BasicInfo(info.clone())).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidValue { .. }));

        info.contact_email = Some("office@hillside.org".to_string());
        assert!(validate_basic_info(&SectionData::BasicInfo(info.clone())).is_ok());

        info.reporting_year = Some(1999);
        let err = validate_basic_info(&SectionData::BasicInfo(info)).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn test_attendance_percent_capped() {
        let data = SectionData::Attendance(Attendance {
            days_open: Some(190),
            average_attendance_percent: Some(101),
            notes: None,
        });
        assert!(matches!(
            validate_attendance(&data),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_finance_rejects_negative_reserves() {
        let data = SectionData::Finance(Finance {
            income_cents: Some(100),
            expenditure_cents: Some(50),
            reserves_cents: Some(-1),
        });
        assert!(matches!(
            validate_finance(&data),
            Err(ValidationError::OutOfRange { field, .. }) if field == "reserves_cents"
        ));
    }

    #[test]
    fn test_declaration_requires_confirmation() {
        let mut decl = Declaration {
            signatory_name: Some("J. Okafor".to_string()),
            signatory_role: None,
            confirmed: false,
        };
        assert!(validate_declaration(&SectionData::Declaration(decl.clone())).is_err());
        decl.confirmed = true;
        assert!(validate_declaration(&SectionData::Declaration(decl)).is_ok());
    }

    #[test]
    fn test_wrong_payload_kind() {
        let err = validate_finance(&SectionKind::BasicInfo.empty_payload()).unwrap_err();
        assert!(matches!(err, ValidationError::SectionMismatch { .. }));
    }
}
