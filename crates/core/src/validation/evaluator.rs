//! Rule evaluator: pure logic, no I/O.

use chrono::NaiveDate;
use validator::ValidateEmail;

use super::rules::{FieldRule, RuleCheck, ValidationErrors};
use super::schema::{schema_for, StepSchema};
use crate::fields::{Draft, FieldName};
use crate::step::{WizardStep, ALL_STEPS};

/// Environmental inputs some refinements depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    pub today: NaiveDate,
}

impl ValidationContext {
    /// Context anchored at the current UTC date.
    pub fn today() -> Self {
        Self::at(chrono::Utc::now().date_naive())
    }

    pub fn at(today: NaiveDate) -> Self {
        Self { today }
    }
}

/// Validate the draft subset governed by `step`.
pub fn validate_step(
    step: WizardStep,
    draft: &Draft,
    ctx: &ValidationContext,
) -> Result<(), ValidationErrors> {
    evaluate_schema(schema_for(step), draft, ctx).into_result()
}

/// Validate every step's schema, collecting violations across the whole draft.
pub fn validate_all_steps(draft: &Draft, ctx: &ValidationContext) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for step in ALL_STEPS {
        for (field, message) in evaluate_schema(schema_for(step), draft, ctx).iter() {
            errors.add(field, message);
        }
    }
    errors.into_result()
}

/// Evaluate one schema against a draft.
pub fn evaluate_schema(
    schema: &StepSchema,
    draft: &Draft,
    ctx: &ValidationContext,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for spec in schema.fields {
        if let Some(message) = first_violation(spec.checks, draft.value(spec.field)) {
            errors.add(spec.field, message);
        }
    }

    for refinement in schema.refinements {
        if errors.contains(refinement.field) {
            continue;
        }
        if let Err(message) = (refinement.check)(draft, ctx) {
            errors.add(refinement.field, message);
        }
    }

    errors
}

/// Re-run `field`'s owning schema on `draft` and return only that field's
/// violation, if any.
pub fn validate_field(
    field: FieldName,
    draft: &Draft,
    ctx: &ValidationContext,
) -> Result<(), String> {
    let errors = evaluate_schema(schema_for(field.step()), draft, ctx);
    match errors.get(field) {
        Some(message) => Err(message.to_string()),
        None => Ok(()),
    }
}

fn first_violation(checks: &[RuleCheck], value: &str) -> Option<&'static str> {
    checks
        .iter()
        .find(|check| !rule_passes(&check.rule, value))
        .map(|check| check.message)
}

fn rule_passes(rule: &FieldRule, value: &str) -> bool {
    match rule {
        FieldRule::Required => !value.trim().is_empty(),
        // Everything else only constrains values that are present.
        _ if value.is_empty() => true,
        FieldRule::MinLength(min) => value.chars().count() >= *min,
        FieldRule::MaxLength(max) => value.chars().count() <= *max,
        FieldRule::Pattern(re) => re.is_match(value),
        FieldRule::Email => value.validate_email(),
        FieldRule::OneOf(allowed) => allowed.iter().any(|a| *a == value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::schema::MAX_BIO_LENGTH;

    fn ctx() -> ValidationContext {
        ValidationContext::at(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    fn draft(pairs: &[(FieldName, &str)]) -> Draft {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    fn valid_basic_info() -> Draft {
        draft(&[
            (FieldName::FullName, "Alice Cooper"),
            (FieldName::Username, "alice_99"),
            (FieldName::Email, "a@b.com"),
            (FieldName::Mobile, "9876543210"),
            (FieldName::Gender, "F"),
        ])
    }

    #[test]
    fn basic_info_passes_with_valid_values() {
        assert!(validate_step(WizardStep::BasicInfo, &valid_basic_info(), &ctx()).is_ok());
    }

    #[test]
    fn basic_info_reports_every_bad_field() {
        let d = draft(&[
            (FieldName::FullName, "Al"),
            (FieldName::Username, "ab"),
            (FieldName::Email, "bad"),
            (FieldName::Mobile, "12"),
            (FieldName::Gender, ""),
        ]);
        let errors = validate_step(WizardStep::BasicInfo, &d, &ctx()).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert_eq!(
            errors.get(FieldName::FullName),
            Some("Full name must be at least 3 characters")
        );
        assert_eq!(errors.get(FieldName::Gender), Some("Gender is required"));
        assert_eq!(
            errors.get(FieldName::Email),
            Some("Email must be a valid email address")
        );
    }

    #[test]
    fn missing_fields_fail_required() {
        let errors = validate_step(WizardStep::BasicInfo, &Draft::new(), &ctx()).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert_eq!(errors.get(FieldName::Mobile), Some("Mobile number is required"));
    }

    #[test]
    fn whitespace_only_fails_required() {
        let mut d = valid_basic_info();
        d.set(FieldName::FullName, "   ");
        let errors = validate_step(WizardStep::BasicInfo, &d, &ctx()).unwrap_err();
        assert_eq!(errors.get(FieldName::FullName), Some("Full name is required"));
    }

    #[test]
    fn first_failing_rule_wins() {
        let mut d = valid_basic_info();
        d.set(FieldName::Username, "a!");
        let errors = validate_step(WizardStep::BasicInfo, &d, &ctx()).unwrap_err();
        assert_eq!(
            errors.get(FieldName::Username),
            Some("Username must be at least 3 characters")
        );
    }

    #[test]
    fn length_is_counted_in_characters() {
        let mut d = draft(&[
            (FieldName::ProfilePic, "local://abc/me.png"),
            (FieldName::DateOfBirth, "1990-05-17"),
        ]);
        d.set(FieldName::Bio, "é".repeat(MAX_BIO_LENGTH));
        assert!(validate_step(WizardStep::Profile, &d, &ctx()).is_ok());
        d.set(FieldName::Bio, "é".repeat(MAX_BIO_LENGTH + 1));
        assert!(validate_step(WizardStep::Profile, &d, &ctx()).is_err());
    }

    #[test]
    fn gender_must_be_a_known_code() {
        let mut d = valid_basic_info();
        d.set(FieldName::Gender, "X");
        let errors = validate_step(WizardStep::BasicInfo, &d, &ctx()).unwrap_err();
        assert!(errors.contains(FieldName::Gender));
    }

    #[test]
    fn other_steps_fields_are_ignored() {
        let mut d = valid_basic_info();
        d.set(FieldName::PostalCode, "nope");
        assert!(validate_step(WizardStep::BasicInfo, &d, &ctx()).is_ok());
    }

    #[test]
    fn bio_is_optional_but_bounded() {
        let mut d = draft(&[
            (FieldName::ProfilePic, "local://abc/me.png"),
            (FieldName::DateOfBirth, "1990-05-17"),
        ]);
        assert!(validate_step(WizardStep::Profile, &d, &ctx()).is_ok());
        d.set(FieldName::Bio, "x".repeat(251));
        let errors = validate_step(WizardStep::Profile, &d, &ctx()).unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![FieldName::Bio]);
    }

    #[test]
    fn refinement_skipped_when_field_already_failed() {
        let d = draft(&[
            (FieldName::ProfilePic, "local://abc/me.png"),
            (FieldName::DateOfBirth, "17/05/1990"),
        ]);
        let errors = validate_step(WizardStep::Profile, &d, &ctx()).unwrap_err();
        assert_eq!(
            errors.get(FieldName::DateOfBirth),
            Some("Date of birth must use the YYYY-MM-DD format")
        );
    }

    #[test]
    fn address_refinement_reports_postal_code() {
        let d = draft(&[
            (FieldName::AddressLine, "221B Baker Street"),
            (FieldName::City, "Pune"),
            (FieldName::State, "Maharashtra"),
            (FieldName::Country, "India"),
            (FieldName::PostalCode, "12345"),
        ]);
        let errors = validate_step(WizardStep::Address, &d, &ctx()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.contains(FieldName::PostalCode));
    }

    #[test]
    fn preview_has_nothing_to_validate() {
        assert!(validate_step(WizardStep::Preview, &Draft::new(), &ctx()).is_ok());
    }

    #[test]
    fn validate_all_steps_collects_across_steps() {
        let errors = validate_all_steps(&valid_basic_info(), &ctx()).unwrap_err();
        assert!(!errors.contains(FieldName::Email));
        assert!(errors.contains(FieldName::ProfilePic));
        assert!(errors.contains(FieldName::City));
        assert!(!errors.contains(FieldName::Bio));
    }

    #[test]
    fn validate_field_isolates_one_field() {
        let mut d = valid_basic_info();
        d.set(FieldName::Mobile, "123");
        assert!(validate_field(FieldName::Email, &d, &ctx()).is_ok());
        assert_eq!(
            validate_field(FieldName::Mobile, &d, &ctx()).unwrap_err(),
            "Mobile number must be exactly 10 digits"
        );
    }
}
