//! Static step schemas.
//!
//! Each form step owns an immutable [`StepSchema`]: an ordered list of field
//! rules plus cross-field refinements. Schemas are built once and looked up
//! by step through [`schema_for`].

use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use super::evaluator::ValidationContext;
use super::rules::{FieldRule, RuleCheck};
use crate::fields::{Draft, FieldName};
use crate::step::WizardStep;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Accepted gender codes.
pub const GENDER_CODES: &[&str] = &["M", "F", "O"];

/// Date format expected for `dateOfBirth`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Maximum length of the free-text bio.
pub const MAX_BIO_LENGTH: usize = 250;

static FULL_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z .'\-]*$").expect("valid regex"));
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid regex"));
static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("valid regex"));
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid regex"));
static PIN_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{5}$").expect("valid regex"));
static ZIP_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}(-[0-9]{4})?$").expect("valid regex"));
static POSTAL_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]{1,8}[A-Za-z0-9]$").expect("valid regex")
});

// ---------------------------------------------------------------------------
// Schema types
// ---------------------------------------------------------------------------

/// Ordered rule list for one field. The first failing rule is reported.
#[derive(Debug)]
pub struct FieldSpec {
    pub field: FieldName,
    pub checks: &'static [RuleCheck],
}

/// A check spanning more than one field, reported against `field`.
///
/// Runs only when `field` passed all of its own rules.
pub struct Refinement {
    pub field: FieldName,
    pub check: fn(&Draft, &ValidationContext) -> Result<(), String>,
}

impl fmt::Debug for Refinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refinement")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

/// The validation ruleset gating advancement past one step.
#[derive(Debug)]
pub struct StepSchema {
    pub step: WizardStep,
    pub fields: &'static [FieldSpec],
    pub refinements: &'static [Refinement],
}

impl StepSchema {
    /// Rules declared for `field` on this step, empty if it is not governed here.
    pub fn checks_for(&self, field: FieldName) -> &'static [RuleCheck] {
        self.fields
            .iter()
            .find(|spec| spec.field == field)
            .map(|spec| spec.checks)
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

static BASIC_INFO: StepSchema = StepSchema {
    step: WizardStep::BasicInfo,
    fields: &[
        FieldSpec {
            field: FieldName::FullName,
            checks: &[
                RuleCheck {
                    rule: FieldRule::Required,
                    message: "Full name is required",
                },
                RuleCheck {
                    rule: FieldRule::MinLength(3),
                    message: "Full name must be at least 3 characters",
                },
                RuleCheck {
                    rule: FieldRule::MaxLength(50),
                    message: "Full name must be at most 50 characters",
                },
                RuleCheck {
                    rule: FieldRule::Pattern(&FULL_NAME_RE),
                    message: "Full name may only contain letters, spaces, dots, apostrophes and hyphens",
                },
            ],
        },
        FieldSpec {
            field: FieldName::Username,
            checks: &[
                RuleCheck {
                    rule: FieldRule::Required,
                    message: "Username is required",
                },
                RuleCheck {
                    rule: FieldRule::MinLength(3),
                    message: "Username must be at least 3 characters",
                },
                RuleCheck {
                    rule: FieldRule::MaxLength(20),
                    message: "Username must be at most 20 characters",
                },
                RuleCheck {
                    rule: FieldRule::Pattern(&USERNAME_RE),
                    message: "Username may only contain letters, digits and underscores",
                },
            ],
        },
        FieldSpec {
            field: FieldName::Email,
            checks: &[
                RuleCheck {
                    rule: FieldRule::Required,
                    message: "Email is required",
                },
                RuleCheck {
                    rule: FieldRule::Email,
                    message: "Email must be a valid email address",
                },
            ],
        },
        FieldSpec {
            field: FieldName::Mobile,
            checks: &[
                RuleCheck {
                    rule: FieldRule::Required,
                    message: "Mobile number is required",
                },
                RuleCheck {
                    rule: FieldRule::Pattern(&MOBILE_RE),
                    message: "Mobile number must be exactly 10 digits",
                },
            ],
        },
        FieldSpec {
            field: FieldName::Gender,
            checks: &[
                RuleCheck {
                    rule: FieldRule::Required,
                    message: "Gender is required",
                },
                RuleCheck {
                    rule: FieldRule::OneOf(GENDER_CODES),
                    message: "Gender must be one of: M, F, O",
                },
            ],
        },
    ],
    refinements: &[],
};

static PROFILE: StepSchema = StepSchema {
    step: WizardStep::Profile,
    fields: &[
        FieldSpec {
            field: FieldName::ProfilePic,
            checks: &[RuleCheck {
                rule: FieldRule::Required,
                message: "Profile picture is required",
            }],
        },
        FieldSpec {
            field: FieldName::DateOfBirth,
            checks: &[
                RuleCheck {
                    rule: FieldRule::Required,
                    message: "Date of birth is required",
                },
                RuleCheck {
                    rule: FieldRule::Pattern(&DATE_RE),
                    message: "Date of birth must use the YYYY-MM-DD format",
                },
            ],
        },
        FieldSpec {
            field: FieldName::Bio,
            checks: &[RuleCheck {
                rule: FieldRule::MaxLength(MAX_BIO_LENGTH),
                message: "Bio must be at most 250 characters",
            }],
        },
    ],
    refinements: &[Refinement {
        field: FieldName::DateOfBirth,
        check: date_of_birth_in_past,
    }],
};

static ADDRESS: StepSchema = StepSchema {
    step: WizardStep::Address,
    fields: &[
        FieldSpec {
            field: FieldName::AddressLine,
            checks: &[
                RuleCheck {
                    rule: FieldRule::Required,
                    message: "Address is required",
                },
                RuleCheck {
                    rule: FieldRule::MinLength(5),
                    message: "Address must be at least 5 characters",
                },
                RuleCheck {
                    rule: FieldRule::MaxLength(100),
                    message: "Address must be at most 100 characters",
                },
            ],
        },
        FieldSpec {
            field: FieldName::City,
            checks: &[
                RuleCheck {
                    rule: FieldRule::Required,
                    message: "City is required",
                },
                RuleCheck {
                    rule: FieldRule::MinLength(2),
                    message: "City must be at least 2 characters",
                },
                RuleCheck {
                    rule: FieldRule::MaxLength(50),
                    message: "City must be at most 50 characters",
                },
            ],
        },
        FieldSpec {
            field: FieldName::State,
            checks: &[
                RuleCheck {
                    rule: FieldRule::Required,
                    message: "State is required",
                },
                RuleCheck {
                    rule: FieldRule::MinLength(2),
                    message: "State must be at least 2 characters",
                },
                RuleCheck {
                    rule: FieldRule::MaxLength(50),
                    message: "State must be at most 50 characters",
                },
            ],
        },
        FieldSpec {
            field: FieldName::Country,
            checks: &[
                RuleCheck {
                    rule: FieldRule::Required,
                    message: "Country is required",
                },
                RuleCheck {
                    rule: FieldRule::MinLength(2),
                    message: "Country must be at least 2 characters",
                },
                RuleCheck {
                    rule: FieldRule::MaxLength(56),
                    message: "Country must be at most 56 characters",
                },
            ],
        },
        FieldSpec {
            field: FieldName::PostalCode,
            checks: &[RuleCheck {
                rule: FieldRule::Required,
                message: "Postal code is required",
            }],
        },
    ],
    refinements: &[Refinement {
        field: FieldName::PostalCode,
        check: postal_code_matches_country,
    }],
};

static PREVIEW: StepSchema = StepSchema {
    step: WizardStep::Preview,
    fields: &[],
    refinements: &[],
};

/// Look up the schema gating advancement past `step`.
pub fn schema_for(step: WizardStep) -> &'static StepSchema {
    match step {
        WizardStep::BasicInfo => &BASIC_INFO,
        WizardStep::Profile => &PROFILE,
        WizardStep::Address => &ADDRESS,
        WizardStep::Preview => &PREVIEW,
    }
}

// ---------------------------------------------------------------------------
// Refinements
// ---------------------------------------------------------------------------

fn date_of_birth_in_past(draft: &Draft, ctx: &ValidationContext) -> Result<(), String> {
    let value = draft.date_of_birth().trim();
    if value.is_empty() {
        return Ok(());
    }
    let date = NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|_| format!("'{value}' is not a valid calendar date"))?;
    if date > ctx.today {
        return Err("Date of birth cannot be in the future".to_string());
    }
    Ok(())
}

/// Postal code formats keyed by country.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PostalFormat {
    India,
    UnitedStates,
    Generic,
}

impl PostalFormat {
    fn for_country(country: &str) -> Self {
        match country.trim().to_ascii_lowercase().as_str() {
            "india" | "in" => Self::India,
            "united states" | "united states of america" | "us" | "usa" => Self::UnitedStates,
            _ => Self::Generic,
        }
    }

    fn regex(self) -> &'static Regex {
        match self {
            Self::India => &PIN_CODE_RE,
            Self::UnitedStates => &ZIP_CODE_RE,
            Self::Generic => &POSTAL_CODE_RE,
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::India => "PIN code must be 6 digits and cannot start with 0",
            Self::UnitedStates => "ZIP code must be 5 digits, optionally followed by -4 digits",
            Self::Generic => "Postal code must be 3 to 10 letters, digits, spaces or hyphens",
        }
    }
}

fn postal_code_matches_country(draft: &Draft, _ctx: &ValidationContext) -> Result<(), String> {
    let code = draft.postal_code().trim();
    if code.is_empty() {
        return Ok(());
    }
    let format = PostalFormat::for_country(draft.country());
    if format.regex().is_match(code) {
        Ok(())
    } else {
        Err(format.message().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::ALL_STEPS;

    fn ctx() -> ValidationContext {
        ValidationContext::at(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    #[test]
    fn every_step_resolves_to_its_own_schema() {
        for step in ALL_STEPS {
            assert_eq!(schema_for(step).step, step);
        }
    }

    #[test]
    fn schemas_only_govern_their_own_fields() {
        for step in ALL_STEPS {
            for spec in schema_for(step).fields {
                assert_eq!(spec.field.step(), step);
            }
            for refinement in schema_for(step).refinements {
                assert_eq!(refinement.field.step(), step);
            }
        }
    }

    #[test]
    fn checks_for_unknown_field_is_empty() {
        assert!(schema_for(WizardStep::BasicInfo)
            .checks_for(FieldName::City)
            .is_empty());
        assert_eq!(
            schema_for(WizardStep::BasicInfo)
                .checks_for(FieldName::Email)
                .len(),
            2
        );
    }

    #[test]
    fn date_of_birth_must_be_a_calendar_date() {
        let draft: Draft = [(FieldName::DateOfBirth, "1999-02-30")].into_iter().collect();
        assert!(date_of_birth_in_past(&draft, &ctx()).is_err());
    }

    #[test]
    fn date_of_birth_cannot_be_in_future() {
        let draft: Draft = [(FieldName::DateOfBirth, "2024-06-02")].into_iter().collect();
        assert_eq!(
            date_of_birth_in_past(&draft, &ctx()).unwrap_err(),
            "Date of birth cannot be in the future"
        );
        let today: Draft = [(FieldName::DateOfBirth, "2024-06-01")].into_iter().collect();
        assert!(date_of_birth_in_past(&today, &ctx()).is_ok());
    }

    #[test]
    fn postal_code_follows_country() {
        let cases = [
            ("India", "411001", true),
            ("IN", "011001", false),
            ("india", "41100", false),
            ("US", "94107", true),
            ("United States", "94107-1234", true),
            ("USA", "9410", false),
            ("Germany", "10115", true),
            ("United Kingdom", "SW1A 1AA", true),
            ("Canada", "K1", false),
        ];
        for (country, code, ok) in cases {
            let draft: Draft = [(FieldName::Country, country), (FieldName::PostalCode, code)]
                .into_iter()
                .collect();
            assert_eq!(
                postal_code_matches_country(&draft, &ctx()).is_ok(),
                ok,
                "{country} / {code}"
            );
        }
    }
}
