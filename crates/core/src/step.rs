//! Wizard step definitions.

use serde::{Deserialize, Serialize};

use crate::error::WizardError;
use crate::fields::FieldName;

/// Total number of steps in the wizard.
pub const TOTAL_STEPS: u8 = 4;

/// Minimum step number (1-based).
pub const MIN_STEP: u8 = 1;

/// Maximum step number (1-based).
pub const MAX_STEP: u8 = 4;

/// The four steps of the onboarding wizard.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    BasicInfo,
    Profile,
    Address,
    Preview,
}

impl WizardStep {
    /// Convert a 1-based step number to a `WizardStep`.
    pub fn from_number(n: u8) -> Result<Self, WizardError> {
        match n {
            1 => Ok(Self::BasicInfo),
            2 => Ok(Self::Profile),
            3 => Ok(Self::Address),
            4 => Ok(Self::Preview),
            _ => Err(WizardError::InvalidStep(n)),
        }
    }

    /// Convert to a 1-based step number.
    pub fn to_number(self) -> u8 {
        match self {
            Self::BasicInfo => 1,
            Self::Profile => 2,
            Self::Address => 3,
            Self::Preview => 4,
        }
    }

    /// Human-readable label for the step.
    pub fn label(self) -> &'static str {
        match self {
            Self::BasicInfo => "Basic Info",
            Self::Profile => "Profile",
            Self::Address => "Address",
            Self::Preview => "Preview",
        }
    }

    /// The following step, or `None` on the final step.
    pub fn next(self) -> Option<Self> {
        Self::from_number(self.to_number() + 1).ok()
    }

    /// The preceding step, or `None` on the first step.
    pub fn previous(self) -> Option<Self> {
        self.to_number()
            .checked_sub(1)
            .and_then(|n| Self::from_number(n).ok())
    }

    pub fn is_final(self) -> bool {
        self == Self::Preview
    }

    /// Fields collected on this step. The preview step collects none.
    pub fn fields(self) -> &'static [FieldName] {
        match self {
            Self::BasicInfo => &[
                FieldName::FullName,
                FieldName::Username,
                FieldName::Email,
                FieldName::Mobile,
                FieldName::Gender,
            ],
            Self::Profile => &[
                FieldName::ProfilePic,
                FieldName::DateOfBirth,
                FieldName::Bio,
            ],
            Self::Address => &[
                FieldName::AddressLine,
                FieldName::City,
                FieldName::State,
                FieldName::Country,
                FieldName::PostalCode,
            ],
            Self::Preview => &[],
        }
    }
}

/// Every step, in order.
pub const ALL_STEPS: [WizardStep; 4] = [
    WizardStep::BasicInfo,
    WizardStep::Profile,
    WizardStep::Address,
    WizardStep::Preview,
];
