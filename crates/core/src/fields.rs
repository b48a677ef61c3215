//! Draft fields and the draft record.
//!
//! Every field the wizard collects is a [`FieldName`] variant; the draft is
//! keyed by that enum so no part of the core dispatches on raw strings.
//! Strings only appear at the boundary, through [`FieldName::as_str`] and
//! [`FieldName::from_str`](std::str::FromStr).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WizardError;
use crate::step::WizardStep;

// ---------------------------------------------------------------------------
// Field names
// ---------------------------------------------------------------------------

/// A field collected by the onboarding wizard.
///
/// Declaration order is display order; [`Draft`] iterates in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    FullName,
    Username,
    Email,
    Mobile,
    Gender,
    ProfilePic,
    DateOfBirth,
    Bio,
    AddressLine,
    City,
    State,
    Country,
    PostalCode,
}

/// Every field, in display order.
pub const ALL_FIELDS: [FieldName; 13] = [
    FieldName::FullName,
    FieldName::Username,
    FieldName::Email,
    FieldName::Mobile,
    FieldName::Gender,
    FieldName::ProfilePic,
    FieldName::DateOfBirth,
    FieldName::Bio,
    FieldName::AddressLine,
    FieldName::City,
    FieldName::State,
    FieldName::Country,
    FieldName::PostalCode,
];

impl FieldName {
    /// Wire name (camelCase), identical to the serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Username => "username",
            Self::Email => "email",
            Self::Mobile => "mobile",
            Self::Gender => "gender",
            Self::ProfilePic => "profilePic",
            Self::DateOfBirth => "dateOfBirth",
            Self::Bio => "bio",
            Self::AddressLine => "addressLine",
            Self::City => "city",
            Self::State => "state",
            Self::Country => "country",
            Self::PostalCode => "postalCode",
        }
    }

    /// Human-readable label for the field.
    pub fn label(self) -> &'static str {
        match self {
            Self::FullName => "Full name",
            Self::Username => "Username",
            Self::Email => "Email",
            Self::Mobile => "Mobile number",
            Self::Gender => "Gender",
            Self::ProfilePic => "Profile picture",
            Self::DateOfBirth => "Date of birth",
            Self::Bio => "Bio",
            Self::AddressLine => "Address",
            Self::City => "City",
            Self::State => "State",
            Self::Country => "Country",
            Self::PostalCode => "Postal code",
        }
    }

    /// The step whose schema owns this field.
    pub fn step(self) -> WizardStep {
        match self {
            Self::FullName | Self::Username | Self::Email | Self::Mobile | Self::Gender => {
                WizardStep::BasicInfo
            }
            Self::ProfilePic | Self::DateOfBirth | Self::Bio => WizardStep::Profile,
            Self::AddressLine | Self::City | Self::State | Self::Country | Self::PostalCode => {
                WizardStep::Address
            }
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_FIELDS
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| WizardError::UnknownField(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// The in-progress record built up across wizard steps.
///
/// Absent and empty values are equivalent as far as validation is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Draft {
    values: BTreeMap<FieldName, String>,
}

/// Generates a typed read accessor per field.
macro_rules! draft_accessors {
    ($($method:ident => $field:ident),* $(,)?) => {
        impl Draft {
            $(
                #[doc = concat!("Current value of [`FieldName::", stringify!($field), "`] (empty when unset).")]
                pub fn $method(&self) -> &str {
                    self.value(FieldName::$field)
                }
            )*
        }
    };
}

draft_accessors! {
    full_name => FullName,
    username => Username,
    email => Email,
    mobile => Mobile,
    gender => Gender,
    profile_pic => ProfilePic,
    date_of_birth => DateOfBirth,
    bio => Bio,
    address_line => AddressLine,
    city => City,
    state => State,
    country => Country,
    postal_code => PostalCode,
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored value, or `None` if the field was never set.
    pub fn get(&self, field: FieldName) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// The stored value, or `""` if the field was never set.
    pub fn value(&self, field: FieldName) -> &str {
        self.get(field).unwrap_or_default()
    }

    pub fn set(&mut self, field: FieldName, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn remove(&mut self, field: FieldName) -> Option<String> {
        self.values.remove(&field)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterate over set fields in display order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl<S: Into<String>> FromIterator<(FieldName, S)> for Draft {
    fn from_iter<I: IntoIterator<Item = (FieldName, S)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k, v.into())).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
