//! Onboarding wizard core.
//!
//! Pure domain logic for the multi-step member onboarding form: the field
//! catalogue, per-step validation schemas, the [`wizard::FormWizard`] state
//! machine and the contracts of the collaborators it drives (image upload and
//! submission). Nothing in here touches HTTP or the filesystem.

pub mod error;
pub mod fields;
pub mod step;
pub mod submit;
pub mod types;
pub mod upload;
pub mod validation;
pub mod wizard;

pub use error::WizardError;
pub use fields::{Draft, FieldName};
pub use step::WizardStep;
pub use wizard::{FormWizard, PreviewEditPolicy, WizardSnapshot};
