//! Mission setup errors.
//!
//! Every map reference is resolved once by `start_mission`; anything missing
//! there is a configuration defect and aborts setup. Runtime anomalies are
//! never surfaced as errors, only traced.

use thiserror::Error;

use crate::LabelId;

#[derive(Debug, Error)]
pub enum SetupError {
    /// The host has no object, area or position under this label.
    #[error("label '{label}' required by {context} does not exist")]
    MissingLabel { label: LabelId, context: String },

    /// The label exists but refers to the wrong kind of thing.
    #[error("label '{label}' required by {context} is a {found}, expected {expected}")]
    WrongLabelKind {
        label: LabelId,
        context: String,
        expected: &'static str,
        found: &'static str,
    },

    /// Content that cannot drive a mission at all.
    #[error("invalid mission content: {reason}")]
    InvalidContent { reason: String },
}
