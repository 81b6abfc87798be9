//! Admission rules applied to freshly uploaded records.

use crate::types::Record;

/// Outcome of [`admit_upload`] for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// `email` is absent or blank.
    MissingEmail,
    /// `status` is `pending`, compared case-insensitively.
    Pending,
}

/// Decide whether an uploaded record is kept.
///
/// Rules are checked in order and the first failure wins:
///
/// 1. `email` must be present and non-blank after trimming.
/// 2. `status` must not equal `pending` case-insensitively. A missing `status` passes.
pub fn admit_upload(record: &Record<'_>) -> Admission {
    match record.get("email") {
        Some(email) if !email.trim().is_empty() => {}
        _ => return Admission::MissingEmail,
    }

    match record.get("status") {
        Some(status) if status.to_lowercase() == "pending" => Admission::Pending,
        _ => Admission::Admitted,
    }
}
