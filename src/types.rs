//! Shared identifier types.

/// Database identifier for a user.
pub type UserId = i64;

/// Database identifier for a form submission.
pub type SubmissionId = i64;
