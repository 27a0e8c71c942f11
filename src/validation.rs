//! Input validation for occurrence seeds.
//!
//! Checks structural integrity of seeds before they are expanded or
//! stored. Detects:
//! - Empty and duplicate IDs
//! - Inverted or empty intervals
//! - Unparsable recurrence text
//! - Seeds without an owner

use std::collections::HashSet;

use crate::models::OccurrenceSeed;
use crate::recurrence::RecurrenceRule;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A seed has an empty ID.
    EmptyId,
    /// Two seeds share the same ID.
    DuplicateId,
    /// A seed's end is not after its start.
    InvalidInterval,
    /// A seed's recurrence text does not parse.
    MalformedRecurrenceRule,
    /// A seed has no owner.
    MissingOwner,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a set of seeds.
///
/// Checks:
/// 1. Every seed has a non-empty, unique ID
/// 2. Every seed's end is after its start
/// 3. Every recurrence rule parses
/// 4. Every seed has an owner
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_seeds(seeds: &[OccurrenceSeed]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for seed in seeds {
        if seed.id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                "Seed with empty ID",
            ));
        } else if !seen.insert(seed.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate seed ID: {}", seed.id),
            ));
        }

        if let Err(err) = seed.interval() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidInterval,
                format!("Seed '{}': {}", seed.id, err),
            ));
        }

        if let Some(text) = &seed.recurrence {
            if let Err(reason) = RecurrenceRule::parse(text) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::MalformedRecurrenceRule,
                    format!("Seed '{}' has malformed recurrence '{}': {}", seed.id, text, reason),
                ));
            }
        }

        if seed.owner_id.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingOwner,
                format!("Seed '{}' has no owner", seed.id),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        log::warn!("Seed validation found {} problems", errors.len());
        Err(errors)
    }
}
