//! Format validation for filter fields.
//!
//! A [`ValidatorRegistry`] compiles each rule's pattern once and is passed to
//! whoever needs it. Validation collects every violation instead of stopping
//! at the first.
//!
//! ```rust
//! use songbook_query::{SongFilter, ValidatorRegistry};
//!
//! let validators = ValidatorRegistry::new().unwrap();
//!
//! // Digit grouping only: no calendar check
//! assert!(validators.validate(&SongFilter::new().release_date("32.13.2020")).is_ok());
//!
//! let errors = validators
//!     .validate(&SongFilter::new().release_date("1.1.2020").link("ftp://x"))
//!     .unwrap_err();
//! assert_eq!(errors.len(), 2);
//! ```

use std::fmt;

use regex_lite::Regex;
use thiserror::Error;

use crate::descriptor::ValidationRule;
use crate::error::{ErrorCode, QueryError, QueryResult};
use crate::query::QueryFilter;

const DATE_PATTERN: &str = r"^\d{2}\.\d{2}\.\d{4}$";

const URL_PATTERN: &str = r"^https?://(?:www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b(?:[-a-zA-Z0-9()@:%_+.~#?&/=]*)$";

/// One field that failed its rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Field name.
    pub field: String,
    /// The rule it failed.
    pub rule: ValidationRule,
    /// The rejected value.
    pub value: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Validation error in field {}: {:?} is not {}",
            self.field,
            self.value,
            self.rule.expectation()
        )
    }
}

/// Every violation found in one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// The individual field errors, in field order.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Number of violated fields.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether nothing was violated.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Names of the violated fields.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.field.as_str())
    }

    fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

/// One line per violated field.
impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl From<ValidationErrors> for QueryError {
    fn from(errors: ValidationErrors) -> Self {
        let mut err = QueryError::new(ErrorCode::InvalidFilter, errors.to_string());
        if let [single] = errors.errors() {
            err = err.with_field(single.field.clone());
        }
        err.with_source(errors)
    }
}

/// Compiled patterns for every [`ValidationRule`].
#[derive(Debug, Clone)]
pub struct ValidatorRegistry {
    date: Regex,
    url: Regex,
}

impl ValidatorRegistry {
    /// Compile the built-in patterns.
    pub fn new() -> QueryResult<Self> {
        Ok(Self {
            date: compile(ValidationRule::Date, DATE_PATTERN)?,
            url: compile(ValidationRule::Url, URL_PATTERN)?,
        })
    }

    /// Check one value against one rule.
    pub fn check(&self, rule: ValidationRule, value: &str) -> bool {
        match rule {
            ValidationRule::Date => self.date.is_match(value),
            ValidationRule::Url => self.url.is_match(value),
        }
    }

    /// Validate every populated field that carries a rule.
    pub fn validate<F: QueryFilter + ?Sized>(&self, filter: &F) -> Result<(), ValidationErrors> {
        self.validate_values(
            filter
                .schema()
                .validated_fields()
                .filter_map(|(field, rule)| Some((field.name, rule, filter.value(field.name)?))),
        )
    }

    /// Validate arbitrary `(field, rule, value)` triples, e.g. an update body.
    ///
    /// Empty values are skipped.
    pub fn validate_values<'a>(
        &self,
        values: impl IntoIterator<Item = (&'a str, ValidationRule, &'a str)>,
    ) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        for (field, rule, value) in values {
            if value.is_empty() || self.check(rule, value) {
                continue;
            }
            errors.push(FieldError {
                field: field.to_string(),
                rule,
                value: value.to_string(),
            });
        }
        errors.into_result()
    }
}

fn compile(rule: ValidationRule, pattern: &str) -> QueryResult<Regex> {
    Regex::new(pattern).map_err(|e| {
        QueryError::internal(format!("invalid {} pattern", rule.name())).with_source(e)
    })
}
