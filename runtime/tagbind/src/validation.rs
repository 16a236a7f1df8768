//! The boundary with struct-level validation.
//!
//! Every adapter hands the target to a [`StructValidator`] once decoding succeeded.
//! `tagbind` doesn't ship validation rules of its own: plug in [`Validators`], with
//! per-type rules, or your own implementation of the trait.
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use smallvec::SmallVec;

/// Check a freshly-bound target.
pub trait StructValidator: Send + Sync {
    /// Types the validator knows nothing about must be reported as valid.
    fn validate_struct(&self, target: &dyn Any) -> Result<(), ValidationError>;
}

/// A type that knows how to validate itself.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

#[derive(Debug, Clone, Copy, Default)]
/// A validator that accepts everything.
pub struct NoValidation;

impl StructValidator for NoValidation {
    fn validate_struct(&self, _target: &dyn Any) -> Result<(), ValidationError> {
        Ok(())
    }
}

type Rule = Arc<dyn Fn(&dyn Any) -> Result<(), ValidationError> + Send + Sync>;

/// Validation rules, keyed by the type they apply to.
///
/// ```rust
/// use tagbind::validation::{StructValidator, ValidationError, Validators};
///
/// struct Signup {
///     email: String,
/// }
///
/// let validators = Validators::new();
/// validators.register(|signup: &Signup| {
///     if signup.email.contains('@') {
///         Ok(())
///     } else {
///         Err(ValidationError::single("email", "must be an email address"))
///     }
/// });
///
/// let invalid = Signup { email: "nope".into() };
/// assert!(validators.validate_struct(&invalid).is_err());
/// // Types without rules are valid.
/// assert!(validators.validate_struct(&42u8).is_ok());
/// ```
#[derive(Default)]
pub struct Validators {
    rules: RwLock<HashMap<TypeId, Rule>>,
}

impl Validators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate values of type `T` with `rule`, replacing any rule previously registered for `T`.
    pub fn register<T, F>(&self, rule: F)
    where
        T: Any,
        F: Fn(&T) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        let rule: Rule = Arc::new(move |target: &dyn Any| match target.downcast_ref::<T>() {
            Some(target) => rule(target),
            None => Ok(()),
        });
        self.rules.write().insert(TypeId::of::<T>(), rule);
    }

    /// Validate values of type `T` with their [`Validate`] implementation.
    pub fn register_validate<T: Validate + Any>(&self) {
        self.register(T::validate);
    }
}

impl StructValidator for Validators {
    fn validate_struct(&self, target: &dyn Any) -> Result<(), ValidationError> {
        let rule = self.rules.read().get(&target.type_id()).cloned();
        match rule {
            Some(rule) => rule(target),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Validators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validators")
            .field("rules", &self.rules.read().len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A rule violated by one field of the target.
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
#[error("The bound data is invalid.{}", render_violations(.violations))]
/// The target was decoded successfully, but it breaks one or more validation rules.
pub struct ValidationError {
    pub violations: SmallVec<[FieldViolation; 2]>,
}

impl ValidationError {
    pub fn new(violations: impl IntoIterator<Item = FieldViolation>) -> Self {
        Self {
            violations: violations.into_iter().collect(),
        }
    }

    /// A single violation.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new([FieldViolation {
            field: field.into(),
            message: message.into(),
        }])
    }

    /// Record one more violation.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.violations.push(FieldViolation {
            field: field.into(),
            message: message.into(),
        });
    }
}

fn render_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|violation| format!("\n- `{}`: {}", violation.field, violation.message))
        .collect()
}
