use thiserror::Error;

/// Failure codes produced by the engine's own rule and condition wrappers.
///
/// Caller-supplied checks are free to use any code they like.
pub mod codes {
    /// The bound value could not be narrowed to the type a typed rule expects.
    pub const TYPE_MISMATCH: &str = "TYPE_MISMATCH";
    /// No data was bound into the context.
    pub const DATA_NOT_FOUND: &str = "DATA_NOT_FOUND";
    /// A rule that loads data in `prepare` was executed without it.
    pub const DATA_NOT_PREPARED: &str = "DATA_NOT_PREPARED";
    /// Every alternative of a disjunctive rule group failed.
    pub const NO_ALTERNATIVE_PASSED: &str = "NO_ALTERNATIVE_PASSED";
}

/// A structured validation failure.
///
/// `field` names what was being checked, `message` is human readable and
/// `code` is a stable identifier meant for routing or localization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("code: {code}, field: {field}, error: {message}")]
#[must_use]
pub struct Failure {
    field: String,
    message: String,
    code: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    causes: Vec<Failure>,
}

impl Failure {
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
            causes: Vec::new(),
        }
    }

    /// Attach the individual failures this one summarizes.
    pub fn with_causes(mut self, causes: Vec<Failure>) -> Self {
        self.causes = causes;
        self
    }

    pub(crate) fn type_mismatch(field: &str, expected: &str, actual: &str) -> Self {
        Self::new(
            field,
            format!("expected data of type {expected}, got {actual}"),
            codes::TYPE_MISMATCH,
        )
    }

    pub(crate) fn data_not_found(field: &str) -> Self {
        Self::new(
            field,
            "validation data not found in context",
            codes::DATA_NOT_FOUND,
        )
    }

    pub(crate) fn data_not_prepared(field: &str) -> Self {
        Self::new(
            field,
            "prepare did not run or did not store data",
            codes::DATA_NOT_PREPARED,
        )
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Failures combined into this one, in the order they occurred. Empty for
    /// ordinary failures.
    #[must_use]
    pub fn causes(&self) -> &[Failure] {
        &self.causes
    }
}
