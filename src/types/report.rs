use std::fmt;
use std::time::Duration;

use crate::Failures;

/// Detailed result of a run, returned by
/// [`validate_detailed()`](crate::validate_detailed).
///
/// Carries the failures, the execution path of every candidate rule in the
/// order evaluation produced them, how many candidates prepared successfully,
/// and the wall-clock duration of the run.
#[derive(Debug, Clone)]
#[must_use]
pub struct ValidationReport {
    failures: Failures,
    candidates: Vec<String>,
    prepared: usize,
    duration: Duration,
}

impl ValidationReport {
    pub(crate) fn new(
        failures: Failures,
        candidates: Vec<String>,
        prepared: usize,
        duration: Duration,
    ) -> Self {
        Self {
            failures,
            candidates,
            prepared,
            duration,
        }
    }

    pub fn failures(&self) -> &Failures {
        &self.failures
    }

    pub fn into_failures(self) -> Failures {
        self.failures
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }

    /// Execution paths of the candidate rules, in evaluation order.
    #[must_use]
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Number of candidates whose `prepare` succeeded and which were executed.
    #[must_use]
    pub fn prepared(&self) -> usize {
        self.prepared
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.passed() {
            write!(f, "passed")?;
        } else {
            write!(f, "failed: [{}]", self.failures.codes().join(", "))?;
        }
        write!(
            f,
            ", candidates: {}, executed: {}",
            self.candidates.len(),
            self.prepared
        )?;
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}
