use std::ops::Deref;

use thiserror::Error;

use crate::Failure;

/// Every failure recorded by one validation run, in the order they were
/// recorded. Empty means the input passed.
///
/// Convert to a `Result` with [`into_result`](Self::into_result) to propagate
/// a rejection with `?`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", summarize(.0))]
#[must_use]
pub struct Failures(Vec<Failure>);

fn summarize(failures: &[Failure]) -> String {
    match failures {
        [] => "no failures".to_owned(),
        [only] => only.to_string(),
        many => {
            let lines: Vec<String> = many.iter().map(Failure::to_string).collect();
            format!("{} failures: {}", many.len(), lines.join("; "))
        }
    }
}

impl Failures {
    pub fn new(failures: Vec<Failure>) -> Self {
        Self(failures)
    }

    /// `Ok(())` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one failure was recorded.
    pub fn into_result(self) -> Result<(), Failures> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Failure codes in order, convenient for assertions and routing.
    #[must_use]
    pub fn codes(&self) -> Vec<&str> {
        self.0.iter().map(Failure::code).collect()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Failure> {
        self.0
    }

    pub(crate) fn push(&mut self, failure: Failure) {
        self.0.push(failure);
    }
}

impl Deref for Failures {
    type Target = [Failure];

    fn deref(&self) -> &[Failure] {
        &self.0
    }
}

impl From<Vec<Failure>> for Failures {
    fn from(failures: Vec<Failure>) -> Self {
        Self(failures)
    }
}

impl FromIterator<Failure> for Failures {
    fn from_iter<I: IntoIterator<Item = Failure>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Failures {
    type Item = Failure;
    type IntoIter = std::vec::IntoIter<Failure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Failures {
    type Item = &'a Failure;
    type IntoIter = std::slice::Iter<'a, Failure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
