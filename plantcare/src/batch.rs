//! Aggregate results for operations applied to many plants.

/// Results of a per-item operation where failures are isolated.
///
/// Items are kept in input order within each vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome<T, E> {
    /// Results of the items that succeeded.
    pub succeeded: Vec<T>,
    /// Errors of the items that failed.
    pub failed: Vec<E>,
}

impl<T, E> Default for BatchOutcome<T, E> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<T, E> BatchOutcome<T, E> {
    /// Returns `true` if no item failed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Converts to a `Result`, keeping `succeeded` only when nothing failed.
    ///
    /// # Errors
    ///
    /// Returns every collected error if at least one item failed.
    pub fn into_result(self) -> Result<Vec<T>, Vec<E>> {
        if self.failed.is_empty() {
            Ok(self.succeeded)
        } else {
            Err(self.failed)
        }
    }
}

impl<T, E> FromIterator<Result<T, E>> for BatchOutcome<T, E> {
    fn from_iter<I: IntoIterator<Item = Result<T, E>>>(iter: I) -> Self {
        let mut outcome = Self::default();
        for result in iter {
            match result {
                Ok(value) => outcome.succeeded.push(value),
                Err(err) => outcome.failed.push(err),
            }
        }
        outcome
    }
}
