//! Character budget shared by every read of a run.

/// Characters consumed so far against an optional global maximum.
///
/// One value is threaded through all reads of a run, in output order, so each
/// read sees what earlier reads consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadBudget {
    limit: Option<usize>,
    consumed: usize,
}

impl ReadBudget {
    pub fn new(limit: Option<usize>) -> Self {
        Self { limit, consumed: 0 }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// A budget that already has `consumed` characters charged against it.
    pub fn resume(limit: Option<usize>, consumed: usize) -> Self {
        let consumed = match limit {
            Some(max) => consumed.min(max),
            None => consumed,
        };
        Self { limit, consumed }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// `None` when unbounded.
    pub fn remaining(&self) -> Option<usize> {
        self.limit.map(|max| max.saturating_sub(self.consumed))
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == Some(0)
    }

    /// Charge `chars`, pinning at the limit.
    pub(crate) fn charge(&mut self, chars: usize) {
        self.consumed = self.consumed.saturating_add(chars);
        if let Some(max) = self.limit {
            self.consumed = self.consumed.min(max);
        }
    }
}

impl Default for ReadBudget {
    fn default() -> Self {
        Self::unbounded()
    }
}
