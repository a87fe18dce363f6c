/// Nonce attached to a backend request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

/// Remembers the latest request of one visualization so responses to
/// superseded requests can be dropped.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    next: u64,
    latest: Option<RequestId>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&mut self) -> RequestId {
        let id = RequestId(self.next);
        self.next += 1;
        self.latest = Some(id);
        id
    }

    pub fn latest(&self) -> Option<RequestId> {
        self.latest
    }

    /// Retires every outstanding request. Responses to them become stale.
    pub fn invalidate(&mut self) {
        self.latest = None;
    }

    /// True unless `id` is the most recently issued request
    pub fn is_stale(&self, id: RequestId) -> bool {
        self.latest != Some(id)
    }
}
