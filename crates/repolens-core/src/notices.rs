use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// A failure that was absorbed instead of propagated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Which operation failed, e.g. "list_commits"
    pub operation: String,
    pub message: String,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.operation, self.message)
    }
}

/// Side channel for user-visible errors. Cloning shares the same list.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    inner: Arc<Mutex<Vec<Notice>>>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, operation: &str, message: impl Into<String>) {
        let notice = Notice {
            operation: operation.to_string(),
            message: message.into(),
        };
        // A poisoned lock only means another holder panicked mid-push
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.push(notice);
    }

    pub fn snapshot(&self) -> Vec<Notice> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Take everything recorded so far, leaving the list empty
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.inner.lock().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_drain() {
        let notices = Notices::new();
        let shared = notices.clone();

        shared.push("list_branches", "Network error: connection refused");
        assert_eq!(notices.len(), 1);
        assert_eq!(
            notices.snapshot()[0].to_string(),
            "list_branches: Network error: connection refused"
        );

        let drained = notices.drain();
        assert_eq!(drained.len(), 1);
        assert!(notices.is_empty());
        assert!(shared.is_empty());
    }
}
