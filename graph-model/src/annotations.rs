//! FILENAME: graph-model/src/annotations.rs
//! Annotations - notes pinned to date ranges of a graph.
//!
//! Annotations are fetched elsewhere after the data arrives. The model only
//! holds the pending fetch and lets callers queue work for when it resolves.
//! The fetch is shared, so any number of callbacks observe the same result.

use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{Deserialize, Serialize};

/// A note attached to a date or date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub start: String,

    #[serde(default)]
    pub end: Option<String>,

    pub description: String,

    #[serde(default)]
    pub note: Option<String>,
}

type PendingAnnotations = Shared<BoxFuture<'static, Arc<Vec<Annotation>>>>;

/// Holds the in-flight annotation fetch, if one was started.
#[derive(Clone, Default)]
pub struct AnnotationSlot {
    pending: Option<PendingAnnotations>,
}

impl AnnotationSlot {
    pub fn new() -> Self {
        AnnotationSlot { pending: None }
    }

    /// Replaces the pending fetch.
    pub fn set<F>(&mut self, fetch: F)
    where
        F: Future<Output = Vec<Annotation>> + Send + 'static,
    {
        self.pending = Some(fetch.map(Arc::new).boxed().shared());
    }

    pub fn is_set(&self) -> bool {
        self.pending.is_some()
    }

    /// Returns a future that runs `callback` once the fetch resolves, or None
    /// when no fetch was ever set. Nothing runs until the future is polled.
    #[must_use = "the callback only runs when the returned future is polled"]
    pub fn after<C, R>(&self, callback: C) -> Option<impl Future<Output = R>>
    where
        C: FnOnce(&[Annotation]) -> R,
    {
        let pending = self.pending.clone()?;
        Some(async move {
            let annotations = pending.await;
            callback(annotations.as_slice())
        })
    }
}

impl std::fmt::Debug for AnnotationSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationSlot")
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use futures::executor::block_on;

    fn create_annotation(start: &str, description: &str) -> Annotation {
        Annotation {
            start: start.to_string(),
            end: None,
            description: description.to_string(),
            note: None,
        }
    }

    #[test]
    fn test_unset_slot_is_a_no_op() {
        let slot = AnnotationSlot::new();
        assert!(!slot.is_set());
        assert!(slot.after(|_| ()).is_none());
    }

    #[test]
    fn test_callback_sees_resolved_annotations() {
        let mut slot = AnnotationSlot::new();
        slot.set(async { vec![create_annotation("2024-01-01", "Outage")] });

        let described = slot.after(|a| a[0].description.clone()).unwrap();
        assert_eq!(block_on(described), "Outage");
    }

    #[test]
    fn test_callbacks_wait_for_the_fetch() {
        let (tx, rx) = oneshot::channel::<Vec<Annotation>>();
        let mut slot = AnnotationSlot::new();
        slot.set(async move { rx.await.unwrap_or_default() });

        let first = slot.after(|a| a.len()).unwrap();
        let second = slot.after(|a| a.iter().map(|x| x.start.clone()).collect::<Vec<_>>()).unwrap();

        tx.send(vec![
            create_annotation("2024-02-01", "Launch"),
            create_annotation("2024-03-01", "Migration"),
        ])
        .unwrap();

        assert_eq!(block_on(first), 2);
        assert_eq!(block_on(second), vec!["2024-02-01", "2024-03-01"]);
    }

    #[test]
    fn test_annotation_from_json() {
        let a: Annotation = serde_json::from_str(
            r#"{"start": "2024-01-01", "end": "2024-01-07", "description": "Bot cleanup"}"#,
        )
        .unwrap();
        assert_eq!(a.end.as_deref(), Some("2024-01-07"));
        assert_eq!(a.note, None);
    }
}
