//! Survey store: The single shared copy of the user's answers.
//!
//! Every panel reads and writes the same `SurveyState`, so a value entered in
//! one section shows up in every other section that uses it. Listeners are
//! called synchronously, in subscription order, after each change.

use crate::domain::{SurveyState, SurveyUpdate};

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&SurveyState) + Send>;

/// Holds the survey and notifies listeners on change.
pub struct SurveyStore {
    state: SurveyState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl std::fmt::Debug for SurveyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurveyStore")
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for SurveyStore {
    fn default() -> Self {
        Self::new(SurveyState::default())
    }
}

impl SurveyStore {
    #[must_use]
    pub fn new(state: SurveyState) -> Self {
        Self {
            state,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Current answers.
    #[must_use]
    pub fn get(&self) -> &SurveyState {
        &self.state
    }

    /// Merge `update` into the survey and notify listeners.
    ///
    /// An empty update changes nothing and notifies nobody.
    pub fn update(&mut self, update: &SurveyUpdate) {
        if update.is_empty() {
            return;
        }
        self.state.apply(update);
        self.notify();
    }

    /// Restore every answer to its default and notify listeners.
    pub fn reset(&mut self) {
        self.state = SurveyState::default();
        tracing::info!("Survey reset to defaults");
        self.notify();
    }

    /// Register a listener called with the new state after every change.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&SurveyState) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&mut self) {
        let state = &self.state;
        for (_, listener) in &mut self.listeners {
            listener(state);
        }
        tracing::debug!(receivers = self.listeners.len(), "Survey change published");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Sex;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_update_merges_and_keeps_other_fields() {
        let mut store = SurveyStore::default();
        store.update(&SurveyUpdate {
            weight: Some(72.0),
            ..Default::default()
        });
        assert_eq!(store.get().weight, 72.0);
        assert_eq!(store.get().age, SurveyState::default().age);
        assert_eq!(store.get().sex, Sex::Male);
    }

    #[test]
    fn test_listeners_see_new_state() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut store = SurveyStore::default();
        let sink = Arc::clone(&seen);
        store.subscribe(move |state| sink.lock().unwrap().push(state.age));

        store.update(&SurveyUpdate {
            age: Some(30.0),
            ..Default::default()
        });
        store.update(&SurveyUpdate {
            age: Some(31.0),
            ..Default::default()
        });

        assert_eq!(*seen.lock().unwrap(), vec![30.0, 31.0]);
    }

    #[test]
    fn test_empty_update_does_not_notify() {
        let count = Arc::new(Mutex::new(0));
        let mut store = SurveyStore::default();
        let sink = Arc::clone(&count);
        store.subscribe(move |_| *sink.lock().unwrap() += 1);

        store.update(&SurveyUpdate::default());
        assert_eq!(*count.lock().unwrap(), 0);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let count = Arc::new(Mutex::new(0));
        let mut store = SurveyStore::default();
        let sink = Arc::clone(&count);
        let id = store.subscribe(move |_| *sink.lock().unwrap() += 1);

        store.reset();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.reset();

        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut store = SurveyStore::default();
        store.update(&SurveyUpdate {
            sex: Some(Sex::Female),
            cholesterol: Some(250.0),
            ..Default::default()
        });
        store.reset();
        assert_eq!(*store.get(), SurveyState::default());
    }
}
