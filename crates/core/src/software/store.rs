use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::native::{ChangeListener, ConfigStore, ListenerToken, Priority};

/// Hint store with the precedence rules of the wrapped library.
///
/// A write loses against a stored value of higher priority, and an
/// environment value shadows everything except an [`Priority::Override`]
/// write. Listeners fire only when the effective value changes and always
/// run after the store lock has been released.
#[derive(Default)]
pub struct SoftwareStore {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    entries: HashMap<String, Entry>,
    environment: HashMap<String, String>,
    listeners: BTreeMap<ListenerToken, (String, ChangeListener)>,
    next_token: u64,
}

struct Entry {
    value: String,
    priority: Priority,
}

impl State {
    fn effective(&self, name: &str) -> Option<String> {
        let environment = self.environment.get(name);
        match self.entries.get(name) {
            Some(entry) if environment.is_none() || entry.priority == Priority::Override => {
                Some(entry.value.clone())
            }
            _ => environment.cloned(),
        }
    }

    fn listeners_for(&self, name: &str) -> Vec<ChangeListener> {
        self.listeners
            .values()
            .filter(|(hint, _)| hint == name)
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }
}

impl SoftwareStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose hints are pre-seeded by environment values.
    pub fn with_environment<I, K, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let environment = values
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();

        Self {
            state: Mutex::new(State {
                environment,
                ..State::default()
            }),
        }
    }

    /// Number of registered change listeners.
    pub fn listener_count(&self) -> usize {
        self.state().listeners.len()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn notify(name: &str, old: Option<&str>, new: Option<&str>, listeners: Vec<ChangeListener>) {
    for listener in listeners {
        listener(name, old, new);
    }
}

impl ConfigStore for SoftwareStore {
    fn get_raw(&self, name: &str) -> Option<String> {
        self.state().effective(name)
    }

    fn set_raw(&self, name: &str, value: &str, priority: Priority) -> bool {
        let (old, listeners) = {
            let mut state = self.state();

            if priority < Priority::Override && state.environment.contains_key(name) {
                return false;
            }
            if state
                .entries
                .get(name)
                .is_some_and(|entry| entry.priority > priority)
            {
                return false;
            }

            let old = state.effective(name);
            state.entries.insert(
                name.to_owned(),
                Entry {
                    value: value.to_owned(),
                    priority,
                },
            );

            if old.as_deref() == Some(value) {
                return true;
            }
            (old, state.listeners_for(name))
        };

        notify(name, old.as_deref(), Some(value), listeners);
        true
    }

    fn register_change_listener(&self, name: &str, listener: ChangeListener) -> ListenerToken {
        let mut state = self.state();
        state.next_token += 1;
        let token = ListenerToken::new(state.next_token);
        state.listeners.insert(token, (name.to_owned(), listener));
        token
    }

    fn unregister_change_listener(&self, token: ListenerToken) {
        self.state().listeners.remove(&token);
    }

    fn clear(&self, name: &str) {
        let (old, new, listeners) = {
            let mut state = self.state();
            let old = state.effective(name);
            if state.entries.remove(name).is_none() {
                return;
            }
            let new = state.effective(name);
            if old == new {
                return;
            }
            (old, new, state.listeners_for(name))
        };

        notify(name, old.as_deref(), new.as_deref(), listeners);
    }
}

impl std::fmt::Debug for SoftwareStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("SoftwareStore")
            .field("entries", &state.entries.len())
            .field("environment", &state.environment.len())
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Events = Arc<Mutex<Vec<(Option<String>, Option<String>)>>>;

    fn record(store: &SoftwareStore, name: &str) -> (Events, ListenerToken) {
        let events: Events = Arc::default();
        let sink = Arc::clone(&events);
        let token = store.register_change_listener(
            name,
            Arc::new(move |_: &str, old: Option<&str>, new: Option<&str>| {
                sink.lock()
                    .unwrap()
                    .push((old.map(str::to_owned), new.map(str::to_owned)));
            }),
        );
        (events, token)
    }

    #[test]
    fn lower_priority_cannot_replace_higher() {
        let store = SoftwareStore::new();
        assert!(store.set_raw("SDL_RENDER_VSYNC", "1", Priority::Override));
        assert!(!store.set_raw("SDL_RENDER_VSYNC", "0", Priority::Normal));
        assert_eq!(store.get_raw("SDL_RENDER_VSYNC").as_deref(), Some("1"));
        assert!(store.set_raw("SDL_RENDER_VSYNC", "0", Priority::Override));
        assert_eq!(store.get_raw("SDL_RENDER_VSYNC").as_deref(), Some("0"));
    }

    #[test]
    fn clear_forgets_the_stored_priority() {
        let store = SoftwareStore::new();
        assert!(store.set_raw("SDL_RENDER_VSYNC", "1", Priority::Override));
        store.clear("SDL_RENDER_VSYNC");

        assert!(store.set_raw("SDL_RENDER_VSYNC", "0", Priority::Default));
        assert_eq!(store.get_raw("SDL_RENDER_VSYNC").as_deref(), Some("0"));
    }

    #[test]
    fn environment_shadows_non_override_writes() {
        let store = SoftwareStore::with_environment([("SDL_RENDER_DRIVER", "metal")]);
        assert!(!store.set_raw("SDL_RENDER_DRIVER", "opengl", Priority::Normal));
        assert_eq!(store.get_raw("SDL_RENDER_DRIVER").as_deref(), Some("metal"));

        assert!(store.set_raw("SDL_RENDER_DRIVER", "opengl", Priority::Override));
        assert_eq!(store.get_raw("SDL_RENDER_DRIVER").as_deref(), Some("opengl"));

        store.clear("SDL_RENDER_DRIVER");
        assert_eq!(store.get_raw("SDL_RENDER_DRIVER").as_deref(), Some("metal"));
    }

    #[test]
    fn listeners_fire_only_on_change() {
        let store = SoftwareStore::new();
        let (events, _) = record(&store, "SDL_EVENT_LOGGING");

        store.set_raw("SDL_EVENT_LOGGING", "1", Priority::Normal);
        store.set_raw("SDL_EVENT_LOGGING", "1", Priority::Normal);
        store.set_raw("SDL_EVENT_LOGGING", "2", Priority::Normal);
        store.set_raw("SDL_OTHER", "2", Priority::Normal);

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                (None, Some("1".to_string())),
                (Some("1".to_string()), Some("2".to_string())),
            ]
        );
    }

    #[test]
    fn clear_notifies_and_tolerates_unset_hints() {
        let store = SoftwareStore::new();
        let (events, token) = record(&store, "SDL_EVENT_LOGGING");
        let (_, second) = record(&store, "SDL_EVENT_LOGGING");
        assert_ne!(token.id(), second.id());
        store.unregister_change_listener(second);

        store.clear("SDL_EVENT_LOGGING");
        store.set_raw("SDL_EVENT_LOGGING", "1", Priority::Normal);
        store.clear("SDL_EVENT_LOGGING");

        assert_eq!(store.get_raw("SDL_EVENT_LOGGING"), None);
        assert_eq!(events.lock().unwrap().len(), 2);

        store.unregister_change_listener(token);
        assert_eq!(store.listener_count(), 0);
    }

    #[test]
    fn listeners_may_write_reentrantly() {
        let store = Arc::new(SoftwareStore::new());
        let inner = Arc::clone(&store);
        store.register_change_listener(
            "SDL_A",
            Arc::new(move |_: &str, _: Option<&str>, new: Option<&str>| {
                if let Some(value) = new {
                    inner.set_raw("SDL_B", value, Priority::Normal);
                }
            }),
        );

        store.set_raw("SDL_A", "mirrored", Priority::Normal);
        assert_eq!(store.get_raw("SDL_B").as_deref(), Some("mirrored"));
    }
}
