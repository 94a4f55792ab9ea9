//! Typed access to the string-valued hint store.
//!
//! Each hint is a type implementing [`Hint`], which fixes its store key and
//! its value type. [`Hints::get`] and [`Hints::set`] marshal through
//! [`HintValue`], so a value of the wrong type is rejected by the compiler:
//!
//! ```
//! use std::sync::Arc;
//! use mediabind_core::{
//!     hints::{Hints, RenderDriver},
//!     software::SoftwareStore,
//!     Priority,
//! };
//!
//! let hints = Hints::new(Arc::new(SoftwareStore::new()));
//! assert!(hints.set::<RenderDriver>(RenderDriver::OpenGl, Priority::Normal));
//! assert_eq!(hints.get::<RenderDriver>()?, Some(RenderDriver::OpenGl));
//! # Ok::<(), mediabind_core::MediaError>(())
//! ```
//!
//! ```compile_fail
//! use std::sync::Arc;
//! use mediabind_core::{
//!     hints::{DoubleBuffer, Hints},
//!     software::SoftwareStore,
//!     Priority,
//! };
//!
//! let hints = Hints::new(Arc::new(SoftwareStore::new()));
//! hints.set::<DoubleBuffer>(1, Priority::Normal);
//! ```

mod catalog;

use std::{
    collections::BTreeSet,
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

pub use catalog::*;

use crate::{
    config::HintSetting,
    native::{ChangeListener, ConfigStore, ListenerToken, Priority},
    MediaError, Result,
};

/// Value types a hint can be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    UInt,
    Float,
    String,
    Enum,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::String => "string",
            Self::Enum => "enum",
        })
    }
}

/// Conversion between a typed value and its string form in the store.
pub trait HintValue: Sized {
    const KIND: ValueKind;

    fn encode(&self) -> String;

    /// Parses a stored string, returning a reason on failure.
    fn decode(raw: &str) -> std::result::Result<Self, String>;
}

/// Booleans are stored as `"1"` and `"0"`. Decoding is permissive: `"1"` is
/// `true` and every other string is `false`.
impl HintValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn encode(&self) -> String {
        let text = if *self { "1" } else { "0" };
        text.to_owned()
    }

    fn decode(raw: &str) -> std::result::Result<Self, String> {
        Ok(raw == "1")
    }
}

macro_rules! numeric_hint_value {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl HintValue for $ty {
                const KIND: ValueKind = ValueKind::$kind;

                fn encode(&self) -> String {
                    self.to_string()
                }

                fn decode(raw: &str) -> std::result::Result<Self, String> {
                    raw.parse::<$ty>().map_err(|err| err.to_string())
                }
            }
        )*
    };
}

numeric_hint_value!(i32 => Int, u32 => UInt, f32 => Float);

impl HintValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(raw: &str) -> std::result::Result<Self, String> {
        Ok(raw.to_owned())
    }
}

/// A named hint with a fixed value type.
pub trait Hint: 'static {
    /// Key of the hint in the store.
    const NAME: &'static str;

    type Value: HintValue;
}

fn decode<H: Hint>(raw: &str) -> Result<H::Value> {
    H::Value::decode(raw).map_err(|reason| {
        tracing::warn!(hint = H::NAME, value = raw, %reason, "malformed hint value");
        MediaError::malformed(H::NAME, raw, reason)
    })
}

fn validate<H: Hint>(raw: &str) -> std::result::Result<(), String> {
    H::Value::decode(raw).map(|_| ())
}

/// Static description of a declared hint.
#[derive(Clone, Copy)]
pub struct HintInfo {
    pub name: &'static str,
    pub kind: ValueKind,
    /// Canonical encodings for enumerated hints, empty otherwise.
    pub choices: &'static [&'static str],
    validate: fn(&str) -> std::result::Result<(), String>,
}

impl HintInfo {
    /// Checks that `raw` parses as the hint's declared type.
    pub fn validate(&self, raw: &str) -> Result<()> {
        (self.validate)(raw).map_err(|reason| MediaError::malformed(self.name, raw, reason))
    }
}

impl fmt::Debug for HintInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HintInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("choices", &self.choices)
            .finish()
    }
}

/// Looks up a declared hint by its store key.
pub fn lookup(name: &str) -> Option<&'static HintInfo> {
    CATALOG.iter().find(|info| info.name == name)
}

/// One change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HintChange<'a> {
    pub name: &'a str,
    pub old: Option<&'a str>,
    pub new: Option<&'a str>,
}

impl HintChange<'_> {
    pub fn parse_old<H: Hint>(&self) -> Result<Option<H::Value>> {
        self.old.map(decode::<H>).transpose()
    }

    pub fn parse_new<H: Hint>(&self) -> Result<Option<H::Value>> {
        self.new.map(decode::<H>).transpose()
    }
}

/// Typed registry over an injected [`ConfigStore`].
#[derive(Clone)]
pub struct Hints {
    store: Arc<dyn ConfigStore>,
    touched: Arc<Mutex<BTreeSet<&'static str>>>,
}

impl Hints {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            touched: Arc::default(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ConfigStore> {
        &self.store
    }

    /// Reads and parses a hint. `Ok(None)` when the hint is unset.
    pub fn get<H: Hint>(&self) -> Result<Option<H::Value>> {
        self.store
            .get_raw(H::NAME)
            .map(|raw| decode::<H>(&raw))
            .transpose()
    }

    /// Returns the stored string without parsing it.
    pub fn raw<H: Hint>(&self) -> Option<String> {
        self.store.get_raw(H::NAME)
    }

    /// Writes a hint. `false` means a value of higher priority won.
    pub fn set<H: Hint>(&self, value: H::Value, priority: Priority) -> bool {
        self.remember(H::NAME);
        let encoded = value.encode();
        let accepted = self.store.set_raw(H::NAME, &encoded, priority);
        tracing::debug!(hint = H::NAME, value = %encoded, %priority, accepted, "hint write");
        accepted
    }

    /// [`set`](Self::set) with [`Priority::Normal`].
    pub fn set_hint<H: Hint>(&self, value: H::Value) -> bool {
        self.set::<H>(value, Priority::Normal)
    }

    pub fn clear<H: Hint>(&self) {
        self.store.clear(H::NAME);
    }

    /// Resets every declared hint, and every hint this registry has written
    /// or subscribed to, back to unset.
    pub fn clear_all(&self) {
        let touched = self.touched().clone();
        let names = CATALOG
            .iter()
            .map(|info| info.name)
            .chain(touched)
            .collect::<BTreeSet<_>>();

        tracing::debug!(count = names.len(), "clearing hints");
        for name in names {
            self.store.clear(name);
        }
    }

    /// Registers `callback` for changes of `H`. The callback runs
    /// synchronously inside the write that caused the change, including
    /// writes the callback itself performs.
    pub fn add_callback<H, U, F>(&self, user_data: U, callback: F) -> Subscription<U>
    where
        H: Hint,
        U: Send + Sync + 'static,
        F: Fn(&U, &HintChange<'_>) + Send + Sync + 'static,
    {
        self.remember(H::NAME);

        let mut subscription = Subscription {
            hint: H::NAME,
            store: Arc::clone(&self.store),
            token: None,
            connected: Arc::new(AtomicBool::new(false)),
            user_data: Arc::new(user_data),
            callback: Arc::new(callback),
        };
        subscription.connect();
        subscription
    }

    /// Applies untyped settings, typically from a configuration file.
    ///
    /// Every setting is checked against the catalog before anything is
    /// written. Returns how many writes the store accepted.
    pub fn apply_preset(&self, settings: &[HintSetting]) -> Result<usize> {
        let mut resolved = Vec::with_capacity(settings.len());
        for setting in settings {
            let info =
                lookup(&setting.name).ok_or_else(|| MediaError::UnknownHint(setting.name.clone()))?;
            info.validate(&setting.value)?;
            resolved.push(info);
        }

        let mut accepted = 0;
        for (setting, info) in settings.iter().zip(resolved) {
            self.remember(info.name);
            if self.store.set_raw(info.name, &setting.value, setting.priority) {
                accepted += 1;
            } else {
                tracing::debug!(hint = info.name, priority = %setting.priority, "preset value rejected");
            }
        }
        Ok(accepted)
    }

    fn remember(&self, name: &'static str) {
        self.touched().insert(name);
    }

    fn touched(&self) -> MutexGuard<'_, BTreeSet<&'static str>> {
        self.touched.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Hints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hints")
            .field("touched", &self.touched().len())
            .finish()
    }
}

type Callback<U> = Arc<dyn Fn(&U, &HintChange<'_>) + Send + Sync>;

/// Registration of a hint callback. Dropping it disconnects.
pub struct Subscription<U> {
    hint: &'static str,
    store: Arc<dyn ConfigStore>,
    token: Option<ListenerToken>,
    connected: Arc<AtomicBool>,
    user_data: Arc<U>,
    callback: Callback<U>,
}

impl<U> Subscription<U> {
    pub fn hint(&self) -> &'static str {
        self.hint
    }

    pub fn user_data(&self) -> &U {
        &self.user_data
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Stops further invocations, including notifications the store has
    /// already queued. A callback that is already running on another thread
    /// may still complete.
    pub fn disconnect(&mut self) {
        self.connected.store(false, Ordering::Release);
        if let Some(token) = self.token.take() {
            self.store.unregister_change_listener(token);
            tracing::trace!(hint = self.hint, "hint callback disconnected");
        }
    }
}

impl<U: Send + Sync + 'static> Subscription<U> {
    /// Registers the callback again after a disconnect. Returns `false` when
    /// it is already connected.
    pub fn connect(&mut self) -> bool {
        if self.token.is_some() {
            return false;
        }

        // Listeners from an earlier connection keep the old, cleared flag.
        let connected = Arc::new(AtomicBool::new(true));
        let listener: ChangeListener = {
            let connected = Arc::clone(&connected);
            let user_data = Arc::clone(&self.user_data);
            let callback = Arc::clone(&self.callback);
            Arc::new(move |name: &str, old: Option<&str>, new: Option<&str>| {
                if !connected.load(Ordering::Acquire) {
                    return;
                }
                tracing::trace!(hint = name, ?old, ?new, "dispatching hint change");
                callback(user_data.as_ref(), &HintChange { name, old, new });
            })
        };

        self.connected = connected;
        self.token = Some(self.store.register_change_listener(self.hint, listener));
        true
    }
}

impl<U> Drop for Subscription<U> {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl<U: fmt::Debug> fmt::Debug for Subscription<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("hint", &self.hint)
            .field("connected", &self.is_connected())
            .field("user_data", &self.user_data)
            .finish()
    }
}
