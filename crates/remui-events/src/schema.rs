#![forbid(unsafe_code)]

//! Parameter schemas and the lazily rebuilt composite decoder.
//!
//! The registry maps parameter keys to decoders. As handlers register and
//! unregister, their keys are added to or removed from the registry; the
//! single [`CompositeDecoder`] covering the current key set is rebuilt
//! lazily on the next read rather than eagerly on every change.
//!
//! # Invariants
//!
//! 1. The composite decoder always reflects the current key set; a stale
//!    decoder is never returned.
//! 2. The reserved `Action` → string mapping is installed at construction
//!    and can be neither overridden nor removed by callers.
//! 3. At most one schema per key; re-registering a key replaces its decoder
//!    silently (last writer wins).
//! 4. `unregister` of an absent key is a no-op, so double-unregister is safe.
//! 5. Rebuild cost is O(registered keys) and happens at most once per
//!    change, on the next read.
//!
//! Two live handlers sharing a key will clobber each other's schema, both
//! on register and on unregister. The key space is global because the wire
//! envelope is a single object per page; see the repository design notes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use ahash::AHashMap;
use arc_swap::ArcSwap;
use serde_json::Value;
use tracing::{debug, trace};

use remui_core::{ACTION_KEY, DecodeError};

/// Decoder vocabulary for one parameter key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    /// UTF-8 string.
    Str,
    /// Signed integer (rejects fractional numbers).
    Int,
    /// Floating point (accepts integers).
    Float,
    /// Boolean.
    Bool,
    /// Any JSON value, kept as-is.
    Json,
}

impl ParamKind {
    /// Decode `value` for parameter `key`.
    pub fn decode(self, key: &str, value: &Value) -> Result<ParamValue, DecodeError> {
        let mismatch = || DecodeError::BadParameter {
            key: key.to_owned(),
            expected: self.expected(),
            found: value.to_string(),
        };
        match self {
            Self::Str => value
                .as_str()
                .map(|s| ParamValue::Str(s.to_owned()))
                .ok_or_else(mismatch),
            Self::Int => value.as_i64().map(ParamValue::Int).ok_or_else(mismatch),
            Self::Float => value.as_f64().map(ParamValue::Float).ok_or_else(mismatch),
            Self::Bool => value.as_bool().map(ParamValue::Bool).ok_or_else(mismatch),
            Self::Json => Ok(ParamValue::Json(value.clone())),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Int => "integer",
            Self::Float => "number",
            Self::Bool => "boolean",
            Self::Json => "json value",
        }
    }
}

/// A decoded parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// Decoded string.
    Str(String),
    /// Decoded integer.
    Int(i64),
    /// Decoded float.
    Float(f64),
    /// Decoded boolean.
    Bool(bool),
    /// Raw JSON value.
    Json(Value),
}

impl ParamValue {
    /// String view, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view, if this is an integer.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Float view; integers widen.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Boolean view, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Raw JSON view, if this was decoded as raw JSON.
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// One (key, decoder) pair, as declared by a handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyedSchema {
    /// Parameter key in the wire payload.
    pub key: String,
    /// Decoder for that key.
    pub kind: ParamKind,
}

impl KeyedSchema {
    /// Create a keyed schema.
    #[must_use]
    pub fn new(key: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            key: key.into(),
            kind,
        }
    }
}

/// Decoded key/value payload accompanying one inbound event.
///
/// Transient: produced once per event, dropped after dispatch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamBag {
    values: AHashMap<String, ParamValue>,
}

impl ParamBag {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a decoded value. Hosts use this to fabricate synthetic events.
    pub fn insert(&mut self, key: impl Into<String>, value: ParamValue) {
        self.values.insert(key.into(), value);
    }

    /// Look up a decoded value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    /// Whether the bag contains `key`.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The action string, when present.
    #[must_use]
    pub fn action(&self) -> Option<&str> {
        self.values.get(ACTION_KEY).and_then(ParamValue::as_str)
    }

    /// Number of decoded parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Immutable decoder over a fixed key set.
///
/// Snapshots of the registry state; obtain via [`SchemaRegistry::composite`].
#[derive(Debug)]
pub struct CompositeDecoder {
    kinds: AHashMap<String, ParamKind>,
}

impl CompositeDecoder {
    /// Decode a raw JSON payload into a parameter bag.
    ///
    /// Registered keys present in the payload decode with their kind; a
    /// shape mismatch fails the whole decode. Unregistered keys are
    /// ignored. Registered keys absent from the payload are simply absent
    /// from the bag.
    pub fn decode(&self, raw: &str) -> Result<ParamBag, DecodeError> {
        let value: Value =
            serde_json::from_str(raw).map_err(|e| DecodeError::MalformedPayload {
                detail: e.to_string(),
            })?;
        let object = value.as_object().ok_or(DecodeError::NotAnObject)?;

        let mut bag = ParamBag::new();
        for (key, kind) in &self.kinds {
            if let Some(v) = object.get(key) {
                bag.insert(key.clone(), kind.decode(key, v)?);
            }
        }
        Ok(bag)
    }

    /// Whether `key` is part of this decoder's key set.
    #[must_use]
    pub fn accepts(&self, key: &str) -> bool {
        self.kinds.contains_key(key)
    }

    /// Number of keys, the reserved `Action` key included.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.kinds.len()
    }
}

/// Registry of per-key parameter decoders with a lazily rebuilt composite.
///
/// Shared between the router (which feeds it from handler registrations)
/// and the host page (which decodes inbound payloads with the composite).
/// All methods take `&self`; internal state is lock-guarded and the
/// composite snapshot is swapped atomically.
#[derive(Debug)]
pub struct SchemaRegistry {
    kinds: Mutex<AHashMap<String, ParamKind>>,
    dirty: AtomicBool,
    composite: ArcSwap<CompositeDecoder>,
}

impl SchemaRegistry {
    /// Create a registry with the reserved `Action` → string mapping
    /// installed.
    #[must_use]
    pub fn new() -> Self {
        let mut kinds = AHashMap::new();
        kinds.insert(ACTION_KEY.to_owned(), ParamKind::Str);
        let composite = CompositeDecoder {
            kinds: kinds.clone(),
        };
        Self {
            kinds: Mutex::new(kinds),
            dirty: AtomicBool::new(false),
            composite: ArcSwap::from_pointee(composite),
        }
    }

    /// Insert or replace the decoder for a key and mark the composite dirty.
    ///
    /// Re-registering an identical schema is idempotent; a different kind
    /// for an existing key silently overrides it. Attempts to register the
    /// reserved `Action` key are ignored.
    pub fn register(&self, schema: KeyedSchema) {
        if schema.key == ACTION_KEY {
            trace!("ignoring attempt to register reserved key {ACTION_KEY}");
            return;
        }
        let mut kinds = self.kinds.lock().expect("schema registry poisoned");
        let replaced = kinds.insert(schema.key.clone(), schema.kind);
        if replaced.is_some_and(|old| old != schema.kind) {
            debug!(key = %schema.key, "parameter schema overridden");
        }
        self.dirty.store(true, Ordering::Release);
    }

    /// Remove the decoder for a key and mark the composite dirty.
    ///
    /// No-op for absent keys and for the reserved `Action` key.
    pub fn unregister(&self, key: &str) {
        if key == ACTION_KEY {
            return;
        }
        let mut kinds = self.kinds.lock().expect("schema registry poisoned");
        if kinds.remove(key).is_some() {
            self.dirty.store(true, Ordering::Release);
        }
    }

    /// The composite decoder over the current key set.
    ///
    /// Rebuilds only when the key set changed since the last rebuild;
    /// otherwise returns the published snapshot without locking.
    #[must_use]
    pub fn composite(&self) -> Arc<CompositeDecoder> {
        if self.dirty.load(Ordering::Acquire) {
            let kinds = self.kinds.lock().expect("schema registry poisoned");
            // Re-check under the lock: another reader may have rebuilt.
            if self.dirty.swap(false, Ordering::AcqRel) {
                let rebuilt = CompositeDecoder {
                    kinds: kinds.clone(),
                };
                debug!(keys = rebuilt.key_count(), "composite decoder rebuilt");
                self.composite.store(Arc::new(rebuilt));
            }
        }
        self.composite.load_full()
    }

    /// Whether a key is currently registered (`Action` always is).
    #[must_use]
    pub fn is_registered(&self, key: &str) -> bool {
        self.kinds
            .lock()
            .expect("schema registry poisoned")
            .contains_key(key)
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(registry: &SchemaRegistry, raw: &str) -> ParamBag {
        registry.composite().decode(raw).expect("decode")
    }

    #[test]
    fn action_mapping_is_always_present() {
        let registry = SchemaRegistry::new();
        let bag = decode(&registry, r#"{"Action":"tab-1-selected"}"#);
        assert_eq!(bag.action(), Some("tab-1-selected"));
    }

    #[test]
    fn action_key_cannot_be_overridden_or_removed() {
        let registry = SchemaRegistry::new();
        registry.register(KeyedSchema::new("Action", ParamKind::Int));
        registry.unregister("Action");
        let bag = decode(&registry, r#"{"Action":"still-a-string"}"#);
        assert_eq!(bag.action(), Some("still-a-string"));
    }

    #[test]
    fn registered_keys_decode_with_their_kind() {
        let registry = SchemaRegistry::new();
        registry.register(KeyedSchema::new("slot", ParamKind::Int));
        registry.register(KeyedSchema::new("label", ParamKind::Str));

        let bag = decode(&registry, r#"{"Action":"a","slot":4,"label":"hi"}"#);
        assert_eq!(bag.get("slot").and_then(ParamValue::as_int), Some(4));
        assert_eq!(bag.get("label").and_then(ParamValue::as_str), Some("hi"));
    }

    #[test]
    fn unregistered_keys_are_ignored() {
        let registry = SchemaRegistry::new();
        let bag = decode(&registry, r#"{"Action":"a","stray":123}"#);
        assert!(!bag.has("stray"), "unregistered keys must not decode");
    }

    #[test]
    fn wrong_shape_fails_the_decode() {
        let registry = SchemaRegistry::new();
        registry.register(KeyedSchema::new("slot", ParamKind::Int));
        let err = registry
            .composite()
            .decode(r#"{"Action":"a","slot":"four"}"#)
            .expect_err("type mismatch must fail");
        assert!(matches!(err, DecodeError::BadParameter { ref key, .. } if key == "slot"));
    }

    #[test]
    fn malformed_payload_fails() {
        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.composite().decode("not json"),
            Err(DecodeError::MalformedPayload { .. })
        ));
        assert!(matches!(
            registry.composite().decode("[1,2,3]"),
            Err(DecodeError::NotAnObject)
        ));
    }

    #[test]
    fn register_then_unregister_round_trip() {
        // Register A, then B, then unregister A: composite accepts B and
        // Action but no longer A.
        let registry = SchemaRegistry::new();
        registry.register(KeyedSchema::new("A", ParamKind::Str));
        registry.register(KeyedSchema::new("B", ParamKind::Str));
        registry.unregister("A");

        let composite = registry.composite();
        assert!(composite.accepts("B"));
        assert!(composite.accepts("Action"));
        assert!(!composite.accepts("A"));

        let bag = composite
            .decode(r#"{"Action":"a","A":"x","B":"y"}"#)
            .expect("decode");
        assert!(!bag.has("A"), "unregistered key must be ignored");
        assert_eq!(bag.get("B").and_then(ParamValue::as_str), Some("y"));
    }

    #[test]
    fn double_unregister_is_safe() {
        let registry = SchemaRegistry::new();
        registry.register(KeyedSchema::new("A", ParamKind::Str));
        registry.unregister("A");
        registry.unregister("A");
        assert!(!registry.composite().accepts("A"));
    }

    #[test]
    fn last_writer_wins_on_shared_key() {
        let registry = SchemaRegistry::new();
        registry.register(KeyedSchema::new("n", ParamKind::Str));
        registry.register(KeyedSchema::new("n", ParamKind::Int));
        let bag = decode(&registry, r#"{"Action":"a","n":7}"#);
        assert_eq!(
            bag.get("n").and_then(ParamValue::as_int),
            Some(7),
            "the later registration's kind must apply"
        );
    }

    #[test]
    fn composite_is_not_rebuilt_when_clean() {
        let registry = SchemaRegistry::new();
        registry.register(KeyedSchema::new("A", ParamKind::Str));
        let first = registry.composite();
        let second = registry.composite();
        assert!(
            Arc::ptr_eq(&first, &second),
            "clean registry must return the published snapshot"
        );
    }

    #[test]
    fn composite_rebuilds_after_change() {
        let registry = SchemaRegistry::new();
        let before = registry.composite();
        registry.register(KeyedSchema::new("A", ParamKind::Str));
        let after = registry.composite();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(after.accepts("A"));
    }

    #[test]
    fn int_rejects_fractions_float_accepts_ints() {
        let registry = SchemaRegistry::new();
        registry.register(KeyedSchema::new("i", ParamKind::Int));
        registry.register(KeyedSchema::new("f", ParamKind::Float));

        assert!(registry.composite().decode(r#"{"i":1.5}"#).is_err());
        let bag = decode(&registry, r#"{"f":2}"#);
        assert_eq!(bag.get("f").and_then(ParamValue::as_float), Some(2.0));
    }

    #[test]
    fn json_kind_keeps_raw_value() {
        let registry = SchemaRegistry::new();
        registry.register(KeyedSchema::new("blob", ParamKind::Json));
        let bag = decode(&registry, r#"{"blob":{"nested":[1,2]}}"#);
        let raw = bag.get("blob").and_then(ParamValue::as_json).expect("raw");
        assert_eq!(raw["nested"][1], 2);
    }
}
