// src/header/trace_header.rs
use crate::error::{Result, SeisError};
use crate::types::HeaderValue;
use std::collections::HashMap;
use std::sync::Arc;

/// Named values of one trace header.
///
/// Only the fields that were decoded or explicitly set are present, so a
/// missing field and a field holding zero can be told apart with
/// [`exists`](TraceHeader::exists).
///
/// # Example
///
/// ```
/// use seisio::TraceHeader;
///
/// let mut header = TraceHeader::new();
/// header.set_int("cdp", 1001);
/// header.set_real("d1", 0.004);
///
/// assert_eq!(header.get_int("cdp").unwrap(), 1001);
/// assert!(header.is_real("d1"));
/// assert!(!header.exists("offset"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceHeader {
    values: HashMap<Arc<str>, HeaderValue>,
}

impl TraceHeader {
    pub fn new() -> Self {
        TraceHeader { values: HashMap::new() }
    }

    /// Set a field, replacing any previous value
    pub fn set(&mut self, name: &str, value: impl Into<HeaderValue>) {
        self.values.insert(Arc::from(name), value.into());
    }

    pub fn set_int(&mut self, name: &str, value: i64) {
        self.set(name, HeaderValue::Int(value));
    }

    pub fn set_real(&mut self, name: &str, value: f64) {
        self.set(name, HeaderValue::Real(value));
    }

    pub(crate) fn insert_shared(&mut self, name: Arc<str>, value: HeaderValue) {
        self.values.insert(name, value);
    }

    /// Value of a field, failing with `UnknownField` when it is absent
    pub fn get(&self, name: &str) -> Result<HeaderValue> {
        self.values
            .get(name)
            .copied()
            .ok_or_else(|| SeisError::UnknownField(name.to_string()))
    }

    /// Integer value of a field; a real-valued field is a `TypeMismatch`
    pub fn get_int(&self, name: &str) -> Result<i64> {
        let value = self.get(name)?;
        value.as_int().ok_or_else(|| mismatch(name, "integer", &value))
    }

    /// Real value of a field; an integer-valued field is a `TypeMismatch`
    pub fn get_real(&self, name: &str) -> Result<f64> {
        let value = self.get(name)?;
        value.as_real().ok_or_else(|| mismatch(name, "real", &value))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_int(&self, name: &str) -> bool {
        self.values.get(name).map_or(false, HeaderValue::is_int)
    }

    pub fn is_real(&self, name: &str) -> bool {
        self.values.get(name).map_or(false, HeaderValue::is_real)
    }

    pub fn remove(&mut self, name: &str) -> Option<HeaderValue> {
        self.values.remove(name)
    }

    /// Keep only the fields for which `keep` returns true.
    ///
    /// Useful when converting between layouts whose field sets differ.
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &HeaderValue) -> bool) {
        self.values.retain(|name, value| keep(name, value));
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, HeaderValue)> + '_ {
        self.values.iter().map(|(name, value)| (name.as_ref(), *value))
    }
}

fn mismatch(name: &str, expected: &str, found: &HeaderValue) -> SeisError {
    SeisError::TypeMismatch {
        field: name.to_string(),
        expected: expected.to_string(),
        found: found.kind().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_versus_zero() {
        let mut header = TraceHeader::new();
        header.set_int("offset", 0);
        assert!(header.exists("offset"));
        assert_eq!(header.get_int("offset").unwrap(), 0);
        assert!(matches!(header.get("sx"), Err(SeisError::UnknownField(name)) if name == "sx"));
    }

    #[test]
    fn test_typed_getters() {
        let mut header = TraceHeader::new();
        header.set("ns", 500u16);
        header.set("d1", 0.002f64);
        assert!(header.is_int("ns"));
        assert!(!header.is_real("ns"));
        assert_eq!(header.get_real("d1").unwrap(), 0.002);
        assert!(matches!(header.get_real("ns"), Err(SeisError::TypeMismatch { .. })));
        assert!(matches!(header.get_int("d1"), Err(SeisError::TypeMismatch { .. })));
    }

    #[test]
    fn test_set_replaces_and_retain() {
        let mut header = TraceHeader::new();
        header.set_int("cdp", 1);
        header.set_real("cdp", 2.5);
        header.set_int("iline", 7);
        assert_eq!(header.len(), 2);
        assert_eq!(header.get("cdp").unwrap(), HeaderValue::Real(2.5));

        header.retain(|name, _| name != "iline");
        assert_eq!(header.len(), 1);
        assert_eq!(header.remove("cdp"), Some(HeaderValue::Real(2.5)));
        assert!(header.is_empty());
    }
}
