use crate::{
    log::{Error, INCOMPATIBLE_VALUE},
    value::Value,
};

use serde::Serialize;

use std::collections::HashMap;

/// A collection of named values available to a [`Template`][`crate::Template`]
/// during rendering.
///
/// # Examples
///
/// ```
/// use temper::Store;
///
/// let store = Store::new()
///     .with_must("name", "taro")
///     .with_must("age", 30);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Store {
    data: HashMap<String, Value>,
}

impl Store {
    /// Create a new empty [`Store`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a serializable value under the given name.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the value cannot be serialized.
    pub fn insert<S, T>(&mut self, name: S, value: T) -> Result<&mut Self, Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        let value = serde_json::to_value(value).map_err(|error| {
            Error::build(INCOMPATIBLE_VALUE).with_help(error.to_string())
        })?;
        self.data.insert(name.into(), value.into());

        Ok(self)
    }

    /// Insert a serializable value under the given name.
    ///
    /// # Panics
    ///
    /// Panics when the value cannot be serialized.
    pub fn insert_must<S, T>(&mut self, name: S, value: T) -> &mut Self
    where
        S: Into<String>,
        T: Serialize,
    {
        if let Err(error) = self.insert(name, value) {
            panic!("{error}");
        }

        self
    }

    /// Insert a [`Value`] under the given name.
    ///
    /// Unlike [`insert`][`Store::insert`] this performs no
    /// serialization, so unsigned integers and [`Struct`][`crate::Struct`]
    /// values keep their exact kind.
    pub fn insert_value<S, T>(&mut self, name: S, value: T) -> &mut Self
    where
        S: Into<String>,
        T: Into<Value>,
    {
        self.data.insert(name.into(), value.into());

        self
    }

    /// Return the [`Store`] with the given serializable value inserted.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the value cannot be serialized.
    pub fn with<S, T>(mut self, name: S, value: T) -> Result<Self, Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert(name, value)?;

        Ok(self)
    }

    /// Return the [`Store`] with the given serializable value inserted.
    ///
    /// # Panics
    ///
    /// Panics when the value cannot be serialized.
    pub fn with_must<S, T>(mut self, name: S, value: T) -> Self
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert_must(name, value);

        self
    }

    /// Return the [`Store`] with the given [`Value`] inserted.
    pub fn with_value<S, T>(mut self, name: S, value: T) -> Self
    where
        S: Into<String>,
        T: Into<Value>,
    {
        self.insert_value(name, value);

        self
    }

    /// Return the [`Value`] of the given name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }
}

/// A view over a [`Store`] carrying the local scopes created while a
/// template renders.
///
/// Loop variables live in frames stacked on top of the store, each
/// frame shadowing the names beneath it.
pub(crate) struct Shadow<'store> {
    /// Reference to the underlying [`Store`].
    store: &'store Store,
    /// Stack of local scope frames, innermost last.
    data: Vec<HashMap<String, Value>>,
}

impl<'store> Shadow<'store> {
    /// Create a new [`Shadow`] over the given [`Store`].
    pub fn new(store: &'store Store) -> Self {
        Self {
            store,
            data: Vec::new(),
        }
    }

    /// Push a new empty scope frame.
    pub fn push(&mut self) {
        self.data.push(HashMap::new());
    }

    /// Pop the innermost scope frame.
    pub fn pop(&mut self) {
        self.data.pop();
    }

    /// Insert a [`Value`] into the innermost scope frame.
    ///
    /// Without any frame the value is dropped, so a frame must be
    /// pushed first.
    pub fn insert<S>(&mut self, name: S, value: Value)
    where
        S: Into<String>,
    {
        if let Some(frame) = self.data.last_mut() {
            frame.insert(name.into(), value);
        }
    }

    /// Return the [`Value`] of the given name, checking the innermost
    /// frame first and the [`Store`] last.
    pub fn get(&self, name: &str) -> Option<&Value> {
        for frame in self.data.iter().rev() {
            if let Some(value) = frame.get(name) {
                return Some(value);
            }
        }

        self.store.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::{Shadow, Store};
    use crate::value::Value;

    #[test]
    fn test_store_insert_serializable() {
        let store = Store::new()
            .with_must("name", "taro")
            .with_must("tags", vec!["a", "b"]);

        assert_eq!(store.get("name"), Some(&Value::from("taro")));
        assert_eq!(store.get("tags"), Some(&Value::from(vec!["a", "b"])));
    }

    #[test]
    fn test_shadow_search_order() {
        let store = Store::new().with_must("name", "global");
        let mut shadow = Shadow::new(&store);

        shadow.push();
        shadow.insert("name", Value::from("local"));
        assert_eq!(shadow.get("name"), Some(&Value::from("local")));

        shadow.pop();
        assert_eq!(shadow.get("name"), Some(&Value::from("global")));
    }

    #[test]
    fn test_shadow_inner_frame_wins() {
        let store = Store::new();
        let mut shadow = Shadow::new(&store);

        shadow.push();
        shadow.insert("v", Value::from(1));
        shadow.push();
        shadow.insert("v", Value::from(2));

        assert_eq!(shadow.get("v"), Some(&Value::from(2)));
    }
}
