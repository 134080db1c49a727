pub(crate) mod field;

use std::{
    collections::{BTreeMap, HashMap},
    fmt::{self, Display, Formatter},
};

/// A dynamically typed value that a template may render.
///
/// Anything stored in a [`Store`][`crate::Store`] is converted to a
/// [`Value`] before rendering begins.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// The absence of a value.
    #[default]
    Null,
    Bool(bool),
    /// A signed integer. All signed widths widen to 64 bits.
    Int(i64),
    /// An unsigned integer. All unsigned widths widen to 64 bits.
    Uint(u64),
    /// A float. Both widths widen to 64 bits.
    Float(f64),
    String(String),
    List(Vec<Value>),
    /// A map with string keys, iterated in sorted key order.
    Map(BTreeMap<String, Value>),
    Struct(Struct),
}

impl Value {
    /// Return true if the value is the zero value of its kind.
    ///
    /// A [`Struct`] is zero when every member is zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(value) => !value,
            Self::Int(value) => *value == 0,
            Self::Uint(value) => *value == 0,
            Self::Float(value) => *value == 0.0,
            Self::String(value) => value.is_empty(),
            Self::List(values) => values.is_empty(),
            Self::Map(values) => values.is_empty(),
            Self::Struct(value) => value.members.iter().all(|member| member.value.is_zero()),
        }
    }

    /// A short description of the kind of the value, usable in an
    /// error message.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "a bool",
            Self::Int(_) | Self::Uint(_) => "an integer",
            Self::Float(_) => "a float",
            Self::String(_) => "a string",
            Self::List(_) => "a list",
            Self::Map(_) => "a map",
            Self::Struct(_) => "a struct",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Uint(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value}"),
            Self::List(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, "]")
            }
            Self::Map(values) => {
                write!(f, "{{")?;
                for (i, (key, value)) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Self::Struct(value) => write!(f, "{value}"),
        }
    }
}

/// An ordered collection of named members, mirroring a host struct.
///
/// Member names beginning with an uppercase letter are exported and
/// may be accessed from a template, other members may not.
///
/// # Examples
///
/// ```
/// use temper::{Struct, Value};
///
/// let post = Struct::new()
///     .with("Title", "hello")
///     .with("Views", 42);
/// assert_eq!(post.to_string(), "{Title: hello, Views: 42}");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Struct {
    members: Vec<Member>,
}

#[derive(Debug, Clone, PartialEq)]
struct Member {
    name: String,
    exported: bool,
    value: Value,
}

impl Struct {
    /// Create a new empty [`Struct`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the [`Struct`] with the given member appended.
    pub fn with<T>(mut self, name: &str, value: T) -> Self
    where
        T: Into<Value>,
    {
        let exported = name.chars().next().is_some_and(char::is_uppercase);
        self.members.push(Member {
            name: name.to_string(),
            exported,
            value: value.into(),
        });

        self
    }

    /// Return the value of the member with the given name.
    pub(crate) fn get(&self, name: &str) -> Option<&Value> {
        self.members
            .iter()
            .find(|member| member.name == name)
            .map(|member| &member.value)
    }
}

impl Display for Struct {
    /// Lists the non-zero exported members in declaration order.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let visible = self
            .members
            .iter()
            .filter(|member| member.exported && !member.value.is_zero());
        for (i, member) in visible.enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", member.name, member.value)?;
        }
        write!(f, "}}")
    }
}

impl From<Struct> for Value {
    fn from(value: Struct) -> Self {
        Self::Struct(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

macro_rules! impl_from_int {
    ($($kind:ty)*) => {$(
        impl From<$kind> for Value {
            fn from(value: $kind) -> Self {
                Self::Int(value as i64)
            }
        }
    )*};
}

macro_rules! impl_from_uint {
    ($($kind:ty)*) => {$(
        impl From<$kind> for Value {
            fn from(value: $kind) -> Self {
                Self::Uint(value as u64)
            }
        }
    )*};
}

impl_from_int!(i8 i16 i32 i64 isize);
impl_from_uint!(u8 u16 u32 u64 usize);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T> From<BTreeMap<String, T>> for Value
where
    T: Into<Value>,
{
    fn from(value: BTreeMap<String, T>) -> Self {
        Self::Map(
            value
                .into_iter()
                .map(|(key, value)| (key, value.into()))
                .collect(),
        )
    }
}

impl<T> From<HashMap<String, T>> for Value
where
    T: Into<Value>,
{
    fn from(value: HashMap<String, T>) -> Self {
        Self::Map(
            value
                .into_iter()
                .map(|(key, value)| (key, value.into()))
                .collect(),
        )
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(value) => Self::Bool(value),
            serde_json::Value::Number(value) => {
                if let Some(value) = value.as_i64() {
                    Self::Int(value)
                } else if let Some(value) = value.as_u64() {
                    Self::Uint(value)
                } else {
                    Self::Float(value.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(value) => Self::String(value),
            serde_json::Value::Array(values) => {
                Self::List(values.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(values) => Self::Map(
                values
                    .into_iter()
                    .map(|(key, value)| (key, value.into()))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Struct, Value};

    use std::collections::BTreeMap;

    #[test]
    fn test_display_primitives() {
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(-7).to_string(), "-7");
        assert_eq!(Value::from(10.5).to_string(), "10.5");
        assert_eq!(Value::from("text").to_string(), "text");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn test_display_list() {
        let list = Value::from(vec![1, 2, 3]);

        assert_eq!(list.to_string(), "[1, 2, 3]");
    }

    #[test]
    fn test_display_map_sorted() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), 2);
        map.insert("a".to_string(), 1);

        assert_eq!(Value::from(map).to_string(), "{a: 1, b: 2}");
    }

    #[test]
    fn test_display_struct_skips_hidden() {
        let post = Struct::new()
            .with("Title", "hello")
            .with("Draft", false)
            .with("views", 9);

        assert_eq!(post.to_string(), "{Title: hello}");
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({"name": "taro", "age": 30});
        let value = Value::from(json);

        assert_eq!(value.to_string(), "{age: 30, name: taro}");
    }

    #[test]
    fn test_is_zero() {
        assert!(Value::from(0).is_zero());
        assert!(Value::from("").is_zero());
        assert!(!Value::from(0.1).is_zero());
        assert!(Value::Struct(Struct::new().with("A", 0)).is_zero());
    }
}
