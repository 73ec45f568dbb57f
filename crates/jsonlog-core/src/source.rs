//! Attribute sources
//!
//! [`AttributeSource`] is the capability interface the assembler walks. A
//! value reports its [`Kind`] once and is then read through the matching
//! accessors: scalars through [`AttributeSource::scalar`], mappings and
//! objects through [`AttributeSource::keys`] and
//! [`AttributeSource::attribute`], sequences through
//! [`AttributeSource::items`]. Opaque values are handed to the encoder chain.

use crate::error::AccessError;
use serde_json::{Map, Value};
use std::any::Any;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

/// Shape of an attribute value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// JSON primitive (null, bool, number, string)
    Scalar,
    /// Ordered list, rendered whole when it survives filtering
    Sequence,
    /// Keyed children
    Mapping,
    /// Named attributes
    Object,
    /// No known structure; rendered by the encoder chain
    Opaque,
}

impl Kind {
    /// Lower-case name, used in diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Scalar => "scalar",
            Kind::Sequence => "sequence",
            Kind::Mapping => "mapping",
            Kind::Object => "object",
            Kind::Opaque => "opaque",
        }
    }

    /// Mapping or object
    pub fn has_children(&self) -> bool {
        matches!(self, Kind::Mapping | Kind::Object)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A child read from an attribute source, borrowed or computed on access
pub enum Attr<'a> {
    /// Child stored inside the parent
    Borrowed(&'a dyn AttributeSource),
    /// Child computed by the parent on access
    Owned(Box<dyn AttributeSource + 'a>),
}

impl<'a> Attr<'a> {
    /// Wrap a computed child
    pub fn owned(value: impl AttributeSource + 'a) -> Self {
        Attr::Owned(Box::new(value))
    }
}

impl<'a> Deref for Attr<'a> {
    type Target = dyn AttributeSource + 'a;

    fn deref(&self) -> &Self::Target {
        match self {
            Attr::Borrowed(source) => *source,
            Attr::Owned(source) => source.as_ref(),
        }
    }
}

impl fmt::Debug for Attr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Attr")
            .field(&self.kind())
            .field(&self.describe())
            .finish()
    }
}

/// Something the assembler can walk.
///
/// Only [`kind`](AttributeSource::kind) and
/// [`describe`](AttributeSource::describe) are required; the remaining
/// accessors default to "nothing there" and are overridden according to the
/// kind the value reports.
pub trait AttributeSource {
    /// Shape of this value
    fn kind(&self) -> Kind;

    /// JSON form of a scalar
    fn scalar(&self) -> Option<Value> {
        None
    }

    /// Child names of a mapping or object, in the source's natural order
    fn keys(&self) -> Vec<Cow<'_, str>> {
        Vec::new()
    }

    /// Read one child of a mapping or object
    fn attribute(&self, name: &str) -> Result<Attr<'_>, AccessError> {
        match self.kind() {
            Kind::Mapping | Kind::Object => Err(AccessError::Missing(name.to_string())),
            kind => Err(AccessError::NotIntrospectable(kind.as_str())),
        }
    }

    /// Elements of a sequence
    fn items(&self) -> Vec<Attr<'_>> {
        Vec::new()
    }

    /// String form of the value, used when nothing else can render it
    fn describe(&self) -> String;

    /// Concrete value for encoder hooks that downcast
    fn as_any(&self) -> Option<&dyn Any> {
        None
    }
}

impl AttributeSource for Value {
    fn kind(&self) -> Kind {
        match self {
            Value::Array(_) => Kind::Sequence,
            Value::Object(_) => Kind::Mapping,
            _ => Kind::Scalar,
        }
    }

    fn scalar(&self) -> Option<Value> {
        match self {
            Value::Array(_) | Value::Object(_) => None,
            other => Some(other.clone()),
        }
    }

    fn keys(&self) -> Vec<Cow<'_, str>> {
        match self {
            Value::Object(map) => map.keys().map(|k| Cow::Borrowed(k.as_str())).collect(),
            _ => Vec::new(),
        }
    }

    fn attribute(&self, name: &str) -> Result<Attr<'_>, AccessError> {
        match self {
            Value::Object(map) => map.attribute(name),
            other => Err(AccessError::NotIntrospectable(other.kind().as_str())),
        }
    }

    fn items(&self) -> Vec<Attr<'_>> {
        match self {
            Value::Array(items) => items.iter().map(|v| Attr::Borrowed(v)).collect(),
            _ => Vec::new(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl AttributeSource for Map<String, Value> {
    fn kind(&self) -> Kind {
        Kind::Mapping
    }

    fn keys(&self) -> Vec<Cow<'_, str>> {
        self.keys().map(|k| Cow::Borrowed(k.as_str())).collect()
    }

    fn attribute(&self, name: &str) -> Result<Attr<'_>, AccessError> {
        self.get(name)
            .map(|v| Attr::Borrowed(v))
            .ok_or_else(|| AccessError::Missing(name.to_string()))
    }

    fn describe(&self) -> String {
        Value::Object(self.clone()).to_string()
    }
}

impl<T: AttributeSource> AttributeSource for BTreeMap<String, T> {
    fn kind(&self) -> Kind {
        Kind::Mapping
    }

    fn keys(&self) -> Vec<Cow<'_, str>> {
        self.keys().map(|k| Cow::Borrowed(k.as_str())).collect()
    }

    fn attribute(&self, name: &str) -> Result<Attr<'_>, AccessError> {
        self.get(name)
            .map(|v| Attr::Borrowed(v as &dyn AttributeSource))
            .ok_or_else(|| AccessError::Missing(name.to_string()))
    }

    fn describe(&self) -> String {
        format!("<mapping of {} entries>", self.len())
    }
}

impl<T: AttributeSource> AttributeSource for Vec<T> {
    fn kind(&self) -> Kind {
        Kind::Sequence
    }

    fn items(&self) -> Vec<Attr<'_>> {
        self.iter()
            .map(|v| Attr::Borrowed(v as &dyn AttributeSource))
            .collect()
    }

    fn describe(&self) -> String {
        format!("<sequence of {} items>", self.len())
    }
}

impl<T: AttributeSource> AttributeSource for Option<T> {
    fn kind(&self) -> Kind {
        match self {
            Some(inner) => inner.kind(),
            None => Kind::Scalar,
        }
    }

    fn scalar(&self) -> Option<Value> {
        match self {
            Some(inner) => inner.scalar(),
            None => Some(Value::Null),
        }
    }

    fn keys(&self) -> Vec<Cow<'_, str>> {
        self.as_ref().map(T::keys).unwrap_or_default()
    }

    fn attribute(&self, name: &str) -> Result<Attr<'_>, AccessError> {
        match self {
            Some(inner) => inner.attribute(name),
            None => Err(AccessError::NotIntrospectable(Kind::Scalar.as_str())),
        }
    }

    fn items(&self) -> Vec<Attr<'_>> {
        self.as_ref().map(T::items).unwrap_or_default()
    }

    fn describe(&self) -> String {
        match self {
            Some(inner) => inner.describe(),
            None => "None".to_string(),
        }
    }

    fn as_any(&self) -> Option<&dyn Any> {
        self.as_ref().and_then(T::as_any)
    }
}

impl AttributeSource for str {
    fn kind(&self) -> Kind {
        Kind::Scalar
    }

    fn scalar(&self) -> Option<Value> {
        Some(Value::String(self.to_string()))
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl AttributeSource for String {
    fn kind(&self) -> Kind {
        Kind::Scalar
    }

    fn scalar(&self) -> Option<Value> {
        Some(Value::String(self.clone()))
    }

    fn describe(&self) -> String {
        self.clone()
    }
}

impl AttributeSource for &str {
    fn kind(&self) -> Kind {
        Kind::Scalar
    }

    fn scalar(&self) -> Option<Value> {
        Some(Value::String((*self).to_string()))
    }

    fn describe(&self) -> String {
        (*self).to_string()
    }
}

macro_rules! scalar_source {
    ($($ty:ty),* $(,)?) => {
        $(
            impl AttributeSource for $ty {
                fn kind(&self) -> Kind {
                    Kind::Scalar
                }

                fn scalar(&self) -> Option<Value> {
                    Some(Value::from(*self))
                }

                fn describe(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

scalar_source!(bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

/// Wrapper marking a value as opaque.
///
/// The assembler never looks inside; encoder hooks may downcast it through
/// [`AttributeSource::as_any`], and the fallback renders its `Debug` form.
#[derive(Clone, Debug)]
pub struct Opaque<T>(pub T);

impl<T: fmt::Debug + Any> AttributeSource for Opaque<T> {
    fn kind(&self) -> Kind {
        Kind::Opaque
    }

    fn describe(&self) -> String {
        format!("{:?}", self.0)
    }

    fn as_any(&self) -> Option<&dyn Any> {
        Some(&self.0)
    }
}
