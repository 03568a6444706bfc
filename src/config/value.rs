// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tagged values flowing through properties and the event store.
//!
//! Port and property declarations carry a [`Kind`]; every value carries its
//! own kind through [`Value::kind`]. Declarations are compared kind against
//! kind when the pipeline is built, so a mismatch fails before any event is
//! processed.

use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{Error, Result};
use crate::traits::{InputStreamerHandle, OutputStreamerHandle};

/// The closed set of value kinds understood by ports and properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Bool,
    Int,
    Float,
    Str,
    Ints,
    Floats,
    Strs,
    Ports,
    InputStreamer,
    OutputStreamer,
    /// A user payload, named by its Rust type.
    Object(String),
}

impl Kind {
    /// Kind of the user payload type `T`.
    pub fn object<T: ?Sized + 'static>() -> Kind {
        Kind::Object(std::any::type_name::<T>().to_string())
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::Int => "i64",
            Kind::Float => "f64",
            Kind::Str => "String",
            Kind::Ints => "Vec<i64>",
            Kind::Floats => "Vec<f64>",
            Kind::Strs => "Vec<String>",
            Kind::Ports => "Vec<Port>",
            Kind::InputStreamer => "InputStreamer",
            Kind::OutputStreamer => "OutputStreamer",
            Kind::Object(name) => name,
        };
        f.pad(name)
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let kind = match s.trim() {
            "bool" => Kind::Bool,
            "i64" | "int" => Kind::Int,
            "f64" | "float" => Kind::Float,
            "String" | "string" | "str" => Kind::Str,
            "Vec<i64>" | "ints" => Kind::Ints,
            "Vec<f64>" | "floats" => Kind::Floats,
            "Vec<String>" | "strings" | "strs" => Kind::Strs,
            "Vec<Port>" | "ports" => Kind::Ports,
            "InputStreamer" => Kind::InputStreamer,
            "OutputStreamer" => Kind::OutputStreamer,
            "" => return Err(Error::Config("empty kind name".into())),
            other => Kind::Object(other.to_string()),
        };
        Ok(kind)
    }
}

impl Serialize for Kind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Kind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// A named data item exchanged through the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub kind: Kind,
}

impl Port {
    pub fn new(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A user payload stored as [`Value::Object`].
///
/// `release` is called when the store drains the value at the end of an event.
pub trait Object: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn object_type(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn release(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
    Strs(Vec<String>),
    Ports(Vec<Port>),
    InputStreamer(InputStreamerHandle),
    OutputStreamer(OutputStreamerHandle),
    Object(Arc<dyn Object>),
}

impl Value {
    pub fn object<T: Object>(payload: T) -> Self {
        Value::Object(Arc::new(payload))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::Str,
            Value::Ints(_) => Kind::Ints,
            Value::Floats(_) => Kind::Floats,
            Value::Strs(_) => Kind::Strs,
            Value::Ports(_) => Kind::Ports,
            Value::InputStreamer(_) => Kind::InputStreamer,
            Value::OutputStreamer(_) => Kind::OutputStreamer,
            Value::Object(obj) => Kind::Object(obj.object_type().to_string()),
        }
    }

    /// Typed view of the value, failing with a kind error.
    pub fn to<T: Typed>(&self) -> Result<T> {
        T::from_value(self).ok_or_else(|| Error::Kind {
            expected: T::kind(),
            actual: self.kind(),
        })
    }

    /// Borrow an object payload as its concrete type.
    pub fn downcast_ref<T: Object>(&self) -> Option<&T> {
        match self {
            Value::Object(obj) => obj.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Run the release hook of an object payload; other values are a no-op.
    pub fn release(&self) -> Result<()> {
        match self {
            Value::Object(obj) => obj.release(),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "Bool({v})"),
            Value::Int(v) => write!(f, "Int({v})"),
            Value::Float(v) => write!(f, "Float({v})"),
            Value::Str(v) => write!(f, "Str({v:?})"),
            Value::Ints(v) => write!(f, "Ints({v:?})"),
            Value::Floats(v) => write!(f, "Floats({v:?})"),
            Value::Strs(v) => write!(f, "Strs({v:?})"),
            Value::Ports(v) => write!(f, "Ports({v:?})"),
            Value::InputStreamer(h) => write!(f, "InputStreamer({h:?})"),
            Value::OutputStreamer(h) => write!(f, "OutputStreamer({h:?})"),
            Value::Object(obj) => write!(f, "Object({})", obj.object_type()),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

/// Rust types with a fixed [`Kind`], convertible to and from [`Value`].
pub trait Typed: Clone + Send + Sync + 'static {
    fn kind() -> Kind;
    fn into_value(self) -> Value;
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! typed {
    ($ty:ty, $variant:ident) => {
        impl Typed for $ty {
            fn kind() -> Kind {
                Kind::$variant
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }

        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        }
    };
}

typed!(bool, Bool);
typed!(i64, Int);
typed!(f64, Float);
typed!(String, Str);
typed!(Vec<i64>, Ints);
typed!(Vec<f64>, Floats);
typed!(Vec<String>, Strs);
typed!(Vec<Port>, Ports);
typed!(InputStreamerHandle, InputStreamer);
typed!(OutputStreamerHandle, OutputStreamer);
