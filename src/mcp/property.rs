//! Typed tool parameters and argument binding.
//!
//! A [`PropertyList`] plays two roles:
//!
//! 1. **Schema** — carried by a tool, it declares the parameters the tool
//!    accepts: name, kind, optional default, and (for integers) an
//!    optional inclusive range.
//! 2. **Binding** — produced by [`PropertyList::bind`] from a JSON-RPC
//!    `arguments` object, it holds the concrete values a handler sees.
//!
//! A property is *required* exactly when it has no default value.
//! Binding never mutates the schema; it produces a fresh list whose
//! entries mirror the schema with every value slot filled.

use serde_json::{json, Map, Value};
use thiserror::Error;

/// The kind of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// A JSON boolean.
    Boolean,
    /// A JSON integer (no fractional part).
    Integer,
    /// A JSON string.
    String,
}

impl PropertyKind {
    /// Returns the JSON Schema type name for this kind.
    #[must_use]
    pub const fn json_type(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::String => "string",
        }
    }
}

/// A concrete parameter value, matching one of the three kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// Boolean value.
    Boolean(bool),
    /// Integer value.
    Integer(i64),
    /// String value.
    String(String),
}

impl PropertyValue {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> PropertyKind {
        match self {
            Self::Boolean(_) => PropertyKind::Boolean,
            Self::Integer(_) => PropertyKind::Integer,
            Self::String(_) => PropertyKind::String,
        }
    }

    /// Converts this value into its JSON representation.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Boolean(b) => json!(b),
            Self::Integer(i) => json!(i),
            Self::String(s) => json!(s),
        }
    }
}

/// Errors raised while declaring a schema.
///
/// These are programmer errors in tool registration code, not peer-visible
/// protocol faults.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// The property name was empty.
    #[error("property name cannot be empty")]
    EmptyName,

    /// The declared default lies outside the declared range.
    #[error("default value {default} for '{name}' is outside [{min}, {max}]")]
    DefaultOutOfRange {
        /// Property name.
        name: String,
        /// The offending default.
        default: i64,
        /// Lower bound (inclusive).
        min: i64,
        /// Upper bound (inclusive).
        max: i64,
    },

    /// A property with the same name already exists in the list.
    #[error("duplicate property name '{name}'")]
    DuplicateName {
        /// The colliding name.
        name: String,
    },
}

/// Errors raised while binding a JSON `arguments` object to a schema.
///
/// The `Display` text of these variants is what the peer sees inside the
/// `"Error: …"` content item of a tool-call result.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BindError {
    /// A required argument was not supplied.
    #[error("Missing required argument '{name}'")]
    MissingArgument {
        /// Property name.
        name: String,
    },

    /// The supplied JSON value does not match the declared kind.
    #[error("Argument '{name}' must be of type {expected}")]
    KindMismatch {
        /// Property name.
        name: String,
        /// The JSON type the schema declares.
        expected: &'static str,
    },

    /// An integer argument lies outside the declared range.
    #[error("Argument '{name}' value {value} is outside the allowed range [{min}, {max}]")]
    OutOfRange {
        /// Property name.
        name: String,
        /// The offending value.
        value: i64,
        /// Lower bound (inclusive).
        min: i64,
        /// Upper bound (inclusive).
        max: i64,
    },

    /// An argument not declared in the schema was supplied (strict mode).
    #[error("Unexpected argument '{name}'")]
    UnexpectedArgument {
        /// The undeclared name.
        name: String,
    },
}

/// A named, typed tool parameter.
///
/// The value slot holds the declared default in a schema, or the bound
/// value in a binding produced by [`PropertyList::bind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    name: String,
    kind: PropertyKind,
    value: Option<PropertyValue>,
    range: Option<(i64, i64)>,
}

impl Property {
    /// Creates a boolean property. `default: None` makes it required.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyName`] if `name` is empty.
    pub fn boolean(name: impl Into<String>, default: Option<bool>) -> Result<Self, SchemaError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SchemaError::EmptyName);
        }
        Ok(Self {
            name,
            kind: PropertyKind::Boolean,
            value: default.map(PropertyValue::Boolean),
            range: None,
        })
    }

    /// Creates an integer property without a range. `default: None` makes
    /// it required.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyName`] if `name` is empty.
    pub fn integer(name: impl Into<String>, default: Option<i64>) -> Result<Self, SchemaError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SchemaError::EmptyName);
        }
        Ok(Self {
            name,
            kind: PropertyKind::Integer,
            value: default.map(PropertyValue::Integer),
            range: None,
        })
    }

    /// Creates an integer property with an inclusive `[min, max]` range.
    ///
    /// When `max <= min` the range is treated as absent, matching the
    /// behaviour of a plain [`Property::integer`].
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyName`] if `name` is empty, or
    /// [`SchemaError::DefaultOutOfRange`] if the default lies outside the
    /// range.
    pub fn integer_in_range(
        name: impl Into<String>,
        default: Option<i64>,
        min: i64,
        max: i64,
    ) -> Result<Self, SchemaError> {
        let mut prop = Self::integer(name, default)?;
        if max <= min {
            return Ok(prop);
        }
        if let Some(d) = default {
            if d < min || d > max {
                return Err(SchemaError::DefaultOutOfRange {
                    name: prop.name,
                    default: d,
                    min,
                    max,
                });
            }
        }
        prop.range = Some((min, max));
        Ok(prop)
    }

    /// Creates a string property. `default: None` makes it required.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyName`] if `name` is empty.
    pub fn string(
        name: impl Into<String>,
        default: Option<impl Into<String>>,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SchemaError::EmptyName);
        }
        Ok(Self {
            name,
            kind: PropertyKind::String,
            value: default.map(|d| PropertyValue::String(d.into())),
            range: None,
        })
    }

    /// Returns the property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the property kind.
    #[must_use]
    pub const fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// Returns the value slot: the default in a schema, the bound value in
    /// a binding.
    #[must_use]
    pub const fn value(&self) -> Option<&PropertyValue> {
        self.value.as_ref()
    }

    /// Returns the inclusive integer range, if declared.
    #[must_use]
    pub const fn range(&self) -> Option<(i64, i64)> {
        self.range
    }

    /// Whether this property must be supplied by the caller.
    ///
    /// A property is required exactly when it carries no default.
    #[must_use]
    pub const fn required(&self) -> bool {
        self.value.is_none()
    }

    /// Returns the boolean value, if this property holds one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            Some(PropertyValue::Boolean(b)) => Some(b),
            _ => None,
        }
    }

    /// Returns the integer value, if this property holds one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self.value {
            Some(PropertyValue::Integer(i)) => Some(i),
            _ => None,
        }
    }

    /// Returns the string value, if this property holds one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            Some(PropertyValue::String(s)) => Some(s),
            _ => None,
        }
    }

    /// Parses a raw JSON argument into a value of this property's kind,
    /// enforcing the declared range.
    fn parse_value(&self, raw: &Value) -> Result<PropertyValue, BindError> {
        let mismatch = || BindError::KindMismatch {
            name: self.name.clone(),
            expected: self.kind.json_type(),
        };

        match self.kind {
            PropertyKind::Boolean => raw.as_bool().map(PropertyValue::Boolean).ok_or_else(mismatch),
            PropertyKind::Integer => {
                // as_i64 rejects floats with a fractional part
                let value = raw.as_i64().ok_or_else(mismatch)?;
                if let Some((min, max)) = self.range {
                    if value < min || value > max {
                        return Err(BindError::OutOfRange {
                            name: self.name.clone(),
                            value,
                            min,
                            max,
                        });
                    }
                }
                Ok(PropertyValue::Integer(value))
            }
            PropertyKind::String => raw
                .as_str()
                .map(|s| PropertyValue::String(s.to_string()))
                .ok_or_else(mismatch),
        }
    }

    /// Emits this property's JSON Schema fragment.
    fn schema_fragment(&self) -> Value {
        let mut fragment = Map::new();
        fragment.insert("type".to_string(), json!(self.kind.json_type()));
        if let Some(default) = &self.value {
            fragment.insert("default".to_string(), default.to_json());
        }
        if let Some((min, max)) = self.range {
            fragment.insert("minimum".to_string(), json!(min));
            fragment.insert("maximum".to_string(), json!(max));
        }
        Value::Object(fragment)
    }
}

/// An ordered sequence of properties with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyList {
    properties: Vec<Property>,
}

impl PropertyList {
    /// Creates an empty property list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            properties: Vec::new(),
        }
    }

    /// Appends a property to the list.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateName`] if a property with the same
    /// name is already present.
    pub fn push(&mut self, property: Property) -> Result<(), SchemaError> {
        if self.find(&property.name).is_some() {
            return Err(SchemaError::DuplicateName {
                name: property.name,
            });
        }
        self.properties.push(property);
        Ok(())
    }

    /// Finds a property by name. Linear, case-sensitive.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterates over the properties in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Property> {
        self.properties.iter()
    }

    /// Returns the boolean value of the named property, if bound.
    #[must_use]
    pub fn bool_value(&self, name: &str) -> Option<bool> {
        self.find(name).and_then(Property::as_bool)
    }

    /// Returns the integer value of the named property, if bound.
    #[must_use]
    pub fn int_value(&self, name: &str) -> Option<i64> {
        self.find(name).and_then(Property::as_i64)
    }

    /// Returns the string value of the named property, if bound.
    #[must_use]
    pub fn string_value(&self, name: &str) -> Option<&str> {
        self.find(name).and_then(Property::as_str)
    }

    /// Binds a JSON-RPC `arguments` object against this schema.
    ///
    /// For each schema property, in order: a supplied value must agree in
    /// kind (and range) with the declaration; an absent value falls back
    /// to the declared default; an absent value without a default fails.
    /// Undeclared arguments are ignored unless `strict` is set.
    ///
    /// The schema itself is never mutated.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] describing the first violation encountered.
    pub fn bind(
        &self,
        arguments: Option<&Map<String, Value>>,
        strict: bool,
    ) -> Result<Self, BindError> {
        if strict {
            if let Some(args) = arguments {
                for name in args.keys() {
                    if self.find(name).is_none() {
                        return Err(BindError::UnexpectedArgument { name: name.clone() });
                    }
                }
            }
        }

        let mut bound = Vec::with_capacity(self.properties.len());
        for prop in &self.properties {
            let value = match arguments.and_then(|args| args.get(&prop.name)) {
                Some(raw) => prop.parse_value(raw)?,
                None => match &prop.value {
                    Some(default) => default.clone(),
                    None => {
                        return Err(BindError::MissingArgument {
                            name: prop.name.clone(),
                        })
                    }
                },
            };
            bound.push(Property {
                name: prop.name.clone(),
                kind: prop.kind,
                value: Some(value),
                range: prop.range,
            });
        }

        Ok(Self { properties: bound })
    }

    /// Emits the JSON-Schema-shaped `inputSchema` object for this list.
    #[must_use]
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for prop in &self.properties {
            properties.insert(prop.name.clone(), prop.schema_fragment());
        }

        let required: Vec<Value> = self
            .properties
            .iter()
            .filter(|p| p.required())
            .map(|p| json!(p.name))
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

impl<'a> IntoIterator for &'a PropertyList {
    type Item = &'a Property;
    type IntoIter = std::slice::Iter<'a, Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
