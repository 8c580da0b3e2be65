use std::fmt;

use serde::{Deserialize, Serialize};

use super::QueryDataType;
use crate::error::UpsertError;

/// Column descriptor as seen by the query layer.
///
/// Equality and hashing are structural over name, type and the hidden flag.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableField {
    name: String,
    data_type: QueryDataType,
    hidden: bool,
}

impl TableField {
    pub fn new(name: impl Into<String>, data_type: QueryDataType, hidden: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            hidden,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &QueryDataType {
        &self.data_type
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

/// Location of a column inside a key-value entry: the key or the value side,
/// and either the whole object (`path == None`) or a named field below it.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPath {
    key: bool,
    path: Option<String>,
}

impl QueryPath {
    /// Alias of the whole key.
    pub const KEY: &'static str = "__key";
    /// Alias of the whole value.
    pub const VALUE: &'static str = "this";

    const KEY_PREFIX: &'static str = "__key.";
    const VALUE_PREFIX: &'static str = "this.";

    pub fn new(key: bool, path: Option<String>) -> Self {
        Self { key, path }
    }

    /// The whole key.
    pub fn key() -> Self {
        Self::new(true, None)
    }

    /// The whole value.
    pub fn value() -> Self {
        Self::new(false, None)
    }

    pub fn key_field(path: impl Into<String>) -> Self {
        Self::new(true, Some(path.into()))
    }

    pub fn value_field(path: impl Into<String>) -> Self {
        Self::new(false, Some(path.into()))
    }

    /// Parses an external column name.
    ///
    /// `__key` and `this` denote the whole key and value, `__key.a` and `this.a`
    /// denote fields of either side, and a bare `a` is a value field.
    pub fn parse(name: &str) -> Result<Self, UpsertError> {
        if name.is_empty() {
            return Err(UpsertError::InvalidPath(name.to_string()));
        }
        let (key, path) = if name == Self::KEY {
            (true, None)
        } else if name == Self::VALUE {
            (false, None)
        } else if let Some(rest) = name.strip_prefix(Self::KEY_PREFIX) {
            (true, Some(rest))
        } else if let Some(rest) = name.strip_prefix(Self::VALUE_PREFIX) {
            (false, Some(rest))
        } else {
            (false, Some(name))
        };
        if let Some(path) = path {
            if path.is_empty() || path.split('.').any(str::is_empty) {
                return Err(UpsertError::InvalidPath(name.to_string()));
            }
        }
        Ok(Self::new(key, path.map(str::to_string)))
    }

    pub fn is_key(&self) -> bool {
        self.key
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn is_top(&self) -> bool {
        self.path.is_none()
    }

    /// Alias naming the side this path belongs to.
    pub fn side_alias(&self) -> &'static str {
        if self.key {
            Self::KEY
        } else {
            Self::VALUE
        }
    }
}

impl fmt::Display for QueryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            None => write!(f, "{}", self.side_alias()),
            Some(path) => write!(f, "{}.{}", self.side_alias(), path),
        }
    }
}

/// A [`TableField`] of a key-value mapping, carrying where it lives in the entry.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapTableField {
    field: TableField,
    path: QueryPath,
}

impl MapTableField {
    pub fn new(
        name: impl Into<String>,
        data_type: QueryDataType,
        hidden: bool,
        path: QueryPath,
    ) -> Self {
        Self {
            field: TableField::new(name, data_type, hidden),
            path,
        }
    }

    /// Builds a visible field whose path is parsed from its name.
    pub fn from_name(name: &str, data_type: QueryDataType) -> Result<Self, UpsertError> {
        let path = QueryPath::parse(name)?;
        Ok(Self::new(name, data_type, false, path))
    }

    pub fn table_field(&self) -> &TableField {
        &self.field
    }

    pub fn name(&self) -> &str {
        self.field.name()
    }

    pub fn data_type(&self) -> &QueryDataType {
        self.field.data_type()
    }

    pub fn is_hidden(&self) -> bool {
        self.field.is_hidden()
    }

    pub fn path(&self) -> &QueryPath {
        &self.path
    }
}
