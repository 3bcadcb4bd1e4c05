//! Dimension definitions

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoordError, Result};

/// Value type of a dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Datatype {
    String,
    Int64,
    Float,
    Document,
    ListString,
    ListInt64,
    SetString,
    SetInt64,
    MapStringString,
    MapStringInt64,
}

/// A named, typed attribute of a space's schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DimensionParts")]
pub struct Dimension {
    name: String,
    datatype: Datatype,
}

#[derive(Deserialize)]
struct DimensionParts {
    name: String,
    datatype: Datatype,
}

impl TryFrom<DimensionParts> for Dimension {
    type Error = CoordError;

    fn try_from(parts: DimensionParts) -> Result<Self> {
        Dimension::new(parts.name, parts.datatype)
    }
}

impl Dimension {
    /// Create a dimension. The name must be non-empty.
    pub fn new(name: impl Into<String>, datatype: Datatype) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(CoordError::InvalidTopology(
                "dimension name must not be empty".to_string(),
            ));
        }
        Ok(Self { name, datatype })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datatype(&self) -> Datatype {
        self.datatype
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.name, self.datatype)
    }
}
