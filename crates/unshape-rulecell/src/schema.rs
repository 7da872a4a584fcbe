//! Cell schema, cell records and partial property assignments.
//!
//! A [`CellSchema`] is fixed once at startup. Every [`Cell`] carries one value
//! per schema property, in schema order, plus its own grid coordinates.
//! A [`Patch`] is a partial assignment produced by rule transforms and stored
//! by stamp aliases.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::{Result, RuleCellError};
use crate::value::{Value, ValueType};

const RESERVED: [&str; 2] = ["row", "col"];

/// Ordered set of named properties with their defaults.
#[derive(Debug, Clone, Default)]
pub struct CellSchema {
    names: Vec<Arc<str>>,
    defaults: Vec<Value>,
    index: HashMap<Arc<str>, usize>,
}

impl CellSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schema from `(name, default)` pairs, keeping their order.
    pub fn from_properties<I, S, V>(properties: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, V)>,
        S: AsRef<str>,
        V: Into<Value>,
    {
        let mut schema = Self::new();
        for (name, default) in properties {
            schema.add(name.as_ref(), default)?;
        }
        Ok(schema)
    }

    /// Appends a property.
    pub fn add(&mut self, name: &str, default: impl Into<Value>) -> Result<()> {
        if RESERVED.contains(&name) {
            return Err(RuleCellError::ReservedProperty(name.to_string()));
        }
        if self.index.contains_key(name) {
            return Err(RuleCellError::DuplicateProperty(name.to_string()));
        }
        let name: Arc<str> = name.into();
        self.index.insert(name.clone(), self.names.len());
        self.names.push(name);
        self.defaults.push(default.into());
        Ok(())
    }

    /// Builder-style [`add`](Self::add).
    pub fn with(mut self, name: &str, default: impl Into<Value>) -> Result<Self> {
        self.add(name, default)?;
        Ok(self)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the schema declares no properties.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of a property in schema order.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Property names in schema order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|n| &**n)
    }

    /// Default value of a property.
    pub fn default_of(&self, name: &str) -> Option<&Value> {
        self.index_of(name).map(|i| &self.defaults[i])
    }

    /// Declared type of a property (the type of its default).
    pub fn type_of(&self, name: &str) -> Option<ValueType> {
        self.default_of(name).map(Value::value_type)
    }

    /// Checks that every entry of `patch` names a property and has its type.
    pub fn check(&self, patch: &Patch) -> Result<()> {
        for (name, value) in patch.iter() {
            self.slot(name, value)?;
        }
        Ok(())
    }

    fn slot(&self, name: &str, value: &Value) -> Result<usize> {
        let i = self
            .index_of(name)
            .ok_or_else(|| RuleCellError::UnknownProperty(name.to_string()))?;
        let expected = self.defaults[i].value_type();
        if value.value_type() != expected {
            return Err(RuleCellError::PropertyType {
                property: name.to_string(),
                source: crate::error::TypeError::expected(expected, value.value_type()),
            });
        }
        Ok(i)
    }
}

/// One grid cell: coordinates plus one value per schema property.
///
/// Cells are values. Transitions produce new cells via [`Cell::with_patch`].
#[derive(Debug, Clone)]
pub struct Cell {
    row: usize,
    col: usize,
    schema: Arc<CellSchema>,
    values: Vec<Value>,
}

impl Cell {
    /// The default cell for `schema`, at `(0, 0)`.
    pub fn default_for(schema: Arc<CellSchema>) -> Self {
        let values = schema.defaults.clone();
        Self {
            row: 0,
            col: 0,
            schema,
            values,
        }
    }

    /// Row index.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column index.
    pub fn col(&self) -> usize {
        self.col
    }

    /// The schema this cell was built from.
    pub fn schema(&self) -> &CellSchema {
        &self.schema
    }

    /// Property value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.index_of(name).map(|i| &self.values[i])
    }

    /// Property values in schema order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Reads a bool property.
    pub fn bool(&self, name: &str) -> Result<bool> {
        self.typed(name, Value::as_bool)
    }

    /// Reads an integer property.
    pub fn int(&self, name: &str) -> Result<i64> {
        self.typed(name, Value::as_int)
    }

    /// Reads a float property.
    pub fn float(&self, name: &str) -> Result<f64> {
        self.typed(name, Value::as_float)
    }

    /// Reads a string property.
    pub fn str(&self, name: &str) -> Result<&str> {
        self.typed(name, Value::as_str)
    }

    fn typed<'a, T>(
        &'a self,
        name: &str,
        read: impl FnOnce(&'a Value) -> std::result::Result<T, crate::error::TypeError>,
    ) -> Result<T> {
        let value = self
            .get(name)
            .ok_or_else(|| RuleCellError::UnknownProperty(name.to_string()))?;
        read(value).map_err(|source| RuleCellError::PropertyType {
            property: name.to_string(),
            source,
        })
    }

    /// Returns a copy with `patch` applied. Coordinates are kept.
    pub fn with_patch(&self, patch: &Patch) -> Result<Cell> {
        let mut next = self.clone();
        for (name, value) in patch.iter() {
            let i = self.schema.slot(name, value)?;
            next.values[i] = value.clone();
        }
        Ok(next)
    }

    /// Returns a copy placed at `(row, col)`.
    pub fn at(&self, row: usize, col: usize) -> Cell {
        Cell {
            row,
            col,
            ..self.clone()
        }
    }

    /// True if both cells hold the same property values, ignoring position.
    pub fn same_state(&self, other: &Cell) -> bool {
        self.values == other.values
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row && self.col == other.col && self.values == other.values
    }
}

impl Eq for Cell {}

/// A partial property assignment.
///
/// ```
/// use unshape_rulecell::{Patch, Value};
///
/// let patch = Patch::new().set("alive", true).set("age", 0i64);
/// assert_eq!(patch.get("alive"), Some(&Value::Bool(true)));
/// assert_eq!(patch.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Patch {
    entries: BTreeMap<String, Value>,
}

impl Patch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an assignment.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Assigned value for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Assignments in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of assignments.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is assigned.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Patch {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
