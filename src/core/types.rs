use std::collections::BTreeMap;
use std::fmt;
use serde::{Serialize, Deserialize};
use serde_json::{Map, Value};
use crate::index::posting::TermInfo;

/// Stable handle of an entry inside one document.
///
/// Ids are handed out in arrival order and never reused, so an index built
/// before a removal can still be resolved safely afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl EntryId {
    pub fn new(id: u64) -> Self {
        EntryId(id)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for EntryId {
    fn from(id: u64) -> Self {
        EntryId(id)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Text field payload. `terms` and `term_stats` stay empty until the field
/// is indexed.
#[derive(Debug, Clone, Default)]
pub struct TextValue {
    pub raw: String,
    pub terms: Vec<String>,
    pub term_stats: BTreeMap<String, TermInfo>,
}

impl TextValue {
    pub fn new(raw: impl Into<String>) -> Self {
        TextValue {
            raw: raw.into(),
            terms: Vec::new(),
            term_stats: BTreeMap::new(),
        }
    }

    pub fn is_indexed(&self) -> bool {
        !self.term_stats.is_empty()
    }

    pub fn clear_terms(&mut self) {
        self.terms.clear();
        self.term_stats.clear();
    }
}

// Two text values are the same field content when their raw text matches;
// derived terms are a cache of the last indexing pass.
impl PartialEq for TextValue {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(u64),
    Text(TextValue),
    Keyword(String),
    Boolean(bool),
}

impl FieldValue {
    pub fn text(raw: impl Into<String>) -> Self {
        FieldValue::Text(TextValue::new(raw))
    }

    pub fn keyword(value: impl Into<String>) -> Self {
        FieldValue::Keyword(value.into())
    }

    pub fn as_number(&self) -> Option<u64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextValue> {
        match self {
            FieldValue::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            FieldValue::Keyword(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Number(n) => Value::from(*n),
            FieldValue::Text(t) => Value::from(t.raw.clone()),
            FieldValue::Keyword(k) => Value::from(k.clone()),
            FieldValue::Boolean(b) => Value::from(*b),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Field { name: name.into(), value }
    }
}

/// One searchable record: an ordered list of uniquely named fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entry {
    pub fields: Vec<Field>,
}

impl Entry {
    pub fn new() -> Self {
        Entry { fields: Vec::with_capacity(4) }
    }

    /// Appends a field, replacing the value of an existing field with the same name.
    pub fn add_field(&mut self, name: impl Into<String>, value: FieldValue) {
        let name = name.into();
        match self.field_mut(&name) {
            Some(existing) => *existing = value,
            None => self.fields.push(Field::new(name, value)),
        }
    }

    pub fn with_number(mut self, name: &str, value: u64) -> Self {
        self.add_field(name, FieldValue::Number(value));
        self
    }

    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.add_field(name, FieldValue::text(value));
        self
    }

    pub fn with_keyword(mut self, name: &str, value: &str) -> Self {
        self.add_field(name, FieldValue::keyword(value));
        self
    }

    pub fn with_boolean(mut self, name: &str, value: bool) -> Self {
        self.add_field(name, FieldValue::Boolean(value));
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.fields.iter_mut().find(|f| f.name == name).map(|f| &mut f.value)
    }

    /// Lookup for code paths where the schema guarantees the field exists.
    ///
    /// # Panics
    ///
    /// Panics when the entry has no field called `name`. Entries are expected
    /// to conform to their document's schema.
    pub fn find_field(&self, name: &str) -> &FieldValue {
        match self.field(name) {
            Some(value) => value,
            None => panic!("entry does not conform to schema: no field named '{}'", name),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_json(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len());
        for field in &self.fields {
            object.insert(field.name.clone(), field.value.to_json());
        }
        Value::Object(object)
    }
}

/// An entry together with the id its document assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub id: EntryId,
    pub entry: Entry,
}
