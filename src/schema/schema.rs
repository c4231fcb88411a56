use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use serde_json::Value;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Entry, FieldValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Number,
    Text,
    Keyword,
    Boolean,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Number => "number",
            FieldKind::Text => "text",
            FieldKind::Keyword => "keyword",
            FieldKind::Boolean => "boolean",
        }
    }

    pub fn of(value: &FieldValue) -> Self {
        match value {
            FieldValue::Number(_) => FieldKind::Number,
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Keyword(_) => FieldKind::Keyword,
            FieldValue::Boolean(_) => FieldKind::Boolean,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "number" => Ok(FieldKind::Number),
            "text" => Ok(FieldKind::Text),
            "keyword" => Ok(FieldKind::Keyword),
            "boolean" => Ok(FieldKind::Boolean),
            other => Err(Error::new(ErrorKind::InvalidArgument, format!("unknown field kind '{}'", other))),
        }
    }
}

/// Field definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    pub kind: FieldKind,
}

/// Ordered list of declared fields; decides how query values are read and
/// which fields can be text indexed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<FieldDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Schema { fields: Vec::new() }
    }

    /// Declares a field. Redeclaring a name changes its kind in place.
    pub fn add_field(mut self, name: &str, kind: FieldKind) -> Self {
        self.declare(name, kind);
        self
    }

    pub fn add_number_field(self, name: &str) -> Self {
        self.add_field(name, FieldKind::Number)
    }

    pub fn add_text_field(self, name: &str) -> Self {
        self.add_field(name, FieldKind::Text)
    }

    pub fn add_keyword_field(self, name: &str) -> Self {
        self.add_field(name, FieldKind::Keyword)
    }

    pub fn add_boolean_field(self, name: &str) -> Self {
        self.add_field(name, FieldKind::Boolean)
    }

    pub fn declare(&mut self, name: &str, kind: FieldKind) {
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.kind = kind,
            None => self.fields.push(FieldDefinition { name: name.to_string(), kind }),
        }
    }

    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.kind)
    }

    /// Like `kind_of`, but an undeclared name is an error.
    pub fn require(&self, name: &str) -> Result<FieldKind> {
        self.kind_of(name).ok_or_else(|| Error::unknown_field(name))
    }

    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| f.kind == FieldKind::Text)
            .map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Checks that every field of `entry` is declared with the matching kind.
    pub fn validate(&self, entry: &Entry) -> Result<()> {
        for field in &entry.fields {
            let declared = self.require(&field.name)?;
            let actual = FieldKind::of(&field.value);
            if declared != actual {
                return Err(Error::new(
                    ErrorKind::InvalidArgument,
                    format!("field '{}' is declared {} but holds a {} value", field.name, declared, actual),
                ));
            }
        }
        Ok(())
    }

    /// `validate`, plus every declared field must be present.
    pub fn check_complete(&self, entry: &Entry) -> Result<()> {
        self.validate(entry)?;
        match self.fields.iter().find(|f| entry.field(&f.name).is_none()) {
            Some(missing) => Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("entry has no value for declared field '{}'", missing.name),
            )),
            None => Ok(()),
        }
    }

    /// Builds an entry from a JSON object, reading every value according to
    /// its declared kind. Values may be given natively or as strings.
    pub fn entry_from_json(&self, json: &Value) -> Result<Entry> {
        let object = json.as_object().ok_or_else(|| {
            Error::new(ErrorKind::InvalidArgument, "entry must be a JSON object")
        })?;

        let mut entry = Entry::new();
        for (name, value) in object {
            let kind = self.require(name)?;
            entry.add_field(name.clone(), parse_json_value(name, kind, value)?);
        }
        Ok(entry)
    }
}

fn parse_json_value(name: &str, kind: FieldKind, value: &Value) -> Result<FieldValue> {
    let invalid = || {
        Error::new(
            ErrorKind::InvalidArgument,
            format!("field '{}' expects a {} value, got {}", name, kind, value),
        )
    };

    match (kind, value) {
        (FieldKind::Number, Value::Number(n)) => n.as_u64().map(FieldValue::Number).ok_or_else(invalid),
        (FieldKind::Number, Value::String(s)) => s.trim().parse().map(FieldValue::Number).map_err(|_| invalid()),
        (FieldKind::Text, Value::String(s)) => Ok(FieldValue::text(s.as_str())),
        (FieldKind::Keyword, Value::String(s)) => Ok(FieldValue::keyword(s.as_str())),
        (FieldKind::Boolean, Value::Bool(b)) => Ok(FieldValue::Boolean(*b)),
        (FieldKind::Boolean, Value::String(s)) => Ok(FieldValue::Boolean(s == "true" || s == "1")),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new()
            .add_number_field("id")
            .add_text_field("title")
            .add_keyword_field("url")
            .add_boolean_field("published")
    }

    #[test]
    fn test_kind_lookup() {
        let schema = schema();
        assert_eq!(schema.kind_of("title"), Some(FieldKind::Text));
        assert_eq!(schema.require("nope").unwrap_err().kind, ErrorKind::UnknownField);
        assert_eq!(schema.text_fields().collect::<Vec<_>>(), vec!["title"]);
    }

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in [FieldKind::Number, FieldKind::Text, FieldKind::Keyword, FieldKind::Boolean] {
            assert_eq!(kind.as_str().parse::<FieldKind>().unwrap(), kind);
        }
        assert!("date".parse::<FieldKind>().is_err());
    }

    #[test]
    fn test_entry_from_json() {
        let entry = schema()
            .entry_from_json(&json!({"id": "5", "title": "Hello", "url": "https://a/b", "published": "1"}))
            .unwrap();
        assert_eq!(entry.field("id"), Some(&FieldValue::Number(5)));
        assert_eq!(entry.field("published"), Some(&FieldValue::Boolean(true)));
        assert_eq!(entry.field("url").and_then(FieldValue::as_keyword), Some("https://a/b"));
    }

    #[test]
    fn test_entry_from_json_rejects_unknown_field() {
        let err = schema().entry_from_json(&json!({"author": "x"})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownField);
    }

    #[test]
    fn test_entry_from_json_rejects_bad_number() {
        let err = schema().entry_from_json(&json!({"id": "five"})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_validate() {
        let schema = schema();
        assert!(schema.validate(&Entry::new().with_number("id", 1)).is_ok());
        let err = schema.validate(&Entry::new().with_keyword("id", "1")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_check_complete() {
        let schema = Schema::new().add_number_field("id").add_text_field("title");
        let full = Entry::new().with_number("id", 1).with_text("title", "windy");
        assert!(schema.check_complete(&full).is_ok());

        let partial = Entry::new().with_number("id", 1);
        assert!(schema.validate(&partial).is_ok());
        let err = schema.check_complete(&partial).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgument);
        assert!(err.context.contains("'title'"));

        let extra = full.clone().with_boolean("published", true);
        assert_eq!(schema.check_complete(&extra).unwrap_err().kind, ErrorKind::UnknownField);
    }
}
