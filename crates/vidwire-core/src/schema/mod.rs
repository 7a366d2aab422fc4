//! Record schemas: named, ordered, typed field lists layered on the value codec.
//!
//! Field order is the wire identity of a record. A record travels as
//! `Value::Record { schema_id, fields }` with one value per declared field;
//! renaming a field is free, reordering one is a breaking change.

pub mod video_player;

use std::collections::BTreeMap;

use crate::codec::{RecordShapes, RecordValue, Value};
use crate::error::{Result, VidwireError};

/// Declared type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int64,
    Float64,
    String,
    /// `map<string, string>`
    StringMap,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    pub nullable: bool,
}

impl FieldDescriptor {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, nullable: false }
    }

    pub const fn nullable(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, nullable: true }
    }
}

/// Static description of one record type.
#[derive(Debug)]
pub struct RecordDescriptor {
    /// One-byte schema id written after the RECORD tag.
    pub id: u8,
    pub name: &'static str,
    pub fields: &'static [FieldDescriptor],
}

/// The set of records a codec instance understands, keyed by schema id.
#[derive(Debug)]
pub struct SchemaTable {
    records: &'static [RecordDescriptor],
}

impl SchemaTable {
    pub const fn new(records: &'static [RecordDescriptor]) -> Self {
        Self { records }
    }

    pub fn get(&self, schema_id: u8) -> Option<&'static RecordDescriptor> {
        self.records.iter().find(|r| r.id == schema_id)
    }

    pub fn records(&self) -> &'static [RecordDescriptor] {
        self.records
    }
}

impl RecordShapes for SchemaTable {
    fn field_count(&self, schema_id: u8) -> Option<usize> {
        self.get(schema_id).map(|r| r.fields.len())
    }
}

/// A typed record that converts to and from its field list.
pub trait Record: Sized + Send + 'static {
    const DESCRIPTOR: &'static RecordDescriptor;

    /// Field values in declared order.
    fn into_fields(self) -> Vec<Value>;

    /// Build from fields; the reader already matched the declared count.
    fn from_fields(reader: &mut FieldReader) -> Result<Self>;
}

/// Types a handler can take as its argument or a caller can expect back.
pub trait FromValue: Sized + Send + 'static {
    fn from_value(value: Value) -> Result<Self>;
}

/// Types a handler can return or a caller can send.
pub trait IntoValue: Send + 'static {
    fn into_value(self) -> Value;
}

impl<T: Record> FromValue for T {
    fn from_value(value: Value) -> Result<Self> {
        let desc = T::DESCRIPTOR;
        let rec = match value {
            Value::Record(rec) if rec.schema_id == desc.id => rec,
            Value::Record(rec) => {
                return Err(VidwireError::mismatch(format!(
                    "expected {} (schema {}), got schema {}",
                    desc.name, desc.id, rec.schema_id
                )))
            }
            other => {
                return Err(VidwireError::mismatch(format!(
                    "expected {} record, got {}",
                    desc.name,
                    other.kind()
                )))
            }
        };
        if rec.fields.len() != desc.fields.len() {
            return Err(VidwireError::mismatch(format!(
                "{}: expected {} fields, got {}",
                desc.name,
                desc.fields.len(),
                rec.fields.len()
            )));
        }
        T::from_fields(&mut FieldReader::new(desc, rec.fields))
    }
}

impl<T: Record> IntoValue for T {
    fn into_value(self) -> Value {
        Value::Record(RecordValue {
            schema_id: T::DESCRIPTOR.id,
            fields: self.into_fields(),
        })
    }
}

/// The void marker: methods without an argument or result carry NULL.
impl FromValue for () {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(()),
            other => Err(VidwireError::mismatch(format!(
                "expected void (null), got {}",
                other.kind()
            ))),
        }
    }
}

impl IntoValue for () {
    fn into_value(self) -> Value {
        Value::Null
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

/// Encode a string map as a MAP value (sorted by key).
pub fn string_map_value(map: BTreeMap<String, String>) -> Value {
    Value::Map(
        map.into_iter()
            .map(|(k, v)| (Value::String(k), Value::String(v)))
            .collect(),
    )
}

/// Sequential typed access to a record's fields.
///
/// A NULL in a required slot is a `SchemaMismatch`, never a default. Each
/// accessor must match the descriptor entry it reads (kind and nullability);
/// a `from_fields` that drifts from its descriptor fails with `Internal`.
pub struct FieldReader {
    descriptor: &'static RecordDescriptor,
    fields: std::vec::IntoIter<Value>,
    index: usize,
}

impl FieldReader {
    pub fn new(descriptor: &'static RecordDescriptor, fields: Vec<Value>) -> Self {
        Self {
            descriptor,
            fields: fields.into_iter(),
            index: 0,
        }
    }

    pub fn required_bool(&mut self) -> Result<bool> {
        self.required(FieldKind::Bool, bool_of, "bool")
    }

    pub fn optional_bool(&mut self) -> Result<Option<bool>> {
        self.optional(FieldKind::Bool, bool_of, "bool")
    }

    /// INT32 widens; anything else is a mismatch.
    pub fn required_i64(&mut self) -> Result<i64> {
        self.required(FieldKind::Int64, |v| v.as_i64(), "int64")
    }

    pub fn required_f64(&mut self) -> Result<f64> {
        self.required(FieldKind::Float64, f64_of, "float64")
    }

    pub fn required_string(&mut self) -> Result<String> {
        self.required(FieldKind::String, string_of, "string")
    }

    pub fn optional_string(&mut self) -> Result<Option<String>> {
        self.optional(FieldKind::String, string_of, "string")
    }

    /// Required `map<string, string>`; may be empty, may not be null.
    pub fn string_map(&mut self) -> Result<BTreeMap<String, String>> {
        let (name, value) = self.next_field(FieldKind::StringMap, false)?;
        let pairs = match value {
            Value::Map(pairs) => pairs,
            Value::Null => return Err(self.null_required(name)),
            other => return Err(self.wrong_kind(name, "map<string,string>", other.kind())),
        };
        let mut out = BTreeMap::new();
        for (k, v) in pairs {
            let (Value::String(k), Value::String(v)) = (k, v) else {
                return Err(self.wrong_kind(name, "map<string,string>", "map with non-string entries"));
            };
            if out.insert(k, v).is_some() {
                return Err(VidwireError::mismatch(format!(
                    "{}.{name}: duplicate map key",
                    self.descriptor.name
                )));
            }
        }
        Ok(out)
    }

    fn required<T>(
        &mut self,
        kind: FieldKind,
        convert: impl FnOnce(&Value) -> Option<T>,
        expected: &str,
    ) -> Result<T> {
        let (name, value) = self.next_field(kind, false)?;
        if value.is_null() {
            return Err(self.null_required(name));
        }
        convert(&value).ok_or_else(|| self.wrong_kind(name, expected, value.kind()))
    }

    fn optional<T>(
        &mut self,
        kind: FieldKind,
        convert: impl FnOnce(&Value) -> Option<T>,
        expected: &str,
    ) -> Result<Option<T>> {
        let (name, value) = self.next_field(kind, true)?;
        if value.is_null() {
            return Ok(None);
        }
        convert(&value)
            .map(Some)
            .ok_or_else(|| self.wrong_kind(name, expected, value.kind()))
    }

    fn next_field(&mut self, kind: FieldKind, nullable: bool) -> Result<(&'static str, Value)> {
        let record = self.descriptor.name;
        let field = self.descriptor.fields.get(self.index).ok_or_else(|| {
            VidwireError::Internal(format!(
                "{record}: read past the {} declared fields",
                self.descriptor.fields.len()
            ))
        })?;
        if field.kind != kind || field.nullable != nullable {
            return Err(VidwireError::Internal(format!(
                "{record}.{}: declared {:?} (nullable: {}), read as {kind:?} (nullable: {nullable})",
                field.name, field.kind, field.nullable
            )));
        }
        let name = field.name;
        let value = self.fields.next().ok_or_else(|| {
            VidwireError::mismatch(format!("{}: missing field {name}", self.descriptor.name))
        })?;
        self.index += 1;
        Ok((name, value))
    }

    fn null_required(&self, name: &str) -> VidwireError {
        VidwireError::mismatch(format!(
            "{}.{name}: required field is null",
            self.descriptor.name
        ))
    }

    fn wrong_kind(&self, name: &str, expected: &str, got: &str) -> VidwireError {
        VidwireError::mismatch(format!(
            "{}.{name}: expected {expected}, got {got}",
            self.descriptor.name
        ))
    }
}

fn bool_of(v: &Value) -> Option<bool> {
    match v {
        Value::Bool(b) => Some(*b),
        _ => None,
    }
}

fn f64_of(v: &Value) -> Option<f64> {
    match v {
        Value::Float64(f) => Some(*f),
        _ => None,
    }
}

fn string_of(v: &Value) -> Option<String> {
    v.as_str().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    const PAIR: RecordDescriptor = RecordDescriptor {
        id: 200,
        name: "PairRecord",
        fields: &[
            FieldDescriptor::required("id", FieldKind::Int64),
            FieldDescriptor::nullable("label", FieldKind::String),
        ],
    };

    fn pair(label: Value) -> Vec<Value> {
        vec![Value::Int64(1), label]
    }

    #[test]
    fn accessors_matching_the_descriptor_read_fields() {
        let mut r = FieldReader::new(&PAIR, pair("a".into()));
        assert_eq!(r.required_i64().unwrap(), 1);
        assert_eq!(r.optional_string().unwrap().as_deref(), Some("a"));

        let mut r = FieldReader::new(&PAIR, pair(Value::Null));
        r.required_i64().unwrap();
        assert_eq!(r.optional_string().unwrap(), None);
    }

    #[test]
    fn wrong_kind_accessor_is_internal() {
        let mut r = FieldReader::new(&PAIR, pair("a".into()));
        let err = r.required_f64().unwrap_err();
        assert!(matches!(err, VidwireError::Internal(_)), "{err}");
        assert!(err.to_string().contains("PairRecord.id"));
    }

    #[test]
    fn wrong_nullability_accessor_is_internal() {
        let mut r = FieldReader::new(&PAIR, pair("a".into()));
        r.required_i64().unwrap();
        let err = r.required_string().unwrap_err();
        assert!(matches!(err, VidwireError::Internal(_)), "{err}");
    }

    #[test]
    fn reading_past_declared_fields_is_internal() {
        let mut r = FieldReader::new(&PAIR, pair(Value::Null));
        r.required_i64().unwrap();
        r.optional_string().unwrap();
        assert!(matches!(r.optional_bool(), Err(VidwireError::Internal(_))));
    }
}
