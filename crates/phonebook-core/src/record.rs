//! Contact record shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Server-assigned numeric identifier of a record.
pub type RecordId = i64;

/// One contact as exchanged with the records endpoint.
///
/// The server owns the schema, so everything except `id` is kept as an
/// open JSON map and round-trips untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets a field, replacing any previous value.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns a field only when it holds a string.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// The contact fields the phonebook UI edits.
///
/// `f`, `i` and `o` are surname, given name and patronymic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub f: String,
    pub i: String,
    pub o: String,
    pub city: String,
    pub address: String,
    pub birthday: String,
    pub phone: String,
}

impl From<Contact> for Record {
    fn from(contact: Contact) -> Self {
        let id = contact.id;
        let fields = match serde_json::to_value(contact) {
            Ok(Value::Object(mut map)) => {
                map.remove("id");
                map
            }
            _ => Map::new(),
        };
        Record { id, fields }
    }
}

impl TryFrom<Record> for Contact {
    type Error = serde_json::Error;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        serde_json::to_value(record).and_then(serde_json::from_value)
    }
}
