use backoffice_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field holding the record identifier inside the record payload.
pub const ID_FIELD: &str = "id";

/// Field marking a record as soft-deleted.
pub const DELETED_AT_FIELD: &str = "deletedAt";

/// Generic record persisted for a resource.
///
/// The identifier is mirrored into the payload under [`ID_FIELD`] so
/// criteria can filter and sort on it like on any other field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminRecord {
    id: NonEmptyString,
    fields: Map<String, Value>,
}

impl AdminRecord {
    /// Creates a record from an identifier and its fields.
    pub fn new(id: impl Into<String>, mut fields: Map<String, Value>) -> AppResult<Self> {
        let id = NonEmptyString::new(id)?;
        fields.insert(ID_FIELD.to_owned(), Value::String(id.as_str().to_owned()));

        Ok(Self { id, fields })
    }

    /// Creates a record from a JSON object carrying an `id` field.
    pub fn from_value(value: Value) -> AppResult<Self> {
        let Value::Object(fields) = value else {
            return Err(AppError::Validation(
                "record data must be a JSON object".to_owned(),
            ));
        };

        let id = fields
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
            .ok_or_else(|| AppError::Validation("record data must carry an id".to_owned()))?;

        Self::new(id, fields)
    }

    /// Returns the record identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the record fields, including the identifier.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns one field value.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Sets a field; the identifier cannot be changed.
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if name == ID_FIELD {
            return;
        }
        self.fields.insert(name, value);
    }

    /// Returns whether the record carries a deletion timestamp.
    #[must_use]
    pub fn is_soft_deleted(&self) -> bool {
        self.fields
            .get(DELETED_AT_FIELD)
            .is_some_and(|value| !value.is_null())
    }

    /// Returns the record payload as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Returns the payload without the hidden fields.
    #[must_use]
    pub fn public_projection(&self, hidden_fields: &[String]) -> Value {
        let projected = self
            .fields
            .iter()
            .filter(|(name, _)| !hidden_fields.iter().any(|hidden| hidden == *name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        Value::Object(projected)
    }
}
