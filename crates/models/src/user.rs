use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ModelError;

/// Attribute-map form of a record, as the backing table stores it.
pub type Attributes = Map<String, Value>;

/// A user record keyed by email. The optional name fields default to the
/// empty string so a partial request body still yields a complete record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "firstName")]
    pub first_name: String,
    #[serde(default, rename = "lastName")]
    pub last_name: String,
}

impl User {
    /// Parse a request body as a user record.
    pub fn parse(body: &str) -> Result<Self, ModelError> {
        serde_json::from_str(body).map_err(ModelError::InvalidUserData)
    }

    /// Syntactic RFC 5322 check on the primary key.
    pub fn validate_email(&self) -> Result<(), ModelError> {
        self.email
            .parse::<EmailAddress>()
            .map(|_| ())
            .map_err(|_| ModelError::InvalidEmail)
    }

    /// Marshal into the attribute map the table persists.
    pub fn to_attributes(&self) -> Result<Attributes, ModelError> {
        let value = serde_json::to_value(self).map_err(ModelError::Encode)?;
        serde_json::from_value(value).map_err(ModelError::Encode)
    }

    /// Unmarshal a stored attribute map back into a record.
    pub fn from_attributes(attrs: Attributes) -> Result<Self, ModelError> {
        serde_json::from_value(Value::Object(attrs)).map_err(ModelError::Decode)
    }
}
