//! Records and payloads exchanged with the REST backend.
//!
//! Records (`User`, `Product`) are what the backend returns. Payloads are
//! what the admin sends; they never carry `id` or `created_at`, which are
//! always assigned by the backend.

use backoffice_core::{Email, Price, ProductId, Tags, UserId};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Users
// =============================================================================

/// A user as returned by the backend. The password is write-only and never
/// part of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a user. A password is mandatory.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct UserCreate {
    pub name: String,
    pub email: Email,
    pub password: String,
}

impl std::fmt::Debug for UserCreate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCreate")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Payload for updating a user.
///
/// `password: None` omits the field from the JSON body entirely, leaving the
/// stored password untouched. Implements `Debug` manually to redact the
/// password.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    pub name: String,
    pub email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl std::fmt::Debug for UserUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserUpdate")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// =============================================================================
// Products
// =============================================================================

const fn default_in_stock() -> bool {
    true
}

/// A product as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

/// Payload for creating or updating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    pub price: Price,
    pub category: String,
    pub tags: Tags,
    pub in_stock: bool,
}

// =============================================================================
// Timestamps
// =============================================================================

/// Accept RFC 3339 timestamps as well as offset-less ISO-8601 ones (read as
/// UTC); the backend emits the latter.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn test_user_deserializes_naive_timestamp() {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "name": "Ada",
            "email": "ada@example.com",
            "created_at": "2024-03-05T10:20:30.123456"
        }))
        .unwrap();

        assert_eq!(user.id, UserId::new(1));
        assert_eq!(user.created_at.year(), 2024);
        assert_eq!(user.created_at.hour(), 10);
    }

    #[test]
    fn test_user_deserializes_rfc3339_timestamp() {
        let user: User = serde_json::from_value(json!({
            "id": 2,
            "name": "Grace",
            "email": "grace@example.com",
            "created_at": "2024-03-05T10:20:30+02:00"
        }))
        .unwrap();

        assert_eq!(user.created_at.hour(), 8);
    }

    #[test]
    fn test_user_rejects_garbage_timestamp() {
        let result: Result<User, _> = serde_json::from_value(json!({
            "id": 2,
            "name": "Grace",
            "email": "grace@example.com",
            "created_at": "yesterday"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_user_update_omits_missing_password() {
        let update = UserUpdate {
            name: "Ada".to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            password: None,
        };

        let value = serde_json::to_value(&update).unwrap();
        assert!(value.get("password").is_none());
        assert_eq!(value["name"], "Ada");
    }

    #[test]
    fn test_user_update_includes_present_password() {
        let update = UserUpdate {
            name: "Ada".to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            password: Some("hunter22".to_string()),
        };

        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["password"], "hunter22");
    }

    #[test]
    fn test_user_payload_debug_redacts_password() {
        let create = UserCreate {
            name: "Ada".to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            password: "hunter22".to_string(),
        };
        let debug_output = format!("{create:?}");
        assert!(!debug_output.contains("hunter22"));
        assert!(debug_output.contains("[REDACTED]"));
    }

    #[test]
    fn test_product_defaults_when_fields_missing() {
        let product: Product = serde_json::from_value(json!({
            "id": 3,
            "name": "Lamp",
            "description": "Bright",
            "price": 12.5,
            "category": "Home"
        }))
        .unwrap();

        assert!(product.in_stock);
        assert!(product.tags.is_empty());
        assert_eq!(product.price, Price::parse("12.5").unwrap());
    }

    #[test]
    fn test_product_payload_wire_shape() {
        let payload = ProductPayload {
            name: "Lamp".to_string(),
            description: "Bright".to_string(),
            price: Price::parse("12.5").unwrap(),
            category: "Home".to_string(),
            tags: Tags::parse("a, b"),
            in_stock: false,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["price"], json!(12.5));
        assert_eq!(value["tags"], json!(["a", "b"]));
        assert_eq!(value["in_stock"], json!(false));
        assert!(value.get("id").is_none());
    }
}
