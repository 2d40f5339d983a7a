//! Certificate records and the submissions that create them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

use crate::crypto::ids;

/// A stored certificate. Owned exclusively by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRecord {
    /// Certificate identifier (CID), the primary key.
    #[serde(alias = "cid")]
    pub id: String,
    #[serde(alias = "tx")]
    pub transaction_id: String,
    #[serde(default)]
    pub student_address: Option<String>,
    pub name: String,
    pub degree: String,
    pub major: String,
    pub year: String,
    pub issuer: String,
    /// `valid` on the wire; flips to true once and never back.
    #[serde(rename = "valid", alias = "verified")]
    pub verified: bool,
    #[schema(value_type = String, format = DateTime)]
    pub issued_at: DateTime<Utc>,
}

impl CertificateRecord {
    /// One-line description used in activity entries.
    pub fn summary(&self) -> String {
        format!("{} • {}", self.name, self.degree)
    }
}

/// Issuance request body.
///
/// Every field defaults to empty so that absent fields reach validation and
/// are reported as `MissingField` rather than as a JSON decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default, alias = "cid", alias = "ipfsCid")]
    pub id: String,
    #[serde(default, alias = "student", skip_serializing_if = "Option::is_none")]
    pub student_address: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub major: String,
    #[serde(default, deserialize_with = "string_or_number")]
    #[schema(value_type = String)]
    pub year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

impl Submission {
    /// Fills in a generated CID when the caller left `id` blank.
    pub fn ensure_id(&mut self) -> &str {
        if self.id.trim().is_empty() {
            self.id = ids::new_certificate_id();
        }
        &self.id
    }

    /// Trimmed student address, `None` when absent or blank.
    pub fn student_address(&self) -> Option<&str> {
        self.student_address
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Returned by a successful issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueReceipt {
    pub transaction_id: String,
    pub id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    Issue,
    Verify,
}

/// Entry in the issuer activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub id: String,
    pub transaction_id: String,
    #[schema(value_type = String, format = DateTime)]
    pub at: DateTime<Utc>,
    pub summary: String,
}

// The front-end sends `year` from a text input, other callers send a number.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => Ok(s),
        JsonValue::Number(n) => Ok(n.to_string()),
        JsonValue::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
