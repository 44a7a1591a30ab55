//! Action payloads as produced by the mapping layer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::error::{Error, ErrorKind, Result};

/// One event mapped to Salesforce semantics.
///
/// Field names follow the mapping layer's JSON keys. The standard object
/// fields (`company`, `last_name`, `billing_city`, ...) feed the derived
/// field mapping in [`crate::shape`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericPayload {
    /// `create`, `update`, `upsert` or `delete`. See [`RecordOperation`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Field/value pairs used to locate an existing record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits: Option<Map<String, Value>>,
    /// `AND` or `OR` between trait clauses; `OR` when absent.
    #[serde(
        default,
        rename = "recordMatcherOperator",
        skip_serializing_if = "Option::is_none"
    )]
    pub record_matcher_operator: Option<String>,
    /// Raw Salesforce fields; these win over derived fields.
    #[serde(
        default,
        rename = "customFields",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_fields: Option<Map<String, Value>>,
    /// Set when the target is a custom object; disables the derived mapping.
    #[serde(
        default,
        rename = "customObjectName",
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_object_name: Option<String>,
    #[serde(
        default,
        rename = "bulkUpsertExternalId",
        skip_serializing_if = "Option::is_none"
    )]
    pub bulk_upsert_external_id: Option<BulkUpsertExternalId>,
    #[serde(
        default,
        rename = "bulkUpdateRecordId",
        skip_serializing_if = "Option::is_none"
    )]
    pub bulk_update_record_id: Option<String>,
    #[serde(default)]
    pub enable_batching: bool,

    // Standard object fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_employees: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub billing_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
}

impl GenericPayload {
    /// Parse the payload's `operation` field.
    pub fn record_operation(&self) -> Result<RecordOperation> {
        self.operation.as_deref().unwrap_or("undefined").parse()
    }

    /// Whether the custom-object flag is set.
    pub fn is_custom_object(&self) -> bool {
        self.custom_object_name
            .as_deref()
            .is_some_and(|name| !name.is_empty())
    }

    /// The trait map when present and non-empty.
    pub(crate) fn non_empty_traits(&self) -> Option<&Map<String, Value>> {
        self.traits.as_ref().filter(|traits| !traits.is_empty())
    }
}

/// External-id descriptor for bulk upsert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkUpsertExternalId {
    #[serde(
        default,
        rename = "externalIdName",
        skip_serializing_if = "Option::is_none"
    )]
    pub external_id_name: Option<String>,
    #[serde(
        default,
        rename = "externalIdValue",
        skip_serializing_if = "Option::is_none"
    )]
    pub external_id_value: Option<Value>,
}

impl BulkUpsertExternalId {
    /// The field name, when both the name and a value are set. `null`, `""`,
    /// `0` and `false` count as unset.
    pub fn complete_name(&self) -> Option<&str> {
        let name = self.external_id_name.as_deref().filter(|n| !n.is_empty())?;
        match self.external_id_value.as_ref()? {
            Value::Null | Value::Bool(false) => None,
            Value::String(s) if s.is_empty() => None,
            Value::Number(n) if n.as_f64() == Some(0.0) => None,
            _ => Some(name),
        }
    }
}

/// Operation carried by a payload's `operation` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOperation {
    Create,
    Update,
    Upsert,
    Delete,
}

impl RecordOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordOperation::Create => "create",
            RecordOperation::Update => "update",
            RecordOperation::Upsert => "upsert",
            RecordOperation::Delete => "delete",
        }
    }
}

impl FromStr for RecordOperation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "create" => Ok(RecordOperation::Create),
            "update" => Ok(RecordOperation::Update),
            "upsert" => Ok(RecordOperation::Upsert),
            "delete" => Ok(RecordOperation::Delete),
            other => Err(Error::new(ErrorKind::UnknownOperation(other.to_string()))),
        }
    }
}

/// Sync mode selected for a batch. `add` is the sync-mode name for create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    Add,
    Update,
    Upsert,
    Delete,
}

impl FromStr for SyncMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add" => Ok(SyncMode::Add),
            "update" => Ok(SyncMode::Update),
            "upsert" => Ok(SyncMode::Upsert),
            "delete" => Ok(SyncMode::Delete),
            other => Err(Error::new(ErrorKind::UnknownOperation(other.to_string()))),
        }
    }
}
