//! Account resource model
//!
//! The wire format is sparse: empty strings, empty lists and unset optional
//! values are left out of the encoded JSON instead of being written as `null`.
//! Plain text fields are `String` (omitted when empty) while the nullable ones
//! are `Option`, so an explicit `""` survives a round trip for those.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

const ACCOUNT_FIELDS: &[&str] = &["attributes", "id", "organisation_id", "type", "version"];

const ATTRIBUTE_FIELDS: &[&str] = &[
    "account_classification",
    "account_matching_opt_out",
    "account_number",
    "alternative_names",
    "bank_id",
    "bank_id_code",
    "base_currency",
    "bic",
    "country",
    "iban",
    "joint_account",
    "name",
    "secondary_identification",
    "status",
    "switched",
];

/// Account record managed by the service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<AccountAttributes>,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub organisation_id: String,

    /// Resource type tag, usually `accounts`
    #[serde(
        rename = "type",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

/// Descriptive account attributes, none of which are validated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_classification: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_matching_opt_out: Option<bool>,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub account_number: String,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub alternative_names: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub bank_id: String,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub bank_id_code: String,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub base_currency: String,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub bic: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub iban: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joint_account: Option<bool>,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub secondary_identification: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub switched: Option<bool>,
}

impl AccountData {
    /// Decode an account from a raw JSON request body.
    ///
    /// A repeated key keeps its last value, and field names match without
    /// regard to ASCII case (`ID` fills `id`).
    pub fn from_json(payload: &[u8]) -> Result<Self, serde_json::Error> {
        let mut value: Value = serde_json::from_slice(payload)?;
        fold_field_names(&mut value, ACCOUNT_FIELDS);
        if let Some(attributes) = value.get_mut("attributes") {
            fold_field_names(attributes, ATTRIBUTE_FIELDS);
        }
        serde_json::from_value(value)
    }
}

// Rewrites keys matching a known field case-insensitively to the field's own
// spelling. When both spellings are present the exact one wins.
fn fold_field_names(value: &mut Value, fields: &[&str]) {
    let Value::Object(map) = value else {
        return;
    };

    let mut folded = Map::with_capacity(map.len());
    let mut exact = Vec::new();
    for (key, field_value) in std::mem::take(map) {
        match fields.iter().find(|field| field.eq_ignore_ascii_case(&key)) {
            Some(field) if *field != key => {
                folded.insert((*field).to_string(), field_value);
            }
            _ => exact.push((key, field_value)),
        }
    }
    folded.extend(exact);
    *map = folded;
}

// JSON `null` decodes to the empty value instead of failing
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_account_is_sparse() {
        let account = AccountData {
            id: "acc-1".to_string(),
            organisation_id: "org-1".to_string(),
            resource_type: "accounts".to_string(),
            ..AccountData::default()
        };
        let json = serde_json::to_string(&account).unwrap();
        assert_eq!(
            json,
            r#"{"id":"acc-1","organisation_id":"org-1","type":"accounts"}"#
        );
    }

    #[test]
    fn test_empty_values_are_omitted() {
        let account = AccountData {
            id: "acc-2".to_string(),
            attributes: Some(AccountAttributes {
                account_number: String::new(),
                name: vec![],
                country: Some("GB".to_string()),
                ..AccountAttributes::default()
            }),
            ..AccountData::default()
        };
        let json = serde_json::to_string(&account).unwrap();
        assert_eq!(json, r#"{"attributes":{"country":"GB"},"id":"acc-2"}"#);
    }

    #[test]
    fn test_explicit_empty_nullable_is_kept() {
        let account = AccountData::from_json(br#"{"id":"a","attributes":{"status":""}}"#).unwrap();
        let json = serde_json::to_string(&account).unwrap();
        assert_eq!(json, r#"{"attributes":{"status":""},"id":"a"}"#);
    }

    #[test]
    fn test_empty_attributes_object_is_kept() {
        let account = AccountData::from_json(br#"{"id":"a","attributes":{}}"#).unwrap();
        assert_eq!(account.attributes, Some(AccountAttributes::default()));
        let json = serde_json::to_string(&account).unwrap();
        assert_eq!(json, r#"{"attributes":{},"id":"a"}"#);
    }

    #[test]
    fn test_nulls_decode_as_absent() {
        let account = AccountData::from_json(
            br#"{"id":"a","organisation_id":null,"version":null,"attributes":{"name":null,"bic":null,"switched":null}}"#,
        )
        .unwrap();
        assert_eq!(account.organisation_id, "");
        assert_eq!(account.version, None);
        let attributes = account.attributes.unwrap();
        assert!(attributes.name.is_empty());
        assert!(attributes.bic.is_empty());
        assert_eq!(attributes.switched, None);
    }

    #[test]
    fn test_full_account_decodes() {
        let payload = br#"{
            "id": "ad27e265-9605-4b4b-a0e5-3003ea9cc4dc",
            "organisation_id": "eb0bd6f5-c3f5-44b2-b677-acd23cdde73c",
            "type": "accounts",
            "version": 0,
            "attributes": {
                "account_classification": "Personal",
                "account_matching_opt_out": false,
                "account_number": "41426819",
                "alternative_names": ["Sam"],
                "bank_id": "400300",
                "bank_id_code": "GBDSC",
                "base_currency": "GBP",
                "bic": "NWBKGB22",
                "country": "GB",
                "iban": "GB11NWBK40030041426819",
                "joint_account": false,
                "name": ["Samantha Holder"],
                "secondary_identification": "A1B2C3D4",
                "status": "confirmed",
                "switched": false
            }
        }"#;
        let account = AccountData::from_json(payload).unwrap();
        assert_eq!(account.resource_type, "accounts");
        assert_eq!(account.version, Some(0));
        let attributes = account.attributes.as_ref().unwrap();
        assert_eq!(attributes.account_matching_opt_out, Some(false));
        assert_eq!(attributes.name, vec!["Samantha Holder".to_string()]);

        // false and zero are values, not absence
        let json = serde_json::to_string(&account).unwrap();
        assert!(json.contains(r#""version":0"#));
        assert!(json.contains(r#""switched":false"#));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let account = AccountData::from_json(br#"{"id":"a","relationships":{"x":1}}"#).unwrap();
        assert_eq!(account.id, "a");
    }

    #[test]
    fn test_repeated_key_keeps_last_value() {
        let account = AccountData::from_json(br#"{"id":"x","id":"acc-1"}"#).unwrap();
        assert_eq!(account.id, "acc-1");

        let account =
            AccountData::from_json(br#"{"id":"a","attributes":{"bic":"OLD","bic":"NEW"}}"#)
                .unwrap();
        assert_eq!(account.attributes.unwrap().bic, "NEW");
    }

    #[test]
    fn test_field_names_ignore_case() {
        let account = AccountData::from_json(
            br#"{"ID":"acc-1","Organisation_ID":"org-1","TYPE":"accounts","Attributes":{"BIC":"NWBKGB22","Switched":true}}"#,
        )
        .unwrap();
        assert_eq!(account.id, "acc-1");
        assert_eq!(account.organisation_id, "org-1");
        assert_eq!(account.resource_type, "accounts");
        let attributes = account.attributes.unwrap();
        assert_eq!(attributes.bic, "NWBKGB22");
        assert_eq!(attributes.switched, Some(true));
    }

    #[test]
    fn test_exact_field_name_beats_folded_one() {
        let account = AccountData::from_json(br#"{"ID":"x","id":"acc-1"}"#).unwrap();
        assert_eq!(account.id, "acc-1");
        let account = AccountData::from_json(br#"{"id":"acc-1","Id":"x"}"#).unwrap();
        assert_eq!(account.id, "acc-1");
    }

    #[test]
    fn test_type_mismatch_is_rejected() {
        assert!(AccountData::from_json(br#"{"id":42}"#).is_err());
        assert!(AccountData::from_json(br#"{"id":"a","version":"1"}"#).is_err());
        assert!(AccountData::from_json(b"not json").is_err());
    }
}
