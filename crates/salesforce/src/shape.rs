//! Derived field mapping for standard objects.

use serde_json::{Map, Value};

use crate::payload::GenericPayload;

/// Map a payload's standard fields onto the Salesforce field names of `sobject`.
///
/// Lead, Contact, Account, Case and Opportunity are understood (case
/// insensitive); any other object gets an empty shape. Absent fields are
/// left out.
pub fn map_object_to_shape(payload: &GenericPayload, sobject: &str) -> Map<String, Value> {
    let mut shape = Shape::default();

    match sobject.to_ascii_lowercase().as_str() {
        "lead" => {
            shape.text("LastName", &payload.last_name);
            shape.text("FirstName", &payload.first_name);
            shape.text("Company", &payload.company);
            shape.text("Email", &payload.email);
            shape.address("", payload, Address::Main);
        }
        "contact" => {
            shape.text("LastName", &payload.last_name);
            shape.text("FirstName", &payload.first_name);
            shape.text("Email", &payload.email);
            shape.text("AccountId", &payload.account_id);
            shape.address("Mailing", payload, Address::Main);
        }
        "account" => {
            shape.text("Name", &payload.name);
            shape.text("AccountNumber", &payload.account_number);
            if let Some(count) = payload.number_of_employees {
                shape.0.insert("NumberOfEmployees".to_string(), count.into());
            }
            shape.text("Phone", &payload.phone);
            shape.text("Website", &payload.website);
            shape.text("Description", &payload.description);
            shape.address("Billing", payload, Address::Billing);
            shape.address("Shipping", payload, Address::Shipping);
        }
        "case" => {
            shape.text("Description", &payload.description);
        }
        "opportunity" => {
            shape.text("Name", &payload.name);
            shape.text("CloseDate", &payload.close_date);
            shape.text("StageName", &payload.stage_name);
            shape.text("Amount", &payload.amount);
            shape.text("Description", &payload.description);
        }
        _ => {}
    }

    shape.0
}

/// The JSON body for a single-record create or update.
///
/// Derived fields are skipped for custom objects; custom fields always win.
pub fn build_json_data(payload: &GenericPayload, sobject: &str) -> Map<String, Value> {
    let mut data = if payload.is_custom_object() {
        Map::new()
    } else {
        map_object_to_shape(payload, sobject)
    };

    if let Some(custom) = &payload.custom_fields {
        data.extend(custom.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    data
}

#[derive(Clone, Copy)]
enum Address {
    Main,
    Billing,
    Shipping,
}

#[derive(Default)]
struct Shape(Map<String, Value>);

impl Shape {
    fn text(&mut self, field: &str, value: &Option<String>) {
        if let Some(value) = value {
            self.0.insert(field.to_string(), Value::String(value.clone()));
        }
    }

    fn address(&mut self, prefix: &str, payload: &GenericPayload, which: Address) {
        let (city, postal_code, country, street, state) = match which {
            Address::Main => (
                &payload.city,
                &payload.postal_code,
                &payload.country,
                &payload.street,
                &payload.state,
            ),
            Address::Billing => (
                &payload.billing_city,
                &payload.billing_postal_code,
                &payload.billing_country,
                &payload.billing_street,
                &payload.billing_state,
            ),
            Address::Shipping => (
                &payload.shipping_city,
                &payload.shipping_postal_code,
                &payload.shipping_country,
                &payload.shipping_street,
                &payload.shipping_state,
            ),
        };

        self.text(&format!("{prefix}City"), city);
        self.text(&format!("{prefix}PostalCode"), postal_code);
        self.text(&format!("{prefix}Country"), country);
        self.text(&format!("{prefix}Street"), street);
        self.text(&format!("{prefix}State"), state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> GenericPayload {
        GenericPayload {
            last_name: Some("Smith".into()),
            company: Some("Acme".into()),
            email: Some("s@acme.com".into()),
            city: Some("Paris".into()),
            billing_city: Some("Lyon".into()),
            shipping_state: Some("IDF".into()),
            name: Some("Acme Corp".into()),
            number_of_employees: Some(12),
            ..Default::default()
        }
    }

    #[test]
    fn test_lead_uses_unprefixed_address() {
        let shape = map_object_to_shape(&payload(), "Lead");
        assert_eq!(shape["LastName"], "Smith");
        assert_eq!(shape["Company"], "Acme");
        assert_eq!(shape["City"], "Paris");
        assert!(!shape.contains_key("FirstName"));
    }

    #[test]
    fn test_contact_uses_mailing_address() {
        let shape = map_object_to_shape(&payload(), "contact");
        assert_eq!(shape["MailingCity"], "Paris");
        assert!(!shape.contains_key("Company"));
    }

    #[test]
    fn test_account_uses_billing_and_shipping() {
        let shape = map_object_to_shape(&payload(), "Account");
        assert_eq!(shape["Name"], "Acme Corp");
        assert_eq!(shape["NumberOfEmployees"], 12);
        assert_eq!(shape["BillingCity"], "Lyon");
        assert_eq!(shape["ShippingState"], "IDF");
        assert!(!shape.contains_key("City"));
    }

    #[test]
    fn test_unknown_object_is_empty() {
        assert!(map_object_to_shape(&payload(), "Widget__c").is_empty());
    }

    #[test]
    fn test_custom_fields_override_derived_fields() {
        let mut p = payload();
        p.custom_fields = Some(
            json!({"LastName": "Override", "Custom__c": true})
                .as_object()
                .cloned()
                .unwrap(),
        );

        let data = build_json_data(&p, "Lead");
        assert_eq!(data["LastName"], "Override");
        assert_eq!(data["Custom__c"], true);
        assert_eq!(data["Company"], "Acme");
    }

    #[test]
    fn test_custom_object_skips_derived_fields() {
        let mut p = payload();
        p.custom_object_name = Some("Widget__c".into());
        p.custom_fields = Some(json!({"Size__c": 3}).as_object().cloned().unwrap());

        let data = build_json_data(&p, "Lead");
        assert_eq!(data.len(), 1);
        assert_eq!(data["Size__c"], 3);
    }
}
