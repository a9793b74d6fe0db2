//! Schema - payload の decode と検証
//!
//! Both functions are pure. `validate` is the only way untrusted input
//! becomes a [`WidgetRequest`].

use serde_json::{Map, Value};

use crate::domain::{Attribute, DecodeError, RequestType, SchemaError, WidgetRequest};

pub fn decode(body: &[u8]) -> Result<Value, DecodeError> {
    Ok(serde_json::from_slice(body)?)
}

pub fn validate(payload: &Value) -> Result<WidgetRequest, SchemaError> {
    let fields = payload.as_object().ok_or(SchemaError::NotAnObject)?;

    let raw_type = required(fields, "type")?;
    let request_id = required(fields, "requestId")?;
    let widget_id = required(fields, "widgetId")?;
    let owner = required(fields, "owner")?;
    let request_type = RequestType::parse(raw_type)?;

    Ok(WidgetRequest {
        request_type,
        request_id: request_id.to_string(),
        widget_id: widget_id.to_string(),
        owner: owner.to_string(),
        label: optional_string(fields, "label")?,
        description: optional_string(fields, "description")?,
        other_attributes: other_attributes(fields)?,
    })
}

fn required<'a>(fields: &'a Map<String, Value>, name: &'static str) -> Result<&'a str, SchemaError> {
    match fields.get(name) {
        None | Some(Value::Null) => Err(SchemaError::MissingField(name)),
        Some(Value::String(value)) if value.trim().is_empty() => Err(SchemaError::EmptyField(name)),
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(SchemaError::InvalidField {
            field: name,
            reason: "expected a string".to_string(),
        }),
    }
}

fn optional_string(
    fields: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<String>, SchemaError> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(_) => Err(SchemaError::InvalidField {
            field: name,
            reason: "expected a string".to_string(),
        }),
    }
}

fn other_attributes(fields: &Map<String, Value>) -> Result<Vec<Attribute>, SchemaError> {
    match fields.get("otherAttributes") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
            SchemaError::InvalidField {
                field: "otherAttributes",
                reason: e.to_string(),
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn valid() -> Value {
        json!({ "type": "create", "requestId": "123", "widgetId": "456", "owner": "user" })
    }

    #[test]
    fn accepts_minimal_request() {
        let request = validate(&valid()).unwrap();
        assert_eq!(
            request,
            WidgetRequest::new(RequestType::Create, "123", "456", "user")
        );
    }

    #[test]
    fn keeps_optional_fields() {
        let payload = json!({
            "type": "update",
            "requestId": "r1",
            "widgetId": "w1",
            "owner": "Jane Doe",
            "label": "New",
            "description": "Shiny",
            "otherAttributes": [
                { "name": "color", "value": "blue" },
                { "name": "size", "value": 3 }
            ]
        });

        let request = validate(&payload).unwrap();
        assert_eq!(request.label.as_deref(), Some("New"));
        assert_eq!(request.description.as_deref(), Some("Shiny"));
        assert_eq!(
            request.other_attributes,
            vec![Attribute::new("color", "blue"), Attribute::new("size", 3)]
        );
    }

    #[rstest]
    #[case::type_("type")]
    #[case::request_id("requestId")]
    #[case::widget_id("widgetId")]
    #[case::owner("owner")]
    fn missing_required_field(#[case] field: &'static str) {
        let mut payload = valid();
        payload.as_object_mut().unwrap().remove(field);
        assert_eq!(validate(&payload), Err(SchemaError::MissingField(field)));
    }

    #[rstest]
    #[case::null("owner", json!(null), SchemaError::MissingField("owner"))]
    #[case::empty("widgetId", json!(""), SchemaError::EmptyField("widgetId"))]
    #[case::blank("requestId", json!("  "), SchemaError::EmptyField("requestId"))]
    fn null_or_empty_required_field(
        #[case] field: &str,
        #[case] value: Value,
        #[case] expected: SchemaError,
    ) {
        let mut payload = valid();
        payload[field] = value;
        assert_eq!(validate(&payload), Err(expected));
    }

    #[test]
    fn only_type_and_request_id_is_rejected() {
        let payload = json!({ "type": "create", "requestId": "123" });
        assert_eq!(validate(&payload), Err(SchemaError::MissingField("widgetId")));
    }

    #[rstest]
    #[case::invalid("invalid")]
    #[case::substring("undelete")]
    #[case::upper("DELETE")]
    fn unknown_type_is_rejected(#[case] raw: &str) {
        let mut payload = valid();
        payload["type"] = json!(raw);
        assert_eq!(
            validate(&payload),
            Err(SchemaError::UnknownType(raw.to_string()))
        );
    }

    #[rstest]
    #[case::non_string_type("type", json!(1))]
    #[case::non_string_owner("owner", json!({ "name": "x" }))]
    #[case::non_string_label("label", json!(5))]
    #[case::attributes_not_array("otherAttributes", json!("color=blue"))]
    #[case::attribute_without_name("otherAttributes", json!([{ "value": "blue" }]))]
    fn wrong_field_shape(#[case] field: &str, #[case] value: Value) {
        let mut payload = valid();
        payload[field] = value;
        assert!(matches!(
            validate(&payload),
            Err(SchemaError::InvalidField { .. })
        ));
    }

    #[rstest]
    #[case::array(json!([1, 2]))]
    #[case::string(json!("create"))]
    fn non_object_payload(#[case] payload: Value) {
        assert_eq!(validate(&payload), Err(SchemaError::NotAnObject));
    }

    #[test]
    fn decode_rejects_malformed_json() {
        assert!(decode(b"{\"type\": \"create\"").is_err());
        assert!(decode(&[0xff, 0xfe]).is_err());
        assert_eq!(decode(b"{\"type\": \"create\"}").unwrap(), json!({ "type": "create" }));
    }
}
