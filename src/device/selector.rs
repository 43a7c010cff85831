use serde_json::{Map, Value, json};

use crate::error::LocatorResult;
use crate::hierarchy::criteria::{
    Criteria, CriterionValue, FieldKind, QUERY_ATTRIBUTES, QueryAttribute, lookup_attribute,
};

pub const MASK_INSTANCE: u32 = 0x0100_0000;

/// uiautomator `UiSelector` as sent to the on-device JSON-RPC server.
///
/// Every field is always present with its default; `mask` marks which ones
/// are actually in effect.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    fields: Map<String, Value>,
    mask: u32,
}

impl Selector {
    pub fn from_criteria(criteria: &Criteria) -> LocatorResult<Self> {
        let mut fields = Map::new();
        for attribute in QUERY_ATTRIBUTES {
            fields.insert(attribute.name.to_string(), default_value(attribute));
        }
        fields.insert("instance".to_string(), json!(0));

        let mut mask = 0;
        for (name, value) in criteria.iter() {
            let attribute = lookup_attribute(name)?;
            fields.insert(name.clone(), wire_value(attribute, value)?);
            mask |= attribute.mask;
        }

        Ok(Self { fields, mask })
    }

    /// Copy of this selector narrowed to the `instance`-th match.
    pub fn instance(&self, instance: usize) -> Self {
        let mut fields = self.fields.clone();
        fields.insert("instance".to_string(), json!(instance));
        Self {
            fields,
            mask: self.mask | MASK_INSTANCE,
        }
    }

    pub fn mask(&self) -> u32 {
        self.mask
    }

    pub fn to_json(&self) -> Value {
        let mut obj = self.fields.clone();
        obj.insert("mask".to_string(), json!(self.mask));
        obj.insert("childOrSibling".to_string(), json!([]));
        obj.insert("childOrSiblingSelector".to_string(), json!([]));
        Value::Object(obj)
    }
}

fn default_value(attribute: &QueryAttribute) -> Value {
    match attribute.field_kind {
        FieldKind::Text => Value::Null,
        FieldKind::Flag => json!(false),
        FieldKind::Number => json!(0),
    }
}

fn wire_value(attribute: &QueryAttribute, value: &CriterionValue) -> LocatorResult<Value> {
    Ok(match attribute.typed_value(value)? {
        CriterionValue::Flag(b) => json!(b),
        CriterionValue::Number(n) => json!(n),
        CriterionValue::Text(s) => json!(s),
    })
}
