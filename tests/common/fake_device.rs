use std::cell::RefCell;

use droid_locator::device::rpc::RpcTransport;
use droid_locator::device::selector::MASK_INSTANCE;
use droid_locator::hierarchy::criteria::QUERY_ATTRIBUTES;
use droid_locator::{Criteria, CriterionValue, LocatorError, LocatorResult, ViewHierarchyDump};
use serde_json::{Value, json};

/// Stands in for the on-device server, answering from a parsed dump.
pub struct FakeDevice {
    pub dump: ViewHierarchyDump,
    pub xml: String,
    pub calls: RefCell<Vec<String>>,
}

impl FakeDevice {
    pub fn new(xml: &str) -> Self {
        Self {
            dump: ViewHierarchyDump::parse(super::utils::DISPLAY, xml).unwrap(),
            xml: xml.to_string(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.borrow().iter().filter(|m| *m == method).count()
    }
}

/// Rebuild criteria from the fields the selector mask marks as in effect.
pub fn criteria_from_selector(selector: &Value) -> Criteria {
    let mask = selector["mask"].as_u64().unwrap() as u32;
    let mut criteria = Criteria::new();
    for attribute in QUERY_ATTRIBUTES {
        if mask & attribute.mask == 0 {
            continue;
        }
        let value = match &selector[attribute.name] {
            Value::Bool(b) => CriterionValue::Flag(*b),
            Value::Number(n) => CriterionValue::Number(n.as_i64().unwrap()),
            Value::String(s) => CriterionValue::Text(s.clone()),
            other => panic!("unexpected selector value {:?}", other),
        };
        criteria = criteria.with(attribute.name, value);
    }
    criteria
}

impl RpcTransport for FakeDevice {
    fn call(&self, method: &str, params: Value) -> LocatorResult<Value> {
        self.calls.borrow_mut().push(method.to_string());
        match method {
            "count" => {
                let criteria = criteria_from_selector(&params[0]);
                Ok(json!(self.dump.find_objects(&criteria)?.len()))
            }
            "objInfo" => {
                let selector = &params[0];
                assert_ne!(
                    selector["mask"].as_u64().unwrap() as u32 & MASK_INSTANCE,
                    0,
                    "objInfo must address one instance"
                );
                let instance = selector["instance"].as_u64().unwrap() as usize;
                let criteria = criteria_from_selector(selector);
                let info = self
                    .dump
                    .find_objects(&criteria)?
                    .into_iter()
                    .nth(instance)
                    .ok_or_else(|| LocatorError::DeviceRpc {
                        method: method.to_string(),
                        code: -32002,
                        message: "UiObjectNotFoundException".into(),
                    })?;
                Ok(serde_json::to_value(info).unwrap())
            }
            "deviceInfo" => Ok(json!({
                "currentPackageName": "com.sec.android.app.launcher",
                "displayWidth": 1080,
                "displayHeight": 1920,
                "displayRotation": 0,
                "sdkInt": 23,
                "naturalOrientation": true,
                "screenOn": true
            })),
            "dumpWindowHierarchy" => Ok(json!(self.xml)),
            other => Err(LocatorError::DeviceRpc {
                method: other.to_string(),
                code: -32601,
                message: "Method not found".into(),
            }),
        }
    }
}
