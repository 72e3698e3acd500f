//! Test data factories for health-submit types
//!
//! Not every helper is used by every test binary.

#![allow(dead_code)]

use health_submit::codec;
use health_submit::form::{Form, Location};
use health_submit::select::Selection;
use health_submit::submitter::SubmitterConfig;
use health_submit::types::Identity;
use serde_json::{json, Value};
use std::time::Duration;

/// Identity used by most tests
pub fn make_identity() -> Identity {
    Identity {
        sn: "012345678901".to_string(),
        id_card: "654321".to_string(),
        nickname: "青山".to_string(),
    }
}

/// Form with a fixed Wuhan address
pub fn make_form() -> Form {
    Form::new(
        &make_identity(),
        Location {
            province: "湖北省".to_string(),
            city: "武汉市".to_string(),
            county: "洪山区".to_string(),
            street: "珞狮路122号".to_string(),
        },
        true,
        false,
    )
    .unwrap()
}

/// Submitter settings pointed at a mock server, with pinned choices
pub fn make_config(base_url: &str) -> SubmitterConfig {
    SubmitterConfig {
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
        user_agent: Selection::Fixed(0),
        temperature: Selection::Fixed(0),
    }
}

/// Successful envelope with an encoded payload
pub fn ok_body(data: &Value) -> String {
    json!({
        "status": true,
        "code": 0,
        "message": null,
        "data": codec::encode(data).unwrap(),
        "otherData": {}
    })
    .to_string()
}

/// Rejected envelope with a message and no payload
pub fn rejected_body(message: &str) -> String {
    json!({
        "status": false,
        "code": 50000,
        "message": message,
        "data": null,
        "otherData": {}
    })
    .to_string()
}

/// `checkBind` answer handing out `session_id`
pub fn check_bind_body(session_id: &str) -> String {
    ok_body(&json!({"bind": false, "sessionId": session_id}))
}

/// `bindUserInfo` answer for user X/Y/Z
pub fn bind_ok_body() -> String {
    ok_body(&json!({
        "user": {
            "id": 1001,
            "openId": "",
            "sn": "012345678901",
            "nickName": "青山",
            "gender": null,
            "name": "Z",
            "college": "X",
            "className": "Y",
            "major": "华尔兹工程",
            "unionId": null
        }
    }))
}
