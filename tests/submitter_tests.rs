//! Workflow tests against a mock health-reporting service

mod common;

use async_trait::async_trait;
use common::fixtures::{
    bind_ok_body, check_bind_body, make_config, make_form, ok_body, rejected_body,
};
use common::mock_service::{
    MockService, BIND_USER_INFO, CANCEL_BIND, CHECK_BIND, MONITOR_REGISTER,
};
use health_submit::codec;
use health_submit::error::Error;
use health_submit::progress::{NoopProgress, ProgressCallback, Step};
use health_submit::select::USER_AGENTS;
use health_submit::status::Stage;
use health_submit::submitter::{Submitter, UNBIND_FAILED_CODE};
use health_submit::types::Outcome;
use mockito::Matcher;
use serde_json::json;
use std::sync::Mutex;

/// Records every callback for later inspection
#[derive(Default)]
struct RecordingProgress {
    events: Mutex<Vec<(Step, Option<bool>)>>,
}

#[async_trait]
impl ProgressCallback for RecordingProgress {
    async fn on_step(&self, step: Step) {
        self.events.lock().unwrap().push((step, None));
    }

    async fn on_step_done(&self, step: Step, success: bool, _message: &str) {
        self.events.lock().unwrap().push((step, Some(success)));
    }
}

fn unbound_body() -> String {
    ok_body(&json!("解绑成功"))
}

#[tokio::test]
async fn test_full_run_submits_and_unbinds() {
    let mut service = MockService::start().await;
    let form = make_form();
    let report = codec::encode(&form.health_report("36°C以下")).unwrap();

    let check = service
        .endpoint_with_body(CHECK_BIND, form.login_token(), &check_bind_body("sess-1"))
        .await;
    let bind = service
        .endpoint_with_body(BIND_USER_INFO, form.login_token(), &bind_ok_body())
        .await;
    let submit = service
        .endpoint_with_body(MONITOR_REGISTER, &report, &ok_body(&json!(true)))
        .await;
    let cancel = service.endpoint(CANCEL_BIND, &unbound_body(), 1).await;

    let config = make_config(&service.url());
    let submitter = Submitter::new(&form, &config).unwrap();
    let status = submitter.submit(&NoopProgress).await.unwrap();

    check.assert_async().await;
    bind.assert_async().await;
    submit.assert_async().await;
    cancel.assert_async().await;

    assert_eq!(status.stage(), Stage::Cancelled);
    assert_eq!(status.session_id(), "sess-1");
    assert!(status.is_bind_success());
    assert!(status.is_submit_success());
    assert!(status.is_cancel_success());
    assert!(status.is_ok());
    assert_eq!(status.recap(), "bind succeeded: X-Y-Z");
}

#[tokio::test]
async fn test_bind_rejected_skips_submission_but_unbinds() {
    let mut service = MockService::start().await;
    let form = make_form();

    let _check = service
        .endpoint(CHECK_BIND, &check_bind_body("sess-2"), 1)
        .await;
    let _bind = service
        .endpoint(BIND_USER_INFO, &rejected_body("identity already bound"), 1)
        .await;
    let submit = service
        .endpoint(MONITOR_REGISTER, &ok_body(&json!(true)), 0)
        .await;
    let cancel = service
        .endpoint(CANCEL_BIND, &rejected_body("no such bound user"), 1)
        .await;

    let config = make_config(&service.url());
    let submitter = Submitter::new(&form, &config).unwrap();
    let status = submitter.submit(&NoopProgress).await.unwrap();

    submit.assert_async().await;
    cancel.assert_async().await;

    assert!(!status.is_bind_success());
    assert!(status.submit_result().is_none());
    assert!(status.cancel_result().is_some());
    assert!(!status.is_cancel_success());
    assert_eq!(status.recap(), "bind failed: identity already bound");
    assert!(!status.is_ok());
}

#[tokio::test]
async fn test_submission_rejected_is_recorded() {
    let mut service = MockService::start().await;
    let form = make_form();

    let _check = service.endpoint(CHECK_BIND, &check_bind_body("sess-3"), 1).await;
    let _bind = service.endpoint(BIND_USER_INFO, &bind_ok_body(), 1).await;
    let _submit = service
        .endpoint(MONITOR_REGISTER, &rejected_body("already submitted today"), 1)
        .await;
    let cancel = service.endpoint(CANCEL_BIND, &unbound_body(), 1).await;

    let config = make_config(&service.url());
    let submitter = Submitter::new(&form, &config).unwrap();
    let status = submitter.submit(&NoopProgress).await.unwrap();

    cancel.assert_async().await;
    assert!(status.is_bind_success());
    assert!(!status.is_submit_success());
    assert_eq!(status.recap(), "already submitted today: X-Y-Z");
}

#[tokio::test]
async fn test_session_cookie_and_headers_sent() {
    let mut service = MockService::start().await;
    let form = make_form();

    let _check = service
        .endpoint(CHECK_BIND, &check_bind_body("cookie-session"), 1)
        .await;
    let bind = service
        .server
        .mock("POST", BIND_USER_INFO)
        .match_header("cookie", Matcher::Regex("JSESSIONID=cookie-session".to_string()))
        .match_header("encode", "true")
        .match_header("content-type", "application/json")
        .match_header("user-agent", USER_AGENTS[0])
        .with_status(200)
        .with_body(rejected_body("输入信息不符合"))
        .expect(1)
        .create_async()
        .await;
    let cancel = service
        .endpoint_with_session(CANCEL_BIND, "cookie-session", &unbound_body())
        .await;

    let config = make_config(&service.url());
    let submitter = Submitter::new(&form, &config).unwrap();
    let status = submitter.submit(&NoopProgress).await.unwrap();

    bind.assert_async().await;
    cancel.assert_async().await;
    assert_eq!(status.bind_message(), "输入信息不符合");
}

#[tokio::test]
async fn test_progress_reports_steps_in_order() {
    let mut service = MockService::start().await;
    let form = make_form();

    let _check = service.endpoint(CHECK_BIND, &check_bind_body("sess-4"), 1).await;
    let _bind = service
        .endpoint(BIND_USER_INFO, &rejected_body("identity already bound"), 1)
        .await;
    let _cancel = service.endpoint(CANCEL_BIND, &unbound_body(), 1).await;

    let config = make_config(&service.url());
    let submitter = Submitter::new(&form, &config).unwrap();
    let progress = RecordingProgress::default();
    submitter.submit(&progress).await.unwrap();

    let events = progress.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            (Step::CheckBind, None),
            (Step::CheckBind, Some(true)),
            (Step::BindUserInfo, None),
            (Step::BindUserInfo, Some(false)),
            (Step::CancelBind, None),
            (Step::CancelBind, Some(true)),
        ]
    );
}

#[tokio::test]
async fn test_missing_session_is_fatal() {
    let mut service = MockService::start().await;
    let form = make_form();

    let _check = service
        .endpoint(CHECK_BIND, &rejected_body("system busy"), 1)
        .await;
    let cancel = service.endpoint(CANCEL_BIND, &unbound_body(), 0).await;

    let config = make_config(&service.url());
    let submitter = Submitter::new(&form, &config).unwrap();
    let err = submitter.submit(&NoopProgress).await.unwrap_err();

    cancel.assert_async().await;
    assert!(matches!(
        err,
        Error::MalformedResponse { ref endpoint, .. } if endpoint == CHECK_BIND
    ));
}

#[tokio::test]
async fn test_malformed_bind_response_still_unbinds() {
    let mut service = MockService::start().await;
    let form = make_form();

    let _check = service.endpoint(CHECK_BIND, &check_bind_body("sess-5"), 1).await;
    let _bind = service
        .server
        .mock("POST", BIND_USER_INFO)
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;
    let cancel = service.endpoint(CANCEL_BIND, &unbound_body(), 1).await;

    let config = make_config(&service.url());
    let submitter = Submitter::new(&form, &config).unwrap();
    let err = submitter.submit(&NoopProgress).await.unwrap_err();

    cancel.assert_async().await;
    assert!(matches!(
        err,
        Error::MalformedResponse { ref endpoint, .. } if endpoint == BIND_USER_INFO
    ));
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    let form = make_form();
    let config = make_config("http://127.0.0.1:1");
    let submitter = Submitter::new(&form, &config).unwrap();

    let err = submitter.submit(&NoopProgress).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}

#[tokio::test]
async fn test_each_step_callable_alone() {
    let mut service = MockService::start().await;
    let form = make_form();

    let _check = service.endpoint(CHECK_BIND, &check_bind_body("sess-6"), 1).await;
    let _cancel = service.endpoint(CANCEL_BIND, &unbound_body(), 1).await;

    let config = make_config(&service.url());
    let submitter = Submitter::new(&form, &config).unwrap();

    let check = submitter.check_bind().await.unwrap();
    assert_eq!(check.session_id, "sess-6");

    let cancel = submitter.cancel_bind().await.unwrap();
    assert!(cancel.is_success());
    assert_eq!(cancel.message(), "");
}

#[tokio::test]
async fn test_failed_unbind_is_recorded_after_accepted_report() {
    let mut service = MockService::start().await;
    let form = make_form();

    let _check = service.endpoint(CHECK_BIND, &check_bind_body("sess-7"), 1).await;
    let _bind = service.endpoint(BIND_USER_INFO, &bind_ok_body(), 1).await;
    let submit = service
        .endpoint(MONITOR_REGISTER, &ok_body(&json!(true)), 1)
        .await;
    let cancel = service
        .server
        .mock("POST", CANCEL_BIND)
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .expect(1)
        .create_async()
        .await;

    let config = make_config(&service.url());
    let submitter = Submitter::new(&form, &config).unwrap();
    let status = submitter.submit(&NoopProgress).await.unwrap();

    submit.assert_async().await;
    cancel.assert_async().await;

    assert_eq!(status.stage(), Stage::Cancelled);
    assert!(status.is_ok());
    assert!(!status.is_cancel_success());
    assert_eq!(status.recap(), "bind succeeded: X-Y-Z");
    match status.cancel_result() {
        Some(Outcome::Failure(rejection)) => {
            assert_eq!(rejection.code, UNBIND_FAILED_CODE);
            assert!(rejection.message.contains(CANCEL_BIND));
        }
        other => panic!("expected a recorded unbind failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_report_response_still_unbinds() {
    let mut service = MockService::start().await;
    let form = make_form();

    let _check = service.endpoint(CHECK_BIND, &check_bind_body("sess-8"), 1).await;
    let _bind = service.endpoint(BIND_USER_INFO, &bind_ok_body(), 1).await;
    let _submit = service
        .server
        .mock("POST", MONITOR_REGISTER)
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;
    let cancel = service
        .endpoint_with_session(CANCEL_BIND, "sess-8", &unbound_body())
        .await;

    let config = make_config(&service.url());
    let submitter = Submitter::new(&form, &config).unwrap();
    let err = submitter.submit(&NoopProgress).await.unwrap_err();

    cancel.assert_async().await;
    assert!(matches!(
        err,
        Error::MalformedResponse { ref endpoint, .. } if endpoint == MONITOR_REGISTER
    ));
}

#[tokio::test]
async fn test_cleanup_unbind_is_reported() {
    let mut service = MockService::start().await;
    let form = make_form();

    let _check = service.endpoint(CHECK_BIND, &check_bind_body("sess-9"), 1).await;
    let _bind = service
        .server
        .mock("POST", BIND_USER_INFO)
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;
    let _cancel = service.endpoint(CANCEL_BIND, &unbound_body(), 1).await;

    let config = make_config(&service.url());
    let submitter = Submitter::new(&form, &config).unwrap();
    let progress = RecordingProgress::default();
    submitter.submit(&progress).await.unwrap_err();

    let events = progress.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            (Step::CheckBind, None),
            (Step::CheckBind, Some(true)),
            (Step::BindUserInfo, None),
            (Step::CancelBind, None),
            (Step::CancelBind, Some(true)),
        ]
    );
}
