//! Mock health-reporting service backed by mockito
//!
//! Each helper registers one endpoint; the returned mock can be asserted on
//! after the run.

#![allow(dead_code)]

use mockito::{Matcher, Mock, ServerGuard};

pub const CHECK_BIND: &str = "/api/login/checkBind";
pub const BIND_USER_INFO: &str = "/api/login/bindUserInfo";
pub const MONITOR_REGISTER: &str = "/monitorRegister";
pub const CANCEL_BIND: &str = "/api/login/cancelBind";

/// Mock server plus its base URL
pub struct MockService {
    pub server: ServerGuard,
}

impl MockService {
    pub async fn start() -> Self {
        Self {
            server: mockito::Server::new_async().await,
        }
    }

    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Answer `path` with `body`, expecting exactly `hits` calls
    pub async fn endpoint(&mut self, path: &str, body: &str, hits: usize) -> Mock {
        self.server
            .mock("POST", path)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create_async()
            .await
    }

    /// Like [`MockService::endpoint`] but only matching requests with `request_body`
    pub async fn endpoint_with_body(
        &mut self,
        path: &str,
        request_body: &str,
        body: &str,
    ) -> Mock {
        self.server
            .mock("POST", path)
            .match_body(Matcher::Exact(request_body.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(1)
            .create_async()
            .await
    }

    /// Only matching requests carrying the session cookie
    pub async fn endpoint_with_session(
        &mut self,
        path: &str,
        session_id: &str,
        body: &str,
    ) -> Mock {
        self.server
            .mock("POST", path)
            .match_header("cookie", Matcher::Regex(format!("JSESSIONID={session_id}")))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(1)
            .create_async()
            .await
    }
}
