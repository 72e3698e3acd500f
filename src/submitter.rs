//! Submitter: drives bind, submit and unbind against the remote service
//!
//! One submitter owns one HTTP session. The steps run strictly in order:
//! 1. `checkBind` - obtain a session id and store it as `JSESSIONID`
//! 2. `bindUserInfo` - bind the identity to that session
//! 3. `monitorRegister` - send the daily report (only if binding succeeded)
//! 4. `cancelBind` - release the binding, always
//!
//! Rejections from the service are recorded in the returned
//! [`SubmitStatus`]; only transport or decoding failures are errors.

use crate::codec;
use crate::error::{Error, Result};
use crate::form::Form;
use crate::progress::{ProgressCallback, Step};
use crate::select::{Selection, TEMPERATURES, USER_AGENTS};
use crate::status::SubmitStatus;
use crate::types::{BindData, CheckBindData, Envelope, Outcome, Rejection, UserRecord};
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONNECTION, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Production service root
pub const DEFAULT_BASE_URL: &str = "https://zhxg.whut.edu.cn/yqtjwx";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Cookie carrying the session id between steps
const SESSION_COOKIE: &str = "JSESSIONID";

/// Code recorded when the unbind request itself could not complete
pub const UNBIND_FAILED_CODE: i64 = -1;

/// Client settings for a submitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitterConfig {
    /// Service root; endpoint paths are appended to it
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// How the user-agent header is chosen
    pub user_agent: Selection,
    /// How the reported temperature is chosen
    pub temperature: Selection,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: Selection::Random,
            temperature: Selection::Random,
        }
    }
}

/// Runs the check-in workflow for one form
pub struct Submitter<'a> {
    form: &'a Form,
    client: Client,
    jar: Arc<Jar>,
    base_url: Url,
    temperature: Selection,
}

impl<'a> Submitter<'a> {
    /// Create a submitter with a fresh session for `form`
    pub fn new(form: &'a Form, config: &SubmitterConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {}: {e}", config.base_url)))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(config.user_agent.pick(USER_AGENTS)),
        );
        headers.insert(
            HeaderName::from_static("encode"),
            HeaderValue::from_static("true"),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .default_headers(headers)
            .cookie_provider(Arc::clone(&jar))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            form,
            client,
            jar,
            base_url,
            temperature: config.temperature,
        })
    }

    /// Form this submitter was created for
    pub const fn form(&self) -> &Form {
        self.form
    }

    /// Run the whole workflow
    ///
    /// Unbinding is attempted even when binding or submitting was rejected.
    /// If a transport error interrupts binding or submitting, unbinding is
    /// still tried before the error is returned. A failed unbind is recorded
    /// in the status, never returned as an error.
    pub async fn submit(&self, progress: &dyn ProgressCallback) -> Result<SubmitStatus> {
        progress.on_step(Step::CheckBind).await;
        let check = self.check_bind().await?;
        progress.on_step_done(Step::CheckBind, true, "").await;

        let status = SubmitStatus::default().with_check(check)?;

        let status = match self.bind_and_report(status, progress).await {
            Ok(status) => status,
            Err(e) => {
                self.unbind(progress).await;
                return Err(e);
            }
        };

        let cancel = self.unbind(progress).await;
        status.with_cancel(cancel)
    }

    /// Release the binding, turning a transport or decoding failure into a
    /// recorded rejection
    async fn unbind(&self, progress: &dyn ProgressCallback) -> Outcome<Option<String>> {
        progress.on_step(Step::CancelBind).await;
        let cancel = self.cancel_bind().await.unwrap_or_else(|e| {
            warn!(sn = self.form.sn(), "unbind failed: {e}");
            Outcome::Failure(Rejection {
                code: UNBIND_FAILED_CODE,
                message: e.to_string(),
            })
        });
        progress
            .on_step_done(Step::CancelBind, cancel.is_success(), cancel.message())
            .await;
        cancel
    }

    async fn bind_and_report(
        &self,
        status: SubmitStatus,
        progress: &dyn ProgressCallback,
    ) -> Result<SubmitStatus> {
        progress.on_step(Step::BindUserInfo).await;
        let bind = self.bind_user_info().await?;
        progress
            .on_step_done(Step::BindUserInfo, bind.is_success(), bind.message())
            .await;

        let status = status.with_bind(bind)?;
        if !status.is_bind_success() {
            info!(sn = self.form.sn(), "bind failed: {}", status.bind_message());
            return Ok(status);
        }

        progress.on_step(Step::SubmitForm).await;
        let submit = self.submit_form().await?;
        progress
            .on_step_done(Step::SubmitForm, submit.is_success(), submit.message())
            .await;

        status.with_submit(submit)
    }

    /// Open a session and remember its id as the session cookie
    ///
    /// The `bind` flag in the answer is the same whether or not the identity
    /// is already bound, so nothing here depends on it.
    pub async fn check_bind(&self) -> Result<CheckBindData> {
        let envelope = self
            .post(Step::CheckBind, Some(self.form.login_token().to_string()))
            .await?;

        let data = envelope
            .data
            .ok_or_else(|| malformed(Step::CheckBind, "missing session payload"))?;
        let check: CheckBindData =
            serde_json::from_value(data).map_err(|e| malformed(Step::CheckBind, e))?;

        // Overwrites any session cookie the server set with the announced id
        self.jar.add_cookie_str(
            &format!("{SESSION_COOKIE}={}; Path=/", check.session_id),
            &self.base_url,
        );
        debug!(session_id = %check.session_id, "session established");

        Ok(check)
    }

    /// Bind the form's identity to the session
    pub async fn bind_user_info(&self) -> Result<Outcome<UserRecord>> {
        let envelope = self
            .post(Step::BindUserInfo, Some(self.form.login_token().to_string()))
            .await?;

        let outcome: Outcome<BindData> = typed(Step::BindUserInfo, envelope)?;
        Ok(outcome.map(|data| data.user))
    }

    /// Send today's report
    pub async fn submit_form(&self) -> Result<Outcome<Value>> {
        let report = self
            .form
            .health_report(self.temperature.pick(TEMPERATURES));
        debug!(temperature = %report.temperature, "report prepared");

        let envelope = self
            .post(Step::SubmitForm, Some(codec::encode(&report)?))
            .await?;
        typed(Step::SubmitForm, envelope)
    }

    /// Release the identity binding
    pub async fn cancel_bind(&self) -> Result<Outcome<Option<String>>> {
        let envelope = self.post(Step::CancelBind, None).await?;
        typed(Step::CancelBind, envelope)
    }

    fn endpoint(&self, step: Step) -> String {
        format!(
            "{}{}",
            self.base_url.as_str().trim_end_matches('/'),
            step.path()
        )
    }

    async fn post(&self, step: Step, body: Option<String>) -> Result<Envelope> {
        let mut request = self.client.post(self.endpoint(step));
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let http_status = response.status();
        let text = response.text().await?;
        debug!(endpoint = step.path(), %http_status, raw = %text, "response received");

        let envelope = Envelope::parse(&text).map_err(|e| malformed(step, e))?;
        info!(
            endpoint = step.path(),
            status = envelope.status,
            reason = envelope.message.as_deref().unwrap_or_default(),
            data = ?envelope.data,
            "response decoded"
        );

        Ok(envelope)
    }
}

fn typed<T: DeserializeOwned>(step: Step, envelope: Envelope) -> Result<Outcome<T>> {
    envelope.into_outcome().map_err(|e| malformed(step, e))
}

fn malformed(step: Step, reason: impl ToString) -> Error {
    Error::MalformedResponse {
        endpoint: step.path().to_string(),
        reason: reason.to_string(),
    }
}
