//! Instagram private API client implementation

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

use instadm_core::{
    AccountInfo, PlatformClient, PlatformError, PlatformResult, SessionState, UserId,
};

use crate::error::{InstagramError, Result};
use crate::settings::ClientSettings;

/// Instagram API base URL
pub const INSTAGRAM_API_URL: &str = "https://i.instagram.com";

/// Android app id sent with every request
const IG_APP_ID: &str = "567067343352427";

/// Instagram API client bound to one session
pub struct InstagramClient {
    client: Client,
    base_url: String,
    settings: ClientSettings,
}

impl InstagramClient {
    /// Create a new client from settings
    pub fn new(
        settings: ClientSettings,
        base_url: &str,
        proxy: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        let mut builder = Client::builder().timeout(timeout);
        if let Some(proxy) = proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| InstagramError::Config(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            settings,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    fn with_headers(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request
            .header(reqwest::header::USER_AGENT, &self.settings.device.user_agent)
            .header(reqwest::header::COOKIE, self.settings.cookie_header())
            .header("X-IG-App-ID", IG_APP_ID)
            .header("X-IG-Device-ID", &self.settings.device.uuid)
            .header("X-IG-Android-ID", &self.settings.device.device_id);
        if let Some(token) = self.settings.csrf_token() {
            request = request.header("X-CSRFToken", token);
        }
        request
    }

    /// Send a request and return the JSON body, classifying failures
    async fn execute(&self, request: RequestBuilder) -> PlatformResult<Value> {
        let response = self
            .with_headers(request)
            .send()
            .await
            .map_err(InstagramError::from)?;

        let status = response.status();
        let body = response.text().await.map_err(InstagramError::from)?;

        debug!("Instagram API response: {}", status);

        let json: Option<Value> = serde_json::from_str(&body).ok();
        let failed = json
            .as_ref()
            .and_then(|j| j.get("status"))
            .and_then(Value::as_str)
            == Some("fail");

        if !status.is_success() || failed {
            let err = classify_error(status, &body, json.as_ref());
            error!("Instagram API error: {} ({})", status, err.category());
            return Err(err);
        }

        json.ok_or_else(|| {
            PlatformError::unknown("ClientJSONDecodeError", format!("Unparseable body: {}", body))
        })
    }
}

#[async_trait]
impl PlatformClient for InstagramClient {
    async fn account_info(&self) -> PlatformResult<AccountInfo> {
        let request = self
            .client
            .get(self.url("accounts/current_user/"))
            .query(&[("edit", "true")]);
        let json = self.execute(request).await?;

        let user = &json["user"];
        let pk = parse_pk(&user["pk"]).ok_or_else(|| {
            PlatformError::unknown("ClientJSONDecodeError", "current_user response has no pk")
        })?;

        Ok(AccountInfo {
            pk,
            username: user["username"].as_str().unwrap_or_default().to_string(),
            full_name: user["full_name"]
                .as_str()
                .filter(|s| !s.is_empty())
                .map(String::from),
        })
    }

    async fn user_id_from_username(&self, username: &str) -> PlatformResult<UserId> {
        info!("Resolving user id for @{}", username);

        let username = username.trim_start_matches('@');
        if username.is_empty()
            || !username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
        {
            return Err(PlatformError::UserNotFound(username.to_string()));
        }

        let request = self
            .client
            .get(self.url(&format!("users/{}/usernameinfo/", username)));
        let json = match self.execute(request).await {
            Ok(json) => json,
            Err(PlatformError::Unknown { category, .. }) if category == "ClientNotFoundError" => {
                return Err(PlatformError::UserNotFound(username.to_string()));
            }
            Err(e) => return Err(e),
        };

        parse_pk(&json["user"]["pk"])
            .ok_or_else(|| PlatformError::UserNotFound(username.to_string()))
    }

    async fn direct_send(&self, text: &str, user_ids: &[UserId]) -> PlatformResult<()> {
        info!("Sending direct message to {} user(s)", user_ids.len());

        let recipients = format!(
            "[[{}]]",
            user_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",")
        );
        let context = Uuid::new_v4().to_string();

        let request = self
            .client
            .post(self.url("direct_v2/threads/broadcast/text/"))
            .form(&[
                ("recipient_users", recipients.as_str()),
                ("text", text),
                ("action", "send_item"),
                ("client_context", context.as_str()),
                ("mutation_token", context.as_str()),
                ("_uuid", self.settings.device.uuid.as_str()),
            ]);
        self.execute(request).await?;

        Ok(())
    }

    fn dump_settings(&self) -> PlatformResult<SessionState> {
        Ok(self.settings.to_state()?)
    }
}

/// Accept `pk` either as a JSON number or a numeric string
fn parse_pk(value: &Value) -> Option<UserId> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Map an error response onto the platform error taxonomy
pub(crate) fn classify_error(
    status: StatusCode,
    body: &str,
    json: Option<&Value>,
) -> PlatformError {
    let field = |name: &str| {
        json.and_then(|j| j.get(name))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let flag = |name: &str| {
        json.and_then(|j| j.get(name))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    };

    let message = field("message");
    let error_type = field("error_type");
    let detail = if message.is_empty() {
        format!("Status: {}, Body: {}", status, body)
    } else {
        message.clone()
    };

    if flag("two_factor_required") || error_type == "two_factor_required" {
        return PlatformError::TwoFactorRequired(detail);
    }
    if message == "challenge_required"
        || error_type.contains("challenge")
        || json.is_some_and(|j| j.get("challenge").is_some())
    {
        return PlatformError::ChallengeRequired(detail);
    }
    if message == "feedback_required" || flag("spam") {
        let feedback = field("feedback_message");
        return PlatformError::FeedbackRequired(if feedback.is_empty() { detail } else { feedback });
    }
    if status == StatusCode::TOO_MANY_REQUESTS
        || error_type == "rate_limit_error"
        || message.contains("Please wait a few minutes")
    {
        return PlatformError::RateLimited(detail);
    }
    if message == "login_required" || status == StatusCode::UNAUTHORIZED {
        return PlatformError::LoginRequired(detail);
    }
    if status == StatusCode::NOT_FOUND {
        return PlatformError::unknown("ClientNotFoundError", detail);
    }
    if status.is_server_error() {
        return PlatformError::Connection(detail);
    }

    PlatformError::unknown("ClientError", detail)
}
