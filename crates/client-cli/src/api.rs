//! HTTP client for the tracker server.

use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use shared::{
    Customer, DashboardSummary, Equipment, EquipmentStatus, ErrorBody, ExportFormat, LoginRequest,
    LoginResponse, NewSchedule, NewUser, ReportData, ScheduleDetails, ScheduleList, ScheduleQuery,
    User, UserList, UserQuery,
};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing, expired or revoked token, or rejected credentials
    #[error("{0}")]
    Unauthorized(String),

    #[error("{message}")]
    Status { status: StatusCode, message: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// A downloaded export
#[derive(Debug)]
pub struct ExportFile {
    pub file_name: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Same client, sending `token` as bearer
    pub fn with_token(&self, token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.request(reqwest::Method::GET, path).send().await?;
        Ok(check(resp).await?.json().await?)
    }

    /// `Ok(None)` when the credentials are rejected
    pub async fn login(&self, credentials: &LoginRequest) -> Result<Option<LoginResponse>, ApiError> {
        let resp = self
            .request(reqwest::Method::POST, "/auth/login")
            .json(credentials)
            .send()
            .await?;
        match check(resp).await {
            Ok(resp) => Ok(Some(resp.json().await?)),
            Err(ApiError::Unauthorized(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let resp = self.request(reqwest::Method::POST, "/auth/logout").send().await?;
        check(resp).await?;
        Ok(())
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        self.get("/auth/me").await
    }

    pub async fn users(&self, query: &UserQuery) -> Result<UserList, ApiError> {
        let resp = self
            .request(reqwest::Method::GET, "/users")
            .query(query)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<User, ApiError> {
        let resp = self
            .request(reqwest::Method::POST, "/users")
            .json(user)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn schedules(&self, query: &ScheduleQuery) -> Result<ScheduleList, ApiError> {
        let resp = self
            .request(reqwest::Method::GET, "/schedules")
            .query(query)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn create_schedule(&self, schedule: &NewSchedule) -> Result<ScheduleDetails, ApiError> {
        let resp = self
            .request(reqwest::Method::POST, "/schedules")
            .json(schedule)
            .send()
            .await?;
        Ok(check(resp).await?.json().await?)
    }

    pub async fn customers(&self) -> Result<Vec<Customer>, ApiError> {
        self.get("/customers").await
    }

    pub async fn equipment(&self, status: Option<EquipmentStatus>) -> Result<Vec<Equipment>, ApiError> {
        let mut builder = self.request(reqwest::Method::GET, "/equipment");
        if let Some(status) = status {
            builder = builder.query(&[("status", status.as_str())]);
        }
        Ok(check(builder.send().await?).await?.json().await?)
    }

    pub async fn technicians(&self) -> Result<Vec<User>, ApiError> {
        self.get("/technicians").await
    }

    pub async fn dashboard(&self) -> Result<DashboardSummary, ApiError> {
        self.get("/dashboard").await
    }

    pub async fn report(&self) -> Result<ReportData, ApiError> {
        self.get("/reports").await
    }

    pub async fn export(&self, format: ExportFormat) -> Result<ExportFile, ApiError> {
        let resp = self
            .request(reqwest::Method::GET, "/reports/export")
            .query(&[("format", format.as_str())])
            .send()
            .await?;
        let resp = check(resp).await?;
        let file_name = resp
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(attachment_name);
        Ok(ExportFile {
            file_name,
            content: resp.text().await?,
        })
    }
}

/// Turn a non-success response into an error carrying the server's message
async fn check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let message = resp
        .json::<ErrorBody>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());

    if status == StatusCode::UNAUTHORIZED {
        Err(ApiError::Unauthorized(message))
    } else {
        Err(ApiError::Status { status, message })
    }
}

/// File name from a `Content-Disposition: attachment; filename="..."` header
fn attachment_name(disposition: &str) -> Option<String> {
    disposition
        .split(';')
        .map(str::trim)
        .find_map(|part| part.strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}
