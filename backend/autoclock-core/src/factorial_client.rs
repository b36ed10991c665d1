// src/factorial_client.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::attendance_api::{
    AttendanceApi, AttendanceMutations, CalendarDayRecord, ClockPayload, NewShift, Period,
    ShiftRecord,
};

pub const FACTORIAL_BASE_URL: &str = "https://api.factorialhr.com";
pub const DEFAULT_RETURN_HOST: &str = "factorialhr.es";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const SIGN_IN_PATH: &str = "/users/sign_in";
const PERIODS_PATH: &str = "/attendance/periods";
const CALENDAR_PATH: &str = "/attendance/calendar";
const SHIFTS_PATH: &str = "/attendance/shifts";
const CLOCK_IN_PATH: &str = "/attendance/shifts/clock_in";
const BREAK_START_PATH: &str = "/attendance/shifts/break_start";
const BREAK_END_PATH: &str = "/attendance/shifts/break_end";
const CLOCK_OUT_PATH: &str = "/attendance/shifts/clock_out";

static CSRF_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<meta\s+name="csrf-token"\s+content="([^"]*)""#).expect("csrf token pattern")
});

static LOGIN_ERROR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<div class="flash flash--wrong">(.*?)</div>"#).expect("login error pattern")
});

// --- Define Specific Factorial Error Type ---
#[derive(Error, Debug)]
pub enum FactorialError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON processing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Login rejected: {0}")]
    LoginRejected(String),

    #[error("Sign-in page did not contain a CSRF token")]
    CsrfTokenMissing,

    #[error("Could not find the specified year/month in the available periods ({month}/{year})")]
    PeriodNotFound { year: i32, month: u32 },

    #[error("Factorial API error: Status={status}, Message='{message}'")]
    ApiError { status: StatusCode, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

#[derive(Clone, Debug)]
pub struct FactorialConfig {
    pub base_url: String,
    pub return_host: String,
    pub timeout_secs: u64,
}

impl Default for FactorialConfig {
    fn default() -> Self {
        Self {
            base_url: FACTORIAL_BASE_URL.to_string(),
            return_host: DEFAULT_RETURN_HOST.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Pulls the Rails authenticity token out of the sign-in page.
pub fn extract_csrf_token(html: &str) -> Option<String> {
    CSRF_TOKEN_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|token| !token.is_empty())
}

/// The flash message shown when the sign-in form is rejected.
pub fn extract_login_error(html: &str) -> Option<String> {
    LOGIN_ERROR_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|message| !message.is_empty())
}

// Factorial API Client Implementation
#[derive(Clone)]
pub struct FactorialClient {
    config: Arc<FactorialConfig>,
    http_client: Client,
}

impl FactorialClient {
    pub fn new(config: FactorialConfig) -> Result<Self, FactorialError> {
        Url::parse(&config.base_url)?;
        if config.timeout_secs == 0 {
            return Err(FactorialError::ConfigError(
                "request timeout must be at least one second".to_string(),
            ));
        }

        // The sign-in cookie lives in this jar for the rest of the session.
        let http_client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            http_client,
        })
    }

    pub fn endpoint_url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, FactorialError> {
        let mut url = Url::parse(&self.config.base_url)?.join(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn build_request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header(ACCEPT, "application/json")
    }

    async fn read_error_body(response: reqwest::Response) -> String {
        response
            .text()
            .await
            .map(|body| body.trim().to_string())
            .unwrap_or_else(|e| format!("Failed to read error body: {}", e))
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context_msg: &str,
    ) -> Result<T, FactorialError> {
        debug!("Sending request for '{}' to URL: {}", context_msg, url);
        let response = self.build_request(Method::GET, url.clone()).send().await?;
        let status = response.status();
        info!("Received response for '{}': Status={}", context_msg, status);

        if status != StatusCode::OK {
            let message = Self::read_error_body(response).await;
            error!(
                "API Error Response: Status={}, Body='{}' for URL: {}",
                status, message, url
            );
            return Err(FactorialError::ApiError { status, message });
        }

        let bytes = response.bytes().await?;
        match serde_json::from_slice::<T>(&bytes) {
            Ok(data) => Ok(data),
            Err(e) => {
                error!(
                    "JSON deserialization failed for '{}' (URL: {}): {}",
                    context_msg, url, e
                );
                Err(FactorialError::Json(e))
            }
        }
    }

    async fn send_expecting(
        &self,
        request: RequestBuilder,
        accepted: fn(StatusCode) -> bool,
        context_msg: &str,
    ) -> Result<(), FactorialError> {
        let response = request.send().await?;
        let status = response.status();
        info!("Received response for '{}': Status={}", context_msg, status);

        if accepted(status) {
            return Ok(());
        }

        let message = Self::read_error_body(response).await;
        warn!(
            "'{}' was rejected: Status={}, Body='{}'",
            context_msg, status, message
        );
        Err(FactorialError::ApiError { status, message })
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        accepted: fn(StatusCode) -> bool,
        context_msg: &str,
    ) -> Result<(), FactorialError> {
        let url = self.endpoint_url(path, &[])?;
        debug!("Sending request for '{}' to URL: {}", context_msg, url);
        let request = self
            .build_request(Method::POST, url)
            .header(CONTENT_TYPE, "application/json;charset=UTF-8")
            .json(body);
        self.send_expecting(request, accepted, context_msg).await
    }

    fn is_created(status: StatusCode) -> bool {
        status == StatusCode::CREATED
    }

    fn is_success(status: StatusCode) -> bool {
        status.is_success()
    }

    async fn fetch_periods(&self, query: &[(&str, String)]) -> Result<Vec<Period>, FactorialError> {
        let url = self.endpoint_url(PERIODS_PATH, query)?;
        self.get_json(url, "Get Periods").await
    }
}

#[async_trait]
impl AttendanceApi for FactorialClient {
    async fn login(&self, email: &str, password: &str) -> Result<(), FactorialError> {
        let sign_in_url = self.endpoint_url(SIGN_IN_PATH, &[])?;

        let page = self
            .http_client
            .get(sign_in_url.clone())
            .send()
            .await?
            .text()
            .await?;
        let csrf_token = extract_csrf_token(&page).ok_or(FactorialError::CsrfTokenMissing)?;
        debug!("Found CSRF token on sign-in page");

        let form = [
            ("authenticity_token", csrf_token.as_str()),
            ("return_host", self.config.return_host.as_str()),
            ("user[email]", email),
            ("user[password]", password),
            ("user[remember_me]", "0"),
            ("commit", "Sign in"),
        ];
        let response = self.http_client.post(sign_in_url).form(&form).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if let Some(message) = extract_login_error(&body) {
            warn!("Sign-in rejected for {}", email);
            return Err(FactorialError::LoginRejected(message));
        }
        if status.is_client_error() || status.is_server_error() {
            return Err(FactorialError::ApiError {
                status,
                message: "sign-in request failed".to_string(),
            });
        }

        info!("Signed in as {}", email);
        Ok(())
    }

    async fn fetch_period(&self, year: i32, month: u32) -> Result<Period, FactorialError> {
        let periods = self
            .fetch_periods(&[("year", year.to_string()), ("month", month.to_string())])
            .await
            .map_err(|e| match e {
                FactorialError::ApiError { .. } => FactorialError::PeriodNotFound { year, month },
                other => other,
            })?;

        periods
            .into_iter()
            .find(|p| p.year == year && p.month == month)
            .ok_or(FactorialError::PeriodNotFound { year, month })
    }

    async fn fetch_calendar(
        &self,
        employee_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<CalendarDayRecord>, FactorialError> {
        let url = self.endpoint_url(
            CALENDAR_PATH,
            &[
                ("id", employee_id.to_string()),
                ("year", year.to_string()),
                ("month", month.to_string()),
            ],
        )?;
        self.get_json(url, "Get Calendar").await
    }

    async fn fetch_minutes_owed(
        &self,
        employee_id: i64,
        year: i32,
        month: u32,
        start_on: NaiveDate,
        end_on: NaiveDate,
    ) -> Result<Vec<Decimal>, FactorialError> {
        let periods = self
            .fetch_periods(&[
                ("year", year.to_string()),
                ("month", month.to_string()),
                ("employee_id", employee_id.to_string()),
                ("start_on", start_on.format("%Y-%m-%d").to_string()),
                ("end_on", end_on.format("%Y-%m-%d").to_string()),
            ])
            .await?;

        periods
            .into_iter()
            .next()
            .map(|p| p.estimated_regular_minutes_distribution)
            .ok_or(FactorialError::PeriodNotFound { year, month })
    }

    async fn fetch_shifts(
        &self,
        employee_id: i64,
        year: i32,
        month: u32,
    ) -> Result<Vec<ShiftRecord>, FactorialError> {
        let url = self.endpoint_url(
            SHIFTS_PATH,
            &[
                ("employee_id", employee_id.to_string()),
                ("year", year.to_string()),
                ("month", month.to_string()),
            ],
        )?;
        self.get_json(url, "Get Shifts").await
    }
}

#[async_trait]
impl AttendanceMutations for FactorialClient {
    async fn create_shift(&self, shift: &NewShift) -> Result<(), FactorialError> {
        self.post_json(SHIFTS_PATH, shift, Self::is_created, "Create Shift")
            .await
    }

    async fn clock_in(&self, payload: &ClockPayload) -> Result<(), FactorialError> {
        self.post_json(CLOCK_IN_PATH, payload, Self::is_success, "Clock In")
            .await
    }

    async fn break_start(&self, payload: &ClockPayload) -> Result<(), FactorialError> {
        self.post_json(BREAK_START_PATH, payload, Self::is_success, "Break Start")
            .await
    }

    async fn break_end(&self, payload: &ClockPayload) -> Result<(), FactorialError> {
        self.post_json(BREAK_END_PATH, payload, Self::is_success, "Break End")
            .await
    }

    async fn clock_out(&self, payload: &ClockPayload) -> Result<(), FactorialError> {
        self.post_json(CLOCK_OUT_PATH, payload, Self::is_success, "Clock Out")
            .await
    }

    async fn delete_shift(&self, shift_id: i64) -> Result<(), FactorialError> {
        let url = self.endpoint_url(&format!("{}/{}", SHIFTS_PATH, shift_id), &[])?;
        debug!("Deleting shift {} at URL: {}", shift_id, url);
        let request = self.build_request(Method::DELETE, url);
        self.send_expecting(request, Self::is_success, "Delete Shift")
            .await
    }
}
