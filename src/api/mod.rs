pub mod schedule;
pub mod terminals;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::api::schedule::Schedule;
use crate::api::terminals::Terminal;

/// Root of the WSF schedule REST API.
pub const BASE_URL: &str = "http://www.wsdot.wa.gov/ferries/api/schedule/rest";

/// Query parameter carrying the access token on every request.
pub const ACCESS_TOKEN_PARAM: &str = "apiaccesstoken";

/// Minimal API client. Reuse across calls.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base: String,
    access_token: String,
}

/// Error type for the schedule API.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("URL build error: {0}")]
    Url(#[from] url::ParseError),
    #[error("Server returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("could not decode response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl ApiClient {
    /// Client against the public WSF endpoint. The token is not validated.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            http: http_client(),
            base: BASE_URL.to_string(),
            access_token: access_token.into(),
        }
    }

    /// Client against another deployment of the API, e.g. a local mirror.
    pub fn with_base_url(base: &str, access_token: impl Into<String>) -> Result<Self, ApiError> {
        Url::parse(base)?;
        Ok(Self {
            http: http_client(),
            base: base.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// `{base}/{segments...}?apiaccesstoken={token}`
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}/{}", self.base, segments.join("/")))?;
        url.query_pairs_mut()
            .append_pair(ACCESS_TOKEN_PARAM, &self.access_token);
        Ok(url)
    }

    async fn fetch(&self, url: Url) -> Result<Response, ApiError> {
        // the query carries the access token
        debug!(path = url.path(), "GET");
        let res = self.http.get(url).send().await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        Ok(res)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        self.fetch(url).await?.json::<T>().await.map_err(ApiError::Decode)
    }
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(concat!("wsf/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("reqwest client")
}

/// Dates appear in request paths unpadded, e.g. `2015-6-22`.
pub fn path_date(date: impl Datelike) -> String {
    format!("{}-{}-{}", date.year(), date.month(), date.day())
}

/// The deserializing side of the schedule API. Implemented by [`ApiClient`];
/// the session only talks to this trait.
#[async_trait]
pub trait ScheduleApi: Send + Sync {
    /// GET /cacheflushdate
    ///
    /// Changes whenever the server-side schedule data changes.
    async fn cache_flush_date(&self) -> Result<String, ApiError>;

    /// GET /terminals/{date}
    async fn terminals_on(&self, date: NaiveDate) -> Result<Vec<Terminal>, ApiError>;

    /// GET /schedule/{date}/{from}/{to}
    async fn schedule(&self, date: NaiveDate, from: i32, to: i32) -> Result<Schedule, ApiError>;
}

#[async_trait]
impl ScheduleApi for ApiClient {
    async fn cache_flush_date(&self) -> Result<String, ApiError> {
        let url = self.endpoint(&["cacheflushdate"])?;
        self.get_json(url).await
    }

    async fn terminals_on(&self, date: NaiveDate) -> Result<Vec<Terminal>, ApiError> {
        let url = self.endpoint(&["terminals", &path_date(date)])?;
        self.get_json(url).await
    }

    async fn schedule(&self, date: NaiveDate, from: i32, to: i32) -> Result<Schedule, ApiError> {
        let url = self.endpoint(&[
            "schedule",
            &path_date(date),
            &from.to_string(),
            &to.to_string(),
        ])?;
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing::subscriber::DefaultGuard;

    /// Everything the fmt subscriber writes while the guard is alive.
    #[derive(Clone, Default)]
    pub(super) struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl CapturedLog {
        pub(super) fn install() -> (Self, DefaultGuard) {
            let log = Self::default();
            let writer = log.clone();
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(tracing::Level::TRACE)
                .with_ansi(false)
                .with_writer(move || writer.clone())
                .finish();
            (log, tracing::subscriber::set_default(subscriber))
        }

        pub(super) fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn assert_shareable<T: Clone + Send + Sync>() {}

    #[test]
    fn client_is_shareable_across_tasks() {
        assert_shareable::<ApiClient>();
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn path_date_is_unpadded() {
        assert_eq!(path_date(date(2015, 6, 2)), "2015-6-2");
        assert_eq!(path_date(date(2024, 12, 31)), "2024-12-31");
    }

    #[test]
    fn base_url_trailing_slash_is_dropped() {
        let client = ApiClient::with_base_url("http://localhost:8080/rest/", "t").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/rest");
        assert_eq!(
            client.endpoint(&["cacheflushdate"]).unwrap().as_str(),
            "http://localhost:8080/rest/cacheflushdate?apiaccesstoken=t"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = ApiClient::with_base_url("not a url", "t").unwrap_err();
        assert!(matches!(err, ApiError::Url(_)));
    }

    #[tokio::test]
    async fn cache_flush_date_is_a_json_string() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/cacheflushdate")
            .match_query(Matcher::UrlEncoded("apiaccesstoken".into(), "ABC123".into()))
            .with_header("content-type", "application/json")
            .with_body(r#""/Date(1434990000000-0700)/""#)
            .create_async()
            .await;

        let client = ApiClient::with_base_url(&server.url(), "ABC123").unwrap();
        let flush = client.cache_flush_date().await.unwrap();

        assert_eq!(flush, "/Date(1434990000000-0700)/");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn terminals_on_uses_the_requested_date() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/terminals/2024-3-9")
            .match_query(Matcher::UrlEncoded("apiaccesstoken".into(), "ABC123".into()))
            .with_body(
                r#"[{"TerminalID":7,"Description":"Seattle"},
                    {"TerminalID":3,"Description":"Bainbridge Island"}]"#,
            )
            .create_async()
            .await;

        let client = ApiClient::with_base_url(&server.url(), "ABC123").unwrap();
        let terminals = client.terminals_on(date(2024, 3, 9)).await.unwrap();

        assert_eq!(
            terminals,
            vec![
                Terminal {
                    description: "Seattle".into(),
                    terminal_id: 7
                },
                Terminal {
                    description: "Bainbridge Island".into(),
                    terminal_id: 3
                },
            ]
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/terminals/2024-3-9")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("bad token")
            .create_async()
            .await;

        let client = ApiClient::with_base_url(&server.url(), "nope").unwrap();
        let err = client.terminals_on(date(2024, 3, 9)).await.unwrap_err();

        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status.as_u16(), 401);
                assert_eq!(body, "bad token");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/schedule/2024-3-9/7/3")
            .match_query(Matcher::Any)
            .with_body("<html>maintenance</html>")
            .create_async()
            .await;

        let client = ApiClient::with_base_url(&server.url(), "ABC123").unwrap();
        let err = client.schedule(date(2024, 3, 9), 7, 3).await.unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn requests_log_the_path_without_the_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/terminals/2024-3-9")
            .match_query(Matcher::Any)
            .with_body("[]")
            .create_async()
            .await;
        let (log, _guard) = CapturedLog::install();

        let client = ApiClient::with_base_url(&server.url(), "SECRET-TOKEN").unwrap();
        client.terminals_on(date(2024, 3, 9)).await.unwrap();

        let log = log.contents();
        assert!(log.contains("/terminals/2024-3-9"), "{log}");
        assert!(!log.contains("SECRET-TOKEN"), "{log}");
    }

    #[tokio::test]
    async fn requests_carry_the_crate_user_agent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/cacheflushdate")
            .match_query(Matcher::Any)
            .match_header("user-agent", Matcher::Regex("^wsf/".into()))
            .with_body(r#""flush""#)
            .create_async()
            .await;

        let client = ApiClient::with_base_url(&server.url(), "ABC123").unwrap();
        client.cache_flush_date().await.unwrap();

        mock.assert_async().await;
    }
}
