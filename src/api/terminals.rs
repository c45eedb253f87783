use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::{ApiClient, ApiError};

/// Date baked into the `terminals` request path, whatever date the caller asks for.
///
/// Use [`ScheduleApi::terminals_on`](crate::api::ScheduleApi::terminals_on) to query a real date.
pub const PINNED_TERMINALS_DATE: &str = "2015-6-22";

/// A ferry terminal as reported by the schedule service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terminal {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "TerminalID", alias = "TerminalId")]
    pub terminal_id: i32,
}

impl ApiClient {
    /// GET /terminals/2015-6-22
    ///
    /// The request always uses [`PINNED_TERMINALS_DATE`]; `at` does not reach the URL.
    /// Any response counts as success and its body is never read, so the result is
    /// always empty. Only a failed exchange (connect, DNS, timeout) is an error.
    pub async fn terminals<Tz: TimeZone>(
        &self,
        at: &DateTime<Tz>,
    ) -> Result<Vec<Terminal>, ApiError> {
        let url = self.terminals_url(at)?;
        self.http.get(url).send().await?;

        Ok(Vec::new())
    }

    /// The exact URL requested by [`ApiClient::terminals`].
    pub fn terminals_url<Tz: TimeZone>(&self, _at: &DateTime<Tz>) -> Result<Url, ApiError> {
        self.endpoint(&["terminals", PINNED_TERMINALS_DATE])
    }
}
