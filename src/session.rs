//! Cached access to the schedule API.
//!
//! A session compares the cached flush date with the server's once, at open. When the
//! server can't be reached the session goes offline and serves whatever the cache holds.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::api::schedule::TerminalCombo;
use crate::api::terminals::Terminal;
use crate::api::{ApiError, ScheduleApi};
use crate::cache::{Cache, CacheError};

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("Terminal not found: {0}")]
    TerminalNotFound(String),
    #[error("No sailings from terminal {from} to terminal {to}")]
    NoSailings { from: i32, to: i32 },
}

pub struct Session<A: ScheduleApi> {
    api: A,
    cache: Cache,
    cache_path: PathBuf,
    offline: bool,
}

impl<A: ScheduleApi> Session<A> {
    pub async fn open(api: A, cache_path: impl Into<PathBuf>) -> Self {
        let cache_path = cache_path.into();
        let mut cache = Cache::load(&cache_path).unwrap_or_else(|e| {
            debug!("Starting with an empty cache: {e}");
            Cache::default()
        });

        let offline = match api.cache_flush_date().await {
            Ok(flush_date) => {
                if cache.cache_flush_date != flush_date {
                    info!(%flush_date, "Schedule data changed, dropping cache");
                    cache.invalidate(&flush_date);
                }
                false
            }
            Err(e) => {
                warn!("Schedule service unreachable, using cached data: {e}");
                true
            }
        };

        Self {
            api,
            cache,
            cache_path,
            offline,
        }
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub async fn terminals(&mut self, date: NaiveDate) -> Result<Vec<Terminal>, SessionError> {
        if self.cache.terminals.is_empty() {
            self.cache.terminals = self.api.terminals_on(date).await?;
        }
        Ok(self.cache.terminals.clone())
    }

    /// First terminal whose description starts with `prefix`, ignoring case.
    pub async fn find_terminal(
        &mut self,
        date: NaiveDate,
        prefix: &str,
    ) -> Result<Terminal, SessionError> {
        let prefix = prefix.to_ascii_lowercase();

        self.terminals(date)
            .await?
            .into_iter()
            .find(|t| t.description.to_ascii_lowercase().starts_with(&prefix))
            .ok_or(SessionError::TerminalNotFound(prefix))
    }

    pub async fn schedule(
        &mut self,
        date: NaiveDate,
        from: i32,
        to: i32,
    ) -> Result<TerminalCombo, SessionError> {
        if let Some(combo) = self.cache.sailing(date, from, to) {
            debug!(from, to, "Sailings served from cache");
            return Ok(combo.clone());
        }

        let combo = self
            .api
            .schedule(date, from, to)
            .await?
            .terminal_combos
            .into_iter()
            .next()
            .ok_or(SessionError::NoSailings { from, to })?;

        self.cache.insert_sailing(date, from, to, combo.clone());
        Ok(combo)
    }

    pub fn save(&self) -> Result<(), SessionError> {
        self.cache.save(&self.cache_path)?;
        Ok(())
    }
}
