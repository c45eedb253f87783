use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::{DeserializeAs, SerializeAs, serde_as};

/// Response of GET /schedule/{date}/{from}/{to}.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Schedule {
    pub terminal_combos: Vec<TerminalCombo>,
}

/// All sailings between one pair of terminals on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TerminalCombo {
    pub departing_terminal_name: String,
    pub arriving_terminal_name: String,
    pub times: Vec<SailingTime>,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SailingTime {
    #[serde_as(as = "WsfDate")]
    pub departing_time: DateTime<FixedOffset>,
    /// Not published for every route.
    #[serde_as(as = "Option<WsfDate>")]
    pub arriving_time: Option<DateTime<FixedOffset>>,
    pub vessel_name: String,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("malformed WSF date `{0}`")]
pub struct WsfDateError(pub String);

/// serde_with adapter for the `/Date(1436318400000-0700)/` wire format:
/// UTC epoch milliseconds followed by the local offset as `+hhmm`/`-hhmm`.
pub struct WsfDate;

impl<'de> DeserializeAs<'de, DateTime<FixedOffset>> for WsfDate {
    fn deserialize_as<D>(deserializer: D) -> Result<DateTime<FixedOffset>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_wsf_date(&raw).map_err(serde::de::Error::custom)
    }
}

impl SerializeAs<DateTime<FixedOffset>> for WsfDate {
    fn serialize_as<S>(source: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_wsf_date(source))
    }
}

pub fn parse_wsf_date(raw: &str) -> Result<DateTime<FixedOffset>, WsfDateError> {
    let invalid = || WsfDateError(raw.to_string());

    let inner = raw
        .strip_prefix("/Date(")
        .and_then(|s| s.strip_suffix(")/"))
        .ok_or_else(invalid)?;

    // a leading '-' belongs to the millis, not the offset
    let sign = inner.rfind(|c: char| c == '+' || c == '-').filter(|&i| i > 0);
    let (millis, offset) = match sign {
        Some(i) => (&inner[..i], parse_offset(&inner[i..]).ok_or_else(invalid)?),
        None => (inner, FixedOffset::east_opt(0).ok_or_else(invalid)?),
    };

    // i64::from_str would accept "+0700" as 700 millis
    if millis.starts_with('+') {
        return Err(invalid());
    }
    let millis: i64 = millis.parse().map_err(|_| invalid())?;
    let utc = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(invalid)?;

    Ok(utc.with_timezone(&offset))
}

fn parse_offset(s: &str) -> Option<FixedOffset> {
    let (sign, digits) = s.split_at(1);
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    let seconds = hours * 3600 + minutes * 60;

    match sign {
        "+" => FixedOffset::east_opt(seconds),
        "-" => FixedOffset::west_opt(seconds),
        _ => None,
    }
}

pub fn format_wsf_date(date: &DateTime<FixedOffset>) -> String {
    let offset = date.offset().local_minus_utc();
    let sign = if offset < 0 { '-' } else { '+' };
    let offset = offset.abs();

    format!(
        "/Date({}{}{:02}{:02})/",
        date.timestamp_millis(),
        sign,
        offset / 3600,
        (offset % 3600) / 60
    )
}
