pub mod std_out;
pub mod tui;

use chrono::{DateTime, NaiveTime, TimeZone};
use wsf::TerminalCombo;

pub trait ResultDisplay {
    fn display(&self, sailings: &TerminalCombo) -> anyhow::Result<()>;
}

// Shared between std_out and tui
pub(super) struct SailingRow {
    pub depart: NaiveTime,
    pub arrive: Option<NaiveTime>,
    pub vessel: String,
    pub mins_until: i64,
    pub departed: bool,
    /// First sailing that has not left yet.
    pub next: bool,
}

/// Rows in `now`'s time zone. Departed sailings are dropped unless `show_all`.
pub(super) fn build_sailing_rows<Tz: TimeZone>(
    combo: &TerminalCombo,
    now: &DateTime<Tz>,
    show_all: bool,
) -> Vec<SailingRow> {
    let tz = now.timezone();
    let mut seen_next = false;
    let mut rows = Vec::new();

    for t in &combo.times {
        let departed = t.departing_time <= *now;
        if departed && !show_all {
            continue;
        }

        let next = !departed && !seen_next;
        seen_next |= next;

        rows.push(SailingRow {
            depart: t.departing_time.with_timezone(&tz).time(),
            arrive: t.arriving_time.map(|a| a.with_timezone(&tz).time()),
            vessel: t.vessel_name.clone(),
            mins_until: t.departing_time.signed_duration_since(now).num_minutes(),
            departed,
            next,
        });
    }
    rows
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use chrono::FixedOffset;
    use wsf::SailingTime;
    use wsf::api::schedule::parse_wsf_date;

    /// Seattle to Bainbridge on 2015-06-22, Pacific daylight time.
    pub(crate) fn seattle_bainbridge() -> TerminalCombo {
        let sailing = |depart: &str, arrive: Option<&str>, vessel: &str| SailingTime {
            departing_time: parse_wsf_date(depart).unwrap(),
            arriving_time: arrive.map(|a| parse_wsf_date(a).unwrap()),
            vessel_name: vessel.into(),
        };
        TerminalCombo {
            departing_terminal_name: "Seattle".into(),
            arriving_terminal_name: "Bainbridge Island".into(),
            times: vec![
                // 14:35, 15:10 (arr 15:45), 16:30
                sailing("/Date(1435008900000-0700)/", None, "Tacoma"),
                sailing(
                    "/Date(1435011000000-0700)/",
                    Some("/Date(1435013100000-0700)/"),
                    "Wenatchee",
                ),
                sailing("/Date(1435015800000-0700)/", None, "Tacoma"),
            ],
        }
    }

    pub(crate) fn pacific(h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2015, 6, 22, h, m, 0)
            .unwrap()
    }

    #[test]
    fn departed_sailings_are_hidden() {
        let rows = build_sailing_rows(&seattle_bainbridge(), &pacific(15, 0), false);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].vessel, "Wenatchee");
        assert_eq!(rows[0].depart, NaiveTime::from_hms_opt(15, 10, 0).unwrap());
        assert_eq!(rows[0].arrive, NaiveTime::from_hms_opt(15, 45, 0));
        assert_eq!(rows[0].mins_until, 10);
        assert!(rows[0].next);
        assert!(!rows[1].next);
        assert_eq!(rows[1].mins_until, 90);
    }

    #[test]
    fn show_all_keeps_departed_sailings() {
        let rows = build_sailing_rows(&seattle_bainbridge(), &pacific(15, 0), true);

        let flags: Vec<_> = rows.iter().map(|r| (r.departed, r.next)).collect();
        assert_eq!(flags, vec![(true, false), (false, true), (false, false)]);
        assert_eq!(rows[0].mins_until, -25);
    }

    #[test]
    fn sailing_leaving_now_counts_as_departed() {
        let rows = build_sailing_rows(&seattle_bainbridge(), &pacific(16, 30), false);

        assert!(rows.is_empty());
    }

    #[test]
    fn times_follow_the_viewer_time_zone() {
        let utc = pacific(15, 0).with_timezone(&chrono::Utc);

        let rows = build_sailing_rows(&seattle_bainbridge(), &utc, false);

        assert_eq!(rows[0].depart, NaiveTime::from_hms_opt(22, 10, 0).unwrap());
    }
}
