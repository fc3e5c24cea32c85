//! iCalendar feed → [`Snapshot`] conversion, built on the `icalendar` parser.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use icalendar::parser::{Component, read_calendar, unfold};
use icalendar::{CalendarDateTime, DatePerhapsTime};

use crate::error::FetchError;
use crate::models::event::{CalendarEvent, Snapshot};

/// Parses every `VEVENT` of a feed, keeps the ones starting on or after
/// `today` and orders them by start.
pub fn parse_feed(content: &str, today: NaiveDate) -> Result<Snapshot, FetchError> {
    let unfolded = unfold(content);
    let calendar =
        read_calendar(&unfolded).map_err(|e| FetchError::Parse(e.to_string()))?;

    let mut events = Vec::new();
    for vevent in calendar.components.iter().filter(|c| c.name == "VEVENT") {
        let event = parse_vevent(vevent)?;
        if event.start.date_naive() >= today {
            events.push(event);
        }
    }
    events.sort_by_key(|event| event.start);
    Ok(events)
}

fn parse_vevent(vevent: &Component) -> Result<CalendarEvent, FetchError> {
    let uid = vevent
        .find_prop("UID")
        .map(|p| p.val.to_string())
        .ok_or_else(|| FetchError::Parse("event without UID".to_string()))?;

    let start_prop = vevent
        .find_prop("DTSTART")
        .ok_or_else(|| FetchError::Parse(format!("event {uid} has no DTSTART")))?;
    let start_value = DatePerhapsTime::try_from(start_prop)
        .map_err(|_| FetchError::Parse(format!("event {uid} has an invalid DTSTART")))?;
    let all_day = matches!(start_value, DatePerhapsTime::Date(_));
    let start = resolve(start_value);

    let end = if let Some(end_prop) = vevent.find_prop("DTEND") {
        let end_value = DatePerhapsTime::try_from(end_prop)
            .map_err(|_| FetchError::Parse(format!("event {uid} has an invalid DTEND")))?;
        resolve(end_value)
    } else if let Some(duration_prop) = vevent.find_prop("DURATION") {
        start + parse_duration(duration_prop.val.as_ref()).ok_or_else(|| {
            FetchError::Parse(format!("event {uid} has an invalid DURATION"))
        })?
    } else if all_day {
        start + Duration::days(1)
    } else {
        start
    };

    let name = vevent
        .find_prop("SUMMARY")
        .map(|p| p.val.to_string())
        .unwrap_or_default();

    Ok(CalendarEvent {
        uid,
        start,
        end,
        name,
    })
}

/// Pins a feed timestamp to a fixed offset. Floating times and unknown
/// zones fall back to UTC.
fn resolve(value: DatePerhapsTime) -> DateTime<FixedOffset> {
    match value {
        DatePerhapsTime::Date(date) => midnight_utc(date),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => dt.fixed_offset(),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            naive.and_utc().fixed_offset()
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            in_zone(date_time, &tzid)
        }
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<FixedOffset> {
    date.and_time(NaiveTime::MIN).and_utc().fixed_offset()
}

fn in_zone(local: NaiveDateTime, tzid: &str) -> DateTime<FixedOffset> {
    let tzid = tzid.trim_matches('"');
    match tzid.parse::<Tz>() {
        Ok(tz) => tz
            .from_local_datetime(&local)
            .earliest()
            // Local time skipped by a DST jump lands after the gap.
            .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
            .map(|dt| dt.fixed_offset())
            .unwrap_or_else(|| local.and_utc().fixed_offset()),
        Err(_) => {
            tracing::debug!(tzid, "unknown TZID, treating as UTC");
            local.and_utc().fixed_offset()
        }
    }
}

fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim().trim_start_matches('+');
    let parsed = iso8601::duration(value).ok()?;
    let std_duration: std::time::Duration = parsed.into();
    Duration::from_std(std_duration).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(body: &str) -> String {
        format!("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TEST\r\n{body}END:VCALENDAR\r\n")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn parses_utc_event() {
        let ics = feed(
            "BEGIN:VEVENT\r\nUID:1\r\nSUMMARY:Math\r\nDTSTART:20240305T130000Z\r\nDTEND:20240305T150000Z\r\nEND:VEVENT\r\n",
        );
        let events = parse_feed(&ics, today()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].uid, "1");
        assert_eq!(events[0].name, "Math");
        assert_eq!(events[0].start.format("%H:%M").to_string(), "13:00");
        assert_eq!(events[0].end.format("%H:%M").to_string(), "15:00");
    }

    #[test]
    fn tzid_keeps_local_wall_clock() {
        let ics = feed(
            "BEGIN:VEVENT\r\nUID:1\r\nSUMMARY:Math\r\nDTSTART;TZID=Europe/Amsterdam:20240305T140000\r\nDTEND;TZID=Europe/Amsterdam:20240305T160000\r\nEND:VEVENT\r\n",
        );
        let events = parse_feed(&ics, today()).unwrap();
        assert_eq!(events[0].start.offset().local_minus_utc(), 3600);
        assert_eq!(events[0].start.format("%H:%M").to_string(), "14:00");
    }

    #[test]
    fn all_day_event_spans_one_day() {
        let ics = feed(
            "BEGIN:VEVENT\r\nUID:day\r\nSUMMARY:Holiday\r\nDTSTART;VALUE=DATE:20240310\r\nEND:VEVENT\r\n",
        );
        let events = parse_feed(&ics, today()).unwrap();
        assert_eq!(events[0].end - events[0].start, Duration::days(1));
    }

    #[test]
    fn duration_sets_end() {
        let ics = feed(
            "BEGIN:VEVENT\r\nUID:d\r\nSUMMARY:Lab\r\nDTSTART:20240305T090000Z\r\nDURATION:PT1H30M\r\nEND:VEVENT\r\n",
        );
        let events = parse_feed(&ics, today()).unwrap();
        assert_eq!(events[0].end.format("%H:%M").to_string(), "10:30");
    }

    #[test]
    fn drops_past_events_and_sorts() {
        let ics = feed(concat!(
            "BEGIN:VEVENT\r\nUID:late\r\nSUMMARY:B\r\nDTSTART:20240320T090000Z\r\nDTEND:20240320T100000Z\r\nEND:VEVENT\r\n",
            "BEGIN:VEVENT\r\nUID:past\r\nSUMMARY:Old\r\nDTSTART:20240229T090000Z\r\nDTEND:20240229T100000Z\r\nEND:VEVENT\r\n",
            "BEGIN:VEVENT\r\nUID:early\r\nSUMMARY:A\r\nDTSTART:20240301T080000Z\r\nDTEND:20240301T090000Z\r\nEND:VEVENT\r\n",
        ));
        let events = parse_feed(&ics, today()).unwrap();
        let uids: Vec<&str> = events.iter().map(|e| e.uid.as_str()).collect();
        assert_eq!(uids, vec!["early", "late"]);
    }

    #[test]
    fn missing_uid_is_a_parse_error() {
        let ics = feed(
            "BEGIN:VEVENT\r\nSUMMARY:Math\r\nDTSTART:20240305T130000Z\r\nDTEND:20240305T150000Z\r\nEND:VEVENT\r\n",
        );
        assert!(matches!(parse_feed(&ics, today()), Err(FetchError::Parse(_))));
    }

    #[test]
    fn summary_is_decoded_once() {
        let ics = feed(concat!(
            "BEGIN:VEVENT\r\nUID:1\r\nSUMMARY:Lokaal C:\\\\new\r\nDTSTART:20240305T130000Z\r\nDTEND:20240305T150000Z\r\nEND:VEVENT\r\n",
            "BEGIN:VEVENT\r\nUID:2\r\nSUMMARY:Math\\, room 4\r\nDTSTART:20240306T130000Z\r\nDTEND:20240306T150000Z\r\nEND:VEVENT\r\n",
        ));
        let events = parse_feed(&ics, today()).unwrap();
        assert_eq!(events[0].name, "Lokaal C:\\new");
        assert_eq!(events[1].name, "Math, room 4");
    }

    #[test]
    fn floating_and_unknown_zone_times_are_utc() {
        let ics = feed(concat!(
            "BEGIN:VEVENT\r\nUID:float\r\nSUMMARY:A\r\nDTSTART:20240305T140000\r\nDTEND:20240305T150000\r\nEND:VEVENT\r\n",
            "BEGIN:VEVENT\r\nUID:foo\r\nSUMMARY:B\r\nDTSTART;TZID=Foo/Bar:20240306T093000\r\nDTEND;TZID=Foo/Bar:20240306T100000\r\nEND:VEVENT\r\n",
        ));
        let events = parse_feed(&ics, today()).unwrap();
        assert_eq!(events[0].uid, "float");
        assert_eq!(events[0].start.offset().local_minus_utc(), 0);
        assert_eq!(events[0].start.format("%H:%M").to_string(), "14:00");
        assert_eq!(events[1].uid, "foo");
        assert_eq!(events[1].start.offset().local_minus_utc(), 0);
        assert_eq!(events[1].start.format("%H:%M").to_string(), "09:30");
        assert_eq!(events[1].end.format("%H:%M").to_string(), "10:00");
    }

    #[test]
    fn time_in_dst_gap_moves_past_the_gap() {
        let ics = feed(
            "BEGIN:VEVENT\r\nUID:gap\r\nSUMMARY:Early\r\nDTSTART;TZID=Europe/Amsterdam:20240331T023000\r\nDTEND;TZID=Europe/Amsterdam:20240331T040000\r\nEND:VEVENT\r\n",
        );
        let events = parse_feed(&ics, today()).unwrap();
        assert_eq!(events[0].start.offset().local_minus_utc(), 7200);
        assert_eq!(events[0].start.format("%H:%M").to_string(), "03:30");
    }
}
