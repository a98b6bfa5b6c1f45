//! Calendar events built from trainings.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::models::{Entity, Training};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarView {
    #[default]
    Month,
    Week,
    Day,
}

impl CalendarView {
    /// First day and the day after the last day shown around `anchor`.
    ///
    /// Weeks start on Sunday.
    pub fn range(&self, anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
        match self {
            CalendarView::Day => (anchor, anchor + Days::new(1)),
            CalendarView::Week => {
                let start = anchor - Days::new(u64::from(anchor.weekday().num_days_from_sunday()));
                (start, start + Days::new(7))
            }
            CalendarView::Month => {
                let start = anchor - Days::new(u64::from(anchor.day0()));
                let end = start
                    .checked_add_months(Months::new(1))
                    .unwrap_or(NaiveDate::MAX);
                (start, end)
            }
        }
    }
}

impl fmt::Display for CalendarView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarView::Month => write!(f, "month"),
            CalendarView::Week => write!(f, "week"),
            CalendarView::Day => write!(f, "day"),
        }
    }
}

impl FromStr for CalendarView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "month" => Ok(CalendarView::Month),
            "week" => Ok(CalendarView::Week),
            "day" => Ok(CalendarView::Day),
            _ => Err(format!(
                "Invalid calendar view '{}'. Valid options: month, week, day",
                s
            )),
        }
    }
}

/// A training placed on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    pub id: Option<i64>,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CalendarEvent {
    pub fn from_training(training: &Training) -> Self {
        Self {
            id: training.id,
            title: format!("{} – {}", training.activity, training.customer_name()),
            start: training.date,
            end: training.end(),
        }
    }
}

pub fn events(trainings: &[Entity<Training>]) -> Vec<CalendarEvent> {
    trainings
        .iter()
        .map(|training| CalendarEvent::from_training(&training.fields))
        .collect()
}

fn local<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDateTime {
    instant.with_timezone(tz).naive_local()
}

/// Events overlapping the view around `anchor`, grouped by local start day.
///
/// Days and events within a day are ordered by start time.
pub fn agenda<'a, Tz: TimeZone>(
    events: &'a [CalendarEvent],
    view: CalendarView,
    anchor: NaiveDate,
    tz: &Tz,
) -> Vec<(NaiveDate, Vec<&'a CalendarEvent>)> {
    let (first, last) = view.range(anchor);
    let range_start = first.and_time(NaiveTime::MIN);
    let range_end = last.and_time(NaiveTime::MIN);

    let mut visible: Vec<&CalendarEvent> = events
        .iter()
        .filter(|event| {
            local(&event.start, tz) < range_end && local(&event.end, tz) > range_start
        })
        .collect();
    visible.sort_by_key(|event| event.start);

    let mut days: Vec<(NaiveDate, Vec<&CalendarEvent>)> = Vec::new();
    for event in visible {
        // events that began before the range are listed on its first day
        let day = local(&event.start, tz).date().max(first);
        match days.last_mut() {
            Some((current, bucket)) if *current == day => bucket.push(event),
            _ => days.push((day, vec![event])),
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Customer, CustomerRef};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(title: &str, start: DateTime<Utc>, minutes: i64) -> CalendarEvent {
        CalendarEvent {
            id: None,
            title: title.to_string(),
            start,
            end: start + chrono::Duration::minutes(minutes),
        }
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_event_from_training() {
        let mut training = Training::new(at(10, 8), "Yoga", 45);
        training.id = Some(3);
        training.customer = Some(CustomerRef::Embedded(Box::new(Entity::new(Customer::new(
            "Aino", "Korhonen",
        )))));

        let event = CalendarEvent::from_training(&training);
        assert_eq!(event.id, Some(3));
        assert_eq!(event.title, "Yoga – Aino Korhonen");
        assert_eq!(event.end, Utc.with_ymd_and_hms(2025, 6, 10, 8, 45, 0).unwrap());
    }

    #[test]
    fn test_event_title_without_customer() {
        let event = CalendarEvent::from_training(&Training::new(at(10, 8), "Gym", 30));
        assert_eq!(event.title, "Gym – Unknown");
    }

    #[test]
    fn test_ranges() {
        // 2025-06-11 is a Wednesday
        let anchor = date(2025, 6, 11);
        assert_eq!(CalendarView::Day.range(anchor), (anchor, date(2025, 6, 12)));
        assert_eq!(
            CalendarView::Week.range(anchor),
            (date(2025, 6, 8), date(2025, 6, 15))
        );
        assert_eq!(
            CalendarView::Month.range(anchor),
            (date(2025, 6, 1), date(2025, 7, 1))
        );
        assert_eq!(
            CalendarView::Month.range(date(2025, 12, 31)),
            (date(2025, 12, 1), date(2026, 1, 1))
        );
    }

    #[test]
    fn test_agenda_filters_and_groups() {
        let events = vec![
            event("late", at(12, 18), 60),
            event("early", at(12, 7), 60),
            event("outside", at(20, 7), 60),
            event("monday", at(9, 7), 60),
        ];

        let agenda = agenda(&events, CalendarView::Week, date(2025, 6, 11), &Utc);
        let days: Vec<_> = agenda
            .iter()
            .map(|(day, events)| {
                (*day, events.iter().map(|e| e.title.as_str()).collect::<Vec<_>>())
            })
            .collect();

        assert_eq!(
            days,
            vec![
                (date(2025, 6, 9), vec!["monday"]),
                (date(2025, 6, 12), vec!["early", "late"]),
            ]
        );
    }

    #[test]
    fn test_agenda_includes_overlapping_event() {
        // starts the evening before the day view and runs past midnight
        let events = vec![event("overnight", at(10, 23), 120)];
        let agenda = agenda(&events, CalendarView::Day, date(2025, 6, 11), &Utc);

        assert_eq!(agenda.len(), 1);
        assert_eq!(agenda[0].0, date(2025, 6, 11));
    }

    #[test]
    fn test_view_from_str() {
        assert_eq!(CalendarView::from_str("WEEK").unwrap(), CalendarView::Week);
        assert!(CalendarView::from_str("year").is_err());
        assert_eq!(CalendarView::default().to_string(), "month");
    }
}
