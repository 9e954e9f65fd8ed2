//! Weekly birthday and work-anniversary selection.
//!
//! The week runs Monday to Sunday around `today`. Birth and hire dates are
//! moved into `today`'s year (month and day kept) and matched against that
//! window; each match carries the message shown on the recognition slide.

pub mod report;

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;
use tracing::debug;

pub use report::{ReportError, parse_report};

/// Date format of the HR report
const REPORT_DATE_FORMAT: &str = "%m/%d/%Y";

/// One row of the HR report.
///
/// Dates stay as the report wrote them (`MM/DD/YYYY`); they are parsed
/// during selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmployeeRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub hire_date: String,
    pub status: String,
    pub in_payroll: String,
    pub badge_type: String,
}

/// Monday through Sunday of the week containing a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start_of_week: NaiveDate,
    end_of_week: NaiveDate,
}

impl DateWindow {
    pub fn containing(today: NaiveDate) -> Self {
        let days_since_monday = u64::from(today.weekday().num_days_from_monday());
        let start_of_week = today - Days::new(days_since_monday);
        Self {
            start_of_week,
            end_of_week: start_of_week + Days::new(6),
        }
    }

    #[inline]
    pub fn start_of_week(&self) -> NaiveDate {
        self.start_of_week
    }

    #[inline]
    pub fn end_of_week(&self) -> NaiveDate {
        self.end_of_week
    }

    /// Inclusive on both ends.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_of_week <= date && date <= self.end_of_week
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecognitionKind {
    Birthday,
    Anniversary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recognition {
    pub person: EmployeeRecord,
    pub kind: RecognitionKind,
    /// The re-anchored date is `today` itself
    pub is_today: bool,
    pub message: String,
    /// Anniversaries only
    pub years_of_service: Option<i32>,
}

/// This week's recognitions, each list in report order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WeeklyRecognitions {
    pub birthdays: Vec<Recognition>,
    pub anniversaries: Vec<Recognition>,
}

impl WeeklyRecognitions {
    pub fn is_empty(&self) -> bool {
        self.birthdays.is_empty() && self.anniversaries.is_empty()
    }
}

/// Select the birthdays and work anniversaries falling in `today`'s week.
///
/// A record whose birth or hire date does not parse is skipped entirely.
/// The two checks are independent, so a record can land in both lists.
/// A Feb 29 date has no counterpart in a non-leap year and does not match.
pub fn select(today: NaiveDate, records: &[EmployeeRecord]) -> WeeklyRecognitions {
    let window = DateWindow::containing(today);
    let mut weekly = WeeklyRecognitions::default();

    for record in records {
        let (Some(birth), Some(hire)) = (
            parse_report_date(&record.birth_date),
            parse_report_date(&record.hire_date),
        ) else {
            debug!(
                id = %record.id,
                birth_date = %record.birth_date,
                hire_date = %record.hire_date,
                "skipping record with unparseable dates"
            );
            continue;
        };

        if let Some(birthday) = birth.with_year(today.year()).filter(|d| window.contains(*d)) {
            weekly
                .birthdays
                .push(birthday_recognition(record, birthday == today));
        }

        if let Some(anniversary) = hire.with_year(today.year()).filter(|d| window.contains(*d)) {
            let years = today.year() - hire.year();
            weekly
                .anniversaries
                .push(anniversary_recognition(record, anniversary == today, years));
        }
    }

    weekly
}

fn parse_report_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), REPORT_DATE_FORMAT).ok()
}

fn birthday_recognition(person: &EmployeeRecord, is_today: bool) -> Recognition {
    let message = if is_today {
        format!("Happy birthday to {} {}!", person.first_name, person.last_name)
    } else {
        format!("{} {}'s birthday is this week!", person.first_name, person.last_name)
    };

    Recognition {
        person: person.clone(),
        kind: RecognitionKind::Birthday,
        is_today,
        message,
        years_of_service: None,
    }
}

fn anniversary_recognition(person: &EmployeeRecord, is_today: bool, years: i32) -> Recognition {
    let unit = if years == 1 { "year" } else { "years" };
    let message = if is_today {
        format!(
            "{} {} today! Congrats, {} {}!",
            years, unit, person.first_name, person.last_name
        )
    } else {
        format!(
            "{} {} has been with us for {} {} this week!",
            person.first_name, person.last_name, years, unit
        )
    };

    Recognition {
        person: person.clone(),
        kind: RecognitionKind::Anniversary,
        is_today,
        message,
        years_of_service: Some(years),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(first: &str, last: &str, birth: &str, hire: &str) -> EmployeeRecord {
        EmployeeRecord {
            id: format!("{}-{}", first, last),
            first_name: first.to_string(),
            last_name: last.to_string(),
            birth_date: birth.to_string(),
            hire_date: hire.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_window_monday_to_sunday() {
        let window = DateWindow::containing(date(2024, 6, 5));
        assert_eq!(window.start_of_week(), date(2024, 6, 3));
        assert_eq!(window.end_of_week(), date(2024, 6, 9));

        let monday = DateWindow::containing(date(2024, 6, 3));
        assert_eq!(monday, window);
        let sunday = DateWindow::containing(date(2024, 6, 9));
        assert_eq!(sunday, window);

        assert!(window.contains(date(2024, 6, 3)));
        assert!(window.contains(date(2024, 6, 9)));
        assert!(!window.contains(date(2024, 6, 2)));
        assert!(!window.contains(date(2024, 6, 10)));
    }

    #[test]
    fn test_window_across_year_end() {
        let window = DateWindow::containing(date(2025, 1, 1));
        assert_eq!(window.start_of_week(), date(2024, 12, 30));
        assert_eq!(window.end_of_week(), date(2025, 1, 5));
    }

    #[test]
    fn test_end_to_end_week() {
        let today = date(2024, 6, 3);
        let records = vec![
            record("Alice", "Smith", "06/04/1990", "01/15/2015"),
            record("Bob", "Jones", "11/20/1970", "06/02/2005"),
            record("Charlie", "Brown", "06/03/1980", "06/03/2010"),
        ];

        let weekly = select(today, &records);

        assert_eq!(weekly.birthdays.len(), 2);
        assert_eq!(weekly.birthdays[0].person.first_name, "Alice");
        assert!(!weekly.birthdays[0].is_today);
        assert_eq!(weekly.birthdays[0].message, "Alice Smith's birthday is this week!");
        assert_eq!(weekly.birthdays[1].message, "Happy birthday to Charlie Brown!");
        assert!(weekly.birthdays[1].is_today);

        assert_eq!(weekly.anniversaries.len(), 1);
        let charlie = &weekly.anniversaries[0];
        assert_eq!(charlie.kind, RecognitionKind::Anniversary);
        assert_eq!(charlie.years_of_service, Some(14));
        assert_eq!(charlie.message, "14 years today! Congrats, Charlie Brown!");
    }

    #[test]
    fn test_last_week_is_excluded() {
        let today = date(2024, 6, 5);
        // 8 days before Monday 06-03
        let weekly = select(today, &[record("Old", "News", "05/26/1990", "01/01/2000")]);
        assert!(weekly.is_empty());
    }

    #[test]
    fn test_unit_word() {
        let today = date(2024, 6, 3);
        let weekly = select(
            today,
            &[
                record("One", "Year", "01/01/1990", "06/05/2023"),
                record("Zero", "Years", "01/01/1990", "06/05/2024"),
                record("Future", "Hire", "01/01/1990", "06/05/2026"),
                record("Today", "One", "01/01/1990", "06/03/2023"),
            ],
        );

        let messages: Vec<&str> = weekly
            .anniversaries
            .iter()
            .map(|r| r.message.as_str())
            .collect();
        assert_eq!(
            messages,
            [
                "One Year has been with us for 1 year this week!",
                "Zero Years has been with us for 0 years this week!",
                "Future Hire has been with us for -2 years this week!",
                "1 year today! Congrats, Today One!",
            ]
        );
    }

    #[test]
    fn test_years_are_plain_year_difference() {
        // Hired late in the year, matched in an early-January week
        let today = date(2025, 1, 1);
        let weekly = select(today, &[record("Late", "Hire", "03/03/1990", "12/31/2020")]);
        // 2020-12-31 re-anchors to 2025-12-31, outside the 2024-12-30..2025-01-05 week
        assert!(weekly.anniversaries.is_empty());

        let weekly = select(today, &[record("Early", "Hire", "03/03/1990", "01/02/2020")]);
        assert_eq!(weekly.anniversaries[0].years_of_service, Some(5));
    }

    #[test]
    fn test_unparseable_dates_skip_the_record() {
        let today = date(2024, 6, 3);
        let weekly = select(
            today,
            &[
                record("Bad", "Birth", "not a date", "06/03/2010"),
                record("Bad", "Hire", "06/03/1980", "2010-06-03"),
                record("Empty", "Dates", "", ""),
            ],
        );
        assert!(weekly.is_empty());
    }

    #[test]
    fn test_feb_29_in_common_year() {
        // Week of 2025-02-24 .. 2025-03-02 has no Feb 29
        let today = date(2025, 2, 26);
        let weekly = select(today, &[record("Leap", "Day", "02/29/2000", "02/26/2024")]);
        assert!(weekly.birthdays.is_empty());
        assert_eq!(weekly.anniversaries.len(), 1);
        assert_eq!(
            weekly.anniversaries[0].message,
            "1 year today! Congrats, Leap Day!"
        );

        // 2028 is a leap year
        let weekly = select(date(2028, 2, 29), &[record("Leap", "Day", "02/29/2000", "01/01/2000")]);
        assert_eq!(weekly.birthdays[0].message, "Happy birthday to Leap Day!");
    }

    #[test]
    fn test_duplicates_and_order_preserved() {
        let today = date(2024, 6, 3);
        let dup = record("Dup", "Row", "06/06/1990", "01/01/2000");
        let weekly = select(
            today,
            &[
                record("Zed", "Last", "06/09/1990", "01/01/2000"),
                dup.clone(),
                dup,
            ],
        );
        let names: Vec<&str> = weekly
            .birthdays
            .iter()
            .map(|r| r.person.first_name.as_str())
            .collect();
        assert_eq!(names, ["Zed", "Dup", "Dup"]);
    }

    #[test]
    fn test_single_digit_dates() {
        let weekly = select(date(2024, 6, 3), &[record("Short", "Date", "6/4/1990", "1/1/2000")]);
        assert_eq!(weekly.birthdays.len(), 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn prop_window_is_monday_to_sunday(offset in 0u64..20_000) {
                let today = date(2000, 1, 1) + Days::new(offset);
                let window = DateWindow::containing(today);
                prop_assert_eq!(window.start_of_week().weekday(), chrono::Weekday::Mon);
                prop_assert_eq!(window.end_of_week() - window.start_of_week(), chrono::Duration::days(6));
                prop_assert!(window.contains(today));
            }

            #[test]
            fn prop_birthday_selected_iff_in_window(
                offset in 0u64..10_000,
                year in 1950i32..2000,
                month in 1u32..=12,
                day in 1u32..=28,
            ) {
                let today = date(2000, 1, 1) + Days::new(offset);
                let birth = format!("{:02}/{:02}/{}", month, day, year);
                let weekly = select(today, &[record("P", "Q", &birth, "01/01/1900")]);

                let anchored = date(today.year(), month, day);
                let expected = DateWindow::containing(today).contains(anchored);
                prop_assert_eq!(weekly.birthdays.len(), usize::from(expected));
                if let Some(recognition) = weekly.birthdays.first() {
                    prop_assert_eq!(recognition.is_today, anchored == today);
                }
            }
        }
    }
}
