//! Slot validation for the dining suggestion intent.
//!
//! Rules run in a fixed order and short-circuit at the first violation. An
//! absent slot means "not yet collected" and its rule is skipped. The caller
//! supplies "now" so the date/time rules are deterministic.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use regex::Regex;

use crate::lex;

/// The nine cuisines the restaurant index covers.
const CUISINES: [&str; 9] = [
    "indian",
    "italian",
    "chinese",
    "vietnamese",
    "mexican",
    "french",
    "thai",
    "japanese",
    "turkish",
];

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// The slot values subject to validation. `PhoneNumber` is collected by the
/// bot but never validated or forwarded.
#[derive(Debug, Default)]
pub struct SlotValues<'a> {
    pub cuisine: Option<&'a str>,
    pub party_size: Option<&'a str>,
    pub date: Option<&'a str>,
    pub time: Option<&'a str>,
    pub location: Option<&'a str>,
    pub email: Option<&'a str>,
}

/// The first rule violation found, naming the slot to re-elicit and the
/// user-facing correction message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotViolation {
    pub slot: &'static str,
    pub message: &'static str,
}

impl SlotViolation {
    fn new(slot: &'static str, message: &'static str) -> Self {
        Self { slot, message }
    }
}

/// Validate whatever slots are present, short-circuiting at the first
/// violation. `now` is the current wall-clock time in the bot's timezone.
pub fn validate_dining_request(
    slots: &SlotValues<'_>,
    now: NaiveDateTime,
) -> Result<(), SlotViolation> {
    if let Some(cuisine) = slots.cuisine {
        if !CUISINES.contains(&cuisine.to_lowercase().as_str()) {
            return Err(SlotViolation::new(
                lex::CUISINE,
                "We do not have that cuisine, can you please try another?",
            ));
        }
    }

    if let Some(party_size) = slots.party_size {
        match party_size.trim().parse::<i64>() {
            Ok(count) if count > 20 => {
                return Err(SlotViolation::new(
                    lex::PARTY_SIZE,
                    "Only a maximum 20 people are allowed to dine, please try again.",
                ));
            }
            Ok(count) if count < 0 => {
                return Err(SlotViolation::new(
                    lex::PARTY_SIZE,
                    "There cannot be less than zero people dining, please try again.",
                ));
            }
            Ok(_) => {}
            Err(_) => {
                return Err(SlotViolation::new(
                    lex::PARTY_SIZE,
                    "I did not understand that, how many people will be dining?",
                ));
            }
        }
    }

    let parsed_date = slots.date.map(parse_date);
    if let Some(result) = &parsed_date {
        match result {
            Ok(date) if *date < now.date() => {
                return Err(SlotViolation::new(
                    lex::DATE,
                    "You cannot choose a date from the past, please try again.",
                ));
            }
            Ok(_) => {}
            Err(_) => {
                return Err(SlotViolation::new(
                    lex::DATE,
                    "I did not understand that, what date would you like to go dining?",
                ));
            }
        }
    }

    if let Some(time) = slots.time {
        let (hour, minute) = parse_time(time).ok_or(SlotViolation::new(
            lex::TIME,
            "Not a valid time, please try again.",
        ))?;

        if !(10..=22).contains(&hour) {
            return Err(SlotViolation::new(
                lex::TIME,
                "Valid booking hours are from 10am to 10pm, please specify a time in this interval.",
            ));
        }

        // The same-day rule only applies once a parseable date is known.
        let is_today = matches!(&parsed_date, Some(Ok(date)) if *date == now.date());
        if is_today && (hour, minute) < (now.hour(), now.minute()) {
            return Err(SlotViolation::new(
                lex::TIME,
                "Please pick a time greater than the current time",
            ));
        }
    }

    if let Some(location) = slots.location {
        if location.trim().is_empty() {
            return Err(SlotViolation::new(
                lex::LOCATION,
                "Not a valid location, please try again.",
            ));
        }
    }

    if let Some(email) = slots.email {
        if !EMAIL_PATTERN.is_match(email) {
            return Err(SlotViolation::new(
                lex::EMAIL,
                "This was not a valid email, please try again.",
            ));
        }
    }

    Ok(())
}

fn parse_date(date: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
}

/// Parse a time slot that must be exactly `HH:MM` with numeric components.
fn parse_time(time: &str) -> Option<(u32, u32)> {
    if time.len() != 5 || time.as_bytes()[2] != b':' {
        return None;
    }

    let hour = time[..2].parse::<u32>().ok()?;
    let minute = time[3..].parse::<u32>().ok()?;
    Some((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn noon(date: &str) -> NaiveDateTime {
        NaiveDateTime::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        )
    }

    fn violated_slot(slots: &SlotValues<'_>, now: NaiveDateTime) -> Option<&'static str> {
        validate_dining_request(slots, now).err().map(|v| v.slot)
    }

    #[test]
    fn test_empty_slots_are_valid() {
        assert!(validate_dining_request(&SlotValues::default(), noon("2025-06-01")).is_ok());
    }

    #[test]
    fn test_cuisine_membership_is_case_insensitive() {
        let now = noon("2025-06-01");
        for cuisine in ["italian", "Italian", "THAI", "Japanese"] {
            let slots = SlotValues {
                cuisine: Some(cuisine),
                ..Default::default()
            };
            assert!(validate_dining_request(&slots, now).is_ok(), "{}", cuisine);
        }

        let slots = SlotValues {
            cuisine: Some("klingon"),
            ..Default::default()
        };
        let violation = validate_dining_request(&slots, now).unwrap_err();
        assert_eq!(violation.slot, lex::CUISINE);
        assert_eq!(
            violation.message,
            "We do not have that cuisine, can you please try another?"
        );
    }

    #[test]
    fn test_party_size_bounds() {
        let now = noon("2025-06-01");
        for size in ["0", "1", "20"] {
            let slots = SlotValues {
                party_size: Some(size),
                ..Default::default()
            };
            assert!(validate_dining_request(&slots, now).is_ok(), "{}", size);
        }

        let over = SlotValues {
            party_size: Some("21"),
            ..Default::default()
        };
        assert_eq!(violated_slot(&over, now), Some(lex::PARTY_SIZE));

        let negative = SlotValues {
            party_size: Some("-1"),
            ..Default::default()
        };
        assert_eq!(violated_slot(&negative, now), Some(lex::PARTY_SIZE));
    }

    #[test]
    fn test_unparseable_party_size_is_a_violation_not_a_crash() {
        let slots = SlotValues {
            party_size: Some("a few"),
            ..Default::default()
        };
        assert_eq!(violated_slot(&slots, noon("2025-06-01")), Some(lex::PARTY_SIZE));
    }

    #[test]
    fn test_date_must_parse_and_not_be_past() {
        let now = noon("2025-06-01");

        let future = SlotValues {
            date: Some("2025-06-02"),
            ..Default::default()
        };
        assert!(validate_dining_request(&future, now).is_ok());

        let today = SlotValues {
            date: Some("2025-06-01"),
            ..Default::default()
        };
        assert!(validate_dining_request(&today, now).is_ok());

        let past = SlotValues {
            date: Some("2025-05-31"),
            ..Default::default()
        };
        let violation = validate_dining_request(&past, now).unwrap_err();
        assert_eq!(violation.slot, lex::DATE);
        assert_eq!(
            violation.message,
            "You cannot choose a date from the past, please try again."
        );

        let garbled = SlotValues {
            date: Some("next tuesday"),
            ..Default::default()
        };
        assert_eq!(violated_slot(&garbled, now), Some(lex::DATE));
    }

    #[test]
    fn test_time_shape_and_booking_hours() {
        let now = noon("2025-06-01");

        for time in ["10:00", "22:00", "19:30"] {
            let slots = SlotValues {
                time: Some(time),
                ..Default::default()
            };
            assert!(validate_dining_request(&slots, now).is_ok(), "{}", time);
        }

        for time in ["9:00", "7pm", "19-30", "aa:bb", "19:3x"] {
            let slots = SlotValues {
                time: Some(time),
                ..Default::default()
            };
            let violation = validate_dining_request(&slots, now).unwrap_err();
            assert_eq!(violation.slot, lex::TIME, "{}", time);
            assert_eq!(violation.message, "Not a valid time, please try again.");
        }

        for time in ["09:00", "23:00"] {
            let slots = SlotValues {
                time: Some(time),
                ..Default::default()
            };
            let violation = validate_dining_request(&slots, now).unwrap_err();
            assert_eq!(violation.slot, lex::TIME, "{}", time);
            assert_eq!(
                violation.message,
                "Valid booking hours are from 10am to 10pm, please specify a time in this interval."
            );
        }
    }

    #[test]
    fn test_same_day_time_must_not_be_earlier_than_now() {
        let now = noon("2025-06-01");

        let earlier = SlotValues {
            date: Some("2025-06-01"),
            time: Some("11:59"),
            ..Default::default()
        };
        let violation = validate_dining_request(&earlier, now).unwrap_err();
        assert_eq!(violation.slot, lex::TIME);
        assert_eq!(violation.message, "Please pick a time greater than the current time");

        let exact = SlotValues {
            date: Some("2025-06-01"),
            time: Some("12:00"),
            ..Default::default()
        };
        assert!(validate_dining_request(&exact, now).is_ok());

        // The same hour and minute tomorrow is fine.
        let tomorrow = SlotValues {
            date: Some("2025-06-02"),
            time: Some("11:59"),
            ..Default::default()
        };
        assert!(validate_dining_request(&tomorrow, now).is_ok());

        // Without a parseable date there is nothing to compare against;
        // the date rule already fired first anyway.
        let no_date = SlotValues {
            time: Some("11:59"),
            ..Default::default()
        };
        assert!(validate_dining_request(&no_date, now).is_ok());
    }

    #[test]
    fn test_location_must_be_non_empty() {
        let now = noon("2025-06-01");

        let blank = SlotValues {
            location: Some("  "),
            ..Default::default()
        };
        assert_eq!(violated_slot(&blank, now), Some(lex::LOCATION));

        let city = SlotValues {
            location: Some("NYC"),
            ..Default::default()
        };
        assert!(validate_dining_request(&city, now).is_ok());
    }

    #[test]
    fn test_email_shape() {
        let now = noon("2025-06-01");

        for email in ["a@b.com", "first.last+tag@sub.example.org"] {
            let slots = SlotValues {
                email: Some(email),
                ..Default::default()
            };
            assert!(validate_dining_request(&slots, now).is_ok(), "{}", email);
        }

        for email in ["not-an-email", "a@b", "a@b.c", "@example.com", "a b@c.com"] {
            let slots = SlotValues {
                email: Some(email),
                ..Default::default()
            };
            let violation = validate_dining_request(&slots, now).unwrap_err();
            assert_eq!(violation.slot, lex::EMAIL, "{}", email);
            assert_eq!(violation.message, "This was not a valid email, please try again.");
        }
    }

    #[test]
    fn test_first_violation_in_order_wins() {
        let slots = SlotValues {
            cuisine: Some("klingon"),
            party_size: Some("99"),
            email: Some("nope"),
            ..Default::default()
        };
        assert_eq!(violated_slot(&slots, noon("2025-06-01")), Some(lex::CUISINE));

        let slots = SlotValues {
            party_size: Some("99"),
            email: Some("nope"),
            ..Default::default()
        };
        assert_eq!(violated_slot(&slots, noon("2025-06-01")), Some(lex::PARTY_SIZE));
    }

    #[test]
    fn test_fully_valid_slot_set() {
        let slots = SlotValues {
            cuisine: Some("italian"),
            party_size: Some("4"),
            date: Some("2025-06-15"),
            time: Some("19:00"),
            location: Some("NYC"),
            email: Some("a@b.com"),
        };
        assert!(validate_dining_request(&slots, noon("2025-06-01")).is_ok());
    }
}
