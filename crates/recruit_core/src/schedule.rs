//! Interview slots offered on the last wizard step.

use crate::domain::{InterviewMode, Slot};
use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub const SLOT_TIMES: [&str; 3] = ["10:00", "14:00", "16:00"];
/// How many weekdays ahead a candidate can book.
pub const BOOKING_WINDOW_DAYS: usize = 7;

/// Slots for the next `days` weekdays after `today`, in both interview modes.
pub fn upcoming_slots(today: NaiveDate, days: usize) -> Vec<Slot> {
    let mut slots = Vec::with_capacity(days * SLOT_TIMES.len() * 2);
    let mut date = today;
    let mut found = 0;
    while found < days {
        date += Duration::days(1);
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }
        found += 1;
        for time in SLOT_TIMES {
            for mode in [InterviewMode::Online, InterviewMode::Offline] {
                slots.push(Slot {
                    date,
                    time: time.to_string(),
                    available: true,
                    mode,
                });
            }
        }
    }
    slots
}

/// The offered slot matching `requested` on date, time and mode.
///
/// The offered copy is returned so the client's `available` flag never reaches the record.
pub fn offered_slot(requested: &Slot, today: NaiveDate) -> Option<Slot> {
    upcoming_slots(today, BOOKING_WINDOW_DAYS)
        .into_iter()
        .find(|s| s.date == requested.date && s.time == requested.time && s.mode == requested.mode)
}
