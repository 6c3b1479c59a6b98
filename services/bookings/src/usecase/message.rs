//! Rendered text of every outbound message.

use std::fmt::Write as _;

use chrono::Duration;

use crate::domain::event::NormalizedEvent;
use crate::domain::types::{Booking, VenueProfile};

const DATE_FORMAT: &str = "%d.%m.%Y";
const TIME_FORMAT: &str = "%H:%M";

/// `90` -> `"1 h 30 min"`, `120` -> `"2 h"`, `45` -> `"45 min"`.
pub fn duration_text(minutes: i64) -> String {
    let (hours, mins) = (minutes / 60, minutes % 60);
    match (hours, mins) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} h"),
        (h, m) => format!("{h} h {m} min"),
    }
}

fn when(venue: &VenueProfile, booking: &Booking) -> (String, String) {
    let local = venue.local(booking.starts_at);
    (
        local.format(DATE_FORMAT).to_string(),
        local.format(TIME_FORMAT).to_string(),
    )
}

fn venue_line(venue: &VenueProfile) -> Option<String> {
    match (venue.name.is_empty(), venue.address.is_empty()) {
        (true, true) => None,
        (false, true) => Some(venue.name.clone()),
        (true, false) => Some(venue.address.clone()),
        (false, false) => Some(format!("{}, {}", venue.name, venue.address)),
    }
}

pub fn confirmation(booking: &Booking, venue: &VenueProfile, reminder_lead: Duration) -> String {
    let (date, time) = when(venue, booking);
    let mut text = format!(
        "Your booking is confirmed!\n\n{}\n{date} at {time}\nDuration: {}\n",
        booking.service,
        duration_text(i64::from(booking.duration_minutes)),
    );
    if let Some(line) = venue_line(venue) {
        let _ = write!(text, "\nWhere to find us: {line}\n");
    }
    let _ = write!(
        text,
        "\nWe will remind you {} before your visit.\nBooking code: {}",
        duration_text(reminder_lead.num_minutes()),
        booking.code,
    );
    text
}

pub fn reminder(booking: &Booking, venue: &VenueProfile) -> String {
    let (date, time) = when(venue, booking);
    let mut text = format!(
        "Reminder: {} on {date} at {time}.\nDuration: {}",
        booking.service,
        duration_text(i64::from(booking.duration_minutes)),
    );
    if let Some(line) = venue_line(venue) {
        let _ = write!(text, "\n{line}");
    }
    text.push_str("\n\nSee you soon!");
    text
}

pub fn feedback_request(booking: &Booking) -> String {
    format!(
        "Thank you for visiting us!\n\nPlease rate \"{}\" from 1 to 5.",
        booking.service
    )
}

pub fn cancellation(booking: &Booking, venue: &VenueProfile) -> String {
    let (date, time) = when(venue, booking);
    format!(
        "Your booking is cancelled.\n\n{}\n{date} at {time}\nDuration: {}\n\nWe hope to see you again!",
        booking.service,
        duration_text(i64::from(booking.duration_minutes)),
    )
}

fn staff_summary(title: &str, event: &NormalizedEvent, venue: &VenueProfile) -> String {
    let local = event.starts_at.with_timezone(&venue.utc_offset);
    let mut text = format!(
        "{title}\n\nName: {}\nPhone: {}\nService: {}\nDate: {}\nTime: {}\nDuration: {}\n",
        event.client_name,
        event
            .phone
            .as_ref()
            .map_or("not provided", |p| p.as_str()),
        event.service,
        local.format(DATE_FORMAT),
        local.format(TIME_FORMAT),
        duration_text(i64::from(event.duration_minutes)),
    );
    if let Some(sum) = &event.total_sum {
        let _ = writeln!(text, "Sum: {sum}");
    }
    let _ = write!(text, "Code: {}", event.code);
    text
}

pub fn staff_new_booking(event: &NormalizedEvent, venue: &VenueProfile, known: bool) -> String {
    let mut text = staff_summary("New booking", event, venue);
    text.push_str(if known {
        "\nCustomer in bot: yes"
    } else {
        "\nCustomer in bot: no"
    });
    text
}

pub fn staff_cancellation(event: &NormalizedEvent, venue: &VenueProfile) -> String {
    staff_summary("Booking cancelled", event, venue)
}
