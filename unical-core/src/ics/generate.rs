//! ICS file generation.

use chrono::{DateTime, Utc};
use icalendar::{Calendar, Component, EventLike};
use uuid::Uuid;

use super::document::CalendarDocument;
use crate::error::{UnicalError, UnicalResult};
use crate::timetable::Lecture;

const PRODID: &str = "PRODID:-//unical//Lecture timetable//EN";

impl CalendarDocument {
    /// Serialize to iCalendar text.
    ///
    /// The output only depends on the document: UIDs are derived from the
    /// timetable identity and DTSTAMP comes from `stamp`.
    pub fn to_ics(&self) -> UnicalResult<Vec<u8>> {
        let mut cal = Calendar::new();
        cal.name(&self.name);
        cal.description(&self.description);
        if let Some(ref tz) = self.timezone {
            cal.timezone(tz.as_str());
        }

        for (index, lecture) in self.events.iter().enumerate() {
            cal.push(self.ics_event(index, lecture)?);
        }
        let cal = cal.done();

        Ok(strip_ics_bloat(&cal.to_string()).into_bytes())
    }

    fn ics_event(&self, index: usize, lecture: &Lecture) -> UnicalResult<icalendar::Event> {
        if lecture.end < lecture.start {
            return Err(UnicalError::Serialization(format!(
                "Lecture '{}' ends before it starts ({} < {})",
                lecture.title, lecture.end, lecture.start
            )));
        }

        let mut ics_event = icalendar::Event::new();
        ics_event.uid(&self.event_uid(index, lecture));
        ics_event.summary(&lecture.title);
        ics_event.add_property("DTSTAMP", format_utc(&self.stamp));
        ics_event.add_property("DTSTART", format_utc(&lecture.start));
        ics_event.add_property("DTEND", format_utc(&lecture.end));

        if let Some(ref loc) = lecture.location {
            ics_event.location(loc);
        }

        if let Some(ref lecturer) = lecture.lecturer {
            ics_event.description(lecturer);
        }

        if let Some(ref url) = lecture.url {
            ics_event.add_property("URL", url);
        }

        Ok(ics_event.done())
    }

    /// Stable UID: same timetable, position and start give the same UID.
    fn event_uid(&self, index: usize, lecture: &Lecture) -> String {
        let name = format!("{}#{}@{}", self.source, index, lecture.start.timestamp());
        format!(
            "{}@unical",
            Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes())
        )
    }
}

fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with our own
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str(PRODID);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}
