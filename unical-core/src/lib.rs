//! Core of unical: turns course timetables into cached `.ics` calendars.
//!
//! A request flows through [`request::validate`], then the
//! [`cache::ArtifactCache`], and on a miss through a
//! [`timetable::TimetableSource`] and [`ics::synthesize`].
//! [`calendar_service::CalendarService`] ties these together.

pub mod cache;
pub mod calendar_service;
pub mod clock;
pub mod config;
pub mod course;
pub mod error;
pub mod ics;
pub mod open_data;
pub mod request;
pub mod timetable;

pub use calendar_service::{CalendarArtifact, CalendarService};
pub use course::{Course, CourseDirectory};
pub use error::{ErrorKind, UnicalError, UnicalResult};
pub use timetable::{CurriculumFilter, Lecture, TimetableSlice, TimetableSource};
