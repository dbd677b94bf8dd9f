//! Calendar synthesis and ICS generation.
//!
//! [`synthesize`] turns a timetable into a [`CalendarDocument`], which is
//! then written out according to RFC 5545 by [`CalendarDocument::to_ics`].

mod document;
mod generate;

pub use document::{CalendarDocument, synthesize};
