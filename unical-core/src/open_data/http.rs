//! Timetable source backed by the JSON endpoint of each course website.
//!
//! The endpoint lives at `{course url}/{path}?anno={year}&curricula={token}`
//! and returns an array of lectures whose times are naive local datetimes.

use async_trait::async_trait;
use chrono::{NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::debug;

use crate::config::TimetableSettings;
use crate::course::Course;
use crate::error::{UnicalError, UnicalResult};
use crate::timetable::{CurriculumFilter, Lecture, TimetableSlice, TimetableSource};

#[derive(Debug, Deserialize)]
struct RawLecture {
    title: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
    #[serde(default)]
    aule: Vec<RawRoom>,
    #[serde(default)]
    docente: Option<String>,
    #[serde(default)]
    teams: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRoom {
    #[serde(default)]
    des_risorsa: String,
    #[serde(default)]
    des_indirizzo: Option<String>,
}

impl RawRoom {
    fn label(&self) -> Option<String> {
        let name = self.des_risorsa.trim();
        let address = self.des_indirizzo.as_deref().map(str::trim).unwrap_or_default();
        match (name.is_empty(), address.is_empty()) {
            (true, true) => None,
            (false, true) => Some(name.to_string()),
            (true, false) => Some(address.to_string()),
            (false, false) => Some(format!("{name} - {address}")),
        }
    }
}

pub struct HttpTimetableSource {
    client: reqwest::Client,
    path: String,
    timezone: Tz,
}

impl HttpTimetableSource {
    pub fn new(settings: &TimetableSettings) -> UnicalResult<Self> {
        let timezone: Tz = settings.timezone.parse().map_err(|e| {
            UnicalError::Config(format!("Unknown timezone '{}': {}", settings.timezone, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("unical/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UnicalError::Config(format!("Could not build HTTP client: {e}")))?;

        Ok(HttpTimetableSource {
            client,
            path: settings.path.trim_start_matches('/').to_string(),
            timezone,
        })
    }

    fn timetable_url(&self, course: &Course) -> UnicalResult<String> {
        let base = course.url.as_deref().ok_or_else(|| {
            UnicalError::TimetableUnavailable(format!("Course {} has no website", course.id))
        })?;
        Ok(format!("{}/{}", base.trim_end_matches('/'), self.path))
    }
}

#[async_trait]
impl TimetableSource for HttpTimetableSource {
    async fn timetable(
        &self,
        course: &Course,
        year: u32,
        curriculum: &CurriculumFilter,
    ) -> UnicalResult<TimetableSlice> {
        let url = self.timetable_url(course)?;

        let mut query = vec![("anno", year.to_string())];
        if let Some(token) = curriculum.token() {
            query.push(("curricula", token.to_string()));
        }

        debug!(%url, year, curriculum = curriculum.token(), "Fetching timetable");

        let raw: Vec<RawLecture> = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| UnicalError::TimetableUnavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| {
                UnicalError::TimetableUnavailable(format!("Malformed timetable from {url}: {e}"))
            })?;

        raw.into_iter()
            .map(|r| into_lecture(r, &self.timezone))
            .collect()
    }
}

fn into_lecture(raw: RawLecture, tz: &Tz) -> UnicalResult<Lecture> {
    let to_utc = |naive: &NaiveDateTime| {
        tz.from_local_datetime(naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| {
                UnicalError::TimetableUnavailable(format!(
                    "'{}' has a nonexistent local time {}",
                    raw.title, naive
                ))
            })
    };

    let start = to_utc(&raw.start)?;
    let end = to_utc(&raw.end)?;

    let rooms: Vec<String> = raw.aule.iter().filter_map(RawRoom::label).collect();

    Ok(Lecture {
        title: raw.title.trim().to_string(),
        start,
        end,
        location: (!rooms.is_empty()).then(|| rooms.join("; ")),
        lecturer: raw.docente.filter(|d| !d.trim().is_empty()),
        url: raw.teams.filter(|t| !t.trim().is_empty()),
    })
}
