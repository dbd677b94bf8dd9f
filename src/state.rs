use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use unical_core::cache::ArtifactCache;
use unical_core::clock::{Clock, SystemClock};
use unical_core::config::UnicalConfig;
use unical_core::open_data::{CourseCatalog, HttpTimetableSource};
use unical_core::CalendarService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    calendars: Arc<CalendarService>,
}

impl AppState {
    pub fn new(calendars: CalendarService) -> Self {
        AppState {
            calendars: Arc::new(calendars),
        }
    }

    /// Wire up the production collaborators. Must run inside the tokio
    /// runtime, since it starts the cache sweeper.
    pub fn from_config(config: &UnicalConfig) -> Result<Self> {
        let courses_path = config.data.courses_path();
        let courses = CourseCatalog::load(&courses_path).with_context(|| {
            format!("Unable to open course snapshot {}", courses_path.display())
        })?;
        info!(courses = courses.len(), path = %courses_path.display(), "Loaded course catalog");

        let timetables = HttpTimetableSource::new(&config.timetable)?;

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let cache = Arc::new(ArtifactCache::from_settings(&config.cache, clock.clone()));
        ArtifactCache::spawn_sweeper(&cache, config.cache.sweep_interval);

        let service = CalendarService::new(Arc::new(courses), Arc::new(timetables), cache, clock)
            .with_timezone(&config.timetable.timezone);

        Ok(AppState::new(service))
    }

    pub fn calendars(&self) -> &CalendarService {
        &self.calendars
    }
}
