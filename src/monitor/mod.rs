pub mod timeline;

use chrono::{Days, NaiveDate};

use crate::models::ImageHandle;

pub use timeline::{build_timeline, TimelineEntry, TimelineEvent, TimelineStatus};

/// Follow-up photos taken while a treatment runs, oldest first.
#[derive(Debug, Clone, Default)]
pub struct ProgressLog {
    photos: Vec<ImageHandle>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, photo: ImageHandle) -> usize {
        self.photos.push(photo);
        self.photos.len()
    }

    pub fn photos(&self) -> &[ImageHandle] {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Before/after pair, once there is something to compare.
    pub fn comparison(&self) -> Option<(&ImageHandle, &ImageHandle)> {
        match self.photos.as_slice() {
            [first, .., latest] => Some((first, latest)),
            _ => None,
        }
    }

    /// Current day within the recovery window: one past the photos taken so
    /// far, capped at the window length.
    pub fn recovery_day(&self, window_days: u32) -> u32 {
        let day = u32::try_from(self.photos.len())
            .unwrap_or(u32::MAX)
            .saturating_add(1);
        day.min(window_days.max(1))
    }
}

pub fn next_checkup(today: NaiveDate, interval_days: u32) -> NaiveDate {
    today
        .checked_add_days(Days::new(u64::from(interval_days)))
        .unwrap_or(NaiveDate::MAX)
}
