//! Notification policy: what should be scheduled, when, and how duplicates are avoided.
//!
//! Every operation is infallible from the caller's side. Platform failures are
//! logged and leave the previous platform state in place; the next lifecycle
//! event retries implicitly.

use chrono::{DateTime, Datelike, Local, NaiveTime, Timelike, Weekday};
use parking_lot::{Mutex, RwLock};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    error::{Error, Result},
    favorite::FavoriteItem,
    milestone::{milestone_message, MILESTONE_TITLE},
    motivation::{pick_motivation, quote_body, DAILY_TITLE},
    notifications::{
        NotificationContent, NotificationData, NotificationSink, ScheduleTag,
        ScheduledNotification, Trigger,
    },
    schedule::{
        next_daily_anchor, next_weekly_anchor, Clock, Recurrence, SystemClock, TriggerStyle,
    },
};

pub const WEEKLY_TITLE: &str = "📚 Weekly Quote Reminder";
pub const FAVORITE_SAVED_TITLE: &str = "❤️ Saved to Favorites!";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyConfig {
    pub daily_time: NaiveTime,
    pub weekly_weekday: Weekday,
    pub weekly_time: NaiveTime,
    pub trigger_style: TriggerStyle,
    pub sound: bool,
    pub badge: Option<u32>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            daily_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default(),
            weekly_weekday: Weekday::Mon,
            weekly_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            trigger_style: TriggerStyle::Anchored,
            sound: true,
            badge: Some(1),
        }
    }
}

pub struct NotificationPolicy {
    sink: Box<dyn NotificationSink>,
    clock: Box<dyn Clock>,
    rng: Mutex<StdRng>,
    config: PolicyConfig,
    // `None` until the first prompt resolves it.
    permission: RwLock<Option<bool>>,
    // Held across cancel-then-register so two callers cannot interleave a tag.
    schedule_lock: Mutex<()>,
}

impl NotificationPolicy {
    pub fn new(sink: Box<dyn NotificationSink>) -> Self {
        Self {
            sink,
            clock: Box::new(SystemClock),
            rng: Mutex::new(StdRng::from_entropy()),
            config: PolicyConfig::default(),
            permission: RwLock::new(None),
            schedule_lock: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn with_config(mut self, config: PolicyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn permission_granted(&self) -> bool {
        *self.permission.read() == Some(true)
    }

    /// Resolve notification permission, prompting only when not already granted.
    pub fn request_permission(&self) -> bool {
        let granted = match self.resolve_permission() {
            Ok(granted) => granted,
            Err(err) => {
                warn!(%err, "unable to resolve notification permission");
                false
            }
        };
        *self.permission.write() = Some(granted);
        info!(granted, "notification permission resolved");
        granted
    }

    /// Replace the daily motivation with a freshly picked quote anchored at the
    /// next daily time.
    pub fn schedule_daily_motivation(&self) -> Option<ScheduledNotification> {
        if !self.allowed("daily motivation") {
            return None;
        }
        let _guard = self.schedule_lock.lock();
        match self.try_schedule_daily() {
            Ok(scheduled) => {
                info!(at = %scheduled.trigger_time, "daily motivation scheduled");
                Some(scheduled)
            }
            Err(err) => {
                warn!(%err, "failed to schedule daily motivation");
                None
            }
        }
    }

    /// Replace the weekly reminder with a random favorite. An empty list only cancels.
    pub fn schedule_weekly_random(
        &self,
        favorites: &[FavoriteItem],
    ) -> Option<ScheduledNotification> {
        if !self.allowed("weekly reminder") {
            return None;
        }
        let _guard = self.schedule_lock.lock();
        match self.try_schedule_weekly(favorites) {
            Ok(Some(scheduled)) => {
                info!(at = %scheduled.trigger_time, "weekly reminder scheduled");
                Some(scheduled)
            }
            Ok(None) => {
                debug!("no favorites to schedule weekly reminder");
                None
            }
            Err(err) => {
                warn!(%err, "failed to schedule weekly reminder");
                None
            }
        }
    }

    /// Fire a milestone alert when `favorites_count` is exactly a threshold.
    /// Returns whether an alert was handed to the platform.
    pub fn check_milestone(&self, favorites_count: usize) -> bool {
        let Some(message) = milestone_message(favorites_count) else {
            return false;
        };
        info!(count = favorites_count, "favorites milestone reached");
        let content = self.content(
            MILESTONE_TITLE,
            message,
            NotificationData::Milestone {
                count: favorites_count,
            },
        );
        self.fire_immediate(content)
    }

    pub fn notify_favorite_saved(&self, item: &FavoriteItem) -> bool {
        let content = self.content(
            FAVORITE_SAVED_TITLE,
            quote_body(&item.content, &item.author),
            NotificationData::FavoriteSaved {
                quote: item.content.clone(),
                author: item.author.clone(),
            },
        );
        self.fire_immediate(content)
    }

    /// Fire-and-forget. Not deduplicated and never retried. Before the first
    /// prompt this asks the platform for its current status instead.
    pub fn fire_immediate(&self, content: NotificationContent) -> bool {
        if let Err(err) = self.ensure_delivery_permission() {
            debug!(%err, "skipping immediate alert");
            return false;
        }
        let title = content.title.clone();
        match self.sink.fire_now(content) {
            Ok(()) => {
                debug!(%title, "immediate alert fired");
                true
            }
            Err(err) => {
                warn!(%err, %title, "failed to fire immediate alert");
                false
            }
        }
    }
}

impl NotificationPolicy {
    fn resolve_permission(&self) -> Result<bool> {
        if self.sink.permission_status()?.is_granted() {
            return Ok(true);
        }
        Ok(self.sink.request_permission()?.is_granted())
    }

    fn ensure_permission(&self) -> Result<()> {
        if self.permission_granted() {
            Ok(())
        } else {
            Err(Error::PermissionDenied)
        }
    }

    /// Like `ensure_permission`, but before the first prompt a grant the
    /// platform already holds is picked up without prompting.
    fn ensure_delivery_permission(&self) -> Result<()> {
        let resolved = *self.permission.read();
        match resolved {
            Some(true) => return Ok(()),
            Some(false) => return Err(Error::PermissionDenied),
            None => {}
        }
        if self.sink.permission_status()?.is_granted() {
            *self.permission.write() = Some(true);
            debug!("notification permission already granted by the platform");
            return Ok(());
        }
        Err(Error::PermissionDenied)
    }

    fn allowed(&self, what: &str) -> bool {
        match self.ensure_permission() {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, what, "skipping notification");
                false
            }
        }
    }

    fn try_schedule_daily(&self) -> Result<ScheduledNotification> {
        self.cancel_tag(ScheduleTag::DailyMotivation)?;

        let quote = pick_motivation(&mut *self.rng.lock());
        let anchor = next_daily_anchor(&self.clock.now(), self.config.daily_time)?;
        let content = self.content(
            DAILY_TITLE,
            quote_body(quote.text, quote.author),
            NotificationData::DailyMotivation {
                quote: quote.text.to_string(),
                author: quote.author.to_string(),
            },
        );
        self.register(ScheduleTag::DailyMotivation, anchor, Recurrence::Daily, content)
    }

    fn try_schedule_weekly(
        &self,
        favorites: &[FavoriteItem],
    ) -> Result<Option<ScheduledNotification>> {
        self.cancel_tag(ScheduleTag::WeeklyRandom)?;

        let Some(favorite) = favorites.choose(&mut *self.rng.lock()).cloned() else {
            return Ok(None);
        };
        let anchor = next_weekly_anchor(
            &self.clock.now(),
            self.config.weekly_weekday,
            self.config.weekly_time,
        )?;
        let author = favorite.display_author();
        let content = self.content(
            WEEKLY_TITLE,
            quote_body(&favorite.content, &author),
            NotificationData::WeeklyRandom {
                quote: favorite.content,
                author,
            },
        );
        self.register(ScheduleTag::WeeklyRandom, anchor, Recurrence::Weekly, content)
            .map(Some)
    }

    /// Cancel every pending entry carrying `tag`. A failure aborts before anything new is registered.
    fn cancel_tag(&self, tag: ScheduleTag) -> Result<usize> {
        let entries = self.sink.scheduled()?;
        let mut cancelled = 0;
        for entry in entries.iter().filter(|entry| entry.content.tag() == Some(tag)) {
            self.sink.cancel(&entry.identifier)?;
            cancelled += 1;
        }
        if cancelled > 0 {
            debug!(?tag, cancelled, "cancelled previous schedule");
        }
        Ok(cancelled)
    }

    fn register(
        &self,
        tag: ScheduleTag,
        anchor: DateTime<Local>,
        every: Recurrence,
        content: NotificationContent,
    ) -> Result<ScheduledNotification> {
        let trigger = self.recurring_trigger(anchor, every);
        let identifier = self.sink.schedule(content.clone(), trigger)?;
        debug!(?tag, %identifier, "registered recurring notification");
        Ok(ScheduledNotification {
            tag,
            trigger_time: anchor,
            content,
        })
    }

    fn recurring_trigger(&self, anchor: DateTime<Local>, every: Recurrence) -> Trigger {
        match self.config.trigger_style {
            TriggerStyle::Anchored => Trigger::Repeating { anchor, every },
            TriggerStyle::Calendar => Trigger::Calendar {
                weekday: match every {
                    Recurrence::Daily => None,
                    Recurrence::Weekly => Some(anchor.weekday()),
                },
                hour: anchor.hour(),
                minute: anchor.minute(),
            },
        }
    }

    fn content(
        &self,
        title: &str,
        body: impl Into<String>,
        data: NotificationData,
    ) -> NotificationContent {
        NotificationContent {
            sound: self.config.sound,
            badge: self.config.badge,
            ..NotificationContent::new(title, body, data)
        }
    }
}
