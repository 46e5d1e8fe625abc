pub mod error;
pub mod favorite;
pub mod memory;
pub mod milestone;
pub mod motivation;
pub mod notifications;
pub mod policy;
pub mod schedule;
pub mod service;

pub use crate::error::{Error, Result};
pub use crate::favorite::{FavoriteItem, FavoriteToggle, Favorites};
pub use crate::memory::MemorySink;
pub use crate::notifications::{
    NotificationContent, NotificationData, NotificationSink, PermissionStatus, ScheduleTag,
    ScheduledEntry, ScheduledNotification, Trigger,
};
pub use crate::policy::{NotificationPolicy, PolicyConfig};
pub use crate::schedule::{Clock, FixedClock, Recurrence, SystemClock, TriggerStyle};
pub use crate::service::{QuoteService, QuoteServiceBuilder};
