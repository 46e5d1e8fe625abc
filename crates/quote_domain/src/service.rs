use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    error::{Error, Result},
    favorite::{FavoriteItem, FavoriteToggle, Favorites},
    notifications::{NotificationSink, ScheduledNotification},
    policy::{NotificationPolicy, PolicyConfig},
    schedule::Clock,
};

/// Outcome of opening the quotes screen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenReport {
    pub permission_granted: bool,
    pub daily: Option<ScheduledNotification>,
    pub weekly: Option<ScheduledNotification>,
}

/// Session state behind the quotes screen: the favorites collection and the
/// notification policy it feeds.
pub struct QuoteService {
    favorites: RwLock<Favorites>,
    policy: NotificationPolicy,
}

pub struct QuoteServiceBuilder {
    notification_sink: Option<Box<dyn NotificationSink>>,
    clock: Option<Box<dyn Clock>>,
    rng_seed: Option<u64>,
    config: PolicyConfig,
}

impl QuoteServiceBuilder {
    pub fn new() -> Self {
        Self {
            notification_sink: None,
            clock: None,
            rng_seed: None,
            config: PolicyConfig::default(),
        }
    }

    pub fn with_notification_sink(mut self, sink: Box<dyn NotificationSink>) -> Self {
        self.notification_sink = Some(sink);
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_config(mut self, config: PolicyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<QuoteService> {
        let sink = self.notification_sink.ok_or(Error::MissingSink)?;
        let mut policy = NotificationPolicy::new(sink).with_config(self.config);
        if let Some(clock) = self.clock {
            policy = policy.with_clock(clock);
        }
        if let Some(seed) = self.rng_seed {
            policy = policy.with_rng_seed(seed);
        }
        Ok(QuoteService {
            favorites: RwLock::new(Favorites::new()),
            policy,
        })
    }
}

impl Default for QuoteServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteService {
    pub fn builder() -> QuoteServiceBuilder {
        QuoteServiceBuilder::new()
    }

    pub fn policy(&self) -> &NotificationPolicy {
        &self.policy
    }

    pub fn permission_granted(&self) -> bool {
        self.policy.permission_granted()
    }

    /// Lifecycle hook for the quotes screen: settle permission, then refresh
    /// both recurring schedules.
    #[instrument(skip(self))]
    pub fn open_quotes(&self) -> OpenReport {
        let permission_granted = self.policy.request_permission();
        let daily = self.policy.schedule_daily_motivation();
        let weekly = self.policy.schedule_weekly_random(&self.favorites());
        OpenReport {
            permission_granted,
            daily,
            weekly,
        }
    }

    /// Add or remove a favorite. Adding fires the saved alert and checks the
    /// milestone for the new count; both directions refresh the weekly reminder.
    #[instrument(skip(self, item), fields(id = item.id))]
    pub fn toggle_favorite(&self, item: FavoriteItem) -> FavoriteToggle {
        let (toggle, snapshot) = {
            let mut favorites = self.favorites.write();
            let toggle = favorites.toggle(item.clone());
            (toggle, favorites.as_slice().to_vec())
        };
        info!(?toggle, count = snapshot.len(), "favorites updated");

        if toggle == FavoriteToggle::Added {
            self.policy.notify_favorite_saved(&item);
            self.policy.check_milestone(snapshot.len());
        }
        self.policy.schedule_weekly_random(&snapshot);
        toggle
    }

    pub fn is_favorite(&self, id: u32) -> bool {
        self.favorites.read().contains(id)
    }

    pub fn favorites(&self) -> Vec<FavoriteItem> {
        self.favorites.read().as_slice().to_vec()
    }

    pub fn favorites_count(&self) -> usize {
        self.favorites.read().len()
    }
}
