//! In-process [`NotificationSink`] that keeps pending schedules in memory.
//!
//! Used by the desktop shell, where there is no OS notification center to hand
//! schedules to, and by tests that need to inspect what the policy asked for.

use std::collections::HashSet;

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    notifications::{
        NotificationContent, NotificationSink, PermissionStatus, ScheduleTag, ScheduledEntry,
        Trigger,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    PermissionStatus,
    RequestPermission,
    Scheduled,
    Cancel(String),
    Schedule(String),
    FireNow(String),
}

#[derive(Debug)]
struct MemoryState {
    status: PermissionStatus,
    prompt_answer: PermissionStatus,
    prompts: usize,
    entries: Vec<(ScheduledEntry, Trigger)>,
    next_id: u64,
    fired: Vec<NotificationContent>,
    calls: Vec<SinkCall>,
    failing: HashSet<&'static str>,
}

#[derive(Debug)]
pub struct MemorySink {
    state: Mutex<MemoryState>,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySink {
    /// Permission starts undetermined and the first prompt grants it.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                status: PermissionStatus::Undetermined,
                prompt_answer: PermissionStatus::Granted,
                prompts: 0,
                entries: Vec::new(),
                next_id: 1,
                fired: Vec::new(),
                calls: Vec::new(),
                failing: HashSet::new(),
            }),
        }
    }

    pub fn with_prompt_answer(self, answer: PermissionStatus) -> Self {
        self.state.lock().prompt_answer = answer;
        self
    }

    /// Make every later call to `operation` fail, e.g. `"cancel"` or `"fire_now"`.
    pub fn fail_operation(&self, operation: &'static str) {
        self.state.lock().failing.insert(operation);
    }

    pub fn prompts(&self) -> usize {
        self.state.lock().prompts
    }

    pub fn entries(&self) -> Vec<ScheduledEntry> {
        self.state
            .lock()
            .entries
            .iter()
            .map(|(entry, _)| entry.clone())
            .collect()
    }

    pub fn entries_tagged(&self, tag: ScheduleTag) -> Vec<ScheduledEntry> {
        self.entries()
            .into_iter()
            .filter(|entry| entry.content.tag() == Some(tag))
            .collect()
    }

    pub fn trigger_for(&self, tag: ScheduleTag) -> Option<Trigger> {
        self.state
            .lock()
            .entries
            .iter()
            .find(|(entry, _)| entry.content.tag() == Some(tag))
            .map(|(_, trigger)| trigger.clone())
    }

    pub fn take_fired(&self) -> Vec<NotificationContent> {
        std::mem::take(&mut self.state.lock().fired)
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.state.lock().calls.clone()
    }

    pub fn schedule_calls(&self) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| matches!(call, SinkCall::Schedule(_)))
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    fn check(state: &MemoryState, operation: &'static str) -> Result<()> {
        if state.failing.contains(operation) {
            return Err(Error::platform(operation, "injected failure"));
        }
        Ok(())
    }
}

impl NotificationSink for MemorySink {
    fn permission_status(&self) -> Result<PermissionStatus> {
        let mut state = self.state.lock();
        state.calls.push(SinkCall::PermissionStatus);
        Self::check(&state, "permission_status")?;
        Ok(state.status)
    }

    fn request_permission(&self) -> Result<PermissionStatus> {
        let mut state = self.state.lock();
        state.calls.push(SinkCall::RequestPermission);
        Self::check(&state, "request_permission")?;
        state.prompts += 1;
        state.status = state.prompt_answer;
        debug!(status = ?state.status, "permission prompt answered");
        Ok(state.status)
    }

    fn scheduled(&self) -> Result<Vec<ScheduledEntry>> {
        let mut state = self.state.lock();
        state.calls.push(SinkCall::Scheduled);
        Self::check(&state, "scheduled")?;
        Ok(state.entries.iter().map(|(entry, _)| entry.clone()).collect())
    }

    fn cancel(&self, identifier: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(SinkCall::Cancel(identifier.to_string()));
        Self::check(&state, "cancel")?;
        state.entries.retain(|(entry, _)| entry.identifier != identifier);
        Ok(())
    }

    fn schedule(&self, content: NotificationContent, trigger: Trigger) -> Result<String> {
        let mut state = self.state.lock();
        let identifier = format!("local-{}", state.next_id);
        state.calls.push(SinkCall::Schedule(identifier.clone()));
        Self::check(&state, "schedule")?;
        state.next_id += 1;
        let period_secs = match &trigger {
            Trigger::Repeating { every, .. } => Some(every.period().num_seconds()),
            _ => None,
        };
        debug!(%identifier, title = %content.title, ?trigger, ?period_secs, "stored schedule");
        state.entries.push((
            ScheduledEntry {
                identifier: identifier.clone(),
                content,
            },
            trigger,
        ));
        Ok(identifier)
    }

    fn fire_now(&self, content: NotificationContent) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(SinkCall::FireNow(content.title.clone()));
        Self::check(&state, "fire_now")?;
        info!(title = %content.title, body = %content.body, "notification");
        state.fired.push(content);
        Ok(())
    }
}
