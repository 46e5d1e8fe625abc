use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use quote_domain::{
    memory::SinkCall, FavoriteItem, FavoriteToggle, FixedClock, MemorySink, NotificationData,
    NotificationSink, PermissionStatus, QuoteService, ScheduleTag,
};

fn wall(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .expect("valid date")
        .and_hms_opt(h, min, 0)
        .expect("valid time")
}

fn service_with(sink: &Arc<MemorySink>, clock: &Arc<FixedClock>) -> QuoteService {
    QuoteService::builder()
        .with_notification_sink(Box::new(Arc::clone(sink)))
        .with_clock(Box::new(Arc::clone(clock)))
        .with_rng_seed(11)
        .build()
        .expect("build quote service")
}

fn quote(id: u32) -> FavoriteItem {
    FavoriteItem::new(id, format!("Quote number {id}"), "Mark Twain, type.kindle")
}

#[test]
fn opening_and_saving_favorites_drives_notifications() {
    let sink = Arc::new(MemorySink::new());
    // Wednesday lunchtime.
    let clock = Arc::new(FixedClock::at_local(wall(2025, 10, 22, 12, 30)).expect("clock"));
    let service = service_with(&sink, &clock);

    let report = service.open_quotes();
    assert!(report.permission_granted);
    let daily = report.daily.expect("daily scheduled");
    assert_eq!(daily.trigger_time.naive_local(), wall(2025, 10, 23, 7, 0));
    assert!(report.weekly.is_none(), "no favorites yet");
    assert_eq!(sink.entries_tagged(ScheduleTag::DailyMotivation).len(), 1);
    assert!(sink.entries_tagged(ScheduleTag::WeeklyRandom).is_empty());

    for id in 1..=4 {
        assert_eq!(service.toggle_favorite(quote(id)), FavoriteToggle::Added);
    }
    let fired = sink.take_fired();
    assert_eq!(fired.len(), 4, "one saved alert per favorite");
    assert!(fired
        .iter()
        .all(|alert| matches!(alert.data, NotificationData::FavoriteSaved { .. })));

    service.toggle_favorite(quote(5));
    let fired = sink.take_fired();
    assert_eq!(fired.len(), 2);
    assert_eq!(fired[1].data, NotificationData::Milestone { count: 5 });

    let weekly = sink.entries_tagged(ScheduleTag::WeeklyRandom);
    assert_eq!(weekly.len(), 1);
    assert!(weekly[0].content.body.ends_with("— Mark Twain"));

    // Reopening the next morning replaces rather than stacks.
    clock
        .set_local(wall(2025, 10, 23, 6, 0))
        .expect("advance clock");
    let report = service.open_quotes();
    assert_eq!(
        report.daily.expect("daily").trigger_time.naive_local(),
        wall(2025, 10, 23, 7, 0)
    );
    assert_eq!(
        report.weekly.expect("weekly").trigger_time.naive_local(),
        wall(2025, 10, 27, 9, 0)
    );
    assert_eq!(sink.entries().len(), 2);
    assert_eq!(sink.prompts(), 1);
}

#[test]
fn removing_the_last_favorite_cancels_the_weekly_reminder() {
    let sink = Arc::new(MemorySink::new());
    let clock = Arc::new(FixedClock::at_local(wall(2025, 10, 20, 8, 0)).expect("clock"));
    let service = service_with(&sink, &clock);
    service.open_quotes();

    service.toggle_favorite(quote(9));
    let weekly = sink.entries_tagged(ScheduleTag::WeeklyRandom);
    assert_eq!(weekly.len(), 1);
    sink.clear_calls();

    assert_eq!(service.toggle_favorite(quote(9)), FavoriteToggle::Removed);
    assert!(sink.entries_tagged(ScheduleTag::WeeklyRandom).is_empty());
    assert_eq!(
        sink.calls(),
        vec![
            SinkCall::Scheduled,
            SinkCall::Cancel(weekly[0].identifier.clone()),
        ]
    );
}

#[test]
fn jumping_past_a_milestone_does_not_catch_up() {
    let sink = Arc::new(MemorySink::new());
    let clock = Arc::new(FixedClock::at_local(wall(2025, 10, 20, 8, 0)).expect("clock"));
    let service = service_with(&sink, &clock);
    service.open_quotes();

    for count in [4, 6, 7] {
        assert!(!service.policy().check_milestone(count));
    }
    assert!(sink.take_fired().is_empty());
}

#[test]
fn saving_before_opening_uses_the_platform_grant() {
    // Granted in an earlier session.
    let sink = Arc::new(MemorySink::new());
    sink.request_permission().expect("grant");
    let clock = Arc::new(FixedClock::at_local(wall(2025, 10, 22, 12, 30)).expect("clock"));
    let service = service_with(&sink, &clock);

    for id in 1..=5 {
        service.toggle_favorite(quote(id));
    }
    let fired = sink.take_fired();
    assert_eq!(fired.len(), 6);
    assert_eq!(fired[5].data, NotificationData::Milestone { count: 5 });
    assert_eq!(sink.prompts(), 1);
    assert!(service.permission_granted());
}

#[test]
fn denied_permission_leaves_the_platform_untouched() {
    let sink = Arc::new(MemorySink::new().with_prompt_answer(PermissionStatus::Denied));
    let clock = Arc::new(FixedClock::at_local(wall(2025, 10, 20, 8, 0)).expect("clock"));
    let service = service_with(&sink, &clock);

    let report = service.open_quotes();
    assert!(!report.permission_granted);
    assert!(report.daily.is_none());

    service.toggle_favorite(quote(1));
    assert!(service.is_favorite(1));
    assert!(sink.entries().is_empty());
    assert!(sink.take_fired().is_empty());
}
