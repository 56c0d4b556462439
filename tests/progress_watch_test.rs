mod common;

use std::time::Duration;

use tokio::time::timeout;

use common::Campus;
use tutor_desk::db::topics;
use tutor_desk::events::{ChangeEvent, ChangeKind, Table};
use tutor_desk::session::ProgressWatcher;

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_watcher_follows_completions() {
    let campus = Campus::new().await;
    let slot = campus.slot_in(24).await;

    let watcher = ProgressWatcher::new(campus.pool.clone(), campus.feed.clone(), &campus.student.id);
    let (mut rx, handle) = watcher.spawn();

    timeout(WAIT, rx.wait_for(|r| r.subjects.len() == 1))
        .await
        .expect("initial report never arrived")
        .unwrap();
    assert_eq!(rx.borrow().overall_percentage, 0);

    let booking = campus.booking();
    let appointment = booking
        .reserve(&campus.as_student(), campus.request_for(&slot, &campus.topics[0]))
        .await
        .unwrap();
    booking.complete(&campus.as_tutor(), &appointment.id).await.unwrap();

    let report = timeout(WAIT, rx.wait_for(|r| r.overall_percentage == 25))
        .await
        .expect("progress was not refreshed")
        .unwrap()
        .clone();
    assert_eq!(report.subjects[0].completed_topics, 1);
    assert_eq!(report.subjects[0].total_topics, 4);

    drop(rx);
    timeout(WAIT, handle).await.expect("watcher did not stop").unwrap();
}

#[tokio::test]
async fn test_watcher_refreshes_on_new_topics() {
    let campus = Campus::new().await;
    for topic in &campus.topics[..2] {
        tutor_desk::db::progress::record_progress(
            &campus.pool,
            &campus.student.id,
            topic.id,
            &campus.subject.id,
            chrono::Utc::now(),
        )
        .await
        .unwrap();
    }

    let (mut rx, _handle) =
        ProgressWatcher::new(campus.pool.clone(), campus.feed.clone(), &campus.student.id).spawn();
    timeout(WAIT, rx.wait_for(|r| r.overall_percentage == 50))
        .await
        .expect("initial report never arrived")
        .unwrap();

    let extra = topics::insert_topic(&campus.pool, &campus.subject.id, 4, "Geometría").await.unwrap();
    campus
        .feed
        .publish(ChangeEvent::new(Table::Topics, ChangeKind::Created, extra.id.to_string()));

    // 2 of 5 topics.
    timeout(WAIT, rx.wait_for(|r| r.overall_percentage == 40))
        .await
        .expect("new topic was not picked up")
        .unwrap();
}
