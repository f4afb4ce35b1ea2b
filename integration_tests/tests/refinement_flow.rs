mod common;

use std::time::{Duration, Instant};

use refine_core::{
    AssignOutcome, BinId, Direction, Fill, GridOrigin, MemoryProgressStore, PixelPoint,
    ProgressRecord, ProgressStore, RefinementSession, RelPos, SessionConfig, SessionEvent,
    SurfaceSize, Temper,
};

/// Full operator loop: temper events fire, the pointer highlights a cluster,
/// the cluster is assigned, and the consumed cells regenerate.
#[test]
fn temper_highlight_assign_cycle() {
    let (mut session, start) = common::eager_session(42, 6.0, 6.0);

    // Let a couple of temper events land.
    session.advance(start + Duration::from_secs(11));
    let metrics = session.metrics();
    assert!(metrics.temper_events >= 2);
    assert!(metrics.cells_tempered >= 1);

    // Find a tempered cell and point at its center.
    let tempered = session
        .grid()
        .visible_cells()
        .find(|(_, cell)| cell.is_tempered())
        .map(|(rel, _)| rel)
        .expect("an eager engine tempered something");
    let focal = PixelPoint::new(
        (tempered.col as f32 + 0.5) * common::CELL,
        (tempered.row as f32 + 0.5) * common::CELL,
    );
    session.highlight_around(focal, 120.0, GridOrigin::default());
    assert!(!session.grid().highlighted_sorted().is_empty());

    let now = start + Duration::from_secs(12);
    let outcome = session.assign(BinId(0), now).expect("bin 01 exists");
    let AssignOutcome::Committed(receipt) = outcome else {
        panic!("expected a commit, got {outcome:?}");
    };
    assert!(receipt.tallies.iter().sum::<usize>() >= 1);
    assert!(session.progress() > 0.0);

    // Settlement resets the consumed cells and frees the viewport.
    assert!(!session.move_viewport(Direction::Down));
    session.advance(now + Duration::from_secs(7));
    assert!(session.grid().highlighted_sorted().is_empty());
    assert!(session.move_viewport(Direction::Down));
}

/// Progress written by one session is restored by the next session on the
/// same file id, and untouched by a different file id.
#[test]
fn progress_survives_across_sessions() -> anyhow::Result<()> {
    let start = Instant::now();
    let mut store = MemoryProgressStore::new();

    {
        let mut first = RefinementSession::with_seed(
            "cold-harbor",
            SessionConfig::default(),
            Box::new(MemoryProgressStore::new()),
            start,
            7,
        );
        first.regenerate(SurfaceSize::new(3.0 * common::CELL, 3.0 * common::CELL));
        first.set_temper(RelPos::new(1, 1), Temper::Frolic).unwrap();
        first.highlight_around(
            PixelPoint::new(75.0, 75.0),
            60.0,
            GridOrigin::default(),
        );
        let outcome = first.assign(BinId(2), start)?;
        assert!(matches!(outcome, AssignOutcome::Committed(_)));

        // Capture what the first session would have persisted.
        store.save("cold-harbor", &ProgressRecord::capture(first.bins()))?;
    }

    let second = RefinementSession::with_seed(
        "cold-harbor",
        SessionConfig::default(),
        Box::new(store),
        start,
        8,
    );
    assert_eq!(
        second.bin(BinId(2)).unwrap().metrics.get(Temper::Frolic),
        Fill::from_count_per_cent(1)
    );
    Ok(())
}

/// The persisted record is plain JSON with the original field shape.
#[test]
fn progress_record_serializes_with_temper_codes() -> anyhow::Result<()> {
    let (mut session, start) = common::default_session(3, 3.0, 3.0);
    session.set_temper(RelPos::new(0, 0), Temper::Dread).unwrap();
    session.highlight_around(PixelPoint::new(25.0, 25.0), 30.0, GridOrigin::default());
    session.assign(BinId(0), start)?;

    let record = ProgressRecord::capture(session.bins());
    let json = serde_json::to_value(&record)?;
    let dr = json["bins"]["01"]["dr"].as_f64().expect("dr field present");
    assert!((dr - 0.01).abs() < 1e-6);
    assert_eq!(json["bins"]["05"]["wo"].as_f64(), Some(0.0));
    Ok(())
}

/// Rejections are surfaced through the hub, never as errors, and leave no
/// partial state behind.
#[test]
fn rejection_pathways_leave_state_untouched() -> anyhow::Result<()> {
    let (mut session, start) = common::default_session(9, 4.0, 4.0);

    let mut denied = 0u32;
    // Subscription proves delivery; the count lives in the subscriber until
    // unsubscribed, so use a channel-free static-friendly pattern.
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = std::rc::Rc::clone(&seen);
    let id = session.events().subscribe(move |event| {
        if let SessionEvent::TransferRejected { reason, .. } = event {
            sink.borrow_mut().push(*reason);
        }
    });

    // Nothing highlighted.
    if let AssignOutcome::Rejected(_) = session.assign(BinId(0), start)? {
        denied += 1;
    }
    // Highlighted but untempered.
    session.highlight_around(PixelPoint::new(100.0, 100.0), 120.0, GridOrigin::default());
    if let AssignOutcome::Rejected(_) = session.assign(BinId(0), start)? {
        denied += 1;
    }

    assert_eq!(denied, 2);
    assert_eq!(seen.borrow().len(), 2);
    assert_eq!(session.progress(), 0.0);
    assert_eq!(session.metrics().transfers_committed, 0);

    assert!(session.events().unsubscribe(id));
    session.assign(BinId(0), start)?;
    assert_eq!(seen.borrow().len(), 2, "unsubscribed observer still notified");
    Ok(())
}
