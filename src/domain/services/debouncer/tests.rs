use super::*;
use crate::domain::entities::ChangeKind;
use proptest::prelude::*;
use std::collections::HashSet;

const WINDOW: Duration = Duration::from_millis(300);

fn modified(path: &str, at: Instant) -> ChangeEvent {
    ChangeEvent::at(path, ChangeKind::Modified, at)
}

#[test]
fn nothing_pending_never_fires() {
    let mut debouncer = Debouncer::new(WINDOW);
    assert!(debouncer.poll(Instant::now() + WINDOW * 2).is_none());
    assert!(debouncer.time_until_ready(Instant::now()).is_none());
}

#[test]
fn does_not_fire_inside_quiet_window() {
    let t0 = Instant::now();
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.submit(modified("main.c", t0));

    assert!(debouncer.poll(t0 + Duration::from_millis(299)).is_none());
    assert!(debouncer.has_pending());
}

#[test]
fn fires_once_after_quiet_window() {
    let t0 = Instant::now();
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.submit(modified("main.c", t0));

    let request = debouncer.poll(t0 + WINDOW).unwrap();
    assert_eq!(request.into_paths(), vec![PathBuf::from("main.c")]);

    // Drained: no second signal for the same burst
    assert!(debouncer.poll(t0 + WINDOW * 3).is_none());
}

#[test]
fn new_event_restarts_the_quiet_timer() {
    let t0 = Instant::now();
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.submit(modified("a.c", t0));
    debouncer.submit(modified("b.c", t0 + Duration::from_millis(250)));

    // 300ms after the first event, but only 50ms after the second
    assert!(debouncer.poll(t0 + Duration::from_millis(300)).is_none());
    assert_eq!(
        debouncer.time_until_ready(t0 + Duration::from_millis(300)),
        Some(Duration::from_millis(250))
    );

    let request = debouncer.poll(t0 + Duration::from_millis(550)).unwrap();
    assert_eq!(request.len(), 2);
}

#[test]
fn duplicate_paths_are_coalesced() {
    let t0 = Instant::now();
    let mut debouncer = Debouncer::new(WINDOW);
    for i in 0..5 {
        debouncer.submit(modified("main.c", t0 + Duration::from_millis(i)));
    }

    let request = debouncer.poll(t0 + WINDOW * 2).unwrap();
    assert_eq!(request.len(), 1);
    assert_eq!(request.event_count(), 5);
}

#[test]
fn late_arriving_old_event_does_not_move_timer_backwards() {
    let t0 = Instant::now();
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.submit(modified("a.c", t0 + Duration::from_millis(200)));
    debouncer.submit(modified("b.c", t0));

    assert!(debouncer.poll(t0 + Duration::from_millis(400)).is_none());
    assert!(debouncer.poll(t0 + Duration::from_millis(500)).is_some());
}

#[test]
fn events_buffered_during_a_build_fire_immediately() {
    // Events happened while a build ran; by the time they are submitted
    // their quiet window has already passed.
    let t0 = Instant::now();
    let mut debouncer = Debouncer::new(WINDOW);
    debouncer.submit(modified("during_build.c", t0));

    let after_build = t0 + Duration::from_secs(5);
    assert_eq!(debouncer.time_until_ready(after_build), Some(Duration::ZERO));
    assert!(debouncer.poll(after_build).is_some());
}

#[test]
fn ignored_paths_are_discarded_at_submission() {
    let dir = tempfile::tempdir().unwrap();
    let policy = IgnorePolicy::for_project(dir.path(), &[], None).unwrap();
    let mut debouncer = Debouncer::new(WINDOW).with_ignore(policy);
    let t0 = Instant::now();

    assert!(!debouncer.submit(modified("build/app.elf", t0)));
    assert!(!debouncer.submit(modified("main.o", t0)));
    assert!(!debouncer.has_pending());
    assert_eq!(debouncer.ignored_count(), 2);

    assert!(debouncer.submit(modified("main.c", t0)));
    assert!(debouncer.has_pending());
}

#[test]
fn merge_unions_paths() {
    let mut first = BuildRequest::new(["a.c", "b.c"]);
    first.merge(BuildRequest::new(["b.c", "c.c"]));

    let paths: Vec<_> = first.path_strings();
    assert_eq!(paths, vec!["a.c", "b.c", "c.c"]);
    assert_eq!(first.event_count(), 4);
}

#[test]
fn initial_request_is_empty() {
    assert!(BuildRequest::initial().is_empty());
}

proptest! {
    /// Any burst whose gaps are all shorter than the quiet window fires
    /// exactly once, carrying the union of the touched paths.
    #[test]
    fn burst_fires_exactly_once_with_union(
        events in prop::collection::vec(("[a-e]\\.c", 0u64..299), 1..40)
    ) {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(WINDOW);
        let mut at = t0;
        let mut expected = HashSet::new();
        let mut fired = 0;

        for (path, gap) in &events {
            at += Duration::from_millis(*gap);
            // Polling mid-burst must never fire
            if debouncer.poll(at).is_some() {
                fired += 1;
            }
            debouncer.submit(modified(path, at));
            expected.insert(PathBuf::from(path));
        }

        let request = debouncer.poll(at + WINDOW);
        prop_assert_eq!(fired, 0);
        let request = request.expect("burst must fire after quiet window");
        let got: HashSet<PathBuf> = request.into_paths().into_iter().collect();
        prop_assert_eq!(got, expected);
        prop_assert!(debouncer.poll(at + WINDOW * 10).is_none());
    }
}
