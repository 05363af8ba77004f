//! Integration tests for the load coordinator lifecycle.
//!
//! Exercises: start, out-of-order completions, refresh while loading,
//! comment-only refresh, failure handling, and deep-link reconciliation.
//! Fetch tasks are fakes that record starts and cancels; completions are
//! delivered by hand, in whatever order the test wants.

use commitview_core::{
    CommentRecord, CommitRecord, DeepLinkTarget, FetchError, FetchTask, Generation,
    LoadCoordinator, Panel, PanelView, ResourceKey, SessionParams, SlotStatus, ViewHost, PANELS,
};

#[derive(Default)]
struct FakeFetch {
    started: Vec<Generation>,
    cancelled: Vec<Generation>,
}

impl<T> FetchTask<T> for FakeFetch {
    type Handle = Generation;

    fn start(&mut self, _key: &ResourceKey, generation: Generation) -> Generation {
        self.started.push(generation);
        generation
    }

    fn cancel(&mut self, handle: Generation) {
        self.cancelled.push(handle);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Signal {
    Ready(bool),
    Panels(Option<Vec<Panel>>),
    Select(Panel, u64),
}

#[derive(Default)]
struct RecordingHost {
    signals: Vec<Signal>,
}

impl RecordingHost {
    fn selections(&self) -> usize {
        self.signals.iter().filter(|s| matches!(s, Signal::Select(..))).count()
    }

    fn last_ready(&self) -> Option<bool> {
        self.signals.iter().rev().find_map(|s| match s {
            Signal::Ready(ready) => Some(*ready),
            _ => None,
        })
    }
}

impl ViewHost for RecordingHost {
    fn set_content_ready(&mut self, ready: bool) {
        self.signals.push(Signal::Ready(ready));
    }

    fn set_available_panels(&mut self, panels: Option<&[Panel]>) {
        self.signals.push(Signal::Panels(panels.map(<[Panel]>::to_vec)));
    }

    fn select_panel(&mut self, panel: Panel, focus: u64) {
        self.signals.push(Signal::Select(panel, focus));
    }
}

type Coordinator = LoadCoordinator<FakeFetch, FakeFetch, RecordingHost>;

fn coordinator() -> Coordinator {
    LoadCoordinator::new(FakeFetch::default(), FakeFetch::default(), RecordingHost::default())
}

fn key() -> ResourceKey {
    ResourceKey::new("octocat", "hello-world", "6dcb09b5b57875f334f61aebed695e2e4193db5e")
}

fn commit() -> CommitRecord {
    CommitRecord {
        sha: "6dcb09b5b57875f334f61aebed695e2e4193db5e".into(),
        message: "Fix all the bugs\n\nLonger body".into(),
        author_name: "Monalisa Octocat".into(),
        author_login: Some("octocat".into()),
        committed_at: Some("2011-04-14T16:00:49Z".into()),
        files: Vec::new(),
        additions: 0,
        deletions: 0,
    }
}

fn comment(id: u64, position: i64) -> CommentRecord {
    CommentRecord {
        id,
        position,
        author: "octocat".into(),
        body: format!("comment {id}"),
        path: (position >= 0).then(|| "file1.txt".to_string()),
        line: (position >= 0).then_some(14),
        created_at: "2011-04-14T16:00:49Z".into(),
    }
}

fn commit_gen(c: &Coordinator) -> Generation {
    c.commit_slot().generation()
}

fn comments_gen(c: &Coordinator) -> Generation {
    c.comments_slot().generation()
}

#[test]
fn start_hides_content_and_loads_both_sources() {
    let mut c = coordinator();
    c.start(key(), DeepLinkTarget::None);

    assert_eq!(
        c.host().signals,
        vec![Signal::Ready(false), Signal::Panels(None)],
        "content must be hidden before loads are issued"
    );
    assert_eq!(c.commit_slot().status(), SlotStatus::Loading);
    assert_eq!(c.comments_slot().status(), SlotStatus::Loading);
    assert_eq!(c.commit_slot().task().started, vec![1]);
    assert_eq!(c.comments_slot().task().started, vec![1]);
    assert_eq!(c.title().as_deref(), Some("Commit 6dcb09b"));
    assert_eq!(c.subtitle().as_deref(), Some("octocat/hello-world"));
}

#[test]
fn ready_only_when_both_slots_ready_in_any_completion_order() {
    let mut c = coordinator();
    c.start(key(), DeepLinkTarget::None);

    assert!(c.on_comments_complete(1, Ok(vec![comment(1, -1)])));
    assert!(!c.is_content_ready());
    assert_eq!(c.host().last_ready(), Some(false));
    assert!(c.panel(0).is_none(), "no panel content before readiness");

    assert!(c.on_commit_complete(1, Ok(commit())));
    assert!(c.is_content_ready());
    assert_eq!(c.host().last_ready(), Some(true));
    assert_eq!(
        c.host().signals.last(),
        Some(&Signal::Panels(Some(PANELS.to_vec())))
    );
    assert_eq!(c.host().selections(), 0);
}

#[test]
fn failed_slot_keeps_content_not_ready_until_reload_succeeds() {
    let mut c = coordinator();
    c.start(key(), DeepLinkTarget::None);

    c.on_commit_complete(1, Ok(commit()));
    c.on_comments_complete(1, Err(FetchError::Http { status: 502, message: "bad gateway".into() }));
    assert!(!c.recompute_readiness());
    assert_eq!(c.comments_slot().status(), SlotStatus::Failed);
    assert!(!c.host().signals.contains(&Signal::Ready(true)));

    c.refresh_comments();
    assert_eq!(comments_gen(&c), 2);
    c.on_comments_complete(2, Ok(Vec::new()));
    assert!(c.is_content_ready());
    assert_eq!(c.host().last_ready(), Some(true));
}

#[test]
fn settled_error_waits_for_the_other_slot() {
    let mut c = coordinator();
    c.start(key(), DeepLinkTarget::None);
    assert_eq!(c.settled_error(), None);

    c.on_commit_complete(1, Err(FetchError::NotFound));
    assert_eq!(c.settled_error(), None, "comments are still loading");

    c.on_comments_complete(1, Ok(vec![comment(5, -1)]));
    assert_eq!(c.settled_error(), Some(&FetchError::NotFound));

    c.refresh();
    assert_eq!(c.settled_error(), None);
    c.on_commit_complete(2, Ok(commit()));
    c.on_comments_complete(2, Ok(Vec::new()));
    assert_eq!(c.settled_error(), None);
    assert!(c.is_content_ready());
}

#[test]
fn refresh_while_loading_discards_the_superseded_result() {
    let mut c = coordinator();
    c.start(key(), DeepLinkTarget::None);
    c.on_comments_complete(1, Ok(vec![comment(1, -1)]));

    c.refresh();
    assert_eq!(commit_gen(&c), 2);
    assert_eq!(comments_gen(&c), 2);
    assert_eq!(c.commit_slot().task().cancelled, vec![1], "outstanding commit fetch is cancelled");
    assert!(c.comments_slot().task().cancelled.is_empty(), "settled fetch has nothing to cancel");

    // The generation-1 commit fetch completes late anyway.
    assert!(!c.on_commit_complete(1, Ok(commit())));
    assert_eq!(c.commit_slot().status(), SlotStatus::Loading);
    assert!(!c.is_content_ready());
    assert_eq!(c.host().last_ready(), Some(false));

    c.on_commit_complete(2, Ok(commit()));
    c.on_comments_complete(2, Ok(Vec::new()));
    assert!(c.is_content_ready());
}

#[test]
fn refresh_always_reports_not_ready_and_unknown_panels() {
    let mut c = coordinator();
    c.start(key(), DeepLinkTarget::None);
    c.on_commit_complete(1, Ok(commit()));
    c.on_comments_complete(1, Ok(Vec::new()));
    let before = c.host().signals.len();

    c.refresh();
    assert_eq!(
        c.host().signals[before..],
        [Signal::Ready(false), Signal::Panels(None)]
    );
    assert!(c.panel(1).is_none());
}

#[test]
fn refresh_comments_leaves_commit_slot_untouched() {
    let mut c = coordinator();
    c.start(key(), DeepLinkTarget::None);
    c.on_commit_complete(1, Ok(commit()));
    c.on_comments_complete(1, Ok(vec![comment(1, -1)]));

    c.refresh_comments();
    assert_eq!(commit_gen(&c), 1);
    assert_eq!(c.commit_slot().value(), Some(&commit()));
    assert_eq!(comments_gen(&c), 2);
    assert_eq!(c.comments_slot().status(), SlotStatus::Loading);
    assert!(!c.is_content_ready());
    assert_eq!(c.commit_slot().task().started, vec![1]);
}

#[test]
fn timeline_deep_link_selects_comments_panel_exactly_once() {
    let mut c = coordinator();
    c.start(key(), DeepLinkTarget::Pending(5));

    c.on_comments_complete(1, Ok(vec![comment(5, -1)]));
    assert_eq!(c.deep_link(), DeepLinkTarget::Pending(5), "kept until content is ready");
    assert_eq!(c.host().selections(), 0);

    c.on_commit_complete(1, Ok(commit()));
    assert!(c.host().signals.contains(&Signal::Select(Panel::Comments, 5)));
    assert_eq!(c.host().selections(), 1);
    assert_eq!(c.deep_link(), DeepLinkTarget::None);

    c.refresh_comments();
    c.on_comments_complete(2, Ok(vec![comment(5, -1)]));
    assert!(c.is_content_ready());
    assert_eq!(c.host().selections(), 1, "a consumed deep link never fires again");
}

#[test]
fn line_anchored_deep_link_is_cleared_without_selection() {
    let mut c = coordinator();
    c.start(key(), DeepLinkTarget::Pending(5));

    c.on_comments_complete(1, Ok(vec![comment(5, 3)]));
    assert_eq!(c.deep_link(), DeepLinkTarget::None);

    c.on_commit_complete(1, Ok(commit()));
    assert!(c.is_content_ready());
    assert_eq!(c.host().selections(), 0);
}

#[test]
fn missing_deep_link_target_never_comes_back() {
    let mut c = coordinator();
    c.start_session(&SessionParams::new("octocat", "hello-world", "abc1234").with_initial_comment(9));
    assert_eq!(c.deep_link(), DeepLinkTarget::Pending(9));

    c.on_comments_complete(1, Ok(vec![comment(1, -1), comment(2, 4)]));
    assert_eq!(c.deep_link(), DeepLinkTarget::None);

    // The comment shows up on a later load; the target stays cleared.
    c.refresh_comments();
    c.on_comments_complete(2, Ok(vec![comment(1, -1), comment(9, -1)]));
    c.on_commit_complete(1, Ok(commit()));
    assert!(c.is_content_ready());
    assert_eq!(c.deep_link(), DeepLinkTarget::None);
    assert_eq!(c.host().selections(), 0);
}

#[test]
fn deep_link_matches_first_comment_with_the_id() {
    let mut c = coordinator();
    c.start(key(), DeepLinkTarget::Pending(7));

    // Server order is preserved; the first match decides.
    c.on_comments_complete(1, Ok(vec![comment(7, 2), comment(7, -1)]));
    assert_eq!(c.deep_link(), DeepLinkTarget::None);
}

#[test]
fn failed_comment_load_does_not_consume_deep_link() {
    let mut c = coordinator();
    c.start(key(), DeepLinkTarget::Pending(5));

    c.on_comments_complete(1, Err(FetchError::Transport("connection reset".into())));
    assert_eq!(c.deep_link(), DeepLinkTarget::Pending(5));

    c.refresh_comments();
    c.on_comments_complete(2, Ok(vec![comment(5, -1)]));
    c.on_commit_complete(1, Ok(commit()));
    assert_eq!(c.host().selections(), 1);
}

#[test]
fn panel_views_expose_both_records_once_ready() {
    let mut c = coordinator();
    c.start(key(), DeepLinkTarget::None);
    c.on_commit_complete(1, Ok(commit()));
    c.on_comments_complete(1, Ok(vec![comment(1, -1), comment(2, 0)]));

    match c.panel(Panel::Comments.index()) {
        Some(PanelView::Comments { commit, comments }) => {
            assert_eq!(commit.summary(), "Fix all the bugs");
            assert_eq!(comments.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2]);
        }
        other => panic!("expected comments panel, got {other:?}"),
    }
    assert_eq!(c.panel(0).map(|view| view.panel()), Some(Panel::Commit));
    assert!(c.panel(2).is_none());
}

#[test]
fn duplicate_and_pre_start_calls_are_harmless() {
    let mut c = coordinator();
    c.refresh();
    c.refresh_comments();
    assert!(c.host().signals.is_empty());
    assert!(!c.on_commit_complete(1, Ok(commit())), "nothing is loading yet");

    c.start(key(), DeepLinkTarget::None);
    assert!(c.on_commit_complete(1, Ok(commit())));
    assert!(!c.on_commit_complete(1, Ok(commit())));
    assert_eq!(commit_gen(&c), 1);
}
