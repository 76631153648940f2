use super::*;

fn session() -> Session {
    Session::new(7, EntryId("root".to_string()), "en")
}

#[test]
fn new_session_rests_on_root() {
    let s = session();
    assert_eq!(s.subject_id, s.root_id);
    assert_eq!(s.mode, Mode::Browsing);
    assert_eq!(s.input_wait, InputWait::None);
    assert_eq!(s.view_offset, 0);
    assert!(s.is_on_top());
}

#[test]
fn rewind_saturates_at_zero() {
    let mut s = session();
    s.view_offset = 4;
    s.rewind(10);
    assert_eq!(s.view_offset, 0);
    s.rewind(10);
    assert_eq!(s.view_offset, 0);
}

#[test]
fn forward_advances_only_while_items_remain() {
    let mut s = session();
    s.forward(10, 15);
    assert_eq!(s.view_offset, 10);
    s.forward(10, 15);
    assert_eq!(s.view_offset, 10);

    let mut exact = session();
    exact.forward(10, 10);
    assert_eq!(exact.view_offset, 0);
}

#[test]
fn reset_state_is_idempotent_and_keeps_position() {
    let mut s = session();
    s.navigate(&EntryId("docs".to_string()));
    s.set_sharing();
    s.view_offset = 10;

    s.reset_state();
    let once = s.clone();
    s.reset_state();

    assert_eq!(s, once);
    assert_eq!(s.mode, Mode::Browsing);
    assert_eq!(s.subject_id.as_str(), "docs");
    assert_eq!(s.view_offset, 10);
}

#[test]
fn modes_are_mutually_exclusive() {
    let mut s = session();
    s.enter_search("q", &EntryId("root".to_string()));
    assert!(s.is_searching());
    s.set_gearing();
    assert!(s.is_gearing());
    assert!(!s.is_searching());
    s.set_sharing();
    assert!(s.is_sharing());
    assert!(!s.is_gearing());
}

#[test]
fn entering_search_resets_offset_and_remembers_directory() {
    let mut s = session();
    s.view_offset = 20;
    s.enter_search("report", &EntryId("docs".to_string()));
    assert_eq!(s.view_offset, 0);
    assert_eq!(s.query, "report");
    assert_eq!(s.search_dir_id, Some(EntryId("docs".to_string())));
}

#[test]
fn session_json_tolerates_missing_optional_fields() {
    let s: Session = serde_json::from_str(
        r#"{"user_id": 3, "root_id": "r", "subject_id": "r", "lang": "en"}"#,
    )
    .expect("parse session");
    assert_eq!(s.mode, Mode::Browsing);
    assert_eq!(s.input_wait, InputWait::None);
    assert!(s.search_dir_id.is_none());
}
