use super::*;

use serde_json::json;

fn update(value: serde_json::Value) -> Update {
    serde_json::from_value(value).expect("parse update")
}

fn text_from(id: i64, text: &str) -> Inbound {
    parse_update(&update(json!({
        "update_id": 1,
        "message": {
            "message_id": 9,
            "from": {"id": id, "first_name": "Ann"},
            "text": text
        }
    })))
    .expect("inbound")
}

fn callback(data: &str) -> Inbound {
    parse_update(&update(json!({
        "update_id": 2,
        "callback_query": {
            "id": "cb",
            "from": {"id": 42, "first_name": "Ann"},
            "data": data
        }
    })))
    .expect("inbound")
}

#[test]
fn selection_callbacks_carry_the_index() {
    let inbound = callback("openFile.4");
    assert_eq!(inbound.callback_id.as_deref(), Some("cb"));
    assert_eq!(
        to_command(&inbound, InputWait::None),
        Some(Command::select(CommandKind::OpenFile, 4))
    );
}

#[test]
fn malformed_callbacks_are_dropped() {
    assert_eq!(to_command(&callback("openFile.x"), InputWait::None), None);
    assert_eq!(to_command(&callback("bogus.1"), InputWait::None), None);
    // doSearch is a text-only command
    assert_eq!(to_command(&callback("doSearch.q"), InputWait::None), None);
}

#[test]
fn plain_callbacks_ignore_the_parameter() {
    assert_eq!(
        to_command(&callback("gear."), InputWait::Dir),
        Some(Command::new(CommandKind::Gear))
    );
}

#[test]
fn text_is_routed_by_the_pending_prompt() {
    let inbound = text_from(42, " Work ");
    let cases = [
        (InputWait::None, CommandKind::DoSearch),
        (InputWait::Dir, CommandKind::MkDir),
        (InputWait::Label, CommandKind::MkLabel),
        (InputWait::RenameDir, CommandKind::RenameDir),
        (InputWait::RenameFile, CommandKind::RenameFile),
        (InputWait::LabelEdit, CommandKind::EditLabel),
        (InputWait::FileGrant, CommandKind::DoSearch),
    ];
    for (wait, kind) in cases {
        let cmd = to_command(&inbound, wait).expect("command");
        assert_eq!(cmd.kind, kind, "wait {:?}", wait);
        assert_eq!(cmd.text(), Some("Work"));
    }
}

#[test]
fn slash_commands() {
    let join = to_command(&text_from(42, "/start shared-abc123"), InputWait::None).expect("cmd");
    assert_eq!(join.kind, CommandKind::JoinPublicShare);
    assert_eq!(join.text(), Some("abc123"));

    let start = to_command(&text_from(42, "/start"), InputWait::Dir).expect("cmd");
    assert_eq!(start.kind, CommandKind::ResetToRoot);

    let help = to_command(&text_from(42, "/help"), InputWait::None).expect("cmd");
    assert_eq!(help.kind, CommandKind::ContextHelp);
}

#[test]
fn documents_and_photos_become_uploads() {
    let doc = parse_update(&update(json!({
        "update_id": 3,
        "message": {
            "message_id": 10,
            "from": {"id": 42, "first_name": "Ann"},
            "document": {"file_id": "F1", "file_name": "cv.pdf"}
        }
    })))
    .expect("inbound");
    let cmd = to_command(&doc, InputWait::None).expect("cmd");
    assert_eq!(cmd.kind, CommandKind::UploadFile);
    assert_eq!(
        cmd.file,
        Some(Attachment {
            owner: 42,
            name: "cv.pdf".to_string(),
            file_ref: Some("F1".to_string()),
        })
    );

    let photo = parse_update(&update(json!({
        "update_id": 4,
        "message": {
            "message_id": 11,
            "from": {"id": 42, "first_name": "Ann"},
            "photo": [
                {"file_id": "small", "width": 90, "height": 90},
                {"file_id": "big", "width": 1280, "height": 960}
            ]
        }
    })))
    .expect("inbound");
    let cmd = to_command(&photo, InputWait::None).expect("cmd");
    let file = cmd.file.expect("file");
    assert_eq!(file.file_ref.as_deref(), Some("big"));
    assert_eq!(file.name, "photo_11.jpg");
}

#[test]
fn contacts_only_count_while_a_grant_is_pending() {
    let contact = parse_update(&update(json!({
        "update_id": 5,
        "message": {
            "message_id": 12,
            "from": {"id": 42, "first_name": "Ann"},
            "contact": {"user_id": 77, "first_name": "Bob", "last_name": "Ray"}
        }
    })))
    .expect("inbound");

    assert_eq!(to_command(&contact, InputWait::None), None);

    let cmd = to_command(&contact, InputWait::FileGrant).expect("cmd");
    assert_eq!(cmd.kind, CommandKind::GrantAccess);
    let file = cmd.file.expect("contact");
    assert_eq!(file.owner, 77);
    assert_eq!(file.name, "Bob Ray");
}

#[test]
fn updates_without_a_sender_are_skipped() {
    let anonymous = update(json!({
        "update_id": 6,
        "message": {"message_id": 13, "text": "hi"}
    }));
    assert!(parse_update(&anonymous).is_none());
}

#[test]
fn start_is_matched_as_a_whole_word() {
    let other = to_command(&text_from(42, "/startle"), InputWait::None).expect("cmd");
    assert_eq!(other.kind, CommandKind::ContextHelp);

    let glued = to_command(&text_from(42, "/startshared-abc"), InputWait::None).expect("cmd");
    assert_eq!(glued.kind, CommandKind::ContextHelp);

    let spaced = to_command(&text_from(42, "/start   shared-abc"), InputWait::None).expect("cmd");
    assert_eq!(spaced.kind, CommandKind::JoinPublicShare);
    assert_eq!(spaced.text(), Some("abc"));
}
