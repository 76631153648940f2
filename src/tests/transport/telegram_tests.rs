use super::*;

#[test]
fn callback_update_deserializes() {
    let update: Update = serde_json::from_value(json!({
        "update_id": 10,
        "callback_query": {
            "id": "cb-1",
            "from": {"id": 42, "first_name": "Ann", "language_code": "en"},
            "data": "openDir.3"
        }
    }))
    .expect("parse update");

    let cb = update.callback_query.expect("callback");
    assert_eq!(cb.from.id, 42);
    assert_eq!(cb.data.as_deref(), Some("openDir.3"));
    assert!(update.message.is_none());
}

#[test]
fn unknown_fields_are_ignored() {
    let update: Update = serde_json::from_value(json!({
        "update_id": 11,
        "message": {
            "message_id": 5,
            "date": 1700000000,
            "chat": {"id": 42, "type": "private"},
            "from": {"id": 42, "is_bot": false, "first_name": "Ann"},
            "text": "hello"
        }
    }))
    .expect("parse update");

    let msg = update.message.expect("message");
    assert_eq!(msg.text.as_deref(), Some("hello"));
}

#[test]
fn display_name_prefers_full_name_then_username() {
    let full: TgUser = serde_json::from_value(json!({
        "id": 1, "first_name": "Ann", "last_name": "Lee"
    }))
    .expect("parse user");
    assert_eq!(full.display_name(), "Ann Lee");

    let handle_only: TgUser = serde_json::from_value(json!({
        "id": 2, "first_name": "", "username": "bobby"
    }))
    .expect("parse user");
    assert_eq!(handle_only.display_name(), "bobby");
}

#[test]
fn inline_keyboard_skips_empty_rows() {
    let mut kbd = Keyboard::new();
    kbd.button("Up", "openParent.");
    kbd.new_line();
    kbd.new_line();
    kbd.button("Docs", "openDir.0");

    let markup = inline_keyboard(&kbd);
    let rows = markup["inline_keyboard"].as_array().expect("rows");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0]["callback_data"], "openDir.0");
    assert_eq!(rows[0][0]["text"], "Up");
}

#[test]
fn client_builds_method_urls_without_double_slashes() {
    let client = TelegramClient::new("https://api.example.org/", "T0K").expect("client");
    assert_eq!(
        client.url("sendMessage"),
        "https://api.example.org/botT0K/sendMessage"
    );
}
