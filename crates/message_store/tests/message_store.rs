use message_store::{Message, MessageStore, MessageStoreError, Role};
use serde_json::json;

fn store_with(messages: &[(Role, &str)]) -> MessageStore {
    let mut store = MessageStore::new();
    for (role, content) in messages {
        store
            .append(*role, *content)
            .expect("fixture message should append");
    }
    store
}

#[test]
fn append_same_pair_twice_keeps_single_entry() {
    let mut store = MessageStore::new();

    for role in [Role::User, Role::System, Role::Assistant] {
        assert!(store.append(role, "same").expect("first append"));
        assert!(!store.append(role, "same").expect("duplicate append is a no-op"));
    }

    assert_eq!(store.len(), 3);
}

#[test]
fn same_content_under_different_roles_is_distinct() {
    let store = store_with(&[(Role::User, "hi"), (Role::Assistant, "hi")]);

    assert_eq!(
        store.list(),
        &[
            Message::new(Role::User, "hi"),
            Message::new(Role::Assistant, "hi"),
        ]
    );
}

#[test]
fn append_rejects_empty_content() {
    let mut store = MessageStore::new();

    let error = store
        .append(Role::User, "")
        .expect_err("empty content should be rejected");

    assert!(matches!(error, MessageStoreError::EmptyContent));
    assert!(store.is_empty());
}

#[test]
fn append_raw_parses_roles_case_insensitively() {
    let mut store = MessageStore::new();

    store.append_raw("System", "Be terse").expect("system role");
    store.append_raw("ASSISTANT", "Sure").expect("assistant role");
    store.append_raw(" user ", "Go").expect("user role");

    let roles: Vec<Role> = store.iter().map(|message| message.role).collect();
    assert_eq!(roles, vec![Role::System, Role::Assistant, Role::User]);
}

#[test]
fn append_raw_rejects_unknown_role() {
    let mut store = MessageStore::new();

    let error = store
        .append_raw("narrator", "Once upon a time")
        .expect_err("unknown role should be rejected");

    assert!(matches!(error, MessageStoreError::InvalidRole(ref role) if role == "narrator"));
    assert_eq!(
        error.to_string(),
        "invalid role 'narrator'; expected one of user, system, assistant"
    );
    assert!(store.is_empty());
}

#[test]
fn replace_moves_rewritten_message_to_tail() {
    let mut store = store_with(&[
        (Role::User, "first c:echo"),
        (Role::Assistant, "reply"),
        (Role::User, "second"),
    ]);

    let old = Message::user("first c:echo");
    assert!(store.replace(&old, old.with_content("first")));

    assert_eq!(
        store.list(),
        &[
            Message::new(Role::Assistant, "reply"),
            Message::user("second"),
            Message::user("first"),
        ]
    );
}

#[test]
fn replace_with_empty_content_removes_message() {
    let mut store = store_with(&[(Role::User, "c:print"), (Role::User, "keep")]);

    assert!(!store.replace(&Message::user("c:print"), Message::user("")));
    assert_eq!(store.list(), &[Message::user("keep")]);
}

#[test]
fn reset_empties_store() {
    let mut store = store_with(&[(Role::User, "a"), (Role::System, "b")]);

    store.reset();

    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert!(store.append(Role::User, "a").expect("append after reset"));
}

#[test]
fn records_are_one_json_object_per_message_in_order() {
    let store = store_with(&[
        (Role::User, "Hello \"world\""),
        (Role::System, "line one\nline two"),
    ]);

    let records = store.records().expect("records should serialize");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0], r#"{"role":"user","content":"Hello \"world\""}"#);
    let second: serde_json::Value = serde_json::from_str(&records[1]).expect("valid json");
    assert_eq!(
        second,
        json!({"role": "system", "content": "line one\nline two"})
    );
    assert!(!records[1].contains('\n'));
}

#[test]
fn message_records_round_trip_through_serde() {
    let message: Message =
        serde_json::from_str(r#"{"role":"assistant","content":"ok"}"#).expect("parse record");
    assert_eq!(message, Message::new(Role::Assistant, "ok"));

    let unknown = serde_json::from_str::<Message>(r#"{"role":"assistant","content":"ok","x":1}"#);
    assert!(unknown.is_err());
}
