use comment_lottery::application::models::comment::{normalize, RawComment};

fn raw(user: Option<&str>, text: &str) -> RawComment {
    RawComment {
        username: user.map(String::from),
        text: text.into(),
        ..Default::default()
    }
}

#[test]
fn test_normalization_is_idempotent_and_ordered() {
    let comments = vec![
        raw(Some("@zoe"), "hi @max and @lea"),
        raw(None, "no author"),
        raw(Some("  "), "blank author"),
        raw(Some("adam"), "plain"),
        raw(Some("Instagram"), "system account"),
        raw(Some("zoe"), "again @Max"),
    ];

    let first = normalize(&comments);
    let second = normalize(&comments);
    assert_eq!(first, second);

    let names: Vec<_> = first.participants.iter().map(|p| p.username.as_str()).collect();
    assert_eq!(names, vec!["zoe", "adam", "zoe"]);
    assert_eq!(first.dropped, 3);
    assert_eq!(first.participants[0].mentioned_accounts, vec!["max", "lea"]);
}

#[test]
fn test_self_mentions_do_not_count() {
    let normalized = normalize(&[raw(Some("amy"), "@amy @Amy @bo.")]);
    assert_eq!(normalized.participants[0].mention_count(), 1);
    assert_eq!(normalized.participants[0].mentioned_accounts, vec!["bo"]);
}
