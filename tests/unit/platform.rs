use comment_lottery::application::models::platform::{validate_url, Platform, PostUrl};
use comment_lottery::error::FetchError;

#[test]
fn test_every_allow_listed_host_is_detected() {
    let cases = [
        ("https://www.threads.net/@a/post/1", Platform::Threads),
        ("https://threads.net/@a/post/1", Platform::Threads),
        ("https://www.threads.com/@a/post/1", Platform::Threads),
        ("http://WWW.THREADS.NET/@a/post/1", Platform::Threads),
        ("https://www.instagram.com/p/abc/", Platform::Instagram),
        ("https://m.instagram.com/reel/abc", Platform::Instagram),
        ("https://Instagram.com/p/abc", Platform::Instagram),
    ];
    for (url, expected) in cases {
        assert_eq!(Platform::detect(url).unwrap(), expected, "{url}");
    }
}

#[test]
fn test_other_hosts_are_unsupported() {
    for url in [
        "https://twitter.com/x/status/1",
        "https://www.facebook.com/post/1",
        "https://example.org/p/1",
    ] {
        assert!(
            matches!(Platform::detect(url), Err(FetchError::UnsupportedPlatform(_))),
            "{url}"
        );
    }
}

#[test]
fn test_malformed_urls_are_invalid() {
    for url in ["", "not a url", "ftp://www.instagram.com/p/1", "instagram.com/p/1"] {
        assert!(matches!(Platform::detect(url), Err(FetchError::InvalidUrl(_))), "{url:?}");
    }
}

#[test]
fn test_post_ids() {
    let post = PostUrl::parse("https://www.instagram.com/reel/Cabc123/?igsh=x").unwrap();
    assert_eq!(post.post_id.as_deref(), Some("Cabc123"));

    let post = PostUrl::parse("https://www.threads.net/@someone/post/DEF456").unwrap();
    assert_eq!(post.platform, Platform::Threads);
    assert_eq!(post.post_id.as_deref(), Some("DEF456"));

    let profile = PostUrl::parse("https://www.instagram.com/someone/").unwrap();
    assert!(profile.post_id.is_none());
}

#[test]
fn test_validation_surface() {
    let ok = validate_url("https://www.threads.com/@a/post/9");
    assert!(ok.valid);
    assert_eq!(ok.platform, Some(Platform::Threads));
    assert_eq!(ok.supported_platforms.len(), 2);

    let bad = validate_url("https://example.com");
    assert!(!bad.valid);
    assert!(bad.error.is_some());
}
