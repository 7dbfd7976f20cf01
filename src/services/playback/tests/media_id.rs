use crate::services::playback::types::MediaId;

#[test]
fn extracts_from_watch_urls() {
    let id = MediaId::from_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    assert_eq!(id.as_str(), "dQw4w9WgXcQ");
}

#[test]
fn extracts_from_short_urls() {
    let id = MediaId::from_url("https://youtu.be/dQw4w9WgXcQ");
    assert_eq!(id.as_str(), "dQw4w9WgXcQ");
}

#[test]
fn extracts_from_embed_urls() {
    let id = MediaId::from_url("https://www.youtube.com/embed/dQw4w9WgXcQ");
    assert_eq!(id.as_str(), "dQw4w9WgXcQ");
}

#[test]
fn extracts_from_secondary_query_parameters() {
    let id = MediaId::from_url("https://www.youtube.com/playlist?list=PL123&v=dQw4w9WgXcQ");
    assert_eq!(id.as_str(), "dQw4w9WgXcQ");
}

#[test]
fn stops_at_query_and_fragment_delimiters() {
    let id = MediaId::from_url("https://youtu.be/dQw4w9WgXcQ?t=42");
    assert_eq!(id.as_str(), "dQw4w9WgXcQ");

    let id = MediaId::from_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=PL123");
    assert_eq!(id.as_str(), "dQw4w9WgXcQ");

    let id = MediaId::from_url("https://www.youtube.com/embed/dQw4w9WgXcQ#start");
    assert_eq!(id.as_str(), "dQw4w9WgXcQ");
}

#[test]
fn unrecognized_urls_yield_the_empty_identifier() {
    assert!(MediaId::from_url("https://example.com/nothing-here").is_empty());
    assert!(MediaId::from_url("").is_empty());
}

#[test]
fn empty_watch_url_yields_the_empty_identifier() {
    // What embeds report after an unload.
    assert!(MediaId::from_url("https://www.youtube.com/watch?v=").is_empty());
}
