use std::sync::Arc;

use super::*;

fn t(id: &str, custom: &[&str]) -> Track {
    Track {
        id: id.into(),
        name: format!("Song {id}"),
        artist: "Artist".into(),
        duration: 180,
        tags: vec!["rock".into()],
        custom_tags: custom.iter().map(|s| s.to_string()).collect(),
        audio_url: Some(format!("https://example.invalid/{id}.mp3")),
        image_url: None,
    }
}

fn ids<'a>(tracks: impl Iterator<Item = &'a Track>) -> Vec<String> {
    tracks.map(|t| t.id.clone()).collect()
}

#[test]
fn new_store_is_seeded_with_one_tag() {
    let store = TrackStore::new("Like");
    assert_eq!(store.all_custom_tags(), ["Like".to_string()]);
    assert_eq!(store.tracks().count(), 0);
    assert_eq!(store.library_len(), 0);
    assert!(store.current_track().is_none());
}

#[test]
fn set_tracks_replaces_working_set_but_accumulates_library() {
    let mut store = TrackStore::default();
    store.set_tracks(vec![t("1", &[]), t("2", &[])]);
    store.set_tracks(vec![t("3", &[])]);

    assert_eq!(ids(store.tracks()), vec!["3"]);
    assert_eq!(ids(store.library_tracks()), vec!["1", "2", "3"]);
}

#[test]
fn get_library_tracks_lists_tracks_outside_the_working_set() {
    let mut store = TrackStore::default();
    store.set_tracks(vec![t("1", &["chill"]), t("2", &[])]);
    store.set_tracks(vec![t("2", &[])]);

    let library = store.get_library_tracks();
    assert_eq!(ids(library.iter().copied()), vec!["1", "2"]);
    assert_eq!(library[0].custom_tags, vec!["chill".to_string()]);
}

#[test]
fn set_tracks_keeps_library_custom_tags_over_incoming() {
    let mut store = TrackStore::default();
    store.set_tracks(vec![t("1", &["chill"])]);
    store.add_track_custom_tag("1", "night");

    let mut refetched = t("1", &["stale"]);
    refetched.name = "Renamed upstream".into();
    store.set_tracks(vec![refetched]);

    let track = store.track("1").unwrap();
    assert_eq!(track.custom_tags, vec!["chill", "night"]);
    assert_eq!(track.name, "Renamed upstream");
    assert!(!store.all_custom_tags().contains(&"stale".to_string()));
}

#[test]
fn set_tracks_registers_new_tags_in_vocabulary() {
    let mut store = TrackStore::default();
    store.set_tracks(vec![t("1", &["chill", "chill", "energy"])]);

    assert_eq!(store.track("1").unwrap().custom_tags, vec!["chill", "energy"]);
    assert_eq!(
        &*store.get_available_tags(),
        ["Like".to_string(), "chill".to_string(), "energy".to_string()]
    );
}

#[test]
fn set_tracks_is_idempotent() {
    let input = vec![t("1", &["a"]), t("2", &["b", "a"])];

    let mut once = TrackStore::default();
    once.set_tracks(input.clone());

    let mut twice = TrackStore::default();
    twice.set_tracks(input.clone());
    twice.set_tracks(input);

    assert_eq!(once.state(), twice.state());
}

#[test]
fn stale_fetch_does_not_overwrite_newer_result() {
    let mut store = TrackStore::default();
    let slow = store.begin_fetch();
    let fast = store.begin_fetch();

    assert!(store.complete_fetch(fast, vec![t("new", &[])]));
    assert!(!store.complete_fetch(slow, vec![t("old", &[])]));

    assert_eq!(ids(store.tracks()), vec!["new"]);
    assert!(store.track("old").is_none());
}

#[test]
fn play_next_and_previous_wrap_within_working_set() {
    let mut store = TrackStore::default();
    store.set_tracks(vec![t("1", &[]), t("2", &[]), t("3", &[])]);
    assert!(store.set_current_track(Some("3")));

    assert!(store.play_next());
    assert_eq!(store.current_track().unwrap().id, "1");

    assert!(store.play_previous());
    assert_eq!(store.current_track().unwrap().id, "3");

    store.set_current_track(Some("2"));
    store.play_previous();
    assert_eq!(store.current_track().unwrap().id, "1");
}

#[test]
fn play_next_is_noop_without_current_or_outside_working_set() {
    let mut store = TrackStore::default();
    assert!(!store.play_next());

    store.set_tracks(vec![t("1", &[]), t("2", &[])]);
    store.set_current_track(Some("1"));
    store.set_tracks(vec![t("3", &[]), t("4", &[])]);

    assert!(!store.play_next());
    assert!(!store.play_previous());
    assert_eq!(store.current_track().unwrap().id, "1");
}

#[test]
fn set_current_track_ignores_unknown_ids() {
    let mut store = TrackStore::default();
    store.set_tracks(vec![t("1", &[])]);
    store.set_current_track(Some("1"));

    assert!(!store.set_current_track(Some("missing")));
    assert_eq!(store.current_track().unwrap().id, "1");

    assert!(store.set_current_track(None));
    assert!(store.current_track().is_none());
}

#[test]
fn tag_edits_are_visible_through_every_view() {
    let mut store = TrackStore::default();
    store.set_tracks(vec![t("1", &[]), t("2", &[])]);
    store.set_current_track(Some("1"));

    assert!(store.add_track_custom_tag("1", "chill"));
    assert!(!store.add_track_custom_tag("1", "chill"));

    let working = store.tracks().find(|t| t.id == "1").unwrap().custom_tags.clone();
    let library = store.library_tracks().find(|t| t.id == "1").unwrap().custom_tags.clone();
    let current = store.current_track().unwrap().custom_tags.clone();
    assert_eq!(working, vec!["chill"]);
    assert_eq!(working, library);
    assert_eq!(working, current);

    assert!(store.remove_track_custom_tag("1", "chill"));
    assert!(store.current_track().unwrap().custom_tags.is_empty());
    assert!(store.all_custom_tags().contains(&"chill".to_string()));
}

#[test]
fn tag_edits_on_unknown_track_are_noops() {
    let mut store = TrackStore::default();
    assert!(!store.add_track_custom_tag("missing", "x"));
    assert!(!store.remove_track_custom_tag("missing", "x"));
    assert!(!store.all_custom_tags().contains(&"x".to_string()));
}

#[test]
fn create_custom_tag_rejects_blank_and_duplicates() {
    let mut store = TrackStore::default();
    assert!(store.create_custom_tag("focus"));
    assert!(!store.create_custom_tag("focus"));
    assert!(!store.create_custom_tag("  "));
    assert!(store.create_custom_tag("Focus"));
}

#[test]
fn delete_custom_tag_purges_tracks_and_vocabulary() {
    let mut store = TrackStore::default();
    store.set_tracks(vec![t("1", &["chill", "x"]), t("2", &["chill"])]);
    store.set_current_track(Some("2"));

    assert!(store.delete_custom_tag("chill"));
    assert_eq!(store.track("1").unwrap().custom_tags, vec!["x"]);
    assert!(store.current_track().unwrap().custom_tags.is_empty());
    assert!(!store.all_custom_tags().contains(&"chill".to_string()));
    assert!(!store.delete_custom_tag("chill"));
}

#[test]
fn rename_custom_tag_preserves_order_everywhere() {
    let mut store = TrackStore::default();
    store.set_tracks(vec![t("1", &["a", "x", "b"])]);
    store.set_current_track(Some("1"));

    assert!(store.rename_custom_tag("x", "y"));
    assert_eq!(store.current_track().unwrap().custom_tags, vec!["a", "y", "b"]);
    assert_eq!(store.all_custom_tags(), ["Like", "a", "y", "b"].map(String::from));
}

#[test]
fn rename_onto_existing_tag_changes_nothing() {
    let mut store = TrackStore::default();
    store.set_tracks(vec![t("1", &["x"]), t("2", &["y"])]);
    let before = store.state();

    assert!(!store.rename_custom_tag("x", "y"));
    assert!(!store.rename_custom_tag("x", "x"));
    assert_eq!(store.state(), before);
}

#[test]
fn available_tags_are_sorted_and_pointer_stable() {
    let mut store = TrackStore::default();
    store.create_custom_tag("zeta");
    store.create_custom_tag("alpha");

    let first = store.get_available_tags();
    assert_eq!(&*first, ["Like", "alpha", "zeta"].map(String::from));

    // Edits that leave the vocabulary alone keep the same allocation.
    store.set_tracks(vec![t("1", &["alpha"])]);
    store.add_track_custom_tag("1", "zeta");
    assert!(Arc::ptr_eq(&first, &store.get_available_tags()));

    store.create_custom_tag("beta");
    assert!(!Arc::ptr_eq(&first, &store.get_available_tags()));
}

#[test]
fn state_round_trip_rebuilds_all_views() {
    let mut store = TrackStore::default();
    store.set_tracks(vec![t("1", &["a"]), t("2", &[])]);
    store.set_tracks(vec![t("2", &[])]);
    store.set_current_track(Some("1"));
    store.delete_custom_tag("Like");

    let json = serde_json::to_string(&store.state()).unwrap();
    let restored = TrackStore::from_state(serde_json::from_str(&json).unwrap(), "Like");

    assert_eq!(ids(restored.tracks()), vec!["2"]);
    assert_eq!(ids(restored.library_tracks()), vec!["1", "2"]);
    assert_eq!(restored.current_track().unwrap().id, "1");
    assert_eq!(restored.all_custom_tags(), ["a".to_string()]);
}

#[test]
fn from_state_prefers_library_tags_over_stale_copies() {
    let state = TrackStoreState {
        tracks: vec![t("1", &["stale"])],
        library_tracks: vec![t("1", &["fresh"])],
        current_track: Some(t("1", &[])),
        all_custom_tags: None,
    };
    let store = TrackStore::from_state(state, "Like");

    assert_eq!(store.current_track().unwrap().custom_tags, vec!["fresh"]);
    assert_eq!(store.tracks().next().unwrap().custom_tags, vec!["fresh"]);
    assert_eq!(store.all_custom_tags(), ["Like", "fresh"].map(String::from));
}

#[test]
fn persisted_shape_uses_camel_case_keys() {
    let mut store = TrackStore::default();
    store.set_tracks(vec![t("1", &["a"])]);
    let value = serde_json::to_value(store.state()).unwrap();

    assert!(value.get("libraryTracks").is_some());
    assert!(value.get("allCustomTags").is_some());
    assert_eq!(value["tracks"][0]["customTags"][0], "a");
    assert!(value["tracks"][0].get("imageUrl").is_none());
}
