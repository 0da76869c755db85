use std::path::Path;

use lofty::prelude::{Accessor, AudioFile, TaggedFileExt};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::Track;

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Build a track from a file on disk, reading whatever metadata is present.
///
/// The path doubles as the stable track id and as the audio URL.
fn track_from_file(path: &Path) -> Track {
    let mut name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    let mut artist = String::new();
    let mut duration = 0u32;
    let mut tags: Vec<String> = Vec::new();

    if let Ok(tagged) = lofty::read_from_path(path) {
        duration = tagged.properties().duration().as_secs() as u32;

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(v) = tag.title() {
                if !v.trim().is_empty() {
                    name = v.trim().to_string();
                }
            }
            if let Some(v) = tag.artist() {
                artist = v.trim().to_string();
            }
            if let Some(v) = tag.genre() {
                tags.extend(
                    v.split([';', ','])
                        .map(str::trim)
                        .filter(|g| !g.is_empty())
                        .map(str::to_string),
                );
            }
        }
    }

    let id = path.display().to_string();
    Track {
        audio_url: Some(id.clone()),
        id,
        name,
        artist,
        duration,
        tags,
        custom_tags: Vec::new(),
        image_url: None,
    }
}

/// Walk `dir` and return every audio file as a track, sorted by display name.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            tracks.push(track_from_file(path));
        }
    }

    tracks.sort_by_key(|t| t.display().to_lowercase());
    tracks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn is_audio_file_matches_configured_extensions_case_insensitive() {
        let settings = LibrarySettings::default();
        assert!(is_audio_file(Path::new("/tmp/a.mp3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.MP3"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.flac"), &settings));
        assert!(is_audio_file(Path::new("/tmp/a.ogg"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a.txt"), &settings));
        assert!(!is_audio_file(Path::new("/tmp/a"), &settings));
    }

    #[test]
    fn scan_uses_file_stem_when_metadata_is_unreadable() {
        let dir = tempdir().unwrap();

        fs::write(dir.path().join("b.MP3"), b"not a real mp3").unwrap();
        fs::write(dir.path().join("A.ogg"), b"not a real ogg").unwrap();
        fs::write(dir.path().join("c.txt"), b"ignore me").unwrap();

        let tracks = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].name, "A");
        assert_eq!(tracks[1].name, "b");
        assert!(tracks.iter().all(|t| t.custom_tags.is_empty()));
        assert_eq!(tracks[0].audio_url.as_deref(), Some(tracks[0].id.as_str()));
    }

    #[test]
    fn scan_ids_are_stable_across_rescans() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("one.mp3"), b"x").unwrap();

        let first = scan(dir.path(), &LibrarySettings::default());
        let second = scan(dir.path(), &LibrarySettings::default());
        assert_eq!(first[0].id, second[0].id);
    }

    #[test]
    fn scan_respects_include_hidden_false() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".hidden.mp3"), b"not real").unwrap();
        fs::write(dir.path().join("visible.mp3"), b"not real").unwrap();

        let settings = LibrarySettings {
            include_hidden: false,
            ..LibrarySettings::default()
        };
        let tracks = scan(dir.path(), &settings);

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].name, "visible");
    }

    #[test]
    fn scan_respects_recursive_false_and_max_depth() {
        let dir = tempdir().unwrap();
        let d1 = dir.path().join("d1");
        let d2 = d1.join("d2");
        fs::create_dir_all(&d2).unwrap();
        fs::write(dir.path().join("root.mp3"), b"not real").unwrap();
        fs::write(d1.join("one.mp3"), b"not real").unwrap();
        fs::write(d2.join("two.mp3"), b"not real").unwrap();

        let flat = LibrarySettings {
            recursive: false,
            ..LibrarySettings::default()
        };
        let names: Vec<String> = scan(dir.path(), &flat).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["root".to_string()]);

        // WalkDir depth counts root as 0, children as 1, grandchildren as 2.
        let capped = LibrarySettings {
            max_depth: Some(2),
            ..LibrarySettings::default()
        };
        let names: Vec<String> = scan(dir.path(), &capped).into_iter().map(|t| t.name).collect();
        assert!(names.contains(&"root".to_string()));
        assert!(names.contains(&"one".to_string()));
        assert!(!names.contains(&"two".to_string()));
    }
}
