//! Command-line parsing and dispatch.

use std::io::{self, Write};

use crate::app::App;
use crate::catalog::Catalog;
use crate::filter::TagOperation;
use crate::library::Track;
use crate::session::{ThemeMode, TrackEnd};

pub const USAGE: &str = "\
usage: tagtune <music-dir> <command> [args]

commands:
  popular                      load the most popular tracks
  search <query>               search the music folder
  list                         show the current tracks (filtered)
  tags                         show the tag vocabulary (* marks pinned tags)
  pin <tag> | unpin <tag>      pin or unpin a tag
  tag <track-id> <tag>         attach a tag to a track
  untag <track-id> <tag>       detach a tag from a track
  create-tag <tag>             add a tag to the vocabulary
  rename-tag <old> <new>       rename a tag everywhere
  delete-tag <tag>             delete a tag everywhere
  filter <any|all> <tag>...    filter by tags
  blocks <a,b> <c> ...         filter by tag blocks (AND inside, OR across)
  save <name> <a,b> <c> ...    save tag blocks as a frozen playlist
  playlists                    list playlists
  open <playlist-id>           load a playlist
  rename-playlist <id> <name>  rename a playlist
  delete-playlist <id>         delete a playlist
  play <track-id>              play a track
  next | prev                  move through the current tracks
  ended                        finish the current track (loop or advance)
  seek <seconds>               set the playback position
  volume <0..1>                set the volume
  mute | loop                  toggle mute or looping
  history                      show recently played tracks
  clear-history                forget recently played tracks
  theme                        toggle light/dark theme
  config                       print the effective settings";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Popular,
    Search(String),
    List,
    Tags,
    Pin(String),
    Unpin(String),
    Tag { track_id: String, tag: String },
    Untag { track_id: String, tag: String },
    CreateTag(String),
    RenameTag { old: String, new: String },
    DeleteTag(String),
    Filter { operation: TagOperation, tags: Vec<String> },
    Blocks(Vec<Vec<String>>),
    Save { name: String, blocks: Vec<Vec<String>> },
    Playlists,
    Open(String),
    RenamePlaylist { id: String, name: String },
    DeletePlaylist(String),
    Play(String),
    Next,
    Prev,
    Ended,
    Seek(f64),
    Volume(f32),
    Mute,
    Loop,
    History,
    ClearHistory,
    Theme,
    Config,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub music_dir: String,
    pub command: Command,
}

/// `"a,b"` becomes the block `["a", "b"]`.
fn parse_block(arg: &str) -> Vec<String> {
    arg.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn one(rest: &[String], what: &str) -> Result<String, String> {
    match rest {
        [value] => Ok(value.clone()),
        _ => Err(format!("expected exactly one {what}")),
    }
}

fn two(rest: &[String], first: &str, second: &str) -> Result<(String, String), String> {
    match rest {
        [a, b] => Ok((a.clone(), b.clone())),
        _ => Err(format!("expected {first} and {second}")),
    }
}

fn none(rest: &[String], command: Command) -> Result<Command, String> {
    if rest.is_empty() {
        Ok(command)
    } else {
        Err("unexpected arguments".to_string())
    }
}

pub fn parse(args: &[String]) -> Result<Invocation, String> {
    let [music_dir, name, rest @ ..] = args else {
        return Err("missing music directory or command".to_string());
    };

    let command = match name.as_str() {
        "popular" => none(rest, Command::Popular)?,
        "search" => {
            if rest.is_empty() {
                return Err("expected a search query".to_string());
            }
            Command::Search(rest.join(" "))
        }
        "list" => none(rest, Command::List)?,
        "tags" => none(rest, Command::Tags)?,
        "pin" => Command::Pin(one(rest, "tag")?),
        "unpin" => Command::Unpin(one(rest, "tag")?),
        "tag" => {
            let (track_id, tag) = two(rest, "a track id", "a tag")?;
            Command::Tag { track_id, tag }
        }
        "untag" => {
            let (track_id, tag) = two(rest, "a track id", "a tag")?;
            Command::Untag { track_id, tag }
        }
        "create-tag" => Command::CreateTag(one(rest, "tag")?),
        "rename-tag" => {
            let (old, new) = two(rest, "the old tag", "the new tag")?;
            Command::RenameTag { old, new }
        }
        "delete-tag" => Command::DeleteTag(one(rest, "tag")?),
        "filter" => {
            let [mode, tags @ ..] = rest else {
                return Err("expected any or all".to_string());
            };
            let operation = match mode.as_str() {
                "any" => TagOperation::Union,
                "all" => TagOperation::Intersection,
                other => return Err(format!("unknown filter mode: {other}")),
            };
            Command::Filter {
                operation,
                tags: tags.to_vec(),
            }
        }
        "blocks" => Command::Blocks(rest.iter().map(|a| parse_block(a)).collect()),
        "save" => {
            let [name, blocks @ ..] = rest else {
                return Err("expected a playlist name".to_string());
            };
            Command::Save {
                name: name.clone(),
                blocks: blocks.iter().map(|a| parse_block(a)).collect(),
            }
        }
        "playlists" => none(rest, Command::Playlists)?,
        "open" => Command::Open(one(rest, "playlist id")?),
        "rename-playlist" => {
            let [id, name @ ..] = rest else {
                return Err("expected a playlist id and a name".to_string());
            };
            if name.is_empty() {
                return Err("expected a playlist id and a name".to_string());
            }
            Command::RenamePlaylist {
                id: id.clone(),
                name: name.join(" "),
            }
        }
        "delete-playlist" => Command::DeletePlaylist(one(rest, "playlist id")?),
        "play" => Command::Play(one(rest, "track id")?),
        "next" => none(rest, Command::Next)?,
        "prev" => none(rest, Command::Prev)?,
        "ended" => none(rest, Command::Ended)?,
        "seek" => {
            let raw = one(rest, "position")?;
            let seconds = raw
                .parse::<f64>()
                .map_err(|_| format!("invalid position: {raw}"))?;
            Command::Seek(seconds)
        }
        "volume" => {
            let raw = one(rest, "volume")?;
            let volume = raw
                .parse::<f32>()
                .map_err(|_| format!("invalid volume: {raw}"))?;
            Command::Volume(volume)
        }
        "mute" => none(rest, Command::Mute)?,
        "loop" => none(rest, Command::Loop)?,
        "history" => none(rest, Command::History)?,
        "clear-history" => none(rest, Command::ClearHistory)?,
        "theme" => none(rest, Command::Theme)?,
        "config" => none(rest, Command::Config)?,
        other => return Err(format!("unknown command: {other}")),
    };

    Ok(Invocation {
        music_dir: music_dir.clone(),
        command,
    })
}

fn print_tracks(out: &mut impl Write, tracks: &[&Track]) -> io::Result<()> {
    if tracks.is_empty() {
        return writeln!(out, "(no tracks)");
    }
    for track in tracks {
        if track.custom_tags.is_empty() {
            writeln!(out, "{}  {}", track.id, track.display())?;
        } else {
            writeln!(
                out,
                "{}  {}  [{}]",
                track.id,
                track.display(),
                track.custom_tags.join(", ")
            )?;
        }
    }
    Ok(())
}

fn print_outcome(out: &mut impl Write, changed: bool, what: &str) -> io::Result<()> {
    if changed {
        writeln!(out, "{what}")
    } else {
        writeln!(out, "nothing changed")
    }
}

fn print_current(out: &mut impl Write, app: &App) -> io::Result<()> {
    match app.tracks.current_track() {
        Some(track) => writeln!(out, "playing: {}", track.display()),
        None => writeln!(out, "nothing playing"),
    }
}

fn theme_name(mode: ThemeMode) -> &'static str {
    match mode {
        ThemeMode::Light => "light",
        ThemeMode::Dark => "dark",
        ThemeMode::System => "system",
    }
}

pub fn execute(
    app: &mut App,
    catalog: &dyn Catalog,
    command: &Command,
    out: &mut impl Write,
) -> io::Result<()> {
    match command {
        Command::Popular => {
            app.load_popular(catalog);
            print_tracks(out, &app.visible_tracks())
        }
        Command::Search(query) => {
            app.search(catalog, query);
            print_tracks(out, &app.visible_tracks())
        }
        Command::List => print_tracks(out, &app.visible_tracks()),
        Command::Tags => {
            for tag in app.available_tags().iter() {
                let marker = if app.tags.is_active(tag) { "*" } else { " " };
                writeln!(out, "{marker} {tag}")?;
            }
            Ok(())
        }
        Command::Pin(tag) => {
            let pinned = app.pin_tag(tag);
            print_outcome(out, pinned, "pinned")
        }
        Command::Unpin(tag) => {
            let unpinned = app.unpin_tag(tag);
            print_outcome(out, unpinned, "unpinned")
        }
        Command::Tag { track_id, tag } => {
            let changed = app.tag_track(track_id, tag);
            print_outcome(out, changed, "tagged")
        }
        Command::Untag { track_id, tag } => {
            let changed = app.untag_track(track_id, tag);
            print_outcome(out, changed, "untagged")
        }
        Command::CreateTag(tag) => {
            let created = app.create_tag(tag);
            print_outcome(out, created, "created")
        }
        Command::RenameTag { old, new } => {
            let renamed = app.rename_tag(old, new);
            print_outcome(out, renamed, "renamed")
        }
        Command::DeleteTag(tag) => {
            let deleted = app.delete_tag(tag);
            print_outcome(out, deleted, "deleted")
        }
        Command::Filter { operation, tags } => {
            app.filter_by_tags(tags.clone(), *operation);
            print_tracks(out, &app.visible_tracks())
        }
        Command::Blocks(blocks) => {
            app.filter_by_blocks(blocks.clone());
            print_tracks(out, &app.visible_tracks())
        }
        Command::Save { name, blocks } => {
            if !blocks.is_empty() {
                app.filter_by_blocks(blocks.clone());
            }
            match app.save_filter_as_playlist(name) {
                Some(id) => writeln!(out, "saved playlist {id}"),
                None => writeln!(out, "nothing to save"),
            }
        }
        Command::Playlists => {
            if app.playlists.is_empty() {
                return writeln!(out, "(no playlists)");
            }
            let active = app.playlists.active_playlist_id();
            for playlist in app.playlists.playlists() {
                let marker = if active == Some(playlist.id.as_str()) { "*" } else { " " };
                writeln!(
                    out,
                    "{marker} {}  {}  ({} tracks)",
                    playlist.id,
                    playlist.name,
                    app.playlists.get_tracks_for_playlist(&playlist.id, &app.tracks).len()
                )?;
            }
            Ok(())
        }
        Command::Open(id) => {
            if app.load_playlist(id) {
                print_tracks(out, &app.visible_tracks())
            } else {
                writeln!(out, "no such playlist: {id}")
            }
        }
        Command::RenamePlaylist { id, name } => {
            let renamed = app.rename_playlist(id, name);
            print_outcome(out, renamed, "renamed")
        }
        Command::DeletePlaylist(id) => {
            let deleted = app.delete_playlist(id);
            print_outcome(out, deleted, "deleted")
        }
        Command::Play(id) => {
            app.play(id);
            print_current(out, app)
        }
        Command::Next => {
            app.play_next();
            print_current(out, app)
        }
        Command::Prev => {
            app.play_previous();
            print_current(out, app)
        }
        Command::Ended => match app.track_ended() {
            TrackEnd::Restart => writeln!(out, "restarting: looping is on"),
            TrackEnd::Advanced => print_current(out, app),
            TrackEnd::Stopped => writeln!(out, "stopped"),
        },
        Command::Seek(seconds) => {
            app.seek(*seconds);
            writeln!(out, "position: {:.1}s", app.player.playback_position)
        }
        Command::Volume(volume) => {
            app.set_volume(*volume);
            writeln!(out, "volume: {:.2}", app.player.volume)
        }
        Command::Mute => {
            app.toggle_mute();
            writeln!(out, "muted: {}", app.player.is_muted())
        }
        Command::Loop => {
            app.toggle_loop();
            writeln!(out, "looping: {}", app.player.is_looping)
        }
        Command::History => {
            for entry in &app.history.history {
                let when = chrono::DateTime::from_timestamp_millis(entry.played_at)
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                let name = app
                    .tracks
                    .track(&entry.track_id)
                    .map(Track::display)
                    .unwrap_or_else(|| entry.track_id.clone());
                writeln!(out, "{when}  {name}")?;
            }
            Ok(())
        }
        Command::ClearHistory => {
            app.clear_history();
            writeln!(out, "history cleared")
        }
        Command::Theme => {
            app.toggle_theme();
            writeln!(out, "theme: {}", theme_name(app.theme.theme))
        }
        Command::Config => {
            let rendered = toml::to_string_pretty(&app.settings)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            write!(out, "{rendered}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn cmd(list: &[&str]) -> Result<Command, String> {
        parse(&args(list)).map(|inv| inv.command)
    }

    #[test]
    fn parses_simple_commands() {
        let inv = parse(&args(&["~/Music", "popular"])).unwrap();
        assert_eq!(inv.music_dir, "~/Music");
        assert_eq!(inv.command, Command::Popular);
        assert_eq!(cmd(&["m", "search", "night", "drive"]), Ok(Command::Search("night drive".into())));
        assert_eq!(cmd(&["m", "volume", "0.5"]), Ok(Command::Volume(0.5)));
    }

    #[test]
    fn parses_filters_and_blocks() {
        assert_eq!(
            cmd(&["m", "filter", "all", "chill", "focus"]),
            Ok(Command::Filter {
                operation: TagOperation::Intersection,
                tags: vec!["chill".into(), "focus".into()],
            })
        );
        assert_eq!(
            cmd(&["m", "blocks", "chill, focus", "energy"]),
            Ok(Command::Blocks(vec![
                vec!["chill".into(), "focus".into()],
                vec!["energy".into()],
            ]))
        );
        assert_eq!(
            cmd(&["m", "save", "Mix", "a,b"]),
            Ok(Command::Save {
                name: "Mix".into(),
                blocks: vec![vec!["a".into(), "b".into()]],
            })
        );
    }

    #[test]
    fn parses_playlist_and_tag_housekeeping() {
        assert_eq!(
            cmd(&["m", "rename-playlist", "abc", "Late", "Night"]),
            Ok(Command::RenamePlaylist {
                id: "abc".into(),
                name: "Late Night".into(),
            })
        );
        assert_eq!(cmd(&["m", "pin", "chill"]), Ok(Command::Pin("chill".into())));
        assert_eq!(cmd(&["m", "unpin", "chill"]), Ok(Command::Unpin("chill".into())));
        assert_eq!(cmd(&["m", "clear-history"]), Ok(Command::ClearHistory));
        assert!(cmd(&["m", "rename-playlist", "abc"]).is_err());
        assert!(cmd(&["m", "pin"]).is_err());
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(cmd(&["m"]).is_err());
        assert!(cmd(&["m", "dance"]).is_err());
        assert!(cmd(&["m", "tag", "only-one"]).is_err());
        assert!(cmd(&["m", "filter", "some", "x"]).is_err());
        assert!(cmd(&["m", "volume", "loud"]).is_err());
        assert!(cmd(&["m", "list", "extra"]).is_err());
        assert!(cmd(&["m", "search"]).is_err());
    }
}
