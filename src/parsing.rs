//! Parsers for wfmu.org documents.
//!
//! This module turns the now-playing JSON feed, playlist and favorites HTML
//! pages and the comments XML feed into typed records. None of the scraped
//! formats is a stable contract, so every parser is strict: a missing anchor
//! element or a malformed row fails the whole document with an error naming
//! the document kind, instead of returning a partial or empty list.

use crate::document::DocElement;
use crate::error::{CommentParseError, FavoritesParseError, PlaylistParseError};
use crate::types::{non_empty, Comment, CommentParent, NowPlaying, Show, Song, Year};
use crate::Result;
use scraper::Html;
use serde::Deserialize;

/// Base URL that playlist ids are appended to.
pub const DEFAULT_PLAYLIST_URL_BASE: &str = "https://www.wfmu.org/playlists/shows/";

/// Prefix on marker element ids that wraps a song id, e.g. `KDBsong-88412`.
pub const SONG_MARKER_PREFIX: &str = "KDBsong-";

const PLAYLIST_CONTAINER: &str = "#drop_table";
const SETBREAK_CLASS: &str = "setbreak";
const SONG_MARKER: &str = ".KDBFavIcon";
const ARTIST_CELL: &str = "td.col_artist";
const TITLE_CELL: &str = "td.col_song_title";
const ALBUM_CELL: &str = "td.col_album_title";
const LABEL_CELL: &str = "td.col_record_label";
const YEAR_CELL: &str = "td.col_year";

const FAVORITES_TABLE: &str = r#"table[name="favorites"]"#;
const FAVORITES_ARTIST_COLUMN: usize = 1;
const FAVORITES_TITLE_COLUMN: usize = 2;
const FAVORITES_ALBUM_COLUMN: usize = 3;

const COMMENT_ELEMENT: &str = "comment";
const COMMENT_ID_PATH: &str = "id";
const COMMENT_AUTHOR_PATH: &str = "author/name";
const COMMENT_CONTENT_PATH: &str = "content";
const COMMENT_PARENT_PATH: &str = "parent";

// ================================================================================================
// STATUS FEED SCHEMA
// ================================================================================================

#[derive(Debug, Deserialize)]
struct StatusFeed {
    show: String,
    #[serde(rename = "showId", default)]
    show_id: String,
    #[serde(default)]
    start: String,
    #[serde(default)]
    end: String,
    playlist: Attributed<IdAttributes>,
    #[serde(rename = "liveIndicator")]
    live_indicator: Attributed<FlagAttributes>,
    #[serde(rename = "setBreak")]
    set_break: Attributed<FlagAttributes>,
    title: String,
    artist: String,
    album: String,
    #[serde(default)]
    year: Option<RawYear>,
    #[serde(default)]
    label: String,
    #[serde(default)]
    song: Option<Attributed<IdAttributes>>,
}

/// The feed is converted from XML upstream, so attributes live under `@attributes`.
#[derive(Debug, Deserialize)]
struct Attributed<T> {
    #[serde(rename = "@attributes")]
    attributes: T,
}

#[derive(Debug, Deserialize)]
struct IdAttributes {
    id: String,
}

#[derive(Debug, Deserialize)]
struct FlagAttributes {
    flag: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawYear {
    Number(i32),
    Text(String),
}

impl RawYear {
    fn into_year(self) -> Option<Year> {
        match self {
            RawYear::Number(year) => Some(Year::Numeric(year)),
            RawYear::Text(text) => Year::parse(&text),
        }
    }
}

/// Parser for all wfmu.org document kinds.
///
/// Stateless apart from the playlist URL base used to build
/// [`Show::playlist_link`].
#[derive(Debug, Clone)]
pub struct WfmuParser {
    playlist_url_base: String,
}

impl WfmuParser {
    pub fn new() -> Self {
        Self::with_playlist_url_base(DEFAULT_PLAYLIST_URL_BASE)
    }

    pub fn with_playlist_url_base(base: &str) -> Self {
        Self {
            playlist_url_base: base.to_string(),
        }
    }

    pub fn playlist_link(&self, playlist_id: &str) -> String {
        format!("{}{}", self.playlist_url_base, playlist_id)
    }

    /// Decode the now-playing feed.
    ///
    /// This is a documented JSON feed rather than scraped markup, so schema
    /// mismatches surface as [`WfmuError::Decode`](crate::WfmuError::Decode).
    pub fn parse_status(&self, json: &str) -> Result<NowPlaying> {
        let feed: StatusFeed = serde_json::from_str(json)?;

        let playlist_id = feed.playlist.attributes.id;
        let show = Show {
            name: feed.show,
            playlist_link: self.playlist_link(&playlist_id),
            playlist_id,
            show_id: feed.show_id,
            start: non_empty(&feed.start),
            end: non_empty(&feed.end),
            live: feed.live_indicator.attributes.flag == "1",
            setbreak: feed.set_break.attributes.flag == "1",
        };

        let song_id = feed
            .song
            .map(|song| song.attributes.id)
            .unwrap_or_default();
        let song = Song::new(feed.title, feed.artist, song_id)
            .with_album(&feed.album)
            .with_year(feed.year.and_then(RawYear::into_year))
            .with_record_label(&feed.label);

        log::debug!("Now playing: {} on {}", song, show);
        Ok(NowPlaying { show, song })
    }

    /// Parse a show's playlist page into its songs, in row order.
    ///
    /// Set-break rows and blank separator rows are skipped. Any surviving
    /// row without a title cell or a song marker fails the whole page.
    pub fn parse_playlist(
        &self,
        document: &Html,
    ) -> std::result::Result<Vec<Song>, PlaylistParseError> {
        let root = document.root_element();
        let containers = root.find_all(PLAYLIST_CONTAINER).map_err(PlaylistParseError)?;

        let container = match containers.as_slice() {
            [only] => *only,
            [] => {
                return Err(PlaylistParseError(format!(
                    "songs container '{PLAYLIST_CONTAINER}' not found"
                )))
            }
            many => {
                return Err(PlaylistParseError(format!(
                    "expected one songs container '{PLAYLIST_CONTAINER}', found {}",
                    many.len()
                )))
            }
        };
        if container.name() != "table" {
            return Err(PlaylistParseError(format!(
                "songs container is a <{}>, expected <table>",
                container.name()
            )));
        }

        let mut songs = Vec::new();
        for (index, row) in container
            .find_all("tr")
            .map_err(PlaylistParseError)?
            .into_iter()
            .enumerate()
        {
            if has_class(&row, SETBREAK_CLASS) {
                continue;
            }
            let artist_cell = row.find_first(ARTIST_CELL).map_err(PlaylistParseError)?;
            let Some(artist_cell) = artist_cell else {
                continue;
            };

            let song = self
                .parse_playlist_row(&row, &artist_cell)
                .map_err(|e| PlaylistParseError(format!("row {index}: {e}")))?;
            songs.push(song);
        }

        log::debug!("Parsed {} songs from playlist page", songs.len());
        Ok(songs)
    }

    fn parse_playlist_row<'a, E: DocElement<'a>>(
        &self,
        row: &E,
        artist_cell: &E,
    ) -> std::result::Result<Song, String> {
        let title = row
            .find_first(TITLE_CELL)?
            .ok_or_else(|| format!("missing title cell '{TITLE_CELL}'"))?
            .normalized_text();
        let artist = artist_cell.normalized_text();

        let optional_cell = |selector: &str| -> std::result::Result<String, String> {
            Ok(row
                .find_first(selector)?
                .map(|cell| cell.normalized_text())
                .unwrap_or_default())
        };
        let album = optional_cell(ALBUM_CELL)?;
        let label = optional_cell(LABEL_CELL)?;
        let year = optional_cell(YEAR_CELL)?;

        let marker = row
            .find_first(SONG_MARKER)?
            .ok_or_else(|| format!("missing song marker '{SONG_MARKER}'"))?;
        let song_id = song_id_from_marker(&marker)?;

        Ok(Song::new(title, artist, song_id)
            .with_album(&album)
            .with_record_label(&label)
            .with_year(Year::parse(&year)))
    }

    /// Parse the logged-in user's favorites page.
    ///
    /// Columns are positional: the song marker, then artist, title and album.
    /// Header rows (no `<td>` cells) are skipped; any other malformed row
    /// fails the whole page.
    pub fn parse_favorites(
        &self,
        document: &Html,
    ) -> std::result::Result<Vec<Song>, FavoritesParseError> {
        let root = document.root_element();
        let tables = root.find_all(FAVORITES_TABLE).map_err(FavoritesParseError)?;
        let table = match tables.as_slice() {
            [only] => *only,
            [] => {
                return Err(FavoritesParseError(
                    "favorites table not found".to_string(),
                ))
            }
            many => {
                return Err(FavoritesParseError(format!(
                    "expected one favorites table, found {}",
                    many.len()
                )))
            }
        };

        let mut songs = Vec::new();
        for (index, row) in table
            .find_all("tr")
            .map_err(FavoritesParseError)?
            .into_iter()
            .enumerate()
        {
            let cells: Vec<_> = row
                .child_elements()
                .into_iter()
                .filter(|cell| cell.name() == "td")
                .collect();
            if cells.is_empty() {
                continue;
            }

            let song = parse_favorites_row(&cells)
                .map_err(|e| FavoritesParseError(format!("row {index}: {e}")))?;
            songs.push(song);
        }

        log::debug!("Parsed {} favorites", songs.len());
        Ok(songs)
    }

    /// Parse the playlist comments XML feed, oldest first as served.
    pub fn parse_comments(
        &self,
        xml: &str,
    ) -> std::result::Result<Vec<Comment>, CommentParseError> {
        let root = xmltree::Element::parse(xml.as_bytes())
            .map_err(|e| CommentParseError(format!("malformed XML: {e}")))?;
        let root = &root;

        let mut comments = Vec::new();
        for (index, element) in root
            .find_all(COMMENT_ELEMENT)
            .map_err(CommentParseError)?
            .into_iter()
            .enumerate()
        {
            let comment = parse_comment(&element)
                .map_err(|e| CommentParseError(format!("comment {index}: {e}")))?;
            comments.push(comment);
        }

        log::debug!("Parsed {} comments", comments.len());
        Ok(comments)
    }
}

impl Default for WfmuParser {
    fn default() -> Self {
        Self::new()
    }
}

// === SHARED PARSING UTILITIES ===

fn has_class<'a, E: DocElement<'a>>(element: &E, class: &str) -> bool {
    element
        .attr("class")
        .map(|classes| classes.split_whitespace().any(|c| c == class))
        .unwrap_or(false)
}

/// Recover a song id from a marker element such as `<span id="KDBsong-88412">`.
fn song_id_from_marker<'a, E: DocElement<'a>>(marker: &E) -> std::result::Result<String, String> {
    let id = marker
        .attr("id")
        .ok_or_else(|| "song marker has no id attribute".to_string())?;
    let song_id = id
        .strip_prefix(SONG_MARKER_PREFIX)
        .ok_or_else(|| format!("song marker id '{id}' lacks prefix '{SONG_MARKER_PREFIX}'"))?;
    if song_id.is_empty() {
        return Err(format!("song marker id '{id}' carries no song id"));
    }
    Ok(song_id.to_string())
}

fn parse_favorites_row<'a, E: DocElement<'a>>(cells: &[E]) -> std::result::Result<Song, String> {
    let cell = |column: usize| {
        cells
            .get(column)
            .ok_or_else(|| format!("missing column {column} (row has {})", cells.len()))
    };

    let marker = cell(0)?
        .find_first(SONG_MARKER)?
        .ok_or_else(|| format!("missing song marker '{SONG_MARKER}'"))?;
    let song_id = song_id_from_marker(&marker)?;

    let artist = cell(FAVORITES_ARTIST_COLUMN)?.normalized_text();
    let title = cell(FAVORITES_TITLE_COLUMN)?.normalized_text();
    let album = cell(FAVORITES_ALBUM_COLUMN)?.normalized_text();

    Ok(Song::new(title, artist, song_id).with_album(&album))
}

fn parse_comment<'a, E: DocElement<'a>>(element: &E) -> std::result::Result<Comment, String> {
    let required_text = |path: &str| -> std::result::Result<String, String> {
        element
            .find_first(path)?
            .map(|found| found.normalized_text())
            .ok_or_else(|| format!("missing <{path}>"))
    };

    let id = required_text(COMMENT_ID_PATH)?;
    if id.is_empty() {
        return Err("empty <id>".to_string());
    }
    let author = required_text(COMMENT_AUTHOR_PATH)?;
    let content = element
        .find_first(COMMENT_CONTENT_PATH)?
        .map(|found| found.text_content().trim().to_string())
        .ok_or_else(|| format!("missing <{COMMENT_CONTENT_PATH}>"))?;

    let parent_block = element
        .find_first(COMMENT_PARENT_PATH)?
        .ok_or_else(|| format!("missing <{COMMENT_PARENT_PATH}>"))?;
    let parent = parse_comment_parent(&parent_block)?;

    Ok(Comment {
        id,
        author,
        content,
        parent,
    })
}

/// Top-level comments carry an empty `<parent/>` block; replies carry the
/// type, id and content of what they reply to.
fn parse_comment_parent<'a, E: DocElement<'a>>(
    block: &E,
) -> std::result::Result<Option<CommentParent>, String> {
    if block.normalized_text().is_empty() {
        return Ok(None);
    }

    let field = |name: &str| -> std::result::Result<String, String> {
        block
            .find_first(name)?
            .map(|found| found.normalized_text())
            .ok_or_else(|| format!("non-empty <parent> missing <{name}>"))
    };

    Ok(Some(CommentParent {
        kind: field("type")?,
        id: field("id")?,
        content: field("content")?,
    }))
}
