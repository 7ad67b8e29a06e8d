//! Data types for WFMU shows, songs and comments.
//!
//! All records are plain immutable values created fresh by the parsers in
//! [`crate::parsing`]. Empty upstream fields are normalized to `None` at
//! construction time rather than carried around as empty strings.

use serde::{Deserialize, Serialize};

// ================================================================================================
// SONGS
// ================================================================================================

/// Release year of a song.
///
/// The playlist pages are filled in by hand by each DJ, so the year column
/// holds anything from `1967` to `"c. 1970"` or `"reissue"`. Numeric years are
/// kept as numbers; everything else is preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Year {
    Numeric(i32),
    Text(String),
}

impl Year {
    /// Parse a raw year cell. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.parse::<i32>() {
            Ok(year) => Some(Year::Numeric(year)),
            Err(_) => Some(Year::Text(trimmed.to_string())),
        }
    }
}

impl std::fmt::Display for Year {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Year::Numeric(year) => write!(f, "{year}"),
            Year::Text(text) => f.write_str(text),
        }
    }
}

/// A song as listed on a playlist, the favorites page or the now-playing feed.
///
/// # Examples
///
/// ```rust
/// use wfmu_client::{Song, Year};
///
/// let song = Song::new("Sister Ray", "The Velvet Underground", "88412")
///     .with_album("White Light/White Heat")
///     .with_year(Year::parse("1968"));
///
/// assert_eq!(song.year, Some(Year::Numeric(1968)));
/// assert_eq!(format!("{song}"), "The Velvet Underground - Sister Ray [White Light/White Heat]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Song {
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<Year>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_label: Option<String>,
    /// Upstream identifier, used as the key for favorites and comment replies
    pub song_id: String,
}

impl Song {
    pub fn new(
        title: impl Into<String>,
        artist: impl Into<String>,
        song_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            album: None,
            year: None,
            record_label: None,
            song_id: song_id.into(),
        }
    }

    pub fn with_album(mut self, album: &str) -> Self {
        self.album = non_empty(album);
        self
    }

    pub fn with_year(mut self, year: Option<Year>) -> Self {
        self.year = year;
        self
    }

    pub fn with_record_label(mut self, label: &str) -> Self {
        self.record_label = non_empty(label);
        self
    }
}

impl std::fmt::Display for Song {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.album {
            Some(album) => write!(f, "{} - {} [{}]", self.artist, self.title, album),
            None => write!(f, "{} - {}", self.artist, self.title),
        }
    }
}

// ================================================================================================
// SHOWS
// ================================================================================================

/// The show currently on air, as reported by the now-playing feed.
///
/// `start` and `end` are passed through untouched: upstream mixes `"3:00pm"`,
/// `"15:00"` and free text, so no attempt is made to parse them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    pub name: String,
    pub playlist_id: String,
    pub playlist_link: String,
    pub show_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    /// Whether the DJ is broadcasting live
    pub live: bool,
    /// Whether the station is currently in a set break
    pub setbreak: bool,
}

impl std::fmt::Display for Show {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if self.live {
            write!(f, " (live)")?;
        }
        Ok(())
    }
}

/// A decoded now-playing snapshot: the show on air and the song playing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub show: Show,
    pub song: Song,
}

// ================================================================================================
// COMMENTS
// ================================================================================================

/// The item a comment replies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentParent {
    /// Kind of the parent item, e.g. `"song"` or `"comment"`
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
    pub content: String,
}

/// A listener comment from the playlist comments feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub content: String,
    /// `None` for top-level comments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CommentParent>,
}

impl std::fmt::Display for Comment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.author, self.content)
    }
}

// ================================================================================================
// FAVORITES
// ================================================================================================

/// Value of the `state` field sent to the favorite toggle endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteState {
    Add,
    Remove,
}

impl FavoriteState {
    pub fn as_form_value(self) -> &'static str {
        match self {
            FavoriteState::Add => "0",
            FavoriteState::Remove => "1",
        }
    }
}

/// Trim `raw` and map the empty string to `None`.
pub(crate) fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_parsing() {
        assert_eq!(Year::parse("1968"), Some(Year::Numeric(1968)));
        assert_eq!(Year::parse(" 2001 "), Some(Year::Numeric(2001)));
        assert_eq!(Year::parse("c. 1970"), Some(Year::Text("c. 1970".to_string())));
        assert_eq!(Year::parse("   "), None);
    }

    #[test]
    fn test_empty_fields_normalize_to_none() {
        let song = Song::new("Title", "Artist", "1")
            .with_album("")
            .with_record_label("  ");
        assert_eq!(song.album, None);
        assert_eq!(song.record_label, None);
    }

    #[test]
    fn test_favorite_state_form_values() {
        assert_eq!(FavoriteState::Add.as_form_value(), "0");
        assert_eq!(FavoriteState::Remove.as_form_value(), "1");
    }
}
