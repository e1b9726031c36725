//! Decides how to present playable audio for one catalog row.
//!
//! The audio cell of a row is interpreted through a fallback chain:
//!
//! | Audio cell | Result |
//! |------------|--------|
//! | column unbound, or empty after trimming | [`AudioPresentation::SearchFallback`] |
//! | names an existing local file | [`AudioPresentation::InlineBytes`] |
//! | does not name an existing path | [`AudioPresentation::RemoteUrl`] |
//! | existence check or read fails | [`AudioPresentation::SearchFallback`] plus a notice |
//!
//! "Remote" is decided purely by the path not existing locally; the value is
//! passed through without URL validation. When search links are disabled,
//! both search fallbacks become [`AudioPresentation::Unavailable`].
//!
//! A resolver can be confined to a directory (see
//! [`AudioResolver::confined_to`]). It then only reads files whose canonical
//! path lies inside that directory. Any other value is passed on as a
//! [`AudioPresentation::RemoteUrl`], as if the path did not exist.
//!
//! Resolution never fails. It runs at render time and nothing is cached.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::core::catalog::Row;
use crate::core::cell::CellValue;
use crate::core::config::{AppConfig, DEFAULT_SEARCH_ENDPOINT};
use crate::core::types::{ColumnRoleMap, IssueKind};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// How one row's audio is surfaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioPresentation {
    /// Bytes read from a local file
    InlineBytes { data: Vec<u8>, path: PathBuf },
    /// The cell value, to be fetched by the player
    RemoteUrl(String),
    /// A link to an external search for the song
    SearchFallback { query: String, url: String },
    /// Nothing playable and search links are disabled
    Unavailable,
}

impl AudioPresentation {
    /// Short machine-readable tag for this variant
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InlineBytes { .. } => "inline_bytes",
            Self::RemoteUrl(_) => "remote_url",
            Self::SearchFallback { .. } => "search_fallback",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Human-readable song label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption {
    pub title: String,
    pub artist: String,
}

impl std::fmt::Display for Caption {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} — {}", self.title, self.artist)
    }
}

/// Caption, presentation and optional notice for one row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAudio {
    pub caption: Caption,
    pub presentation: AudioPresentation,
    /// Set when a local file could not be read and the search fallback was used
    pub notice: Option<String>,
}

impl ResolvedAudio {
    /// `ResourceUnavailable` when the audio source could not be read
    #[must_use]
    pub fn issue(&self) -> Option<IssueKind> {
        self.notice.as_ref().map(|_| IssueKind::ResourceUnavailable)
    }

    /// JSON view used by the CLI and web API. Inline bytes are described,
    /// not embedded.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let presentation = match &self.presentation {
            AudioPresentation::InlineBytes { data, path } => serde_json::json!({
                "type": self.presentation.kind(),
                "file": path.file_name().map(|name| name.to_string_lossy()),
                "size": data.len(),
            }),
            AudioPresentation::RemoteUrl(url) => serde_json::json!({
                "type": self.presentation.kind(),
                "url": url,
            }),
            AudioPresentation::SearchFallback { query, url } => serde_json::json!({
                "type": self.presentation.kind(),
                "query": query,
                "url": url,
            }),
            AudioPresentation::Unavailable => serde_json::json!({
                "type": self.presentation.kind(),
            }),
        };

        serde_json::json!({
            "caption": self.caption.to_string(),
            "title": self.caption.title,
            "artist": self.caption.artist,
            "audio": presentation,
            "notice": self.notice,
            "issue": self.issue(),
        })
    }
}

/// Build the search query for a song: `"{title} {artist}"` with spaces as `%20`
#[must_use]
pub fn search_query(title: &str, artist: &str) -> String {
    format!("{title} {artist}").replace(' ', "%20")
}

/// Resolves audio presentations with a configurable search endpoint
#[derive(Debug, Clone)]
pub struct AudioResolver {
    search_endpoint: Option<String>,
    /// Canonical directory local files must live under, if any
    local_root: Option<PathBuf>,
}

impl Default for AudioResolver {
    fn default() -> Self {
        Self::new(Some(DEFAULT_SEARCH_ENDPOINT.to_string()))
    }
}

impl AudioResolver {
    /// `None` disables search links
    #[must_use]
    pub fn new(search_endpoint: Option<String>) -> Self {
        Self {
            search_endpoint,
            local_root: None,
        }
    }

    /// Only read local files under `root`. Used for catalogs supplied by
    /// users, whose audio cells may name arbitrary paths.
    #[must_use]
    pub fn confined_to(mut self, root: &Path) -> Self {
        self.local_root = Some(root.canonicalize().unwrap_or_else(|e| {
            tracing::warn!("Cannot resolve audio root {}: {e}", root.display());
            root.to_path_buf()
        }));
        self
    }

    /// Whether a file that exists may be read
    fn may_read(&self, path: &Path) -> bool {
        let Some(root) = &self.local_root else {
            return true;
        };
        match path.canonicalize() {
            Ok(canonical) => canonical.starts_with(root),
            Err(_) => false,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.search_endpoint.clone())
    }

    /// Resolve the caption and audio presentation for a row
    #[must_use]
    pub fn resolve(&self, row: Row<'_>, roles: &ColumnRoleMap) -> ResolvedAudio {
        let caption = Caption {
            title: text_or(row, roles.title.as_deref(), UNKNOWN_TITLE),
            artist: text_or(row, roles.artist.as_deref(), UNKNOWN_ARTIST),
        };

        let audio = roles
            .audio
            .as_deref()
            .and_then(|col| row.get(col))
            .map(CellValue::trimmed)
            .unwrap_or_default();

        if audio.is_empty() {
            return ResolvedAudio {
                presentation: self.fallback(&caption),
                caption,
                notice: None,
            };
        }

        let path = Path::new(&audio);
        let outcome = match path.try_exists() {
            Ok(true) if !self.may_read(path) => {
                tracing::debug!("Audio path {audio} is outside the allowed directory");
                Ok(AudioPresentation::RemoteUrl(audio.clone()))
            }
            Ok(true) => read_local(path).map(|data| AudioPresentation::InlineBytes {
                data,
                path: path.to_path_buf(),
            }),
            Ok(false) => Ok(AudioPresentation::RemoteUrl(audio.clone())),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(presentation) => ResolvedAudio {
                caption,
                presentation,
                notice: None,
            },
            Err(e) => {
                tracing::debug!("Audio source {audio} unavailable: {e}");
                ResolvedAudio {
                    presentation: self.fallback(&caption),
                    caption,
                    notice: Some(format!("Couldn't play audio directly ({e}).")),
                }
            }
        }
    }

    fn fallback(&self, caption: &Caption) -> AudioPresentation {
        match &self.search_endpoint {
            Some(endpoint) => {
                let query = search_query(&caption.title, &caption.artist);
                AudioPresentation::SearchFallback {
                    url: format!("{endpoint}{query}"),
                    query,
                }
            }
            None => AudioPresentation::Unavailable,
        }
    }
}

/// Resolve a row's audio with the default search endpoint, given the bound
/// title, artist and audio columns.
#[must_use]
pub fn resolve_audio(
    row: Row<'_>,
    title_col: Option<&str>,
    artist_col: Option<&str>,
    audio_col: Option<&str>,
) -> ResolvedAudio {
    let roles = ColumnRoleMap {
        genre: None,
        title: title_col.map(str::to_string),
        artist: artist_col.map(str::to_string),
        audio: audio_col.map(str::to_string),
    };
    AudioResolver::default().resolve(row, &roles)
}

fn text_or(row: Row<'_>, column: Option<&str>, default: &str) -> String {
    column
        .and_then(|col| row.get(col))
        .map(CellValue::trimmed)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read a whole local file; the handle is closed on every path out
fn read_local(path: &Path) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    Ok(data)
}
