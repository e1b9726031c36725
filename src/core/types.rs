use serde::{Deserialize, Serialize};

/// Semantic role a catalog column can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Genre,
    Title,
    Artist,
    Audio,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 4] = [Self::Genre, Self::Title, Self::Artist, Self::Audio];

    /// Lower-cased candidate column names, highest priority first
    #[must_use]
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Self::Genre => &["genre", "genres", "label"],
            Self::Title => &["title", "song", "track", "name"],
            Self::Artist => &["artist", "artists", "singer", "band"],
            Self::Audio => &[
                "preview_url",
                "audio_url",
                "audio",
                "url",
                "stream_url",
                "mp3",
            ],
        }
    }
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Genre => write!(f, "genre"),
            Self::Title => write!(f, "title"),
            Self::Artist => write!(f, "artist"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// Which concrete catalog column (if any) plays each role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnRoleMap {
    pub genre: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub audio: Option<String>,
}

impl ColumnRoleMap {
    #[must_use]
    pub fn get(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::Genre => self.genre.as_deref(),
            ColumnRole::Title => self.title.as_deref(),
            ColumnRole::Artist => self.artist.as_deref(),
            ColumnRole::Audio => self.audio.as_deref(),
        }
    }

    pub fn set(&mut self, role: ColumnRole, column: Option<String>) {
        match role {
            ColumnRole::Genre => self.genre = column,
            ColumnRole::Title => self.title = column,
            ColumnRole::Artist => self.artist = column,
            ColumnRole::Audio => self.audio = column,
        }
    }

    /// True when no role could be bound
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        ColumnRole::ALL.iter().all(|r| self.get(*r).is_none())
    }
}

/// Classification of the non-fatal problems an operation can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A required model or catalog file is absent
    MissingArtifact,
    /// A file exists but cannot be parsed
    MalformedSource,
    /// A required semantic column cannot be found
    UnresolvedSchema,
    /// An audio source cannot be read or reached
    ResourceUnavailable,
    /// A filter or search matched nothing
    EmptyResult,
}

impl IssueKind {
    /// Stable machine-readable code, as used in JSON output
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::MissingArtifact => "missing_artifact",
            Self::MalformedSource => "malformed_source",
            Self::UnresolvedSchema => "unresolved_schema",
            Self::ResourceUnavailable => "resource_unavailable",
            Self::EmptyResult => "empty_result",
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingArtifact => write!(f, "missing artifact"),
            Self::MalformedSource => write!(f, "malformed source"),
            Self::UnresolvedSchema => write!(f, "unresolved schema"),
            Self::ResourceUnavailable => write!(f, "resource unavailable"),
            Self::EmptyResult => write!(f, "empty result"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_codes_match_serde_names() {
        for kind in [
            IssueKind::MissingArtifact,
            IssueKind::MalformedSource,
            IssueKind::UnresolvedSchema,
            IssueKind::ResourceUnavailable,
            IssueKind::EmptyResult,
        ] {
            assert_eq!(serde_json::json!(kind), kind.code());
        }
    }

    #[test]
    fn test_role_map_get_set() {
        let mut roles = ColumnRoleMap::default();
        assert!(roles.is_unresolved());
        roles.set(ColumnRole::Audio, Some("mp3".to_string()));
        assert_eq!(roles.get(ColumnRole::Audio), Some("mp3"));
        assert!(!roles.is_unresolved());
    }
}
