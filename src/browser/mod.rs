//! Lists the catalog songs belonging to a genre.
//!
//! Browsing is a short linear state machine; every terminal state is a normal
//! [`BrowseOutcome`], never an error:
//!
//! ```text
//! NoCatalog ─┐
//!            │ (catalog present, or upload supplied)
//!            ▼
//!      CatalogReady ──► NoGenreColumn
//!            │
//!            ▼
//!        Filtering ───► EmptySubset
//!            │
//!            ▼
//!        Rendering
//! ```

use crate::audio::{AudioResolver, ResolvedAudio};
use crate::catalog::schema;
use crate::core::catalog::Catalog;
use crate::core::config::DEFAULT_BROWSE_LIMIT;
use crate::core::types::{ColumnRoleMap, IssueKind};

/// Prompt shown when no catalog is available
pub const NO_CATALOG_MESSAGE: &str = "No local catalog found. Upload a CSV with your songs \
     (including a 'Genre' column and optional 'preview_url').";

/// Error shown when the catalog has no genre-like column
pub const NO_GENRE_COLUMN_MESSAGE: &str =
    "No genre-like column found in catalog. Add a 'Genre' column and retry.";

/// Notice shown when no row matches the genre
pub const NO_MATCHES_MESSAGE: &str = "No songs found for this genre in the catalog.";

/// One listed song
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingItem {
    /// Position of the song in the catalog it was listed from
    pub row_index: usize,
    pub audio: ResolvedAudio,
}

/// The rendered listing for a genre
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreListing {
    pub genre: String,
    /// Number of catalog rows in the genre, before truncation
    pub total: usize,
    pub limit: usize,
    pub roles: ColumnRoleMap,
    pub items: Vec<ListingItem>,
}

/// Result of a browse request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseOutcome {
    /// No catalog (or an empty one) and no upload; the caller should offer one
    NoCatalog { genre: String },
    /// The catalog has no column recognisable as a genre
    NoGenreColumn { genre: String, columns: Vec<String> },
    /// No row matched the genre
    NoMatches { genre: String },
    /// Matching songs
    Listing(GenreListing),
}

impl BrowseOutcome {
    #[must_use]
    pub fn genre(&self) -> &str {
        match self {
            Self::NoCatalog { genre }
            | Self::NoGenreColumn { genre, .. }
            | Self::NoMatches { genre } => genre,
            Self::Listing(listing) => &listing.genre,
        }
    }

    /// Problem classification of the terminal state, `None` for a listing
    #[must_use]
    pub fn issue(&self) -> Option<IssueKind> {
        match self {
            Self::NoCatalog { .. } => Some(IssueKind::MissingArtifact),
            Self::NoGenreColumn { .. } => Some(IssueKind::UnresolvedSchema),
            Self::NoMatches { .. } => Some(IssueKind::EmptyResult),
            Self::Listing(_) => None,
        }
    }

    /// User-facing message for the terminal state, `None` for a listing
    #[must_use]
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::NoCatalog { .. } => Some(NO_CATALOG_MESSAGE),
            Self::NoGenreColumn { .. } => Some(NO_GENRE_COLUMN_MESSAGE),
            Self::NoMatches { .. } => Some(NO_MATCHES_MESSAGE),
            Self::Listing(_) => None,
        }
    }

    /// Number of songs rendered
    #[must_use]
    pub fn rendered(&self) -> usize {
        match self {
            Self::Listing(listing) => listing.items.len(),
            _ => 0,
        }
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let status = match self {
            Self::NoCatalog { .. } => "no_catalog",
            Self::NoGenreColumn { .. } => "no_genre_column",
            Self::NoMatches { .. } => "no_matches",
            Self::Listing(_) => "listing",
        };

        let mut value = serde_json::json!({
            "status": status,
            "genre": self.genre(),
            "issue": self.issue(),
            "message": self.message(),
        });

        match self {
            Self::NoGenreColumn { columns, .. } => {
                value["columns"] = serde_json::json!(columns);
            }
            Self::Listing(listing) => {
                value["total"] = serde_json::json!(listing.total);
                value["limit"] = serde_json::json!(listing.limit);
                value["roles"] = serde_json::json!(listing.roles);
                value["items"] = listing
                    .items
                    .iter()
                    .map(|item| {
                        let mut json = item.audio.to_json();
                        json["row"] = serde_json::json!(item.row_index);
                        json
                    })
                    .collect();
            }
            _ => {}
        }

        value
    }
}

/// Browses a catalog for the songs of one genre
#[derive(Debug, Clone)]
pub struct GenreBrowser {
    resolver: AudioResolver,
    limit: usize,
}

impl Default for GenreBrowser {
    fn default() -> Self {
        Self::new(AudioResolver::default())
    }
}

impl GenreBrowser {
    #[must_use]
    pub fn new(resolver: AudioResolver) -> Self {
        Self {
            resolver,
            limit: DEFAULT_BROWSE_LIMIT,
        }
    }

    /// Maximum number of songs rendered per listing
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// List the songs of `genre`.
    ///
    /// `upload` replaces `catalog` only when `catalog` is absent or empty.
    /// Rows match when their stringified genre cell equals `genre` exactly
    /// (case-sensitive, no normalization). The first `limit` matches in
    /// catalog order are rendered; the listing reports the full match count.
    #[must_use]
    pub fn browse(
        &self,
        genre: &str,
        catalog: Option<&Catalog>,
        upload: Option<&Catalog>,
    ) -> BrowseOutcome {
        let genre = genre.to_string();

        let catalog = match catalog.filter(|c| !c.is_empty()).or(upload) {
            Some(catalog) => catalog,
            None => return BrowseOutcome::NoCatalog { genre },
        };

        let roles = schema::resolve(catalog);
        let Some(genre_col) = roles.genre.as_deref() else {
            tracing::warn!("Catalog has no genre-like column");
            return BrowseOutcome::NoGenreColumn {
                genre,
                columns: catalog.columns().to_vec(),
            };
        };

        let subset: Vec<_> = catalog
            .rows()
            .filter(|row| row.get(genre_col).is_some_and(|v| v.to_string() == genre))
            .collect();

        if subset.is_empty() {
            return BrowseOutcome::NoMatches { genre };
        }

        tracing::debug!(
            "Genre '{genre}': {} matching songs, listing up to {}",
            subset.len(),
            self.limit
        );

        let items = subset
            .iter()
            .take(self.limit)
            .map(|row| ListingItem {
                row_index: row.index(),
                audio: self.resolver.resolve(*row, &roles),
            })
            .collect();

        BrowseOutcome::Listing(GenreListing {
            total: subset.len(),
            limit: self.limit,
            genre,
            roles,
            items,
        })
    }
}

/// Browse with the default resolver, given an explicit `limit`
#[must_use]
pub fn browse(
    genre: &str,
    catalog: Option<&Catalog>,
    upload: Option<&Catalog>,
    limit: usize,
) -> BrowseOutcome {
    GenreBrowser::default()
        .with_limit(limit)
        .browse(genre, catalog, upload)
}
