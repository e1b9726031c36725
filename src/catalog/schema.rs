//! Heuristic mapping of arbitrary catalog columns onto semantic roles.

use std::collections::HashMap;

use crate::core::catalog::Catalog;
use crate::core::types::{ColumnRole, ColumnRoleMap};

/// Infer which columns hold the genre, title, artist and audio source.
///
/// Matching is case-insensitive. For each role the synonym list of
/// [`ColumnRole::synonyms`] is scanned in order and the first synonym present
/// wins, so the result does not depend on the catalog's column order. When
/// two columns differ only by case, the later one is used. Never fails: a
/// catalog without any recognisable column yields an all-unresolved map.
#[must_use]
pub fn resolve(catalog: &Catalog) -> ColumnRoleMap {
    resolve_columns(catalog.columns())
}

/// Same as [`resolve`], from bare column names
#[must_use]
pub fn resolve_columns(columns: &[String]) -> ColumnRoleMap {
    let lookup: HashMap<String, &str> = columns
        .iter()
        .map(|c| (c.to_lowercase(), c.as_str()))
        .collect();

    let mut roles = ColumnRoleMap::default();
    for role in ColumnRole::ALL {
        let column = role
            .synonyms()
            .iter()
            .find_map(|syn| lookup.get(*syn))
            .map(|c| (*c).to_string());
        roles.set(role, column);
    }

    tracing::debug!(
        genre = ?roles.genre,
        title = ?roles.title,
        artist = ?roles.artist,
        audio = ?roles.audio,
        "Resolved catalog columns"
    );

    roles
}
