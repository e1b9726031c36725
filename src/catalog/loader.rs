use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::core::catalog::Catalog;
use crate::core::config::{
    AppConfig, COMBINED_CATALOG, COMBINED_CATALOG_GZ, TEST_CATALOG, TRAIN_CATALOG,
};
use crate::parsing::csv::read_csv_file;

/// Finds and loads the song catalog from its well-known on-disk sources.
///
/// Sources are tried in strict priority order:
///
/// 1. `combined.csv`
/// 2. `combined.csv.gz`
/// 3. `train.csv` followed by `test.csv` (either may be absent)
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    pub combined: PathBuf,
    pub combined_gz: PathBuf,
    pub train: PathBuf,
    pub test: PathBuf,
}

impl CatalogLoader {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            combined: config.data_path(COMBINED_CATALOG),
            combined_gz: config.data_path(COMBINED_CATALOG_GZ),
            train: config.data_path(TRAIN_CATALOG),
            test: config.data_path(TEST_CATALOG),
        }
    }

    /// Load the first available catalog.
    ///
    /// A source that exists but fails to parse is logged and treated as
    /// absent. For the train/test pair, a part that fails is dropped and the
    /// other part is used alone. Returns `None` when nothing could be loaded.
    #[must_use]
    pub fn load(&self) -> Option<Catalog> {
        if let Some(catalog) = try_load(&self.combined) {
            return Some(catalog);
        }
        if let Some(catalog) = try_load(&self.combined_gz) {
            return Some(catalog);
        }

        let parts: Vec<Catalog> = [&self.train, &self.test]
            .into_iter()
            .filter_map(|p| try_load(p))
            .collect();
        if parts.is_empty() {
            tracing::debug!("No local catalog found");
            return None;
        }
        Some(Catalog::concat(parts))
    }
}

fn try_load(path: &Path) -> Option<Catalog> {
    if !path.exists() {
        return None;
    }
    match read_csv_file(path) {
        Ok(catalog) => {
            tracing::info!(
                "Loaded catalog {} ({} rows)",
                path.display(),
                catalog.len()
            );
            Some(catalog)
        }
        Err(e) => {
            tracing::warn!("Failed to load local catalog {}: {e}", path.display());
            None
        }
    }
}

/// Session-lifetime memo of the catalog in use.
///
/// The disk catalog is loaded at most once. A user upload installs an
/// override that takes precedence over the disk catalog until replaced; it
/// never reloads or invalidates the disk memo.
#[derive(Debug, Default)]
pub struct CatalogCache {
    state: Mutex<CacheState>,
}

#[derive(Debug, Default)]
struct CacheState {
    /// `None` until the first load attempt; `Some(None)` if nothing was found
    disk: Option<Option<Arc<Catalog>>>,
    upload: Option<Arc<Catalog>>,
}

impl CatalogCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The uploaded override if present, otherwise the (memoized) disk catalog
    pub fn current(&self, loader: &CatalogLoader) -> Option<Arc<Catalog>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(upload) = &state.upload {
            return Some(Arc::clone(upload));
        }
        state
            .disk
            .get_or_insert_with(|| loader.load().map(Arc::new))
            .clone()
    }

    /// Install a user-supplied catalog as the override
    pub fn set_upload(&self, catalog: Catalog) -> Arc<Catalog> {
        let catalog = Arc::new(catalog);
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.upload = Some(Arc::clone(&catalog));
        catalog
    }

    /// Whether `catalog` is the installed upload rather than the disk catalog
    pub fn is_upload(&self, catalog: &Arc<Catalog>) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .upload
            .as_ref()
            .is_some_and(|upload| Arc::ptr_eq(upload, catalog))
    }

    /// Whether an uploaded override is installed
    pub fn has_upload(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .upload
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    fn loader_in(dir: &TempDir) -> CatalogLoader {
        CatalogLoader::from_config(&AppConfig::new("artifacts", dir.path()))
    }

    fn write(dir: &TempDir, name: &str, content: &str) {
        std::fs::write(dir.path().join(name), content).unwrap();
    }

    fn write_gz(dir: &TempDir, name: &str, content: &str) {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content.as_bytes()).unwrap();
        std::fs::write(dir.path().join(name), encoder.finish().unwrap()).unwrap();
    }

    #[test]
    fn test_no_sources() {
        let dir = TempDir::new().unwrap();
        assert!(loader_in(&dir).load().is_none());
    }

    #[test]
    fn test_combined_takes_priority() {
        let dir = TempDir::new().unwrap();
        write(&dir, "combined.csv", "Genre,Title\npop,Combined\n");
        write_gz(&dir, "combined.csv.gz", "Genre,Title\npop,Gz\n");
        write(&dir, "train.csv", "Genre,Title\npop,Train\n");

        let catalog = loader_in(&dir).load().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.row(0).unwrap().get("Title").unwrap().to_string(),
            "Combined"
        );
    }

    #[test]
    fn test_gzip_used_when_plain_missing() {
        let dir = TempDir::new().unwrap();
        write_gz(&dir, "combined.csv.gz", "Genre,Title\npop,Gz\n");
        write(&dir, "train.csv", "Genre,Title\npop,Train\n");

        let catalog = loader_in(&dir).load().unwrap();
        assert_eq!(
            catalog.row(0).unwrap().get("Title").unwrap().to_string(),
            "Gz"
        );
    }

    #[test]
    fn test_malformed_source_falls_through() {
        let dir = TempDir::new().unwrap();
        write(&dir, "combined.csv", "a,b\n1,2,3\n");
        std::fs::write(dir.path().join("combined.csv.gz"), b"not gzip").unwrap();
        write(&dir, "test.csv", "Genre,Title\nrock,Test\n");

        let catalog = loader_in(&dir).load().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.row(0).unwrap().get("Title").unwrap().to_string(),
            "Test"
        );
    }

    #[test]
    fn test_train_then_test_order() {
        let dir = TempDir::new().unwrap();
        write(&dir, "train.csv", "Genre,Title\npop,T1\npop,T2\n");
        write(&dir, "test.csv", "Genre,Title\nrock,S1\n");

        let catalog = loader_in(&dir).load().unwrap();
        let titles: Vec<String> = catalog
            .rows()
            .map(|r| r.get("Title").unwrap().to_string())
            .collect();
        assert_eq!(titles, vec!["T1", "T2", "S1"]);
    }

    #[test]
    fn test_all_sources_malformed() {
        let dir = TempDir::new().unwrap();
        write(&dir, "combined.csv", "");
        write(&dir, "train.csv", "a\n1,2\n");
        assert!(loader_in(&dir).load().is_none());
    }

    #[test]
    fn test_cache_memoizes_disk_and_prefers_upload() {
        let dir = TempDir::new().unwrap();
        write(&dir, "combined.csv", "Genre,Title\npop,Disk\n");
        let loader = loader_in(&dir);
        let cache = CatalogCache::new();

        let first = cache.current(&loader).unwrap();
        // Changes on disk are not seen once memoized
        write(&dir, "combined.csv", "Genre,Title\npop,Changed\npop,Again\n");
        let second = cache.current(&loader).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!cache.has_upload());

        let upload = Catalog::new(vec!["Genre".to_string()], Vec::new());
        cache.set_upload(upload.clone());
        assert!(cache.has_upload());
        assert_eq!(*cache.current(&loader).unwrap(), upload);
    }

    #[test]
    fn test_cache_remembers_absence() {
        let dir = TempDir::new().unwrap();
        let loader = loader_in(&dir);
        let cache = CatalogCache::new();
        assert!(cache.current(&loader).is_none());

        write(&dir, "combined.csv", "Genre\npop\n");
        assert!(cache.current(&loader).is_none());
    }
}
