use std::path::PathBuf;

/// Default endpoint used to build search links for songs without audio
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://open.spotify.com/search/";

/// Default number of songs listed by the genre browser
pub const DEFAULT_BROWSE_LIMIT: usize = 25;

/// Filenames of the artifacts produced by training
pub const MODEL_FILENAME: &str = "pipeline_lr.json";
pub const METADATA_FILENAME: &str = "metadata.json";

/// Filenames of the on-disk catalog sources, checked in this order
pub const COMBINED_CATALOG: &str = "combined.csv";
pub const COMBINED_CATALOG_GZ: &str = "combined.csv.gz";
pub const TRAIN_CATALOG: &str = "train.csv";
pub const TEST_CATALOG: &str = "test.csv";

/// Runtime configuration shared by the CLI and the web server
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding the model artifact and metadata sidecar
    pub artifacts_dir: PathBuf,
    /// Directory searched for catalog files
    pub data_dir: PathBuf,
    /// Search endpoint for songs without audio; `None` disables search links
    pub search_endpoint: Option<String>,
}

impl AppConfig {
    #[must_use]
    pub fn new(artifacts_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifacts_dir: artifacts_dir.into(),
            data_dir: data_dir.into(),
            search_endpoint: Some(DEFAULT_SEARCH_ENDPOINT.to_string()),
        }
    }

    #[must_use]
    pub fn without_search_links(mut self) -> Self {
        self.search_endpoint = None;
        self
    }

    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.artifacts_dir.join(MODEL_FILENAME)
    }

    #[must_use]
    pub fn metadata_path(&self) -> PathBuf {
        self.artifacts_dir.join(METADATA_FILENAME)
    }

    #[must_use]
    pub fn data_path(&self, filename: &str) -> PathBuf {
        self.data_dir.join(filename)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new("artifacts", ".")
    }
}
