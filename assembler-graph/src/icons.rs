//! Item icon download and cache
//!
//! Icons are fetched from the official Factorio wiki on first use and kept
//! under a local cache directory. No images ship with this crate; downloaded
//! files are for personal use under the Factorio terms of service.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

pub const WIKI_IMAGE_BASE_URL: &str = "https://wiki.factorio.com/images/";

#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("GET {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("GET {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("icon cache I/O on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Supplies an image file for an item, for renderers that show icons.
pub trait IconProvider {
    fn icon(&self, item: &str) -> Result<PathBuf, IconError>;
}

/// Downloads icons into `dir/<item>.png`, once per item.
#[derive(Debug)]
pub struct IconCache {
    dir: PathBuf,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl IconCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_base_url(dir, WIKI_IMAGE_BASE_URL)
    }

    pub fn with_base_url(dir: impl Into<PathBuf>, base_url: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        IconCache {
            dir: dir.into(),
            base_url: base_url.to_string(),
            client,
        }
    }

    pub fn icon_path(&self, item: &str) -> PathBuf {
        self.dir.join(format!("{}.png", item))
    }

    /// Wiki image URL for an item
    pub fn icon_url(&self, item: &str) -> String {
        format!("{}{}.png", self.base_url, wiki_image_name(item))
    }

    fn download(&self, item: &str, path: &Path) -> Result<(), IconError> {
        fs::create_dir_all(&self.dir).map_err(|source| IconError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let url = self.icon_url(item);
        info!(%url, path = %path.display(), "downloading icon");

        let response = self.client.get(&url).send().map_err(|source| IconError::Http {
            url: url.clone(),
            source,
        })?;
        if !response.status().is_success() {
            return Err(IconError::Status {
                url,
                status: response.status().as_u16(),
            });
        }
        let bytes = response
            .bytes()
            .map_err(|source| IconError::Http { url, source })?;

        fs::write(path, &bytes).map_err(|source| IconError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl IconProvider for IconCache {
    fn icon(&self, item: &str) -> Result<PathBuf, IconError> {
        let path = self.icon_path(item);
        if path.is_file() {
            debug!(item, "icon cache hit");
        } else {
            self.download(item, &path)?;
        }
        Ok(path)
    }
}

/// Wiki file name: the item id with its first letter capitalised, apart
/// from a few images named differently.
pub fn wiki_image_name(item: &str) -> String {
    match item {
        "power_armor_mk2" => return "Power_armor_MK2".to_string(),
        "rail" => return "Straight_rail".to_string(),
        _ => {}
    }

    let mut chars = item.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
