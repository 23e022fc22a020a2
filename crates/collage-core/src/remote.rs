//! Client for public folders on an HTTP file-hosting API.
//!
//! A public share is addressed by its key; resources inside it by a path
//! relative to the share root. Folders are listed through the resources
//! endpoint and every file is fetched from the signed link the API hands
//! out, streamed straight to disk. Archives are never requested, so no
//! unpacking step is needed.
//!
//! Requests are made once; retrying is left to the caller.

use futures_util::StreamExt;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::config::RemoteConfig;
use crate::error::RemoteError;

/// An entry in a public folder listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteItem {
    /// File or folder name
    pub name: String,
    /// Path relative to the share root
    pub path: String,
    /// "file" or "dir"
    #[serde(rename = "type")]
    pub kind: String,
    /// Direct download link, when the listing includes one
    #[serde(default)]
    pub file: Option<String>,
    /// Size in bytes (files only)
    #[serde(default)]
    pub size: Option<u64>,
}

impl RemoteItem {
    pub fn is_file(&self) -> bool {
        self.kind == "file"
    }
}

/// Resources endpoint response for a folder.
#[derive(Deserialize)]
struct ResourceListing {
    #[serde(rename = "_embedded")]
    embedded: Option<EmbeddedItems>,
}

#[derive(Deserialize)]
struct EmbeddedItems {
    #[serde(default)]
    items: Vec<RemoteItem>,
}

/// Download endpoint response.
#[derive(Deserialize)]
struct DownloadLink {
    href: Option<String>,
}

/// Turn a user-typed folder name into the name used remotely and on disk.
///
/// Share links encode spaces as `%20`; those are decoded, and surrounding
/// slashes are dropped.
pub fn normalize_folder_name(raw: &str) -> String {
    raw.replace("%20", " ").trim_matches('/').to_string()
}

/// Client for one public share.
pub struct PublicDiskClient {
    api_base: String,
    public_key: String,
    page_limit: u32,
    client: reqwest::Client,
}

impl PublicDiskClient {
    pub fn new(config: &RemoteConfig) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            public_key: config.public_key.clone(),
            page_limit: config.page_limit,
            client: reqwest::Client::new(),
        }
    }

    /// URL of the folder listing request.
    pub fn listing_url(&self, folder: &str) -> Result<Url, RemoteError> {
        let path = format!("/{}", normalize_folder_name(folder));
        let limit = self.page_limit.to_string();
        self.build_url(
            &self.api_base,
            &[
                ("public_key", self.public_key.as_str()),
                ("path", path.as_str()),
                ("limit", limit.as_str()),
            ],
        )
    }

    /// URL of the request that resolves a signed download link for `path`.
    pub fn download_link_url(&self, path: &str) -> Result<Url, RemoteError> {
        let endpoint = format!("{}/download", self.api_base);
        self.build_url(
            &endpoint,
            &[("public_key", self.public_key.as_str()), ("path", path)],
        )
    }

    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, RemoteError> {
        Url::parse_with_params(endpoint, params).map_err(|e| RemoteError::Http {
            url: endpoint.to_string(),
            message: format!("Invalid URL: {e}"),
            status_code: None,
        })
    }

    /// Resolve the signed download link for a resource path.
    pub async fn download_link(&self, path: &str) -> Result<String, RemoteError> {
        let url = self.download_link_url(path)?;
        let link: DownloadLink = self.get_json(url).await?;
        let href = link.href.ok_or_else(|| RemoteError::MissingLink {
            path: path.to_string(),
        })?;
        tracing::debug!("Resolved download link for {}", path);
        Ok(href)
    }

    /// List the entries of a folder in the share.
    pub async fn list_folder(&self, folder: &str) -> Result<Vec<RemoteItem>, RemoteError> {
        let url = self.listing_url(folder)?;
        let listing: ResourceListing = self.get_json(url).await?;
        let items = listing.embedded.map(|e| e.items).unwrap_or_default();
        tracing::info!("Folder {:?}: {} entries", normalize_folder_name(folder), items.len());
        Ok(items)
    }

    /// Local directory a folder is downloaded into.
    pub fn local_folder(dest_root: &Path, folder: &str) -> PathBuf {
        dest_root.join(normalize_folder_name(folder))
    }

    /// Download one file entry into `dest_dir`, returning the written path.
    pub async fn download_item(
        &self,
        item: &RemoteItem,
        dest_dir: &Path,
    ) -> Result<PathBuf, RemoteError> {
        // Entry names come from the server; keep only the final component.
        let file_name = Path::new(&item.name)
            .file_name()
            .ok_or_else(|| RemoteError::MissingLink {
                path: item.path.clone(),
            })?;
        let dest = dest_dir.join(file_name);

        let link = match &item.file {
            Some(link) => link.clone(),
            None => self.download_link(&item.path).await?,
        };
        let bytes = self.download_file(&link, &dest).await?;
        tracing::debug!("Downloaded {} ({} bytes) to {:?}", item.name, bytes, dest);
        Ok(dest)
    }

    /// Download every file of a folder into `dest_root/<folder>`.
    ///
    /// Sub-folders are skipped. `on_item` is called after each file is
    /// written, with the number done so far and the folder's file count.
    /// Returns the written paths sorted.
    pub async fn download_folder<F>(
        &self,
        folder: &str,
        dest_root: &Path,
        mut on_item: F,
    ) -> Result<Vec<PathBuf>, RemoteError>
    where
        F: FnMut(&RemoteItem, usize, usize),
    {
        let items: Vec<RemoteItem> = self
            .list_folder(folder)
            .await?
            .into_iter()
            .filter(RemoteItem::is_file)
            .collect();
        let dest_dir = Self::local_folder(dest_root, folder);
        tokio::fs::create_dir_all(&dest_dir)
            .await
            .map_err(|source| RemoteError::Io {
                path: dest_dir.clone(),
                source,
            })?;

        let total = items.len();
        let mut written = Vec::with_capacity(total);
        for item in &items {
            written.push(self.download_item(item, &dest_dir).await?);
            on_item(item, written.len(), total);
        }
        written.sort();

        tracing::info!("Downloaded {} file(s) into {:?}", written.len(), dest_dir);
        Ok(written)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, RemoteError> {
        let url_str = url.to_string();
        tracing::debug!("GET {}", url_str);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| http_error(&url_str, e))?;
        let response = check_status(&url_str, response)?;
        response.json::<T>().await.map_err(|e| http_error(&url_str, e))
    }

    /// Stream `url` into `dest`, returning the number of bytes written.
    async fn download_file(&self, url: &str, dest: &Path) -> Result<u64, RemoteError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| http_error(url, e))?;
        let response = check_status(url, response)?;

        let io_error = |source: std::io::Error| RemoteError::Io {
            path: dest.to_path_buf(),
            source,
        };
        let mut file = tokio::fs::File::create(dest).await.map_err(io_error)?;
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| http_error(url, e))?;
            file.write_all(&chunk).await.map_err(io_error)?;
            downloaded += chunk.len() as u64;
        }

        file.flush().await.map_err(io_error)?;
        Ok(downloaded)
    }
}

fn check_status(url: &str, response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(RemoteError::Http {
        url: url.to_string(),
        message: format!("HTTP {status}"),
        status_code: Some(status.as_u16()),
    })
}

fn http_error(url: &str, error: reqwest::Error) -> RemoteError {
    RemoteError::Http {
        url: url.to_string(),
        message: error.to_string(),
        status_code: error.status().map(|s| s.as_u16()),
    }
}
