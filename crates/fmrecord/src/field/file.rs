//! Remote and stored file references

use md5::{Digest, Md5};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};
use url::{ParseError, Url};

use crate::error::Result;
use crate::value::Value;

/// File content together with its storage name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

/// Retrieves remote file content
pub trait Fetch: Send + Sync {
    /// Content and mimetype for `url`, or `None` on any failure
    fn fetch(&self, url: &Url) -> Option<(Vec<u8>, String)>;
}

/// Stores files and maps their names to public URLs
pub trait Storage: Send + Sync {
    fn url(&self, name: &str) -> String;

    fn open(&self, path: &str) -> Result<StoredFile>;
}

/// Default number of fetch attempts
pub const DEFAULT_RETRIES: u32 = 5;

/// Where file fields fetch from and store to
#[derive(Clone)]
pub struct FileSource {
    pub base_url: Option<Url>,
    pub retries: u32,
    pub fetch: Arc<dyn Fetch>,
    pub storage: Arc<dyn Storage>,
}

impl fmt::Debug for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileSource")
            .field("base_url", &self.base_url)
            .field("retries", &self.retries)
            .finish_non_exhaustive()
    }
}

impl FileSource {
    pub fn new(fetch: Arc<dyn Fetch>, storage: Arc<dyn Storage>) -> Self {
        Self {
            base_url: None,
            retries: DEFAULT_RETRIES,
            fetch,
            storage,
        }
    }

    /// Resolve `raw` against the base URL and fetch it, naming the result by
    /// content hash
    pub(crate) fn load(&self, raw: &Value, image: bool) -> std::result::Result<Value, String> {
        let text = if raw.is_null() { String::new() } else { raw.to_text() };
        let url = resolve_url(&text, self.base_url.as_ref())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("Unable to obtain file via \"{}\"", url.scheme()));
        }

        let mut fetched = None;
        for attempt in 1..=self.retries {
            match self.fetch.fetch(&url) {
                Some(result) => {
                    fetched = Some(result);
                    break;
                }
                None => warn!(attempt, url = %redacted(&url), "file fetch failed"),
            }
        }
        let Some((content, mime)) = fetched else {
            return Err(format!("Could not get file from: {}", redacted(&url)));
        };

        let mime = normalize_mime(&mime);
        if image && mime.split('/').next() != Some("image") {
            return Err(format!("\"{mime}\" is not a valid image type."));
        }
        let digest = hex::encode(Md5::digest(&content));
        let name = format!("{}{}", digest.get(..20).unwrap_or_default(), extension_for(&mime));
        debug!(%name, %mime, bytes = content.len(), "fetched file");

        Ok(Value::File(StoredFile {
            name,
            content_type: Some(mime),
            content,
        }))
    }
}

/// Storage for files that were uploaded out of band
#[derive(Clone)]
pub struct UploadSource {
    pub storage: Arc<dyn Storage>,
}

impl fmt::Debug for UploadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadSource").finish_non_exhaustive()
    }
}

impl UploadSource {
    pub(crate) fn open(&self, raw: &Value) -> std::result::Result<Value, String> {
        let text = raw.to_text();
        let full = match Url::parse(text.trim()) {
            Ok(url) => url.path().to_string(),
            Err(_) => text.split(['?', '#']).next().unwrap_or_default().to_string(),
        };
        let path = full.trim_start_matches(|c: char| c.is_whitespace() || c == '/' || c == '.');
        self.storage
            .open(path)
            .map(Value::File)
            .map_err(|_| format!("Could not open file \"{path}\"."))
    }
}

/// Map stored names to URLs, or `None` when the value holds no file
pub(crate) fn storage_url(storage: &dyn Storage, value: &Value) -> Option<String> {
    match value {
        Value::File(file) if !file.name.is_empty() => Some(storage.url(&file.name)),
        _ => None,
    }
}

fn normalize_mime(mime: &str) -> String {
    let mime = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
    match mime.as_str() {
        "image/jpeg" | "image/jpe" | "image/jpg" => "image/jpg".to_string(),
        _ => mime,
    }
}

/// File extension (with leading dot) for a mimetype, empty when unknown
pub fn extension_for(mime: &str) -> &'static str {
    match mime {
        "image/jpg" | "image/jpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/bmp" => ".bmp",
        "image/tiff" => ".tiff",
        "image/webp" => ".webp",
        "image/svg+xml" => ".svg",
        "image/x-icon" | "image/vnd.microsoft.icon" => ".ico",
        "application/pdf" => ".pdf",
        "application/json" => ".json",
        "application/xml" | "text/xml" => ".xml",
        "application/zip" => ".zip",
        "application/msword" => ".doc",
        "application/vnd.ms-excel" => ".xls",
        "application/octet-stream" => ".bin",
        "text/plain" => ".txt",
        "text/html" => ".html",
        "text/csv" => ".csv",
        "audio/mpeg" => ".mp3",
        "video/mp4" => ".mp4",
        "video/quicktime" => ".mov",
        _ => "",
    }
}

/// Resolve a file reference against `base`
///
/// Relative references are joined onto the base. Absolute ones keep their own
/// scheme and host, but take the base credentials when they carry none.
pub fn resolve_url(raw: &str, base: Option<&Url>) -> std::result::Result<Url, String> {
    let raw = raw.trim();
    let mut url = match (Url::parse(raw), base) {
        (Ok(url), _) => url,
        (Err(ParseError::RelativeUrlWithoutBase), Some(base)) => base
            .join(raw)
            .map_err(|err| format!("Could not determine file url: {err}"))?,
        (Err(ParseError::RelativeUrlWithoutBase), None) => {
            return Err("Unable to obtain file via \"\"".to_string())
        }
        (Err(err), _) => return Err(format!("Could not determine file url: {err}")),
    };
    let Some(base) = base else {
        return Ok(url);
    };
    let base_has_auth = !base.username().is_empty() || base.password().is_some();
    if base_has_auth && url.username().is_empty() && url.password().is_none() && url.has_host() {
        url.set_username(base.username())
            .and_then(|()| url.set_password(base.password()))
            .map_err(|()| "Could not determine file url.".to_string())?;
    }
    Ok(url)
}

/// `url` with any credentials removed, for logs and messages
pub fn redacted(url: &Url) -> Url {
    let mut url = url.clone();
    if url.has_host() {
        url.set_username("").ok();
        url.set_password(None).ok();
    }
    url
}
