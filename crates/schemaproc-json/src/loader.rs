//! # Schema Loader
//!
//! Resolves schema identifiers to raw bytes.
//!
//! | Identifier | Source |
//! |------------|--------|
//! | `file:///abs/path.json` | local file |
//! | `schemas/kyc.json`, `/abs/kyc.json` | local file, relative paths joined to the schema directory |
//! | `http://…`, `https://…` | HTTP GET, retried on transport errors |
//!
//! Any other scheme is rejected. The returned format tag is the lowercase
//! extension of the last path segment (`"json"`, `"jsonld"`, `"yaml"`), or
//! empty when there is none.

use std::path::{Path, PathBuf};
use std::time::Duration;

use schemaproc_core::{BoxError, LoadedSchema, SchemaLoader};
use thiserror::Error;
use url::Url;

use crate::config::LoaderConfig;
use crate::retry::{retry_send, RetryPolicy};

/// Error while loading a schema.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The identifier uses a scheme this loader does not handle.
    #[error("unsupported scheme '{scheme}' in '{url}'")]
    UnsupportedScheme { url: String, scheme: String },

    /// The identifier looks like a URL but does not parse as one.
    #[error("invalid schema URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Remote loading is disabled by configuration.
    #[error("remote schema loading is disabled: '{url}'")]
    RemoteDisabled { url: String },

    /// Local schema file could not be read.
    #[error("cannot read schema file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// HTTP transport error after all retries.
    #[error("HTTP error fetching '{url}': {source}")]
    Http { url: String, source: reqwest::Error },

    /// Server answered with a non-2xx status.
    #[error("'{url}' returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The HTTP client could not be constructed.
    #[error("cannot build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Blocking HTTP fetcher with retry.
#[derive(Debug, Clone)]
struct HttpFetcher {
    client: reqwest::blocking::Client,
    retry: RetryPolicy,
}

impl HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<Vec<u8>, LoadError> {
        let resp = retry_send(&self.retry, || self.client.get(url.clone()).send()).map_err(
            |source| LoadError::Http {
                url: url.to_string(),
                source,
            },
        )?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(LoadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().map_err(|source| LoadError::Http {
            url: url.to_string(),
            source,
        })?;
        Ok(bytes.to_vec())
    }
}

/// Loads schemas from the filesystem and, when allowed, over HTTP.
#[derive(Debug, Clone)]
pub struct UriLoader {
    schema_dir: PathBuf,
    http: Option<HttpFetcher>,
}

impl UriLoader {
    /// A loader for local files only, resolving relative paths under `schema_dir`.
    pub fn local(schema_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_dir: schema_dir.into(),
            http: None,
        }
    }

    /// Build a loader from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Client`] if remote loading is enabled and the
    /// HTTP client cannot be built.
    pub fn from_config(config: &LoaderConfig) -> Result<Self, LoadError> {
        let http = if config.allow_remote {
            let client = reqwest::blocking::Client::builder()
                .timeout(Duration::from_secs(config.http_timeout_secs))
                .build()
                .map_err(LoadError::Client)?;
            Some(HttpFetcher {
                client,
                retry: config.retry_policy(),
            })
        } else {
            None
        };
        Ok(Self {
            schema_dir: config.schema_dir.clone(),
            http,
        })
    }

    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    pub fn allows_remote(&self) -> bool {
        self.http.is_some()
    }

    /// Load the schema identified by `id`.
    pub fn load_schema(&self, id: &str) -> Result<LoadedSchema, LoadError> {
        if !id.contains("://") {
            return self.read_file(&self.resolve_path(Path::new(id)));
        }

        let url = Url::parse(id).map_err(|e| LoadError::InvalidUrl {
            url: id.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "file" => {
                let path = url.to_file_path().map_err(|()| LoadError::InvalidUrl {
                    url: id.to_string(),
                    reason: "not a local file path".to_string(),
                })?;
                self.read_file(&path)
            }
            "http" | "https" => {
                let http = self.http.as_ref().ok_or_else(|| LoadError::RemoteDisabled {
                    url: id.to_string(),
                })?;
                tracing::debug!(url = %url, "fetching remote schema");
                let bytes = http.fetch(&url)?;
                let segment = url
                    .path_segments()
                    .and_then(|mut segments| segments.next_back())
                    .unwrap_or("");
                Ok(LoadedSchema::new(bytes, extension_of(Path::new(segment))))
            }
            other => Err(LoadError::UnsupportedScheme {
                url: id.to_string(),
                scheme: other.to_string(),
            }),
        }
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.schema_dir.join(path)
        }
    }

    fn read_file(&self, path: &Path) -> Result<LoadedSchema, LoadError> {
        tracing::debug!(path = %path.display(), "reading schema file");
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(LoadedSchema::new(bytes, extension_of(path)))
    }
}

impl SchemaLoader for UriLoader {
    fn load(&self, url: &str) -> Result<LoadedSchema, BoxError> {
        Ok(self.load_schema(url)?)
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn relative_path_resolves_under_schema_dir() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "kyc/age.json", r#"{"type":"object"}"#);
        let loader = UriLoader::local(tmp.path());

        let schema = loader.load_schema("kyc/age.json").unwrap();
        assert_eq!(schema.bytes, br#"{"type":"object"}"#);
        assert_eq!(schema.extension, "json");
    }

    #[test]
    fn file_url_is_read_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write(tmp.path(), "Credential.JSONLD", "{}");
        let url = Url::from_file_path(&path).unwrap();
        let loader = UriLoader::local("/nonexistent");

        let schema = loader.load_schema(url.as_str()).unwrap();
        assert_eq!(schema.bytes, b"{}");
        assert_eq!(schema.extension, "jsonld");
    }

    #[test]
    fn missing_file_is_io_error_with_path() {
        let tmp = tempfile::tempdir().unwrap();
        let loader = UriLoader::local(tmp.path());
        let err = loader.load_schema("absent.json").unwrap_err();
        match err {
            LoadError::Io { path, .. } => assert!(path.ends_with("absent.json")),
            other => panic!("expected Io, got: {other}"),
        }
    }

    #[test]
    fn file_without_extension_has_empty_tag() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "schema", "{}");
        let schema = UriLoader::local(tmp.path()).load_schema("schema").unwrap();
        assert_eq!(schema.extension, "");
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        let loader = UriLoader::local(".");
        let err = loader.load_schema("ipfs://QmHash/schema.json").unwrap_err();
        assert!(
            matches!(err, LoadError::UnsupportedScheme { ref scheme, .. } if scheme == "ipfs"),
            "got: {err}"
        );
    }

    #[test]
    fn remote_disabled_for_local_loader() {
        let loader = UriLoader::local(".");
        assert!(!loader.allows_remote());
        let err = loader
            .load_schema("https://example.com/schema.json")
            .unwrap_err();
        assert!(matches!(err, LoadError::RemoteDisabled { .. }));
    }

    #[test]
    fn malformed_url_is_rejected() {
        let err = UriLoader::local(".").load_schema("http://[::1/x").unwrap_err();
        assert!(matches!(err, LoadError::InvalidUrl { .. }));
    }

    #[test]
    fn from_config_respects_allow_remote() {
        let cfg = LoaderConfig {
            allow_remote: false,
            ..LoaderConfig::default()
        };
        assert!(!UriLoader::from_config(&cfg).unwrap().allows_remote());
    }

    #[test]
    fn trait_impl_boxes_load_error() {
        let loader = UriLoader::local(".");
        let err = SchemaLoader::load(&loader, "ftp://host/x.json").unwrap_err();
        assert!(err.downcast_ref::<LoadError>().is_some());
    }
}
