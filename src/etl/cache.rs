use std::fs;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use log::info;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::errors::{Error, Result};

pub const DEFAULT_ENDPOINT: &str = "http://overpass-api.de/api/interpreter";

/// Sends one query to the upstream service and returns the raw response body.
/// A single attempt; non-success statuses are errors.
pub trait Transport {
    fn post(&self, query: &str) -> Result<Vec<u8>>;
}

pub struct HttpTransport {
    agent: ureq::Agent,
    url: String,
}

impl HttpTransport {
    pub fn new(url: &str) -> HttpTransport {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();
        HttpTransport {
            agent,
            url: url.to_string(),
        }
    }
}

impl Transport for HttpTransport {
    fn post(&self, query: &str) -> Result<Vec<u8>> {
        let mut response = self.agent.post(&self.url)
            .header("Content-Type", "text/plain; charset=utf-8")
            .send(query)?;
        let status = response.status();
        let body = response.body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()?;
        if !status.is_success() {
            return Err(Error::network(format!(
                "{} returned status {}: {}",
                self.url,
                status.as_u16(),
                String::from_utf8_lossy(&body)
            )));
        }
        Ok(body)
    }
}

/// Content-addressed store of upstream responses. Entries never expire.
pub struct QueryCache<T: Transport> {
    dir: PathBuf,
    transport: T,
}

impl<T: Transport> QueryCache<T> {
    pub fn new(dir: &Path, transport: T) -> Result<QueryCache<T>> {
        fs::create_dir_all(dir)
            .map_err(|err| Error::from(err).context(format!("creating cache dir {}", dir.display())))?;
        Ok(QueryCache {
            dir: dir.to_path_buf(),
            transport,
        })
    }

    pub fn fetch(&self, query: &str) -> Result<Vec<u8>> {
        let key = cache_key(query);
        let path = self.dir.join(&key);
        match fs::read(&path) {
            Ok(body) => {
                info!(cache_key = key.as_str(); "Query served from cache");
                return Ok(body);
            }
            Err(err) if err.kind() == IoErrorKind::NotFound => (),
            Err(err) => {
                return Err(Error::from(err).context(format!("reading cache entry {}", path.display())))
            }
        }

        info!(cache_key = key.as_str(); "Query not cached, requesting upstream");
        let body = self.transport.post(query)?;
        self.store(&path, &body)?;
        info!(cache_key = key.as_str(), bytes = body.len(); "Query response cached");
        Ok(body)
    }

    /// Writes through a synced temporary file so a crash never leaves a
    /// truncated entry under a valid key.
    fn store(&self, path: &Path, body: &[u8]) -> Result<()> {
        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(body)?;
        file.as_file().sync_all()?;
        file.persist(path)?;
        Ok(())
    }
}

/// URL-safe base64 of the SHA-256 digest of the exact query text.
pub fn cache_key(query: &str) -> String {
    URL_SAFE.encode(Sha256::digest(query.as_bytes()))
}
