//! Boot and disk image loading.
//!
//! Runs on a helper thread so the foreground loop keeps servicing events while
//! the blobs are read; the result comes back as a message.

use crossbeam_channel::Sender;
use flate2::read::GzDecoder;
use harness_core::config::ResourceConfig;
use log::{debug, info};
use std::io::Read;
use std::sync::Arc;
use std::thread::JoinHandle;
use thiserror::Error;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not fetch {location}: {source}")]
    Fetch {
        location: String,
        source: std::io::Error,
    },

    #[error("could not decompress {location}: {source}")]
    Decompress {
        location: String,
        source: std::io::Error,
    },

    #[error("{location} is empty")]
    Empty { location: String },
}

/// Where blobs come from
pub trait Fetch: Send + Sync + 'static {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError>;
}

/// Reads blobs from the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFetch;

impl Fetch for FsFetch {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError> {
        std::fs::read(location).map_err(|source| LoadError::Fetch {
            location: location.to_string(),
            source,
        })
    }
}

/// Both blobs needed to build the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resources {
    pub bootloader: Vec<u8>,
    pub disk: Vec<u8>,
}

/// Transparently inflates gzip blobs; anything else passes through
pub fn decode(location: &str, bytes: Vec<u8>) -> Result<Vec<u8>, LoadError> {
    if !bytes.starts_with(&GZIP_MAGIC) {
        return Ok(bytes);
    }

    let mut data = Vec::new();
    GzDecoder::new(bytes.as_slice())
        .read_to_end(&mut data)
        .map_err(|source| LoadError::Decompress {
            location: location.to_string(),
            source,
        })?;
    debug!(
        "[loader] inflated {location}: {} -> {} bytes",
        bytes.len(),
        data.len()
    );
    Ok(data)
}

fn load_one(fetch: &dyn Fetch, location: &str) -> Result<Vec<u8>, LoadError> {
    let data = decode(location, fetch.fetch(location)?)?;
    if data.is_empty() {
        return Err(LoadError::Empty {
            location: location.to_string(),
        });
    }
    Ok(data)
}

/// Fetches both blobs; fails as soon as either does
pub fn load_resources(fetch: &dyn Fetch, config: &ResourceConfig) -> Result<Resources, LoadError> {
    info!("[loader] loading bootloader from {}", config.bootloader);
    let bootloader = load_one(fetch, &config.bootloader)?;
    info!("[loader] loading disk image from {}", config.disk);
    let disk = load_one(fetch, &config.disk)?;
    Ok(Resources { bootloader, disk })
}

#[derive(Clone)]
pub struct ResourceLoader {
    fetch: Arc<dyn Fetch>,
    config: ResourceConfig,
}

impl ResourceLoader {
    pub fn new(fetch: Arc<dyn Fetch>, config: ResourceConfig) -> Self {
        Self { fetch, config }
    }

    pub fn from_fs(config: ResourceConfig) -> Self {
        Self::new(Arc::new(FsFetch), config)
    }

    /// Loads on a helper thread and sends the outcome to `done`
    pub fn spawn(
        &self,
        done: Sender<Result<Resources, LoadError>>,
    ) -> std::io::Result<JoinHandle<()>> {
        let fetch = self.fetch.clone();
        let config = self.config.clone();
        std::thread::Builder::new()
            .name("harness-loader".into())
            .spawn(move || {
                let result = load_resources(fetch.as_ref(), &config);
                done.send(result).ok();
            })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::collections::HashMap;
    use std::io::Write;

    /// In-memory blobs keyed by location
    #[derive(Default)]
    pub(crate) struct MemFetch(pub HashMap<String, Vec<u8>>);

    impl MemFetch {
        pub(crate) fn with(mut self, location: &str, data: &[u8]) -> Self {
            self.0.insert(location.to_string(), data.to_vec());
            self
        }
    }

    impl Fetch for MemFetch {
        fn fetch(&self, location: &str) -> Result<Vec<u8>, LoadError> {
            self.0.get(location).cloned().ok_or_else(|| LoadError::Fetch {
                location: location.to_string(),
                source: std::io::ErrorKind::NotFound.into(),
            })
        }
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn resources() -> ResourceConfig {
        ResourceConfig {
            bootloader: "boot.bin".into(),
            disk: "disk.img.gz".into(),
        }
    }

    #[test]
    fn loads_plain_and_gzipped_blobs() {
        let fetch = MemFetch::default()
            .with("boot.bin", b"loader")
            .with("disk.img.gz", &gzip(b"a disk image"));

        let loaded = load_resources(&fetch, &resources()).unwrap();
        assert_eq!(loaded.bootloader, b"loader");
        assert_eq!(loaded.disk, b"a disk image");
    }

    #[test]
    fn missing_disk_fails_the_whole_load() {
        let fetch = MemFetch::default().with("boot.bin", b"loader");
        let err = load_resources(&fetch, &resources()).unwrap_err();
        assert!(matches!(err, LoadError::Fetch { ref location, .. } if location == "disk.img.gz"));
    }

    #[test]
    fn truncated_gzip_is_a_decompress_error() {
        let mut broken = gzip(b"a disk image that gets cut short");
        broken.truncate(broken.len() - 4);
        let fetch = MemFetch::default()
            .with("boot.bin", b"loader")
            .with("disk.img.gz", &broken);

        assert!(matches!(
            load_resources(&fetch, &resources()),
            Err(LoadError::Decompress { .. })
        ));
    }

    #[test]
    fn empty_blob_is_rejected() {
        let fetch = MemFetch::default()
            .with("boot.bin", b"")
            .with("disk.img.gz", b"disk");
        assert!(matches!(
            load_resources(&fetch, &resources()),
            Err(LoadError::Empty { .. })
        ));
    }

    #[test]
    fn spawned_loader_reports_back() {
        let fetch = MemFetch::default()
            .with("boot.bin", b"loader")
            .with("disk.img.gz", b"disk");
        let loader = ResourceLoader::new(Arc::new(fetch), resources());
        let (tx, rx) = crossbeam_channel::bounded(1);

        loader.spawn(tx).unwrap().join().unwrap();
        let loaded = rx.recv().unwrap().unwrap();
        assert_eq!(loaded.disk, b"disk");
    }
}
