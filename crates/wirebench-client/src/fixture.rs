use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;
use wirebench_model::PayloadSizeClass;

use crate::ClientError;

/// Serialized JSON and XML documents of one size class, sent verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub json: Bytes,
    pub xml: Bytes,
}

impl Fixture {
    pub fn new(json: impl Into<Bytes>, xml: impl Into<Bytes>) -> Self {
        Self {
            json: json.into(),
            xml: xml.into(),
        }
    }
}

/// Provides the fixture pair of a size class.
///
/// A load error aborts the whole run: measurements without fixtures are meaningless.
pub trait FixtureSource {
    fn load(&self, size: &PayloadSizeClass) -> Result<Fixture, ClientError>;
}

/// Reads `<dir>/<size>_JSON.json` and `<dir>/<size>_XML.xml`.
#[derive(Debug, Clone)]
pub struct FsFixtures {
    dir: PathBuf,
}

impl FsFixtures {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn json_path(&self, size: &PayloadSizeClass) -> PathBuf {
        self.dir.join(format!("{size}_JSON.json"))
    }

    pub fn xml_path(&self, size: &PayloadSizeClass) -> PathBuf {
        self.dir.join(format!("{size}_XML.xml"))
    }
}

impl FixtureSource for FsFixtures {
    fn load(&self, size: &PayloadSizeClass) -> Result<Fixture, ClientError> {
        let json = read(self.json_path(size))?;
        let xml = read(self.xml_path(size))?;
        debug!(%size, json_bytes = json.len(), xml_bytes = xml.len(), "fixtures loaded");
        Ok(Fixture::new(json, xml))
    }
}

fn read(path: PathBuf) -> Result<Vec<u8>, ClientError> {
    std::fs::read(&path).map_err(|source| ClientError::Fixture { path, source })
}
