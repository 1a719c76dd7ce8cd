use err_derive::Error;
use log::*;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::documents::{HasMeta, Version};
use crate::ids::{Entity, Id, DIVIDER};

#[derive(Debug, Error)]
pub enum Error {
    #[error(display = "stale version")]
    Concurrency,
    #[error(display = "storage: {}", _0)]
    Store(#[error(source)] sled::Error),
    #[error(display = "codec: {}", _0)]
    Codec(#[error(source)] serde_json::Error),
}

/// What consumers need from a document store.
pub trait Storage {
    fn save<D>(&self, document: &mut D) -> Result<(), Error>
    where
        D: Entity + HasMeta + Serialize;
    fn load<D>(&self, id: &Id<D>) -> Result<Option<D>, Error>
    where
        D: Entity + DeserializeOwned;
    fn all<D>(&self) -> Result<Vec<D>, Error>
    where
        D: Entity + DeserializeOwned;
    /// Durably persists everything written so far.
    fn flush(&self) -> Result<(), Error>;
}

/// A JSON document store over an embedded [`sled`] tree, keyed by the
/// document id's display form. Saves are guarded by an optimistic version
/// check: a fresh document (version zero) must insert, an update must match
/// the stored version, and either bumps the version on success.
#[derive(Debug, Clone)]
pub struct Documents {
    db: sled::Db,
}

impl Documents {
    pub fn new(db: sled::Db) -> Self {
        Documents { db }
    }
}

fn stored_version(bytes: &[u8]) -> Result<Version, Error> {
    let body: serde_json::Value = serde_json::from_slice(bytes)?;
    Ok(body
        .get("_version")
        .and_then(|v| v.as_u64())
        .map(Version::from)
        .unwrap_or_default())
}

impl Storage for Documents {
    fn save<D>(&self, document: &mut D) -> Result<(), Error>
    where
        D: Entity + HasMeta + Serialize,
    {
        let key = document.meta().id.to_string();
        let current = self.db.get(key.as_bytes())?;
        let current_version = match current {
            Some(ref bytes) => Some(stored_version(bytes)?),
            None => None,
        };
        let version = document.meta().version;
        let consistent = match current_version {
            None => version.is_initial(),
            Some(stored) => stored == version,
        };
        if !consistent {
            warn!(
                "Version conflict on {}: stored {:?}, saving {:?}",
                key, current_version, version
            );
            return Err(Error::Concurrency);
        }

        document.meta_mut().version = version.next();
        let json = serde_json::to_vec(document)?;
        self.db.insert(key.as_bytes(), json)?;
        debug!("Saved {} at {:?}", key, document.meta().version);
        Ok(())
    }

    fn load<D>(&self, id: &Id<D>) -> Result<Option<D>, Error>
    where
        D: Entity + DeserializeOwned,
    {
        let key = id.to_string();
        match self.db.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn all<D>(&self) -> Result<Vec<D>, Error>
    where
        D: Entity + DeserializeOwned,
    {
        let prefix = format!("{}{}", D::PREFIX, DIVIDER);
        let mut documents = Vec::new();
        for row in self.db.scan_prefix(prefix.as_bytes()) {
            let (_key, bytes) = row?;
            documents.push(serde_json::from_slice(&bytes)?);
        }
        Ok(documents)
    }

    fn flush(&self) -> Result<(), Error> {
        self.db.flush()?;
        Ok(())
    }
}

/// Hands out [`Documents`] handles over one shared tree, so callers can keep
/// using an `r2d2` pool the way they would with a remote store.
#[derive(Debug, Clone)]
pub struct DocumentConnectionManager {
    db: sled::Db,
}

impl DocumentConnectionManager {
    pub fn new(db: sled::Db) -> Self {
        DocumentConnectionManager { db }
    }
}

impl r2d2::ManageConnection for DocumentConnectionManager {
    type Connection = Documents;
    type Error = Error;

    fn connect(&self) -> Result<Documents, Error> {
        Ok(Documents::new(self.db.clone()))
    }

    fn is_valid(&self, conn: &mut Documents) -> Result<(), Error> {
        conn.db.size_on_disk()?;
        Ok(())
    }

    fn has_broken(&self, _conn: &mut Documents) -> bool {
        false
    }
}
