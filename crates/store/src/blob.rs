use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use futures::TryStreamExt;
use logdigest_core::error::{DigestError, Result};
use object_store::azure::MicrosoftAzureBuilder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use percent_encoding::percent_decode_str;

use crate::connection::{AzureConnection, Backend, parse_backend};

#[derive(Clone)]
pub struct Store {
    inner: Arc<dyn ObjectStore>,
    location: String,
}

impl Store {
    pub fn open(connection: &str, container: &str) -> Result<Self> {
        match parse_backend(connection)? {
            Backend::Azure(conn) => Self::open_azure(&conn, container),
            Backend::Local(root) => Self::open_local(&root.join(container)),
            Backend::Memory => Ok(Self::open_in_memory()),
        }
    }

    pub fn open_local(root: &Path) -> Result<Self> {
        fs::create_dir_all(root).map_err(|e| {
            DigestError::StorageUnavailable(format!(
                "failed to create container dir {}: {e}",
                root.display()
            ))
        })?;
        let fs_store = LocalFileSystem::new_with_prefix(root).map_err(|e| {
            DigestError::StorageUnavailable(format!("failed to open {}: {e}", root.display()))
        })?;
        Ok(Self {
            inner: Arc::new(fs_store),
            location: format!("file://{}", root.display()),
        })
    }

    pub fn open_in_memory() -> Self {
        Self {
            inner: Arc::new(InMemory::new()),
            location: "memory://".to_string(),
        }
    }

    fn open_azure(conn: &AzureConnection, container: &str) -> Result<Self> {
        let mut builder = MicrosoftAzureBuilder::new()
            .with_container_name(container)
            .with_use_emulator(conn.use_emulator);
        if let Some(account) = &conn.account {
            builder = builder.with_account(account);
        }
        if let Some(key) = &conn.access_key {
            builder = builder.with_access_key(key);
        }
        if let Some(endpoint) = &conn.endpoint {
            builder = builder.with_endpoint(endpoint.clone());
        }
        let azure = builder
            .build()
            .map_err(|e| DigestError::Config(format!("invalid azure storage settings: {e}")))?;

        let account = conn.account.as_deref().unwrap_or("devstoreaccount1");
        Ok(Self {
            inner: Arc::new(azure),
            location: format!("azure://{account}/{container}"),
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub async fn list(&self, prefix: &str) -> Result<Vec<ObjectName>> {
        // Backend prefixes are whole path segments, so list the enclosing
        // directory and filter on the raw string.
        let dir = prefix.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
        let dir_path = (!dir.is_empty()).then(|| ObjectPath::from(dir));

        let listed = self
            .inner
            .list(dir_path.as_ref())
            .try_collect::<Vec<_>>()
            .await;
        let metas = match listed {
            Ok(metas) => metas,
            Err(object_store::Error::NotFound { .. }) => Vec::new(),
            Err(e) => {
                return Err(DigestError::StorageUnavailable(format!(
                    "list {prefix} failed: {e}"
                )));
            }
        };

        let mut objects = metas
            .into_iter()
            .map(|meta| ObjectName::from_location(meta.location))
            .filter(|object| object.name.starts_with(prefix))
            .collect::<Vec<_>>();
        objects.sort_by(|a, b| a.name.cmp(&b.name));
        tracing::debug!(prefix, count = objects.len(), "listed objects");
        Ok(objects)
    }

    pub async fn download(&self, object: impl Into<ObjectName>) -> Result<Bytes> {
        let object = object.into();
        let result = self.inner.get(&object.location).await.map_err(|e| {
            DigestError::StorageUnavailable(format!("get {} failed: {e}", object.name))
        })?;
        result.bytes().await.map_err(|e| {
            DigestError::StorageUnavailable(format!("read {} failed: {e}", object.name))
        })
    }

    pub async fn upload(&self, name: &str, body: impl Into<Bytes>) -> Result<()> {
        let path = ObjectPath::from(name);
        let payload = PutPayload::from(body.into());
        self.inner
            .put(&path, payload)
            .await
            .map_err(|e| DigestError::StorageUnavailable(format!("put {name} failed: {e}")))?;
        Ok(())
    }
}

/// An object as listed: the decoded name callers see, and the backend key it
/// is fetched by. Keys may carry percent-encoding the name does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectName {
    name: String,
    location: ObjectPath,
}

impl ObjectName {
    fn from_location(location: ObjectPath) -> Self {
        let name = percent_decode_str(location.as_ref())
            .decode_utf8_lossy()
            .into_owned();
        Self { name, location }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl From<&str> for ObjectName {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_string(),
            location: ObjectPath::from(name),
        }
    }
}

impl From<&ObjectName> for ObjectName {
    fn from(object: &ObjectName) -> Self {
        object.clone()
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
