use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    config::AppConfig,
    objects::{DiskObjects, ObjectStore, S3Objects},
    reminders::notify::{LogNotifier, Notifier},
    store::{MemStore, PgStore, Store},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub objects: Arc<dyn ObjectStore>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match &config.database_url {
            Some(url) => {
                info!("using PostgreSQL store");
                Arc::new(PgStore::connect(url).await?) as Arc<dyn Store>
            }
            None => {
                warn!("DATABASE_URL not set; data is kept in memory only");
                Arc::new(MemStore::new()) as Arc<dyn Store>
            }
        };

        let objects = match &config.minio {
            Some(minio) => {
                info!(endpoint = %minio.endpoint, bucket = %minio.bucket, "using S3 object store");
                Arc::new(S3Objects::new(minio).await?) as Arc<dyn ObjectStore>
            }
            None => {
                info!(dir = %config.upload_dir, "using local upload directory");
                Arc::new(DiskObjects::new(&config.upload_dir)) as Arc<dyn ObjectStore>
            }
        };

        Ok(Self::from_parts(store, config, objects, Arc::new(LogNotifier)))
    }

    pub fn from_parts(
        store: Arc<dyn Store>,
        config: Arc<AppConfig>,
        objects: Arc<dyn ObjectStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            config,
            objects,
            notifier,
        }
    }

    /// In-memory state for tests: fresh store, in-memory objects, recording notifier.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::SessionConfig;
        use crate::reminders::notify::RecordingNotifier;
        use async_trait::async_trait;
        use bytes::Bytes;
        use std::collections::HashMap;
        use tokio::sync::Mutex;

        #[derive(Default)]
        struct FakeObjects {
            blobs: Mutex<HashMap<String, Bytes>>,
        }
        #[async_trait]
        impl ObjectStore for FakeObjects {
            async fn put_object(&self, k: &str, b: Bytes, _ct: &str) -> anyhow::Result<()> {
                self.blobs.lock().await.insert(k.to_string(), b);
                Ok(())
            }
            async fn delete_object(&self, k: &str) -> anyhow::Result<()> {
                self.blobs.lock().await.remove(k);
                Ok(())
            }
            async fn url(&self, k: &str) -> anyhow::Result<String> {
                Ok(format!("https://fake.local/{}", k))
            }
        }

        let config = Arc::new(AppConfig {
            database_url: None,
            host: "127.0.0.1".into(),
            port: 0,
            session: SessionConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                secure_cookie: false,
            },
            upload_dir: "uploads".into(),
            minio: None,
            reminder_check_interval_secs: 0,
        });

        Self::from_parts(
            Arc::new(MemStore::new()),
            config,
            Arc::new(FakeObjects::default()),
            Arc::new(RecordingNotifier::default()),
        )
    }
}
