//! Display-only read-through cache over Redis.
//!
//! A failure here is treated as a cache miss, never a request failure.
//! Quota check-and-consume and version switching always go straight to
//! Postgres; only snapshot reads for display are served from here.

use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

#[derive(Clone)]
pub struct Cache {
    client: redis::Client,
}

impl Cache {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                debug!("cache unavailable: {e}");
                return None;
            }
        };
        let raw: Option<String> = match conn.get(key).await {
            Ok(value) => value,
            Err(e) => {
                debug!("cache get {key} failed: {e}");
                return None;
            }
        };
        raw.and_then(|s| serde_json::from_str(&s).ok())
    }

    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        let Ok(raw) = serde_json::to_string(value) else {
            return;
        };
        match self.client.get_multiplexed_async_connection().await {
            Ok(mut conn) => {
                if let Err(e) = conn.set_ex::<_, _, ()>(key, raw, ttl_secs).await {
                    debug!("cache set {key} failed: {e}");
                }
            }
            Err(e) => debug!("cache unavailable: {e}"),
        }
    }

    pub async fn del(&self, key: &str) {
        if let Ok(mut conn) = self.client.get_multiplexed_async_connection().await {
            if let Err(e) = conn.del::<_, ()>(key).await {
                debug!("cache del {key} failed: {e}");
            }
        }
    }
}
