use std::sync::Arc;

use async_trait::async_trait;
use fred::prelude::{Builder, Client, ClientLike, Config, KeysInterface};
use sticky_cart_core::Session;

use super::{SessionStorage, SessionStorageError, decode_session, encode_session};

/// A Redis session storage implementation.
///
/// Each session is a plain string key (`SET`/`GET`/`DEL`) holding the JSON
/// record. Keys never expire; a session lives until it is overwritten or deleted.
///
/// Generic over the `fred` client so a `Pool` can be used in place of a
/// single `Client`.
#[derive(Clone, Debug)]
pub struct RedisSessionStorage<C: KeysInterface + Send + Sync = Client> {
    client: Arc<C>,
}

impl<C> RedisSessionStorage<C>
where
    C: KeysInterface + Send + Sync,
{
    pub const fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

impl RedisSessionStorage<Client> {
    /// Connect to the Redis server at `url` and wait for the connection.
    ///
    /// # Errors
    ///
    /// Returns `SessionStorageError::Backend` if the URL is invalid or the
    /// server cannot be reached.
    pub async fn connect(url: &str) -> Result<Self, SessionStorageError> {
        let config = Config::from_url(url).map_err(backend)?;
        let client = Builder::from_config(config).build().map_err(backend)?;
        client.init().await.map_err(backend)?;

        tracing::info!("Connected to session cache");
        Ok(Self::new(Arc::new(client)))
    }
}

fn backend(err: fred::error::Error) -> SessionStorageError {
    SessionStorageError::Backend(err.to_string())
}

#[async_trait]
impl<C> SessionStorage for RedisSessionStorage<C>
where
    C: KeysInterface + Send + Sync + 'static,
{
    async fn store(&self, session: &Session) -> Result<bool, SessionStorageError> {
        let value = encode_session(session)?;
        let _: () = self
            .client
            .set(session.id.as_str(), value, None, None, false)
            .await
            .map_err(backend)?;
        Ok(true)
    }

    async fn load(&self, id: &str) -> Result<Option<Session>, SessionStorageError> {
        let value: Option<String> = self.client.get(id).await.map_err(backend)?;
        value.as_deref().map(decode_session).transpose()
    }

    async fn delete(&self, id: &str) -> Result<bool, SessionStorageError> {
        let removed: i64 = self.client.del(id).await.map_err(backend)?;
        Ok(removed > 0)
    }
}
