// In crates/engine/src/feed.rs

use api_client::ApiClient;
use app_config::types::BinanceSettings;
use async_trait::async_trait;
use core_types::{Kline, Symbol};

/// Source of the most recent klines for the live loop.
#[async_trait]
pub trait KlineFeed: Send + Sync {
    /// The latest `limit` klines, oldest first. The last one may still be open.
    async fn latest_window(
        &self,
        symbol: &Symbol,
        interval: &str,
        limit: u16,
    ) -> anyhow::Result<Vec<Kline>>;

    /// Re-establishes the underlying connection.
    async fn reconnect(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Polls `GET /api/v3/klines` over REST.
pub struct RestKlineFeed {
    settings: BinanceSettings,
    client: ApiClient,
}

impl RestKlineFeed {
    pub fn new(settings: &BinanceSettings) -> anyhow::Result<Self> {
        Ok(Self {
            settings: settings.clone(),
            client: ApiClient::new(settings)?,
        })
    }
}

#[async_trait]
impl KlineFeed for RestKlineFeed {
    async fn latest_window(
        &self,
        symbol: &Symbol,
        interval: &str,
        limit: u16,
    ) -> anyhow::Result<Vec<Kline>> {
        Ok(self
            .client
            .get_klines(symbol, interval, None, None, Some(limit))
            .await?)
    }

    async fn reconnect(&mut self) -> anyhow::Result<()> {
        self.client = ApiClient::new(&self.settings)?;
        Ok(())
    }
}
