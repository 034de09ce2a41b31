// src/store.rs - RedisTimeSeries client plus the key/channel naming scheme
use log::info;
use redis::aio::{MultiplexedConnection, PubSub};

use crate::config::AppConfig;
use crate::types::TimeSeriesPoint;

/// Keyspace notification channel prefix for db 0.
pub const KEYSPACE_PREFIX: &str = "__keyspace@0__:";
/// Series suffix whose writes drive detection: last trade of the 1-minute bid bar.
pub const CHANNEL_SUFFIX: &str = ":BID:1_MIN:LAST";
/// Glob pattern the subscriber listens on.
/// e.g. __keyspace@0__:CS.D.CRYPTOB10.CFD.IP:BID:1_MIN:LAST
pub const CHANNEL_PATTERN: &str = "__keyspace@0__:*:BID:1_MIN:LAST";
/// Payload that asks the subscriber to shut down.
pub const STOPWORD: &str = "STOP";

/// Per-field series of the 1-minute bid bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarField {
    First,
    Max,
    Min,
    Last,
    Count,
}

impl BarField {
    pub fn as_str(&self) -> &'static str {
        match self {
            BarField::First => "FIRST",
            BarField::Max => "MAX",
            BarField::Min => "MIN",
            BarField::Last => "LAST",
            BarField::Count => "COUNT",
        }
    }
}

/// `{instrument}:BID:1_MIN:{FIELD}`
pub fn series_key(instrument: &str, field: BarField) -> String {
    format!("{}:BID:1_MIN:{}", instrument, field.as_str())
}

/// `{instrument}:{SIDE}`, SIDE one of BID / OFR.
pub fn latest_price_key(instrument: &str, side: &str) -> String {
    format!("{}:{}", instrument, side)
}

/// Invert the channel naming convention exactly: prefix + instrument + suffix.
/// Returns None for anything that does not match, so a malformed channel can
/// be logged and dropped without touching the store.
pub fn instrument_from_channel(channel: &str) -> Option<&str> {
    channel
        .strip_prefix(KEYSPACE_PREFIX)?
        .strip_suffix(CHANNEL_SUFFIX)
        .filter(|epic| !epic.is_empty())
}

/// Shared handle to the time-series store. The multiplexed connection is
/// cheap to clone and safe for concurrent callers, so every detection worker
/// can hold the same store.
#[derive(Clone)]
pub struct TimeSeriesStore {
    client: redis::Client,
    conn: MultiplexedConnection,
}

impl TimeSeriesStore {
    pub async fn connect(config: &AppConfig) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(config.redis_url())?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        info!("Connected to redis timeseries at {}", config.redis_host);
        Ok(Self { client, conn })
    }

    /// `TS.RANGE key from to` - ordered (timestamp, value) samples.
    pub async fn range(
        &self,
        key: &str,
        from_ms: i64,
        to_ms: i64,
    ) -> Result<Vec<TimeSeriesPoint>, redis::RedisError> {
        let mut conn = self.conn.clone();
        let rows: Vec<(i64, f64)> = redis::cmd("TS.RANGE")
            .arg(key)
            .arg(from_ms)
            .arg(to_ms)
            .query_async(&mut conn)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(timestamp, value)| TimeSeriesPoint { timestamp, value })
            .collect())
    }

    /// `TS.GET key` - most recent sample, or None when the series is empty.
    pub async fn latest(&self, key: &str) -> Result<Option<TimeSeriesPoint>, redis::RedisError> {
        let mut conn = self.conn.clone();
        let raw: redis::Value = redis::cmd("TS.GET").arg(key).query_async(&mut conn).await?;
        match raw {
            redis::Value::Bulk(items) if items.len() == 2 => {
                let timestamp: i64 = redis::from_redis_value(&items[0])?;
                let value: f64 = redis::from_redis_value(&items[1])?;
                Ok(Some(TimeSeriesPoint { timestamp, value }))
            }
            _ => Ok(None),
        }
    }

    /// Dedicated pub/sub connection for the keyspace subscription. Pub/sub
    /// cannot share the multiplexed query connection.
    pub async fn pubsub(&self) -> Result<PubSub, redis::RedisError> {
        Ok(self.client.get_async_connection().await?.into_pubsub())
    }
}
