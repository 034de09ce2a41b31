// src/subscriber.rs - keyspace notification loop feeding the detection workers
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use log::{debug, error, info, warn};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::cycle::{run_detection_cycle, PipelineContext};
use crate::store::{instrument_from_channel, CHANNEL_PATTERN, STOPWORD};

/// How long one poll may block before the loop wakes to re-check for shutdown.
const POLL_WAIT: Duration = Duration::from_secs(1);
/// Decoded events waiting for a worker. A full queue backpressures the
/// subscriber instead of fanning out unboundedly.
const QUEUE_DEPTH: usize = 1024;

/// Owns the long-lived keyspace subscription and the pool of detection
/// workers that drain the decoded-event queue.
pub struct NotificationSubscriber {
    ctx: Arc<PipelineContext>,
    worker_count: usize,
}

impl NotificationSubscriber {
    pub fn new(ctx: Arc<PipelineContext>, worker_count: usize) -> Self {
        Self { ctx, worker_count }
    }

    /// Subscribe and process notifications until the STOP sentinel arrives.
    /// Queued and in-flight cycles are drained before this returns; only the
    /// subscription itself is torn down eagerly.
    pub async fn run(&self) -> Result<(), redis::RedisError> {
        let (event_tx, event_rx) = mpsc::channel::<String>(QUEUE_DEPTH);
        let workers = self.spawn_workers(event_rx);

        let mut pubsub = self.ctx.store.pubsub().await?;
        pubsub.psubscribe(CHANNEL_PATTERN).await?;
        info!("[SUBSCRIBER] Subscribed to {}", CHANNEL_PATTERN);

        {
            let mut messages = pubsub.on_message();
            loop {
                let message = match timeout(POLL_WAIT, messages.next()).await {
                    // Bounded wait elapsed - wake up and poll again.
                    Err(_) => continue,
                    Ok(None) => {
                        warn!("[SUBSCRIBER] Notification stream closed by the store");
                        break;
                    }
                    Ok(Some(message)) => message,
                };

                let payload: String = message.get_payload().unwrap_or_default();
                if payload == STOPWORD {
                    info!("[SUBSCRIBER] STOP received, shutting down subscription");
                    break;
                }

                let channel = message.get_channel_name();
                match instrument_from_channel(channel) {
                    Some(instrument) => {
                        debug!("[SUBSCRIBER] {} changed, queueing detection", instrument);
                        if event_tx.send(instrument.to_string()).await.is_err() {
                            error!("[SUBSCRIBER] All detection workers gone, stopping");
                            break;
                        }
                    }
                    None => {
                        warn!("[SUBSCRIBER] Ignoring undecodable channel '{}'", channel);
                    }
                }
            }
        }

        pubsub.punsubscribe(CHANNEL_PATTERN).await?;
        info!("[SUBSCRIBER] Unsubscribed, draining workers");

        // Closing the queue lets each worker finish what it holds and exit.
        drop(event_tx);
        for handle in workers {
            if let Err(e) = handle.await {
                error!("[SUBSCRIBER] Worker ended abnormally: {}", e);
            }
        }
        info!("[SUBSCRIBER] All workers drained");
        Ok(())
    }

    fn spawn_workers(&self, event_rx: mpsc::Receiver<String>) -> Vec<JoinHandle<()>> {
        let event_rx = Arc::new(Mutex::new(event_rx));
        (0..self.worker_count)
            .map(|worker_id| {
                let ctx = Arc::clone(&self.ctx);
                let event_rx = Arc::clone(&event_rx);
                tokio::spawn(async move {
                    loop {
                        // Hold the lock only while waiting for the next event,
                        // never across a detection cycle.
                        let instrument = { event_rx.lock().await.recv().await };
                        match instrument {
                            Some(instrument) => {
                                debug!(
                                    "[WORKER {}] Running detection for {}",
                                    worker_id, instrument
                                );
                                run_detection_cycle(&ctx, &instrument).await;
                            }
                            None => break,
                        }
                    }
                    debug!("[WORKER {}] Queue closed, exiting", worker_id);
                })
            })
            .collect()
    }
}
