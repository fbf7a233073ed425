use std::time::Duration;

use fred::prelude::{
    ClientLike, EventInterface, ListInterface, Pool, ReconnectPolicy, Server, ServerConfig,
};
use fred::types::Builder;
use fred::types::config::UnresponsiveConfig;
use futures::future::join_all;
use postback_config::shared::QueueConfig;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error};

use crate::error::{ErrorKind, PostbackResult};
use crate::postback_error;
use crate::queue::base::JobQueue;

/// Number of pooled Redis connections shared by all consumer tasks.
const CONNECTION_POOL_SIZE: usize = 4;

/// Redis-backed work queue client.
///
/// Wraps a pooled fred client around the queue list: producers `LPUSH`
/// delivery jobs, the agent `RPOP`s them. The pool is safe for concurrent
/// callers, so a single clone of this handle is shared by every consumer
/// task rather than opening one connection per consumer.
#[derive(Clone)]
pub struct RedisQueue {
    pool: Pool,
    queue_name: String,
}

impl RedisQueue {
    /// Connects to Redis and binds the client to the given queue name.
    ///
    /// Connection failures here are fatal: the agent cannot do any work
    /// without queue access, so the error propagates to process exit instead
    /// of being retried forever.
    pub async fn connect(config: QueueConfig, queue_name: String) -> PostbackResult<Self> {
        let password = config.exposed_password();
        let pool = Builder::default_centralized()
            .with_config(|redis_config| {
                redis_config.username = config.username.clone();
                redis_config.password = password;
                redis_config.database = config.database;
                redis_config.server = ServerConfig::Centralized {
                    server: Server::new(config.host.clone(), config.port),
                };
            })
            .with_connection_config(|config| {
                config.internal_command_timeout = Duration::from_secs(5);
                config.reconnect_on_auth_error = true;
                config.unresponsive = UnresponsiveConfig {
                    max_timeout: Some(Duration::from_secs(10)),
                    interval: Duration::from_secs(3),
                };
            })
            .with_performance_config(|config| {
                config.default_command_timeout = Duration::from_secs(5);
            })
            .set_policy(ReconnectPolicy::new_exponential(0, 1, 2000, 5))
            .build_pool(CONNECTION_POOL_SIZE)
            .map_err(|err| {
                postback_error!(
                    ErrorKind::QueueConnectionFailed,
                    "Failed to build Redis client",
                    source: err
                )
            })?;

        for client in pool.clients() {
            // Steady-state connection events are logged, never propagated:
            // the reconnect policy owns recovery.
            let mut error_rx = client.error_rx();
            let mut reconnect_rx = client.reconnect_rx();

            tokio::spawn(async move {
                loop {
                    match error_rx.recv().await {
                        Ok((error, server)) => {
                            error!(?server, "queue connection error: {error:?}");
                        }
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    }
                }
            });

            tokio::spawn(async move {
                loop {
                    match reconnect_rx.recv().await {
                        Ok(server) => {
                            debug!("queue client connected to {server:?}");
                        }
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    }
                }
            });
        }

        let client_handles = pool.connect_pool();

        pool.wait_for_connect().await.map_err(|err| {
            postback_error!(
                ErrorKind::QueueConnectionFailed,
                "Failed to connect to Redis",
                source: err
            )
        })?;

        tokio::spawn(async move {
            let _results = join_all(client_handles).await;
        });

        debug!(queue_name = %queue_name, "connected to Redis work queue");

        Ok(Self { pool, queue_name })
    }
}

impl JobQueue for RedisQueue {
    async fn pop(&self) -> PostbackResult<Option<String>> {
        let message: Option<String> = self.pool.rpop(self.queue_name.as_str(), None).await?;

        Ok(message)
    }
}
