//! AMQP broker client
//!
//! Connects to RabbitMQ, declares a durable direct exchange, a durable
//! queue and the binding between them, then publishes events with
//! publisher confirms enabled. A publish only counts as confirmed when the
//! broker acks it without returning it as unroutable.
//!
//! The client is synchronous from the caller's point of view: each call
//! drives a private current-thread runtime to completion, and every wait on
//! the broker is bounded by [`BrokerTuning`].

use super::{EventSink, PublishOutcome};
use crate::config::{BrokerConfig, BrokerTuning};
use crate::error::{BrokerError, BrokerResult};
use chrono::Utc;
use fs2mq_scanner::FileEvent;
use lapin::options::{
    BasicPublishOptions, ConfirmSelectOptions, ExchangeDeclareOptions, QueueBindOptions,
    QueueDeclareOptions,
};
use lapin::publisher_confirm::Confirmation;
use lapin::types::FieldTable;
use lapin::uri::AMQPUri;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties, ExchangeKind};
use std::future::Future;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info, warn};

/// `app_id` property on every message
pub const APP_ID: &str = "fs2mq";
/// `type` property identifying the event schema
pub const MESSAGE_TYPE: &str = "file.found";
/// `content_type` property of the JSON body
pub const CONTENT_TYPE: &str = "application/json";

const PERSISTENT_DELIVERY: u8 = 2;
const REPLY_SUCCESS: u16 = 200;

/// Publisher owning one broker connection and channel for a run
pub struct AmqpPublisher {
    runtime: Runtime,
    connection: Option<Connection>,
    channel: Channel,
    exchange: String,
    routing_key: String,
    tuning: BrokerTuning,
}

impl AmqpPublisher {
    /// Connect, enable publisher confirms and declare topology
    ///
    /// Any failure here is fatal to the run. The connection is closed again
    /// if a later setup step fails.
    pub fn connect(config: &BrokerConfig, tuning: BrokerTuning) -> BrokerResult<Self> {
        let uri = tuned_uri(&config.amqp_url, &tuning)?;
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(BrokerError::Runtime)?;

        let connection = runtime
            .block_on(bounded(
                "connect",
                tuning.socket_timeout,
                Connection::connect_uri(uri, ConnectionProperties::default()),
            ))?
            .map_err(BrokerError::Connect)?;

        let channel = match runtime.block_on(open_confirm_channel(&connection, &tuning)) {
            Ok(channel) => channel,
            Err(e) => {
                let _ = runtime.block_on(bounded(
                    "close connection",
                    tuning.socket_timeout,
                    connection.close(REPLY_SUCCESS, "setup failed"),
                ));
                return Err(e);
            }
        };

        let publisher = Self {
            runtime,
            connection: Some(connection),
            channel,
            exchange: config.exchange.clone(),
            routing_key: config.routing_key.clone(),
            tuning,
        };
        // Dropping the publisher on error closes the connection.
        publisher.declare_topology(config)?;

        info!(
            exchange = %config.exchange,
            queue = %config.queue_name,
            routing_key = %config.routing_key,
            "connected to broker"
        );
        Ok(publisher)
    }

    fn declare_topology(&self, config: &BrokerConfig) -> BrokerResult<()> {
        let channel = &self.channel;
        let limit = self.tuning.socket_timeout;

        self.runtime.block_on(async {
            bounded(
                "declare exchange",
                limit,
                channel.exchange_declare(
                    &config.exchange,
                    ExchangeKind::Direct,
                    ExchangeDeclareOptions {
                        durable: config.durable,
                        ..ExchangeDeclareOptions::default()
                    },
                    FieldTable::default(),
                ),
            )
            .await?
            .map_err(|source| BrokerError::Declare {
                what: "exchange",
                name: config.exchange.clone(),
                source,
            })?;

            bounded(
                "declare queue",
                limit,
                channel.queue_declare(
                    &config.queue_name,
                    QueueDeclareOptions {
                        durable: config.durable,
                        ..QueueDeclareOptions::default()
                    },
                    FieldTable::default(),
                ),
            )
            .await?
            .map_err(|source| BrokerError::Declare {
                what: "queue",
                name: config.queue_name.clone(),
                source,
            })?;

            bounded(
                "bind queue",
                limit,
                channel.queue_bind(
                    &config.queue_name,
                    &config.exchange,
                    &config.routing_key,
                    QueueBindOptions::default(),
                    FieldTable::default(),
                ),
            )
            .await?
            .map_err(|source| BrokerError::Declare {
                what: "binding",
                name: format!("{} -> {}", config.exchange, config.queue_name),
                source,
            })
        })
    }

    /// Publish a body and wait for the broker's confirmation
    fn publish_confirmed(&self, body: &[u8]) -> BrokerResult<Confirmation> {
        let properties = message_properties(Utc::now().timestamp());
        let limit = self.tuning.blocked_connection_timeout;

        self.runtime.block_on(async {
            bounded("confirm publish", limit, async {
                self.channel
                    .basic_publish(
                        &self.exchange,
                        &self.routing_key,
                        BasicPublishOptions {
                            mandatory: true,
                            ..BasicPublishOptions::default()
                        },
                        body,
                        properties,
                    )
                    .await?
                    .await
            })
            .await?
            .map_err(BrokerError::Publish)
        })
    }

    /// Close the connection; later calls do nothing
    pub fn shutdown(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };
        let closed = self.runtime.block_on(bounded(
            "close connection",
            self.tuning.socket_timeout,
            connection.close(REPLY_SUCCESS, "OK"),
        ));
        match closed {
            Ok(Ok(())) => debug!("broker connection closed"),
            Ok(Err(e)) => warn!(error = %e, "error closing broker connection"),
            Err(e) => warn!(error = %e, "error closing broker connection"),
        }
    }
}

impl EventSink for AmqpPublisher {
    fn publish(&mut self, event: &FileEvent) -> PublishOutcome {
        let body = match event.to_json_bytes() {
            Ok(body) => body,
            Err(e) => return PublishOutcome::Rejected(e.to_string()),
        };

        match self.publish_confirmed(&body) {
            Ok(confirmation) => confirmation_outcome(&confirmation),
            Err(e) => PublishOutcome::Rejected(e.to_string()),
        }
    }

    fn close(&mut self) {
        self.shutdown();
    }
}

impl Drop for AmqpPublisher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn open_confirm_channel(
    connection: &Connection,
    tuning: &BrokerTuning,
) -> BrokerResult<Channel> {
    let channel = bounded(
        "open channel",
        tuning.socket_timeout,
        connection.create_channel(),
    )
    .await?
    .map_err(BrokerError::Connect)?;

    bounded(
        "enable publisher confirms",
        tuning.socket_timeout,
        channel.confirm_select(ConfirmSelectOptions::default()),
    )
    .await?
    .map_err(BrokerError::Connect)?;

    Ok(channel)
}

/// Run `fut` to completion or fail with [`BrokerError::Timeout`]
async fn bounded<F: Future>(
    operation: &'static str,
    limit: Duration,
    fut: F,
) -> BrokerResult<F::Output> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| BrokerError::Timeout {
            operation,
            secs: limit.as_secs(),
        })
}

/// Parse the URL and add heartbeat and connect timeout unless it sets them
fn tuned_uri(url: &str, tuning: &BrokerTuning) -> BrokerResult<AMQPUri> {
    let mut uri: AMQPUri = url.parse().map_err(BrokerError::InvalidUrl)?;
    uri.query
        .heartbeat
        .get_or_insert(u16::try_from(tuning.heartbeat.as_secs()).unwrap_or(u16::MAX));
    uri.query
        .connection_timeout
        .get_or_insert(u64::try_from(tuning.socket_timeout.as_millis()).unwrap_or(u64::MAX));
    Ok(uri)
}

fn message_properties(timestamp: i64) -> BasicProperties {
    BasicProperties::default()
        .with_content_type(CONTENT_TYPE.into())
        .with_delivery_mode(PERSISTENT_DELIVERY)
        .with_timestamp(u64::try_from(timestamp).unwrap_or(0))
        .with_app_id(APP_ID.into())
        .with_kind(MESSAGE_TYPE.into())
}

fn confirmation_outcome(confirmation: &Confirmation) -> PublishOutcome {
    match confirmation {
        Confirmation::Ack(None) => PublishOutcome::Confirmed,
        Confirmation::Ack(Some(returned)) => PublishOutcome::Rejected(format!(
            "unroutable message: {} {}",
            returned.reply_code,
            returned.reply_text.as_str()
        )),
        Confirmation::Nack(_) => PublishOutcome::Rejected("broker nacked message".to_string()),
        Confirmation::NotRequested => {
            PublishOutcome::Rejected("publisher confirms not enabled".to_string())
        }
    }
}
