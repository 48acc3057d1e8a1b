use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::sync::Barrier;
use tokio::time::{self, Instant};
use tracing::{info, warn};

use crate::error::BenchmarkError;

const POLL_INTERVAL: Duration = Duration::from_secs(1);
const KEEP_ALIVE: Duration = Duration::from_secs(5);
const REQUEST_CHANNEL_CAPACITY: usize = 10;

pub struct Consumer {
    consumer_id: u32,
    host: String,
    port: u16,
    topic: String,
    expected_messages: u64,
    idle_timeout: Duration,
    ready_barrier: Arc<Barrier>,
}

impl Consumer {
    pub fn new(
        consumer_id: u32,
        host: &str,
        port: u16,
        topic: &str,
        expected_messages: u64,
        idle_timeout: Duration,
        ready_barrier: Arc<Barrier>,
    ) -> Self {
        Self {
            consumer_id,
            host: host.to_string(),
            port,
            topic: topic.to_string(),
            expected_messages,
            idle_timeout,
            ready_barrier,
        }
    }

    pub async fn run(&self) -> Result<f64, BenchmarkError> {
        let mut options = MqttOptions::new(
            format!("consumer-{}", self.consumer_id),
            &self.host,
            self.port,
        );
        options.set_keep_alive(KEEP_ALIVE);
        let (client, mut event_loop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);
        client
            .subscribe(self.topic.as_str(), QoS::AtMostOnce)
            .await?;

        // Drive the event loop until the broker acknowledges the subscription,
        // then rendezvous with the publisher. No message may be published
        // before every consumer has reached this point.
        loop {
            if let Event::Incoming(Packet::SubAck(_)) = event_loop.poll().await? {
                break;
            }
        }
        info!(
            "Consumer #{} → subscribed to {:?}, waiting for the other consumers...",
            self.consumer_id, self.topic
        );
        // The broker drops clients whose keep-alive goes quiet, so the event
        // loop must stay serviced while this consumer is parked waiting for
        // the stragglers. Anything delivered before the release is drained
        // and not counted.
        let rendezvous = self.ready_barrier.wait();
        tokio::pin!(rendezvous);
        loop {
            tokio::select! {
                _ = &mut rendezvous => break,
                event = event_loop.poll() => {
                    event?;
                }
            }
        }

        let released_at = Instant::now();
        let mut total_messages: u64 = 0;
        let mut first_message_at: Option<Instant> = None;
        let mut last_message_at: Option<Instant> = None;

        while total_messages < self.expected_messages {
            // Bound each poll so the exit checks below run at a coarse, roughly
            // one second cadence even when the broker goes quiet.
            if let Ok(event) = time::timeout(POLL_INTERVAL, event_loop.poll()).await {
                if let Event::Incoming(Packet::Publish(_)) = event? {
                    total_messages += 1;
                    let now = Instant::now();
                    last_message_at = Some(now);
                    first_message_at.get_or_insert(now);
                }
            }

            // With at least two messages the timeout caps the measurement
            // interval itself; with fewer it bounds the wait for delivery to
            // start at all, so a silent broker cannot hang the consumer.
            match first_message_at {
                Some(first) if total_messages >= 2 => {
                    if first.elapsed() >= self.idle_timeout {
                        warn!(
                            "Consumer #{} → delivery stalled after {} messages",
                            self.consumer_id, total_messages
                        );
                        break;
                    }
                }
                _ => {
                    if released_at.elapsed() >= self.idle_timeout {
                        warn!(
                            "Consumer #{} → received {} messages within {:?}, giving up",
                            self.consumer_id, total_messages, self.idle_timeout
                        );
                        break;
                    }
                }
            }
        }

        let _ = client.disconnect().await;

        let interval = match (first_message_at, last_message_at) {
            (Some(first), Some(last)) => last.duration_since(first),
            _ => Duration::ZERO,
        };
        let rate = delivery_rate(total_messages, interval)?;
        info!(
            "Consumer #{} → received {} messages in {:.2} s, {:.1} msg/s",
            self.consumer_id,
            total_messages,
            interval.as_secs_f64(),
            rate
        );
        Ok(rate)
    }
}

/// The first message only establishes the baseline timestamp, so it is
/// excluded from the counted interval.
pub(crate) fn delivery_rate(
    total_messages: u64,
    interval: Duration,
) -> Result<f64, BenchmarkError> {
    if total_messages < 2 || interval.is_zero() {
        return Err(BenchmarkError::InsufficientSamples {
            received: total_messages,
        });
    }
    Ok((total_messages - 1) as f64 / interval.as_secs_f64())
}
