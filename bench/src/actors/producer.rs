use std::time::Duration;

use rumqttc::{AsyncClient, MqttOptions, QoS};
use tokio::sync::watch;
use tracing::info;

use crate::error::BenchmarkError;

const KEEP_ALIVE: Duration = Duration::from_secs(5);
const REQUEST_CHANNEL_CAPACITY: usize = 10;

pub struct Producer {
    host: String,
    port: u16,
    topic: String,
    payload_size: u32,
}

impl Producer {
    pub fn new(host: &str, port: u16, topic: &str, payload_size: u32) -> Self {
        Self {
            host: host.to_string(),
            port,
            topic: topic.to_string(),
            payload_size,
        }
    }

    /// Publishes as fast as the broker accepts until `stop` flips to true.
    /// The loop is deliberately unthrottled, the point is to measure the
    /// maximum sustainable delivery rate.
    pub async fn run(&self, stop: watch::Receiver<bool>) -> Result<u64, BenchmarkError> {
        let mut options = MqttOptions::new("producer", &self.host, self.port);
        options.set_keep_alive(KEEP_ALIVE);
        let (client, mut event_loop) = AsyncClient::new(options, REQUEST_CHANNEL_CAPACITY);

        let payload = create_payload(self.payload_size);
        let topic = self.topic.clone();
        let pump = tokio::spawn(async move {
            let mut published: u64 = 0;
            while !*stop.borrow() {
                client
                    .publish(topic.as_str(), QoS::AtMostOnce, false, payload.clone())
                    .await?;
                published += 1;
            }
            client.disconnect().await?;
            Ok::<u64, BenchmarkError>(published)
        });

        info!(
            "Producer → publishing {} B messages to {:?} until the consumers finish...",
            self.payload_size, self.topic
        );
        loop {
            match event_loop.poll().await {
                Ok(_) => {}
                // Once the pump has requested the disconnect, the link going
                // down is the expected way out of this loop.
                Err(_) if pump.is_finished() => break,
                Err(e) => {
                    pump.abort();
                    return Err(e.into());
                }
            }
        }

        let published = pump.await??;
        info!("Producer → published {} messages", published);
        Ok(published)
    }
}

fn create_payload(size: u32) -> Vec<u8> {
    let mut payload = Vec::with_capacity(size as usize);
    for i in 0..size {
        payload.push((i % 26 + 97) as u8);
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_has_the_configured_size() {
        assert_eq!(create_payload(1).len(), 1);
        assert_eq!(create_payload(1024).len(), 1024);
    }

    #[test]
    fn payload_cycles_through_the_alphabet() {
        let payload = create_payload(28);
        assert_eq!(&payload[..4], b"abcd");
        assert_eq!(&payload[26..], b"ab");
    }
}
