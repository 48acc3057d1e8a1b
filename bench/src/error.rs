use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error("broker connection failed: {0}")]
    Connection(#[from] rumqttc::ConnectionError),
    #[error("client request failed: {0}")]
    Client(#[from] rumqttc::ClientError),
    #[error("consumers did not confirm their subscriptions within {0:?}")]
    SubscriptionTimeout(Duration),
    #[error("received {received} messages, at least 2 are required to measure a rate")]
    InsufficientSamples { received: u64 },
    #[error("actor task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
    #[error("no consumer measured a usable delivery rate")]
    Inconclusive,
}
