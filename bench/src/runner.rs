use std::sync::Arc;
use std::time::Duration;

use futures::future::select_all;
use tokio::sync::{watch, Barrier};
use tokio::time::timeout;
use tracing::{info, warn};

use crate::actors::consumer::Consumer;
use crate::actors::producer::Producer;
use crate::args::BenchmarkArgs;
use crate::error::BenchmarkError;

pub const BENCHMARK_TOPIC: &str = "benchmark";

pub struct BenchmarkRunner {
    args: BenchmarkArgs,
}

impl BenchmarkRunner {
    pub fn new(args: BenchmarkArgs) -> Self {
        Self { args }
    }

    pub async fn run(&self) -> Result<(), BenchmarkError> {
        let args = &self.args;
        info!(
            "Benchmarking {} consumers x {} messages of {} B against {}:{}",
            args.consumers, args.messages, args.size, args.host, args.port
        );

        let ready_barrier = Arc::new(Barrier::new(args.consumers as usize + 1));
        let mut handles = Vec::with_capacity(args.consumers as usize);
        for consumer_id in 1..=args.consumers {
            let consumer = Consumer::new(
                consumer_id,
                &args.host,
                args.port,
                BENCHMARK_TOPIC,
                args.messages,
                Duration::from_secs(args.timeout),
                ready_barrier.clone(),
            );
            handles.push(tokio::spawn(async move { consumer.run().await }));
        }

        // The runner is the extra party on the barrier: publishing cannot
        // start until every consumer has an acknowledged subscription. The
        // wait is bounded, and a consumer that dies before subscribing (e.g.
        // unreachable broker) fails the run with its own error right away.
        // SubscriptionTimeout is reserved for consumers that are alive but
        // never reach the acknowledgment.
        let subscribe_timeout = Duration::from_secs(args.subscribe_timeout);
        info!(
            "Waiting up to {:?} for all consumers to subscribe...",
            subscribe_timeout
        );
        let mut rates = Vec::with_capacity(handles.len());
        let rendezvous = timeout(subscribe_timeout, ready_barrier.wait());
        tokio::pin!(rendezvous);
        loop {
            tokio::select! {
                released = &mut rendezvous => {
                    released.map_err(|_| BenchmarkError::SubscriptionTimeout(subscribe_timeout))?;
                    break;
                }
                (result, index, _) = select_all(handles.iter_mut()), if !handles.is_empty() => {
                    handles.swap_remove(index);
                    match result? {
                        Ok(rate) => rates.push(rate),
                        Err(BenchmarkError::InsufficientSamples { received }) => {
                            warn!(
                                "Consumer received only {} messages before timing out, excluding it from the mean",
                                received
                            );
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        let producer = Producer::new(&args.host, args.port, BENCHMARK_TOPIC, args.size);
        let producer_handle = tokio::spawn(async move { producer.run(stop_rx).await });

        // Each consumer task resolves exactly once with its measured rate.
        // A consumer that saw too few messages is excluded from the mean,
        // anything else is fatal.
        while !handles.is_empty() {
            let (result, _index, remaining) = select_all(handles).await;
            handles = remaining;
            match result? {
                Ok(rate) => rates.push(rate),
                Err(BenchmarkError::InsufficientSamples { received }) => {
                    warn!(
                        "Consumer received only {} messages before timing out, excluding it from the mean",
                        received
                    );
                }
                Err(e) => {
                    let _ = stop_tx.send(true);
                    return Err(e);
                }
            }
        }

        let _ = stop_tx.send(true);
        producer_handle.await??;

        let mean = mean_rate(&rates).ok_or(BenchmarkError::Inconclusive)?;
        println!("{mean:.1}");
        Ok(())
    }
}

fn mean_rate(rates: &[f64]) -> Option<f64> {
    if rates.is_empty() {
        return None;
    }
    Some(rates.iter().sum::<f64>() / rates.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time;

    #[test]
    fn mean_of_three_rates() {
        assert_eq!(mean_rate(&[10.0, 20.0, 30.0]), Some(20.0));
    }

    #[test]
    fn mean_of_a_single_rate() {
        assert_eq!(mean_rate(&[42.5]), Some(42.5));
    }

    #[test]
    fn mean_of_no_rates_is_none() {
        assert_eq!(mean_rate(&[]), None);
    }

    #[test]
    fn report_is_formatted_with_one_decimal_place() {
        assert_eq!(format!("{:.1}", 1234.56_f64), "1234.6");
        assert_eq!(format!("{:.1}", 20.0_f64), "20.0");
    }

    #[tokio::test]
    async fn publisher_is_released_only_after_every_consumer_signals_readiness() {
        let consumers = 4;
        let barrier = Arc::new(Barrier::new(consumers + 1));
        let subscribed = Arc::new(AtomicUsize::new(0));

        for _ in 0..consumers {
            let barrier = barrier.clone();
            let subscribed = subscribed.clone();
            tokio::spawn(async move {
                time::sleep(Duration::from_millis(5)).await;
                subscribed.fetch_add(1, Ordering::SeqCst);
                barrier.wait().await;
            });
        }

        barrier.wait().await;
        // The barrier releases no party before all of them have arrived, so
        // by the time the publisher side returns every consumer has signaled.
        assert_eq!(subscribed.load(Ordering::SeqCst), consumers);
    }

    #[tokio::test(start_paused = true)]
    async fn rendezvous_times_out_when_a_consumer_never_subscribes() {
        let barrier = Arc::new(Barrier::new(2));
        let wait = timeout(Duration::from_secs(30), barrier.wait()).await;
        assert!(wait.is_err());
    }

    #[tokio::test]
    async fn unreachable_broker_fails_with_a_connection_error() {
        use clap::Parser;

        // Nothing listens on this port, so every consumer errors before it
        // can subscribe. The run must report that error, not wait out the
        // subscribe timeout and blame the rendezvous.
        let args = BenchmarkArgs::try_parse_from([
            "mqtt-bench",
            "127.0.0.1",
            "--port",
            "59999",
            "--consumers",
            "2",
            "--subscribe-timeout",
            "5",
        ])
        .unwrap();
        let err = BenchmarkRunner::new(args).run().await.unwrap_err();
        assert!(matches!(err, BenchmarkError::Connection(_)));
    }
}
