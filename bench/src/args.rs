use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

const DEFAULT_PORT: u16 = 1883;
const DEFAULT_CONSUMERS: u32 = 1;
const DEFAULT_MESSAGES: u64 = 1000;
const DEFAULT_MESSAGE_SIZE: u32 = 1;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SUBSCRIBE_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug)]
#[command(author, version, about = "MQTT message delivery rate benchmark", long_about = None)]
pub struct BenchmarkArgs {
    /// MQTT broker host
    pub host: String,

    /// MQTT broker port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Number of concurrent consumers
    #[arg(long, default_value_t = DEFAULT_CONSUMERS)]
    pub consumers: u32,

    /// Number of messages each consumer should receive
    #[arg(long, default_value_t = DEFAULT_MESSAGES)]
    pub messages: u64,

    /// Message payload size in bytes
    #[arg(long, default_value_t = DEFAULT_MESSAGE_SIZE)]
    pub size: u32,

    /// Seconds a consumer keeps waiting for messages before giving up
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Seconds to wait for all consumers to confirm their subscriptions
    #[arg(long, default_value_t = DEFAULT_SUBSCRIBE_TIMEOUT_SECS)]
    pub subscribe_timeout: u64,
}

impl BenchmarkArgs {
    pub fn validate(&self) {
        if self.consumers == 0 {
            Self::command()
                .error(ErrorKind::InvalidValue, "at least one consumer is required")
                .exit();
        }

        if self.messages < 2 {
            Self::command()
                .error(
                    ErrorKind::InvalidValue,
                    "at least 2 messages are required to measure a delivery rate",
                )
                .exit();
        }

        if self.size == 0 {
            Self::command()
                .error(ErrorKind::InvalidValue, "message size must be greater than 0")
                .exit();
        }
    }
}
