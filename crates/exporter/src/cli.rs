use anyhow::Context;
use clap::{value_parser, Parser, ValueEnum};
use lkl_exporter::sink::{ClickHouseConfig, ClickHouseSink, KafkaConfig, KafkaSink, MemorySink};
use lkl_exporter::{ExportConfig, MissingBlockPolicy, SinkBox};
use lkl_node_client::{default_http_client, ReqwestNodeClient};
use lkl_primitives::BlockNumber;
use std::time::Duration;
use url::Url;


#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SinkKind {
    Kafka,
    Clickhouse,
    /// Keep records in memory, useful for dry runs
    Memory,
}


#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// URL of the node HTTP interface
    #[arg(long, env = "LKL_HOST", value_name = "URL", default_value = "http://127.0.0.1:50052")]
    pub node_url: Url,

    /// Connect and read timeout of node requests in seconds
    #[arg(long, env = "LKL_TIMEOUT", value_name = "SEC", default_value_t = 20)]
    pub node_timeout: u64,

    /// Where to write exported records
    #[arg(long, env = "SINK", value_enum, default_value_t = SinkKind::Kafka)]
    pub sink: SinkKind,

    /// Kafka bootstrap servers
    #[arg(long, env = "BOOTSTRAP_SERVERS", default_value = "127.0.0.1:9092")]
    pub bootstrap_servers: String,

    #[arg(long, env = "KAFKA_TOPIC_BLOCKS", default_value = "blocks")]
    pub blocks_topic: String,

    #[arg(long, env = "KAFKA_TOPIC_TRANSACTIONS", default_value = "transactions")]
    pub transactions_topic: String,

    /// URL of the ClickHouse HTTP interface
    #[arg(long, env = "CH_HOST", value_name = "URL", default_value = "http://127.0.0.1:8123")]
    pub clickhouse_url: Url,

    #[arg(long, env = "CH_USER")]
    pub clickhouse_user: Option<String>,

    #[arg(long, env = "CH_PASSWORD", hide_env_values = true)]
    pub clickhouse_password: Option<String>,

    #[arg(long, env = "CH_DATABASE")]
    pub clickhouse_database: Option<String>,

    #[arg(long, env = "CH_SYNK_TABLE", default_value = "blocks")]
    pub blocks_table: String,

    #[arg(long, env = "CH_TRANSACTIONS_TABLE", default_value = "transactions")]
    pub transactions_table: String,

    /// First block to export. When not set, export resumes after the last block in the sink
    #[arg(long, env = "START_BLOCK", value_name = "N")]
    pub start_block: Option<BlockNumber>,

    /// Stop before this block
    #[arg(long, env = "EXIT_BLOCK", value_name = "N")]
    pub exit_block: Option<BlockNumber>,

    /// What to do when the next block is not produced yet
    #[arg(long, env = "ON_MISSING_BLOCK", value_enum, default_value_t = MissingBlockPolicy::Wait)]
    pub on_missing_block: MissingBlockPolicy,

    /// Pause between attempts to get a missing block in seconds
    #[arg(long, env = "SLEEP_TIME", value_name = "SEC", value_parser = value_parser!(u64).range(1..), default_value_t = 2)]
    pub sleep_time: u64,

    /// Number of blocks which must exist on top of a block before it is exported
    #[arg(long, env = "SAFETY_MARGIN", value_name = "N", default_value_t = 0)]
    pub safety_margin: u64,

    /// Whether the logs should be structured in JSON format
    #[arg(long)]
    pub json_log: bool,

    /// Port to use for built-in prometheus metrics server
    #[arg(long, env = "PROM_PORT")]
    pub prom_port: Option<u16>,
}


impl Cli {
    pub fn node_client(&self) -> anyhow::Result<ReqwestNodeClient> {
        ReqwestNodeClient::from_url(
            self.node_url.clone(),
            Duration::from_secs(self.node_timeout)
        )
    }

    pub fn build_sink(&self) -> anyhow::Result<SinkBox> {
        Ok(match self.sink {
            SinkKind::Kafka => {
                let sink = KafkaSink::new(KafkaConfig {
                    bootstrap_servers: self.bootstrap_servers.clone(),
                    blocks_topic: self.blocks_topic.clone(),
                    transactions_topic: self.transactions_topic.clone(),
                })?;
                Box::new(sink)
            },
            SinkKind::Clickhouse => {
                let http = default_http_client(Duration::from_secs(60))
                    .context("failed to create clickhouse http client")?;
                let sink = ClickHouseSink::new(http, ClickHouseConfig {
                    url: self.clickhouse_url.clone(),
                    user: self.clickhouse_user.clone(),
                    password: self.clickhouse_password.clone(),
                    database: self.clickhouse_database.clone(),
                    blocks_table: self.blocks_table.clone(),
                    transactions_table: self.transactions_table.clone(),
                });
                Box::new(sink)
            },
            SinkKind::Memory => Box::new(MemorySink::new())
        })
    }

    pub fn export_config(&self, first_block: BlockNumber) -> ExportConfig {
        ExportConfig {
            first_block,
            exit_block: self.exit_block,
            on_missing_block: self.on_missing_block,
            poll_interval: Duration::from_secs(self.sleep_time),
            safety_margin: self.safety_margin,
        }
    }
}
