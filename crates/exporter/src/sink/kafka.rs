use crate::sink::Sink;
use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use lkl_primitives::{BlockNumber, BlockRecord, TransactionRecord};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{BaseConsumer, Consumer};
use rdkafka::producer::{DeliveryFuture, FutureProducer, FutureRecord};
use rdkafka::{Message, Offset, TopicPartitionList};
use std::time::Duration;
use tracing::debug;


const METADATA_TIMEOUT: Duration = Duration::from_secs(10);


#[derive(Clone, Debug)]
pub struct KafkaConfig {
    pub bootstrap_servers: String,
    pub blocks_topic: String,
    pub transactions_topic: String,
}


#[derive(Clone, Copy)]
enum Topic {
    Blocks,
    Transactions
}


/// Publishes blocks keyed by depth and transactions keyed by content
/// fingerprint into two topics.
pub struct KafkaSink {
    producer: FutureProducer,
    config: KafkaConfig,
    deliveries: Vec<DeliveryFuture>,
}


impl KafkaSink {
    pub fn new(config: KafkaConfig) -> anyhow::Result<Self> {
        let producer = ClientConfig::new()
            .set("bootstrap.servers", &config.bootstrap_servers)
            .set("message.timeout.ms", "30000")
            .create()
            .context("failed to create kafka producer")?;

        Ok(Self {
            producer,
            config,
            deliveries: Vec::new(),
        })
    }

    fn enqueue(&mut self, topic: Topic, key: &[u8], payload: &[u8]) -> anyhow::Result<()> {
        let topic = match topic {
            Topic::Blocks => &self.config.blocks_topic,
            Topic::Transactions => &self.config.transactions_topic,
        };

        let record = FutureRecord::to(topic)
            .key(key)
            .payload(payload);

        let delivery = self.producer
            .send_result(record)
            .map_err(|(err, _)| err)
            .with_context(|| format!("failed to enqueue a message for {}", topic))?;

        self.deliveries.push(delivery);
        Ok(())
    }
}


#[async_trait]
impl Sink for KafkaSink {
    async fn append_block(&mut self, block: &BlockRecord) -> anyhow::Result<()> {
        let key = block_key(block.depth);
        let payload = serde_json::to_vec(block)?;
        self.enqueue(Topic::Blocks, &key, &payload)
    }

    async fn append_transactions(&mut self, transactions: &[TransactionRecord]) -> anyhow::Result<()> {
        for tx in transactions {
            let key = tx.fingerprint();
            let payload = serde_json::to_vec(tx)?;
            self.enqueue(Topic::Transactions, key.as_bytes(), &payload)?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> anyhow::Result<()> {
        let deliveries = std::mem::take(&mut self.deliveries);
        debug!(messages = deliveries.len(), "waiting for delivery acknowledgements");
        for delivery in deliveries {
            match delivery.await {
                Ok(Ok(_)) => {},
                Ok(Err((err, _))) => return Err(anyhow!(err).context("message delivery failed")),
                Err(_) => bail!("message delivery was cancelled")
            }
        }
        Ok(())
    }

    async fn query_max_depth(&self) -> anyhow::Result<Option<BlockNumber>> {
        let servers = self.config.bootstrap_servers.clone();
        let topic = self.config.blocks_topic.clone();
        tokio::task::spawn_blocking(move || read_max_depth(&servers, &topic)).await?
    }
}


/// Depth as a JSON number, so consumers of the topic see keys like `b"42"`.
fn block_key(depth: BlockNumber) -> Vec<u8> {
    depth.to_string().into_bytes()
}


/// Reads the last message of every partition of the blocks topic.
fn read_max_depth(bootstrap_servers: &str, topic: &str) -> anyhow::Result<Option<BlockNumber>> {
    let consumer: BaseConsumer = ClientConfig::new()
        .set("bootstrap.servers", bootstrap_servers)
        .set("group.id", "lkl-exporter-checkpoint")
        .set("enable.auto.commit", "false")
        .create()
        .context("failed to create kafka consumer")?;

    let metadata = consumer.fetch_metadata(Some(topic), METADATA_TIMEOUT)?;
    let partitions: Vec<i32> = metadata.topics()
        .iter()
        .filter(|t| t.name() == topic)
        .flat_map(|t| t.partitions().iter().map(|p| p.id()))
        .collect();

    let mut max_depth = None;

    for partition in partitions {
        let (low, high) = consumer.fetch_watermarks(topic, partition, METADATA_TIMEOUT)?;
        if high <= low {
            continue
        }

        let mut assignment = TopicPartitionList::new();
        assignment.add_partition_offset(topic, partition, Offset::Offset(high - 1))?;
        consumer.assign(&assignment)?;

        let message = match consumer.poll(METADATA_TIMEOUT) {
            Some(message) => message?,
            None => bail!("timed out reading the last message of {}/{}", topic, partition)
        };

        if let Some(payload) = message.payload() {
            let block: BlockRecord = serde_json::from_slice(payload)
                .with_context(|| format!("unexpected message in {}/{}", topic, partition))?;
            max_depth = max_depth.max(Some(block.depth));
        }
    }

    Ok(max_depth)
}


#[cfg(test)]
mod test {
    use super::block_key;


    #[test]
    fn block_key_is_decimal_depth() {
        assert_eq!(block_key(0), b"0");
        assert_eq!(block_key(1234), b"1234");
    }
}
