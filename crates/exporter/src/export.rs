use crate::metrics;
use crate::normalize::{normalize_block, normalize_transactions};
use crate::progress::Progress;
use crate::resolver::TxHashResolver;
use crate::sink::Sink;
use anyhow::Context;
use clap::ValueEnum;
use lkl_node_client::{NodeClient, RawBlock};
use lkl_primitives::BlockNumber;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, enabled, info, Level};


/// Heights which are multiples of this value are logged as milestones.
pub const MILESTONE_INTERVAL: BlockNumber = 100;


pub fn is_milestone(height: BlockNumber) -> bool {
    height % MILESTONE_INTERVAL == 0
}


/// What to do when the requested block is not produced yet.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissingBlockPolicy {
    /// Pause and ask for the same block again, forever
    Wait,
    /// Finish the export
    Stop,
}


#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub first_block: BlockNumber,
    /// Exclusive upper bound of the export
    pub exit_block: Option<BlockNumber>,
    pub on_missing_block: MissingBlockPolicy,
    pub poll_interval: Duration,
    /// Block `h` is exported only once block `h + safety_margin` exists
    pub safety_margin: u64,
}


impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            first_block: 0,
            exit_block: None,
            on_missing_block: MissingBlockPolicy::Wait,
            poll_interval: Duration::from_secs(2),
            safety_margin: 0,
        }
    }
}


#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Last block known to be in the sink, `None` if nothing precedes the first block
    pub last_block: Option<BlockNumber>,
    pub blocks: u64,
    pub transactions: u64,
    pub unresolved: u64,
}


/// Sequential block export: fetch, normalize, write, advance.
///
/// Every node call and sink write completes before the next one starts, so
/// records of block `h` always reach the sink before records of `h + 1`.
pub struct Exporter<C, S> {
    client: C,
    sink: S,
    resolver: TxHashResolver,
    config: ExportConfig,
    shutdown: CancellationToken,
    progress: Progress,
    last_progress_report: Instant,
}


impl<C: NodeClient, S: Sink> Exporter<C, S> {
    pub fn new(client: C, sink: S, config: ExportConfig) -> Self {
        Self {
            client,
            sink,
            resolver: TxHashResolver::new(),
            config,
            shutdown: CancellationToken::new(),
            progress: Progress::new(NonZeroUsize::new(10).unwrap(), Duration::from_secs(1)),
            last_progress_report: Instant::now(),
        }
    }

    /// Token which stops the export between two blocks once cancelled.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn resolver(&self) -> &TxHashResolver {
        &self.resolver
    }

    pub async fn run(&mut self) -> anyhow::Result<ExportReport> {
        let mut report = ExportReport::default();
        let mut height = self.config.first_block;

        loop {
            if self.config.exit_block.is_some_and(|exit_block| height >= exit_block) {
                info!("reached exit block #{}", height);
                break
            }

            if self.shutdown.is_cancelled() {
                info!("export was interrupted before block #{}", height);
                break
            }

            let Some(block) = self.fetch(height).await? else {
                match self.config.on_missing_block {
                    MissingBlockPolicy::Stop => {
                        info!("block #{} is not available, stopping", height);
                        break
                    },
                    MissingBlockPolicy::Wait => {
                        info!("waiting for the block #{}", height);
                        tokio::select! {
                            _ = tokio::time::sleep(self.config.poll_interval) => {},
                            _ = self.shutdown.cancelled() => {}
                        }
                        continue
                    }
                }
            };

            self.export_block(height, &block, &mut report).await?;
            self.register_progress(height, block.timestamp);
            height += 1;
        }

        report.last_block = height.checked_sub(1);

        if self.progress.has_news() {
            self.report_progress();
        }

        Ok(report)
    }

    async fn fetch(&self, height: BlockNumber) -> anyhow::Result<Option<RawBlock>> {
        if self.config.safety_margin > 0 {
            let confirmation = height.saturating_add(self.config.safety_margin);
            let confirmed = self.client.get_block(confirmation)
                .await
                .with_context(|| format!("failed to fetch block #{}", confirmation))?
                .is_some();
            if !confirmed {
                debug!("block #{} is not confirmed by block #{} yet", height, confirmation);
                return Ok(None)
            }
        }

        self.client.get_block(height)
            .await
            .with_context(|| format!("failed to fetch block #{}", height))
    }

    async fn export_block(
        &mut self,
        height: BlockNumber,
        raw: &RawBlock,
        report: &mut ExportReport
    ) -> anyhow::Result<()>
    {
        let block = normalize_block(height, raw)?;
        let transactions = normalize_transactions(raw, &self.client, &mut self.resolver)
            .await
            .with_context(|| format!("failed to normalize transactions of block #{}", height))?;

        let unresolved = transactions.iter()
            .filter(|tx| !tx.transaction_hash.is_resolved())
            .count() as u64;

        async {
            self.sink.append_block(&block).await?;
            self.sink.append_transactions(&transactions).await?;
            self.sink.flush().await
        }.await.with_context(|| format!("failed to write block #{} to the sink", height))?;

        report.blocks += 1;
        report.transactions += transactions.len() as u64;
        report.unresolved += unresolved;

        metrics::EXPORTED_BLOCKS.inc();
        metrics::EXPORTED_TRANSACTIONS.inc_by(transactions.len() as u64);
        metrics::UNRESOLVED_TRANSACTIONS.inc_by(unresolved);
        Ok(())
    }

    fn register_progress(&mut self, height: BlockNumber, timestamp: u64) {
        metrics::LAST_BLOCK.set(height as i64);
        metrics::LAST_BLOCK_TIMESTAMP.set(timestamp as i64);
        self.progress.set_current_height(height);

        if is_milestone(height) {
            info!(
                resolved_hashes = self.resolver.cache_len(),
                "processed blocks till block #{}, continuing",
                height
            );
        }

        if enabled!(Level::INFO) && self.last_progress_report.elapsed() > Duration::from_secs(5) {
            self.report_progress();
            self.last_progress_report = Instant::now();
        }
    }

    fn report_progress(&mut self) {
        let speed = self.progress.speed();
        metrics::PROGRESS.set(speed);
        if let Some(height) = self.progress.current_height() {
            info!("last block: {}, progress: {} blocks/sec", height, speed.round());
        }
    }
}
