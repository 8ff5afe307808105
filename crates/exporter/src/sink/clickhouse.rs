use crate::sink::Sink;
use anyhow::{bail, Context};
use async_trait::async_trait;
use lkl_primitives::serde::decode_int;
use lkl_primitives::{BlockNumber, BlockRecord, TransactionRecord};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;


#[derive(Clone, Debug)]
pub struct ClickHouseConfig {
    pub url: Url,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub blocks_table: String,
    pub transactions_table: String,
}


/// Writes records through the ClickHouse HTTP interface.
///
/// Rows are buffered as `JSONEachRow` and sent with one `INSERT` per table on
/// flush. Transactions go first, so a stored block row implies its
/// transactions were stored too.
pub struct ClickHouseSink {
    http: Client,
    config: ClickHouseConfig,
    blocks: Vec<u8>,
    transactions: Vec<u8>,
}


#[derive(Deserialize)]
struct MaxDepthRow {
    #[serde(deserialize_with = "decode_int")]
    depth: BlockNumber,
    #[serde(deserialize_with = "decode_int")]
    blocks: u64,
}


impl ClickHouseSink {
    pub fn new(http: Client, config: ClickHouseConfig) -> Self {
        Self {
            http,
            config,
            blocks: Vec::new(),
            transactions: Vec::new(),
        }
    }

    fn request(&self) -> RequestBuilder {
        let mut req = self.http.post(self.config.url.clone());
        if let Some(user) = self.config.user.as_ref() {
            req = req.header("X-ClickHouse-User", user);
        }
        if let Some(password) = self.config.password.as_ref() {
            req = req.header("X-ClickHouse-Key", password);
        }
        if let Some(database) = self.config.database.as_ref() {
            req = req.header("X-ClickHouse-Database", database);
        }
        req
    }

    async fn insert(&self, table: &str, rows: Vec<u8>) -> anyhow::Result<()> {
        if rows.is_empty() {
            return Ok(())
        }

        let query = format!("INSERT INTO {} FORMAT JSONEachRow", table);
        debug!(query = %query, bytes = rows.len(), "inserting rows");

        let res = self.request()
            .query(&[("query", query.as_str())])
            .body(rows)
            .send()
            .await?;

        ensure_success(res)
            .await
            .with_context(|| format!("insert into {} failed", table))?;

        Ok(())
    }
}


#[async_trait]
impl Sink for ClickHouseSink {
    async fn append_block(&mut self, block: &BlockRecord) -> anyhow::Result<()> {
        push_row(&mut self.blocks, block)
    }

    async fn append_transactions(&mut self, transactions: &[TransactionRecord]) -> anyhow::Result<()> {
        for tx in transactions {
            push_row(&mut self.transactions, tx)?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> anyhow::Result<()> {
        let transactions = std::mem::take(&mut self.transactions);
        let blocks = std::mem::take(&mut self.blocks);
        self.insert(&self.config.transactions_table, transactions).await?;
        self.insert(&self.config.blocks_table, blocks).await?;
        Ok(())
    }

    async fn query_max_depth(&self) -> anyhow::Result<Option<BlockNumber>> {
        let query = format!(
            "SELECT max(depth) AS depth, count() AS blocks FROM {} FORMAT JSONEachRow",
            self.config.blocks_table
        );

        let res = self.request().body(query).send().await?;
        let text = ensure_success(res).await?.text().await?;

        let row: MaxDepthRow = serde_json::from_str(text.trim())
            .with_context(|| format!("unexpected max depth response - {}", text.trim()))?;

        Ok((row.blocks > 0).then_some(row.depth))
    }
}


fn push_row<T: Serialize>(buf: &mut Vec<u8>, row: &T) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *buf, row)?;
    buf.push(b'\n');
    Ok(())
}


async fn ensure_success(res: Response) -> anyhow::Result<Response> {
    if res.status().is_success() {
        return Ok(res)
    }
    let status = res.status().as_u16();
    let text = res.text().await.unwrap_or_default();
    bail!("clickhouse responded with HTTP {}: {}", status, text.trim())
}
