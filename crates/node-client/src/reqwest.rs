use crate::client::NodeClient;
use crate::errors::{NodeError, UnexpectedStatus};
use crate::types::{AccountInfo, NodeResponse, RawBlock, TransactionInfo};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use lkl_primitives::BlockNumber;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::fmt::{Debug, Formatter};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;


pub fn default_http_client(timeout: Duration) -> anyhow::Result<Client> {
    let client = Client::builder()
        .read_timeout(timeout)
        .connect_timeout(timeout)
        .gzip(true)
        .build()?;
    Ok(client)
}


/// [NodeClient] talking to the node's JSON-over-POST interface.
///
/// Transport failures and non-200 answers are returned as errors and never
/// retried here.
#[derive(Clone)]
pub struct ReqwestNodeClient {
    http: Client,
    url: Url
}


impl Debug for ReqwestNodeClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestNodeClient")
            .field("url", &self.url.as_str())
            .finish()
    }
}


impl ReqwestNodeClient {
    pub fn from_url(url: Url, timeout: Duration) -> anyhow::Result<Self> {
        let http = default_http_client(timeout)?;
        Self::new(http, url)
    }

    pub fn new(http: Client, url: Url) -> anyhow::Result<Self> {
        anyhow::ensure!(!url.cannot_be_a_base(), "invalid node url - {}", url);
        Ok(Self {
            http,
            url
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn endpoint(&self, method: &str) -> Url {
        let mut url = self.url.clone();
        url.path_segments_mut()
            .expect("base url was validated on construction")
            .pop_if_empty()
            .push(method);
        url
    }

    async fn call<B: Serialize>(
        &self,
        method: &'static str,
        body: &B
    ) -> anyhow::Result<NodeResponse>
    {
        let res = self.http
            .post(self.endpoint(method))
            .json(body)
            .send()
            .await
            .with_context(|| format!("{} request failed", method))?;

        if res.status().as_u16() != 200 {
            return Err(response_error(method, res).await.into())
        }

        res.json()
            .await
            .with_context(|| format!("failed to decode {} response", method))
    }
}


#[async_trait]
impl NodeClient for ReqwestNodeClient {
    #[instrument(level = "debug", skip(self))]
    async fn get_block(&self, number: BlockNumber) -> anyhow::Result<Option<RawBlock>> {
        let res = self.call("get_block", &json!({ "number": number })).await?;

        if res.status == "error" {
            let not_found = format!("Block was not found. number:{}", number);
            return if res.result.as_str() == Some(not_found.as_str()) {
                debug!("block is not available yet");
                Ok(None)
            } else {
                Err(node_error("get_block", res.result).into())
            }
        }

        decode_result("get_block", res).map(Some)
    }

    #[instrument(level = "debug", skip(self))]
    async fn get_account_transactions(&self, address: &str) -> anyhow::Result<Vec<String>> {
        let res = self.call("get_account", &json!({ "address": address })).await?;
        if res.status == "error" {
            return Err(node_error("get_account", res.result).into())
        }
        let info: AccountInfo = decode_result("get_account", res)?;
        Ok(info.transaction_hashes)
    }

    #[instrument(level = "debug", skip(self))]
    async fn get_transaction(&self, hash: &str) -> anyhow::Result<TransactionInfo> {
        let res = self.call("get_transaction", &json!({ "hash": hash })).await?;
        if res.status == "error" {
            return Err(node_error("get_transaction", res.result).into())
        }
        decode_result("get_transaction", res)
    }
}


fn decode_result<T: DeserializeOwned>(method: &'static str, res: NodeResponse) -> anyhow::Result<T> {
    if res.status != "ok" {
        warn!(
            method,
            status = %res.status,
            result = %res.result,
            "unknown response status"
        );
    }
    serde_json::from_value(res.result)
        .map_err(|err| anyhow!(err))
        .with_context(|| format!("unexpected {} result", method))
}


fn node_error(method: &'static str, result: serde_json::Value) -> NodeError {
    let message = match result {
        serde_json::Value::String(s) => s,
        other => other.to_string()
    };
    NodeError {
        method,
        message
    }
}


async fn response_error(method: &'static str, response: Response) -> UnexpectedStatus {
    let status = response.status().as_u16();
    let body = response.text().await.ok().filter(|text| !text.is_empty());
    UnexpectedStatus {
        method,
        status,
        body
    }
}
