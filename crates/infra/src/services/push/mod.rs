use anyhow::Context;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

/// Transport that delivers one push message to one device address.
/// Implementations must bound the call with a timeout so a stuck transport
/// surfaces as a send failure instead of blocking a dispatch worker.
#[async_trait::async_trait]
pub trait IPushService: Send + Sync {
    async fn send(
        &self,
        address: &str,
        title: &str,
        body: &str,
        payload: &Value,
    ) -> anyhow::Result<()>;
}

/// Forwards messages to the push relay, which owns the APNs / FCM
/// credentials and the per-platform protocol details.
pub struct RelayPushService {
    client: reqwest::Client,
    relay_url: String,
    relay_key: String,
}

impl RelayPushService {
    pub fn new(relay_url: String, relay_key: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Unable to create push relay http client")?;
        Ok(Self {
            client,
            relay_url,
            relay_key,
        })
    }
}

#[async_trait::async_trait]
impl IPushService for RelayPushService {
    async fn send(
        &self,
        address: &str,
        title: &str,
        body: &str,
        payload: &Value,
    ) -> anyhow::Result<()> {
        self.client
            .post(&self.relay_url)
            .header("pirouette-relay-key", &self.relay_key)
            .json(&serde_json::json!({
                "address": address,
                "title": title,
                "body": body,
                "payload": payload,
            }))
            .send()
            .await
            .context("Push relay request failed")?
            .error_for_status()
            .context("Push relay rejected the message")?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentPush {
    pub address: String,
    pub title: String,
    pub body: String,
    pub payload: Value,
}

/// Records sends instead of performing them; addresses registered through
/// `fail_address` reject every send. For tests.
pub struct InMemoryPushService {
    pub sent: Mutex<Vec<SentPush>>,
    failing: Mutex<HashSet<String>>,
}

impl InMemoryPushService {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn fail_address(&self, address: &str) {
        self.failing.lock().unwrap().insert(address.to_string());
    }

    pub fn sent_to(&self, address: &str) -> Vec<SentPush> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.address == address)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl IPushService for InMemoryPushService {
    async fn send(
        &self,
        address: &str,
        title: &str,
        body: &str,
        payload: &Value,
    ) -> anyhow::Result<()> {
        if self.failing.lock().unwrap().contains(address) {
            anyhow::bail!("Send to {} failed", address);
        }
        self.sent.lock().unwrap().push(SentPush {
            address: address.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }
}
