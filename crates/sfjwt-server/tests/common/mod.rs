//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use sfjwt_oauth::Relay;
use sfjwt_server::{AppState, Server, ServerConfig};
use sfjwt_session::CacheConfig;

pub const RSA_PRIVATE_KEY: &str = include_str!("../../../sfjwt-oauth/tests/fixtures/rsa_private.pem");
pub const RSA_PUBLIC_KEY: &str = include_str!("../../../sfjwt-oauth/tests/fixtures/rsa_public.pem");

/// A server running in the background on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start with rate limiting and request logging off.
    pub async fn start() -> Result<Self> {
        Self::start_with(ServerConfig::new()).await
    }

    pub async fn start_with(config: ServerConfig) -> Result<Self> {
        Self::start_with_sessions(config, CacheConfig::default()).await
    }

    pub async fn start_with_sessions(config: ServerConfig, sessions: CacheConfig) -> Result<Self> {
        let addr = find_available_port().await?;
        let config = config
            .with_bind_address(addr)
            .with_rate_limiting(false)
            .with_request_logging(false);

        let server = Server::new(AppState::new(config, Relay::new()?, sessions));
        let handle = tokio::spawn(async move {
            let _ = server.run_on(addr).await;
        });

        let client = Client::new();
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            _handle: handle,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}{}", self.base_url(), path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(format!("{}{}", self.base_url(), path))
    }

    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.delete(format!("{}{}", self.base_url(), path))
    }
}

async fn find_available_port() -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return,
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
