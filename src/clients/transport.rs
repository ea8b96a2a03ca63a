use async_trait::async_trait;

/// Raw response of a completion call. The status is carried but not acted on here.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait CompletionTransport: Send + Sync {
    /// Issue one POST with a bearer credential and a JSON body.
    async fn post_json(
        &self,
        url: &str,
        bearer: &str,
        body: Vec<u8>,
    ) -> Result<TransportResponse, String>;
}

/// reqwest-backed transport. `reqwest::Client` is pooled, so one value can be
/// cloned and shared across concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompletionTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        bearer: &str,
        body: Vec<u8>,
    ) -> Result<TransportResponse, String> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", bearer))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| e.to_string())?; // read the body once
        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}
