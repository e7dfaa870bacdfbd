//! DOM operations for a tab session.

use std::collections::HashMap;

use serde_json::json;

use crate::error::CdpError;

use super::core::TabSession;

impl TabSession {
    /// Get the document root node id.
    pub async fn document(&self) -> Result<i64, CdpError> {
        let result = self.call("DOM.getDocument", Some(json!({"depth": 0}))).await?;

        result["root"]["nodeId"]
            .as_i64()
            .ok_or_else(|| CdpError::InvalidResponse("missing document root".to_string()))
    }

    /// Query selector against the whole document.
    pub async fn query_selector(&self, selector: &str) -> Result<Option<i64>, CdpError> {
        let doc = self.document().await?;
        self.query_selector_from(doc, selector).await
    }

    /// Query selector scoped under an existing node.
    pub async fn query_selector_from(
        &self,
        node_id: i64,
        selector: &str,
    ) -> Result<Option<i64>, CdpError> {
        let result = self
            .call(
                "DOM.querySelector",
                Some(json!({
                    "nodeId": node_id,
                    "selector": selector,
                })),
            )
            .await?;

        let found = result["nodeId"].as_i64().unwrap_or(0);
        if found == 0 { Ok(None) } else { Ok(Some(found)) }
    }

    /// Query selector all scoped under an existing node.
    pub async fn query_selector_all_from(
        &self,
        node_id: i64,
        selector: &str,
    ) -> Result<Vec<i64>, CdpError> {
        let result = self
            .call(
                "DOM.querySelectorAll",
                Some(json!({
                    "nodeId": node_id,
                    "selector": selector,
                })),
            )
            .await?;

        let node_ids: Vec<i64> = result["nodeIds"]
            .as_array()
            .map(|arr| arr.iter().filter_map(|v| v.as_i64()).collect())
            .unwrap_or_default();

        Ok(node_ids)
    }

    /// Read all attributes of a node.
    ///
    /// CDP returns a flat interleaved name/value array.
    pub async fn attributes(&self, node_id: i64) -> Result<HashMap<String, String>, CdpError> {
        let result = self
            .call("DOM.getAttributes", Some(json!({"nodeId": node_id})))
            .await?;

        let flat: Vec<String> = result["attributes"]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        Ok(flat
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect())
    }

    /// Read a single attribute of a node.
    pub async fn attribute(&self, node_id: i64, name: &str) -> Result<Option<String>, CdpError> {
        Ok(self.attributes(node_id).await?.remove(name))
    }

    /// Wait for a selector to match, polling until the timeout.
    ///
    /// Resolves immediately when the element is already present. On
    /// timeout the error carries the selector so callers can surface
    /// what never appeared.
    pub async fn wait_for_selector(
        &self,
        selector: &str,
        timeout: std::time::Duration,
        poll_interval: std::time::Duration,
    ) -> Result<i64, CdpError> {
        let start = std::time::Instant::now();

        loop {
            if let Some(node_id) = self.query_selector(selector).await? {
                return Ok(node_id);
            }

            if start.elapsed() > timeout {
                return Err(CdpError::Timeout(format!(
                    "waiting for selector '{}' timed out",
                    selector
                )));
            }

            tokio::time::sleep(poll_interval).await;
        }
    }
}
