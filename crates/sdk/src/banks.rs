//! Bank list lookup, for rendering a bank picker before redirecting.

use std::future::Future;

use tracing::debug;
use vnpay_types::Bank;

use crate::{
    client::{VnpayClient, cancellable, ensure_success},
    error::{GatewayError, Result, TransportError},
    logger::LogRecord,
};

impl VnpayClient {
    /// Banks enabled for this merchant. Logo links come back absolute.
    pub async fn get_bank_list(&self) -> Result<Vec<Bank>> {
        let url = self.endpoint(&self.settings.endpoints.bank_list);
        let response = self
            .http_client
            .post(&url)
            .form(&[("tmn_code", self.settings.tmn_code.as_str())])
            .send()
            .await
            .map_err(TransportError::from)?;

        let text = ensure_success(response)
            .await?
            .text()
            .await
            .map_err(TransportError::from)?;
        let mut banks: Vec<Bank> = serde_json::from_str(&text)
            .map_err(|e| GatewayError::Protocol(format!("Invalid bank list: {}", e)))?;

        for bank in &mut banks {
            bank.logo_link = self.resolve_logo_link(&bank.logo_link);
        }

        debug!(count = banks.len(), "Fetched bank list");
        self.logger.log(LogRecord::new("getBankList").with_field("count", banks.len()));
        Ok(banks)
    }

    /// [`Self::get_bank_list`], abandoned with `TransportError::Cancelled` once `cancel` resolves
    pub async fn get_bank_list_with_cancel(
        &self,
        cancel: impl Future<Output = ()>,
    ) -> Result<Vec<Bank>> {
        cancellable(self.get_bank_list(), cancel).await
    }

    fn resolve_logo_link(&self, link: &str) -> String {
        if link.is_empty() || link.starts_with("http://") || link.starts_with("https://") {
            link.to_string()
        } else {
            self.endpoint(link)
        }
    }
}
