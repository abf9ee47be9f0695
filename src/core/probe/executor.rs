/*!
Probe executor: one GET per call, always returning a `ProbeOutcome`.

Transport failures (DNS, TLS, refused connections, timeouts, unreadable
certificate bundles) never escape this module. They become a sentinel outcome
with status 999, zero elapsed time and the failure text, so the scheduler
records them as data and keeps going.
*/

use crate::config::defaults::DEFAULT_TIMEOUT_SECS;
use crate::config::CertificateBundle;
use crate::core::probe::debug_logger::get_debug_logger;
use crate::core::probe::transport::{ProbeRequest, ProbeTransport};
use crate::core::probe::types::ProbeOutcome;
use std::sync::Arc;
use std::time::Duration;

pub struct ProbeExecutor {
    transport: Arc<dyn ProbeTransport>,
    timeout: Duration,
}

impl ProbeExecutor {
    pub fn new(transport: Arc<dyn ProbeTransport>) -> Self {
        Self {
            transport,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the request; the certificate is attached only when both parts are non-empty
    pub fn build_request(
        &self,
        url: &str,
        cert_path: Option<&str>,
        cert_password: Option<&str>,
    ) -> ProbeRequest {
        ProbeRequest {
            url: url.to_string(),
            client_certificate: CertificateBundle::from_parts(cert_path, cert_password),
            timeout: self.timeout,
        }
    }

    pub async fn execute(
        &self,
        url: &str,
        cert_path: Option<&str>,
        cert_password: Option<&str>,
    ) -> ProbeOutcome {
        let debug_logger = get_debug_logger();
        let probe_id = format!("probe_{}", uuid::Uuid::new_v4());

        let request = self.build_request(url, cert_path, cert_password);
        debug_logger.probe_start(url, request.client_certificate.is_some(), probe_id.clone());

        let outcome = match self.transport.get(request).await {
            Ok(response) => ProbeOutcome::success(response.status_code, response.total_time),
            Err(err) => {
                debug_logger.error("ProbeExecutor", "probe_failed", &format!("Probe failed: {}", err));
                ProbeOutcome::failure(err)
            }
        };

        debug_logger.probe_end(
            outcome.status_code,
            outcome.elapsed_seconds,
            &outcome.error_message,
            probe_id,
        );
        outcome
    }
}
