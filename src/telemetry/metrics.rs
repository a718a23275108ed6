// Telemetry counters for llmwatch

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for exporter and workload activity
#[derive(Clone)]
pub struct Metrics {
    // Export metrics
    log_records_exported: Arc<AtomicU64>,
    log_batches: Arc<AtomicU64>,
    log_export_errors: Arc<AtomicU64>,

    // Image upload metrics
    images_uploaded: Arc<AtomicU64>,
    image_upload_errors: Arc<AtomicU64>,

    // Workload metrics
    llm_requests: Arc<AtomicU64>,
    llm_errors: Arc<AtomicU64>,
    llm_tokens_prompt: Arc<AtomicU64>,
    llm_tokens_completion: Arc<AtomicU64>,
}

impl Metrics {
    /// Create a new metrics instance
    pub fn new() -> Self {
        Self {
            log_records_exported: Arc::new(AtomicU64::new(0)),
            log_batches: Arc::new(AtomicU64::new(0)),
            log_export_errors: Arc::new(AtomicU64::new(0)),
            images_uploaded: Arc::new(AtomicU64::new(0)),
            image_upload_errors: Arc::new(AtomicU64::new(0)),
            llm_requests: Arc::new(AtomicU64::new(0)),
            llm_errors: Arc::new(AtomicU64::new(0)),
            llm_tokens_prompt: Arc::new(AtomicU64::new(0)),
            llm_tokens_completion: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record a successfully exported log batch
    pub fn record_log_batch(&self, records: u64) {
        self.log_batches.fetch_add(1, Ordering::Relaxed);
        self.log_records_exported.fetch_add(records, Ordering::Relaxed);
        metrics::counter!("llmwatch_log_batches_total").increment(1);
        metrics::counter!("llmwatch_log_records_exported_total").increment(records);
    }

    pub fn inc_log_export_errors(&self) {
        self.log_export_errors.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("llmwatch_log_export_errors_total").increment(1);
    }

    pub fn inc_images_uploaded(&self) {
        self.images_uploaded.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("llmwatch_images_uploaded_total").increment(1);
    }

    pub fn inc_image_upload_errors(&self) {
        self.image_upload_errors.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("llmwatch_image_upload_errors_total").increment(1);
    }

    pub fn inc_llm_requests(&self) {
        self.llm_requests.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("llmwatch_llm_requests_total").increment(1);
    }

    pub fn inc_llm_errors(&self) {
        self.llm_errors.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("llmwatch_llm_errors_total").increment(1);
    }

    /// Record token usage reported by the model
    pub fn record_llm_tokens(&self, prompt: u64, completion: u64) {
        self.llm_tokens_prompt.fetch_add(prompt, Ordering::Relaxed);
        self.llm_tokens_completion.fetch_add(completion, Ordering::Relaxed);
        metrics::counter!("llmwatch_llm_tokens_prompt_total").increment(prompt);
        metrics::counter!("llmwatch_llm_tokens_completion_total").increment(completion);
    }

    // Current values

    pub fn get_log_records_exported(&self) -> u64 {
        self.log_records_exported.load(Ordering::Relaxed)
    }

    pub fn get_log_batches(&self) -> u64 {
        self.log_batches.load(Ordering::Relaxed)
    }

    pub fn get_log_export_errors(&self) -> u64 {
        self.log_export_errors.load(Ordering::Relaxed)
    }

    pub fn get_images_uploaded(&self) -> u64 {
        self.images_uploaded.load(Ordering::Relaxed)
    }

    pub fn get_image_upload_errors(&self) -> u64 {
        self.image_upload_errors.load(Ordering::Relaxed)
    }

    pub fn get_llm_requests(&self) -> u64 {
        self.llm_requests.load(Ordering::Relaxed)
    }

    pub fn get_llm_errors(&self) -> u64 {
        self.llm_errors.load(Ordering::Relaxed)
    }

    pub fn get_llm_tokens_prompt(&self) -> u64 {
        self.llm_tokens_prompt.load(Ordering::Relaxed)
    }

    pub fn get_llm_tokens_completion(&self) -> u64 {
        self.llm_tokens_completion.load(Ordering::Relaxed)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let m = Metrics::new();
        assert_eq!(m.get_log_records_exported(), 0);
        assert_eq!(m.get_llm_requests(), 0);
    }

    #[test]
    fn test_log_batch_counts_records() {
        let m = Metrics::new();
        m.record_log_batch(5);
        m.record_log_batch(3);
        assert_eq!(m.get_log_batches(), 2);
        assert_eq!(m.get_log_records_exported(), 8);
    }

    #[test]
    fn test_token_accounting() {
        let m = Metrics::new();
        m.record_llm_tokens(120, 48);
        m.record_llm_tokens(10, 2);
        assert_eq!(m.get_llm_tokens_prompt(), 130);
        assert_eq!(m.get_llm_tokens_completion(), 50);
    }

    #[test]
    fn test_clone_shares_counters() {
        let m = Metrics::new();
        let m2 = m.clone();
        m.inc_images_uploaded();
        assert_eq!(m2.get_images_uploaded(), 1);
    }
}
