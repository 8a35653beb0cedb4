use crate::error::{CoreError, CoreResult};
use crate::scan::model::ScanResult;
use crate::scan::url_check::validate_check_url;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);

/// An engine that inspects a live page. Implementations must not cache:
/// every call reflects the page at call time.
#[async_trait]
pub trait PageAnalyzer: Send + Sync {
    fn name(&self) -> &str;
    async fn analyze(&self, url: &str) -> CoreResult<ScanResult>;
}

/// Validates input and bounds every analysis by a deadline. No retries here;
/// that decision belongs to whoever calls `submit` again.
#[derive(Clone)]
pub struct AnalyzerGateway {
    analyzer: Arc<dyn PageAnalyzer>,
    timeout: Duration,
}

impl AnalyzerGateway {
    pub fn new(analyzer: Arc<dyn PageAnalyzer>) -> Self {
        Self {
            analyzer,
            timeout: DEFAULT_ANALYSIS_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn analyzer_name(&self) -> &str {
        self.analyzer.name()
    }

    pub async fn analyze(&self, url: &str) -> CoreResult<ScanResult> {
        let url = validate_check_url(url)?;
        debug!(
            analyzer = self.analyzer.name(),
            timeout_ms = self.timeout.as_millis() as u64,
            "analyzing {}",
            url
        );
        match tokio::time::timeout(self.timeout, self.analyzer.analyze(url)).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => {
                warn!(analyzer = self.analyzer.name(), "analysis of {} failed: {}", url, e);
                Err(e)
            }
            Err(_) => {
                warn!(
                    analyzer = self.analyzer.name(),
                    "analysis of {} exceeded {} ms",
                    url,
                    self.timeout.as_millis()
                );
                Err(CoreError::AnalysisTimeout(self.timeout.as_millis() as u64))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalyzerGateway, PageAnalyzer};
    use crate::error::{CoreError, CoreResult};
    use crate::scan::model::ScanResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct Counting {
        calls: AtomicUsize,
        delay: Duration,
    }

    #[async_trait]
    impl PageAnalyzer for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        async fn analyze(&self, _url: &str) -> CoreResult<ScanResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(ScanResult::new(vec![], self.calls.load(Ordering::SeqCst) as u32))
        }
    }

    #[tokio::test]
    async fn every_call_reanalyzes() {
        let analyzer = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        });
        let gw = AnalyzerGateway::new(analyzer.clone());
        let a = gw.analyze("https://example.com").await.unwrap();
        let b = gw.analyze("https://example.com").await.unwrap();
        assert_eq!(a.warning_count, 1);
        assert_eq!(b.warning_count, 2);
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalid_url_never_reaches_analyzer() {
        let analyzer = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        });
        let gw = AnalyzerGateway::new(analyzer.clone());
        let err = gw.analyze("not a url").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidUrl(_)));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_maps_to_timeout() {
        let gw = AnalyzerGateway::new(Arc::new(Counting {
            calls: AtomicUsize::new(0),
            delay: Duration::from_secs(60),
        }))
        .with_timeout(Duration::from_millis(250));
        let err = gw.analyze("https://example.com").await.unwrap_err();
        assert!(matches!(err, CoreError::AnalysisTimeout(250)));
    }
}
