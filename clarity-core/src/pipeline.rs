// The two request flows: the audit state machine and the per-image
// caption loop. Both own their state for the duration of one run.

use crate::caption::{CaptionGenerator, CaptionModel};
use crate::error::AuditError;
use crate::llm::ChatModel;
use crate::model::{CaptionResult, Remediation, ReportEnvelope};
use crate::report::ReportGenerator;
use clarity_scanner::{PageFetcher, uncaptioned_images};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

/// Mutable record threaded stage to stage through one audit run. Each
/// invocation constructs its own; nothing is shared across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineState {
    pub url: String,
    pub content: String,
    pub report: Option<ReportEnvelope>,
}

impl PipelineState {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            content: String::new(),
            report: None,
        }
    }
}

/// Audit stages. Strictly linear: fetch, then report, then done. No
/// branches, no cycles, one traversal per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuditStage {
    Fetch,
    Report,
    Done,
}

pub struct AuditPipeline<M: ChatModel> {
    fetcher: PageFetcher,
    generator: ReportGenerator<M>,
}

impl<M: ChatModel> AuditPipeline<M> {
    pub fn new(fetcher: PageFetcher, generator: ReportGenerator<M>) -> Self {
        Self { fetcher, generator }
    }

    /// Run the audit exactly once. A fetch failure propagates as a
    /// request-level error; report failures are already absorbed into
    /// the degraded envelope and never surface here.
    pub async fn run(&self, url: &str) -> Result<PipelineState, AuditError> {
        let mut state = PipelineState::new(url);
        let mut stage = AuditStage::Fetch;

        loop {
            stage = match stage {
                AuditStage::Fetch => {
                    debug!("Audit stage fetch: {}", state.url);
                    let page = self.fetcher.fetch_text(&state.url).await?;
                    state.content = page.text;
                    AuditStage::Report
                }
                AuditStage::Report => {
                    debug!("Audit stage report: {}", state.url);
                    state.report = Some(self.generator.generate(&state.url, &state.content).await);
                    AuditStage::Done
                }
                AuditStage::Done => break,
            };
        }

        info!("Audit complete for {}", state.url);
        Ok(state)
    }
}

pub struct CaptionPipeline<M: CaptionModel> {
    fetcher: PageFetcher,
    generator: CaptionGenerator<M>,
}

impl<M: CaptionModel> CaptionPipeline<M> {
    pub fn new(fetcher: PageFetcher, generator: CaptionGenerator<M>) -> Self {
        Self { fetcher, generator }
    }

    /// Enumerate, filter, then caption each selected image in order,
    /// strictly one at a time. Exactly one result per selected image;
    /// a single image's failure never aborts the batch. Only the page
    /// enumeration itself can fail the whole request.
    pub async fn run(&self, url: &str) -> Result<Remediation, AuditError> {
        let page_url =
            Url::parse(url).map_err(|e| AuditError::InvalidUrl(format!("{}: {}", url, e)))?;

        let tags = self
            .fetcher
            .fetch_images(url)
            .await
            .map_err(AuditError::Crawl)?;
        let selected = uncaptioned_images(&tags, &page_url);

        if selected.is_empty() {
            info!("No uncaptioned images on {}", url);
            return Ok(Remediation::NoUncaptionedImages);
        }

        info!("Captioning {} image(s) from {}", selected.len(), url);
        let mut results: Vec<CaptionResult> = Vec::with_capacity(selected.len());
        for img_url in &selected {
            results.push(self.generator.caption(img_url).await);
        }

        Ok(Remediation::Captions(results))
    }
}
