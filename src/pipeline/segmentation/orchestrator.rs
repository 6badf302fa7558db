use std::sync::Arc;

use uuid::Uuid;

use super::openrouter::OpenRouterClient;
use super::parser::recover_segmentation;
use super::prompt::{build_segmentation_prompt, truncate_article, SEGMENTATION_SYSTEM_PROMPT};
use super::types::{CompletionRequest, LlmClient, SegmentationRequest, SegmentationResult};
use super::SegmentationError;
use crate::config::{LlmSettings, SegmenterConfig};
use crate::pipeline::diagnostic::dump_failed_response;

/// Segments one contest's editorial article into per-problem solution texts:
/// validate → truncate → prompt → LLM → recover → normalize → result
///
/// Holds no per-request state; a single instance may serve concurrent requests.
pub struct EditorialSegmenter {
    llm: Option<Box<dyn LlmClient + Send + Sync>>,
    config: SegmenterConfig,
}

impl EditorialSegmenter {
    pub fn new(llm: Box<dyn LlmClient + Send + Sync>, config: SegmenterConfig) -> Self {
        Self {
            llm: Some(llm),
            config,
        }
    }

    /// A segmenter whose every request fails with `NoProvider`.
    pub fn without_provider(config: SegmenterConfig) -> Self {
        Self { llm: None, config }
    }

    /// Build the OpenRouter-backed segmenter, or one without a provider when the
    /// settings are disabled, lack a key, or the HTTP client cannot be built.
    pub fn from_settings(settings: &LlmSettings, config: SegmenterConfig) -> Self {
        if !settings.is_usable() {
            tracing::warn!(
                enabled = settings.enabled,
                has_key = settings.api_key.is_some(),
                "LLM provider not configured, segmentation disabled"
            );
            return Self::without_provider(config);
        }

        match OpenRouterClient::new(settings) {
            Ok(client) => Self::new(Box::new(client), config),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build LLM client, segmentation disabled");
                Self::without_provider(config)
            }
        }
    }

    pub fn has_provider(&self) -> bool {
        self.llm.is_some()
    }

    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Segment one editorial article.
    ///
    /// Marker spans are resolved against the full `article_text`, even when the
    /// prompt carried a truncated copy.
    pub fn segment(
        &self,
        request: &SegmentationRequest,
    ) -> Result<SegmentationResult, SegmentationError> {
        let request_id = Uuid::new_v4();
        let _span = tracing::info_span!(
            "segment_editorial",
            contest_id = %request.contest_id,
            request_id = %request_id
        )
        .entered();

        let Some(llm) = self.llm.as_deref() else {
            return Err(SegmentationError::NoProvider {
                contest_id: request.contest_id.clone(),
            });
        };

        let length = request.article_text.trim().chars().count();
        if length < self.config.min_content_chars {
            tracing::warn!(
                length,
                minimum = self.config.min_content_chars,
                "Editorial content too short for segmentation"
            );
            return Err(SegmentationError::ContentTooShort {
                contest_id: request.contest_id.clone(),
                length,
                minimum: self.config.min_content_chars,
            });
        }

        let (article, truncated) =
            truncate_article(&request.article_text, self.config.max_article_chars);
        if truncated {
            tracing::warn!(
                original_chars = request.article_text.chars().count(),
                max_chars = self.config.max_article_chars,
                "Editorial text truncated before prompting"
            );
        }

        let prompt = build_segmentation_prompt(
            &request.contest_id,
            &article,
            request.expected_problems.as_deref(),
        );
        let completion = CompletionRequest {
            system: SEGMENTATION_SYSTEM_PROMPT,
            prompt: &prompt,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::info!(model = llm.model(), "Requesting editorial segmentation");
        let response = llm.complete(&completion).map_err(|source| {
            tracing::warn!(error = %source, "LLM call failed");
            SegmentationError::Provider {
                contest_id: request.contest_id.clone(),
                source,
            }
        })?;

        match recover_segmentation(&response, &request.article_text) {
            Ok(result) if result.is_empty() => {
                tracing::warn!("Model response contained no usable segments");
                Err(SegmentationError::NothingSegmented {
                    contest_id: request.contest_id.clone(),
                })
            }
            Ok(result) => {
                tracing::info!(
                    count = result.len(),
                    strategy = result.strategy.map(|s| s.as_str()).unwrap_or("none"),
                    "Editorial segmented"
                );
                Ok(result)
            }
            Err(failure) => {
                tracing::error!(
                    response_chars = response.chars().count(),
                    "All JSON recovery strategies failed"
                );
                if let Some(dir) = &self.config.dump_dir {
                    if let Some(path) = dump_failed_response(
                        dir,
                        &request.contest_id,
                        &response,
                        failure.attempted_json.as_deref(),
                    ) {
                        tracing::error!(path = %path.display(), "Failed response saved");
                    }
                }
                Err(SegmentationError::Unrecoverable {
                    contest_id: request.contest_id.clone(),
                    raw_response: response,
                })
            }
        }
    }
}

/// Run `segment` on tokio's blocking pool so async callers never stall a worker.
pub async fn segment_blocking(
    segmenter: Arc<EditorialSegmenter>,
    request: SegmentationRequest,
) -> Result<SegmentationResult, SegmentationError> {
    let contest_id = request.contest_id.clone();
    tokio::task::spawn_blocking(move || segmenter.segment(&request))
        .await
        .map_err(|e| SegmentationError::Aborted {
            contest_id,
            reason: e.to_string(),
        })?
}
