//! Analysis worker: one image pair, one remote call.

use std::sync::Arc;

use crate::cost::{self, CostEstimate, PricePer1kTokens};
use crate::encode::encode_image;
use crate::error::Result;
use crate::llm::{ChatMessage, VisionClient};
use crate::pairing::ImagePair;

/// Successful analysis of one pair.
#[derive(Debug, Clone)]
pub struct PairAnalysis {
    pub text: String,
    pub cost: CostEstimate,
    pub cost_summary: String,
}

/// Analyze one image pair: encode both images, send a single multimodal
/// request, and derive the cost estimate from the reported usage.
///
/// Errors (unreadable image, failed remote call) propagate to the caller,
/// which surfaces them as a failure for this pair only. Writing the result
/// to disk is the orchestrator's job.
pub async fn analyze_pair(
    client: Arc<dyn VisionClient>,
    pair: &ImagePair,
    model: &str,
    prompt: &str,
    rates: PricePer1kTokens,
) -> Result<PairAnalysis> {
    let image_a = encode_image(&pair.path_a)?;
    let image_b = encode_image(&pair.path_b)?;

    let message = ChatMessage::user_with_images(
        prompt,
        [image_a.data_uri(), image_b.data_uri()],
    );

    let response = client.chat_completion(model, &[message]).await?;
    let (cost, cost_summary) = cost::estimate(response.usage.as_ref(), rates);

    tracing::debug!(stem = %pair.stem, total_cost = cost.total_cost, "pair analyzed");

    Ok(PairAnalysis {
        text: response.content,
        cost,
        cost_summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::llm::{ChatResponse, ContentPart, MessageContent, TokenUsage};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;

    const RATES: PricePer1kTokens = PricePer1kTokens {
        input: 0.0030,
        output: 0.0090,
    };

    /// Records the messages it receives and replies with a canned response.
    struct RecordingClient {
        seen: Mutex<Vec<ChatMessage>>,
        usage: Option<TokenUsage>,
    }

    #[async_trait]
    impl VisionClient for RecordingClient {
        async fn chat_completion(
            &self,
            _model: &str,
            messages: &[ChatMessage],
        ) -> crate::error::Result<ChatResponse> {
            self.seen.lock().unwrap().extend_from_slice(messages);
            Ok(ChatResponse {
                content: "analysis text".to_string(),
                usage: self.usage,
            })
        }
    }

    fn pair_in(dir: &Path) -> ImagePair {
        let path_a = dir.join("cat.png");
        let path_b = dir.join("cat.jpg");
        std::fs::write(&path_a, b"png-bytes").unwrap();
        std::fs::write(&path_b, b"jpg-bytes").unwrap();
        ImagePair {
            stem: "cat".to_string(),
            path_a,
            path_b,
        }
    }

    #[tokio::test]
    async fn test_sends_prompt_then_both_images() {
        let dir = tempfile::tempdir().unwrap();
        let pair = pair_in(dir.path());
        let client = Arc::new(RecordingClient {
            seen: Mutex::new(Vec::new()),
            usage: Some(TokenUsage {
                prompt_tokens: 100,
                completion_tokens: 50,
            }),
        });

        let analysis = analyze_pair(client.clone(), &pair, "model-x", "compare", RATES)
            .await
            .unwrap();
        assert_eq!(analysis.text, "analysis text");
        assert!(analysis.cost.total_cost > 0.0);

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let MessageContent::Parts(parts) = &seen[0].content else {
            panic!("expected multimodal content");
        };
        assert_eq!(parts.len(), 3);
        assert!(matches!(&parts[0], ContentPart::Text { text } if text == "compare"));
        let ContentPart::ImageUrl { image_url } = &parts[1] else {
            panic!("expected image part");
        };
        assert!(image_url.url.starts_with("data:image/png;base64,"));
        let ContentPart::ImageUrl { image_url } = &parts[2] else {
            panic!("expected image part");
        };
        assert!(image_url.url.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_missing_usage_yields_zero_cost() {
        let dir = tempfile::tempdir().unwrap();
        let pair = pair_in(dir.path());
        let client = Arc::new(RecordingClient {
            seen: Mutex::new(Vec::new()),
            usage: None,
        });

        let analysis = analyze_pair(client, &pair, "model-x", "compare", RATES)
            .await
            .unwrap();
        assert_eq!(analysis.cost.total_cost, 0.0);
        assert_eq!(analysis.cost_summary, "no usage info");
    }

    #[tokio::test]
    async fn test_unreadable_image_skips_remote_call() {
        let dir = tempfile::tempdir().unwrap();
        let pair = ImagePair {
            stem: "ghost".to_string(),
            path_a: dir.path().join("missing.png"),
            path_b: dir.path().join("also_missing.png"),
        };
        let client = Arc::new(RecordingClient {
            seen: Mutex::new(Vec::new()),
            usage: None,
        });

        let err = analyze_pair(client.clone(), &pair, "model-x", "compare", RATES)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ImageRead { .. }));
        assert!(client.seen.lock().unwrap().is_empty());
    }
}
