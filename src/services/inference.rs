use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// The external neural-style-transfer model: one synchronous request per
/// synthesis, no retries. Any non-success response or malformed payload
/// surfaces as an upstream failure.
#[async_trait::async_trait]
pub trait StyleTransferModel: Send + Sync {
    /// Synthesize a stylized image from the two source images and return its
    /// public URL.
    async fn predict(&self, content_image_url: &str, style_image_url: &str) -> Result<String>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictRequest<'a> {
    content_image_public_url: &'a str,
    style_image_public_url: &'a str,
}

#[derive(Deserialize)]
struct PredictResponse {
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    stylized_image_public_url: String,
}

/// HTTP client for the model service's `POST /predict` endpoint.
pub struct HttpStyleTransferModel {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStyleTransferModel {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl StyleTransferModel for HttpStyleTransferModel {
    async fn predict(&self, content_image_url: &str, style_image_url: &str) -> Result<String> {
        let url = format!("{}/predict", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&PredictRequest {
                content_image_public_url: content_image_url,
                style_image_public_url: style_image_url,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Upstream(format!(
                "style transfer model returned status {}",
                response.status()
            )));
        }

        let payload: PredictResponse = response
            .json()
            .await
            .map_err(|err| Error::Upstream(format!("malformed model response: {err}")))?;
        let prediction = payload.predictions.into_iter().next().ok_or_else(|| {
            Error::Upstream("style transfer model returned no predictions".to_string())
        })?;
        Ok(prediction.stylized_image_public_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prediction_payload_uses_the_model_wire_names() {
        let payload: PredictResponse = serde_json::from_str(
            r#"{"predictions": [{"stylizedImagePublicUrl": "http://cdn/z.png"}]}"#,
        )
        .unwrap();
        assert_eq!(
            payload.predictions[0].stylized_image_public_url,
            "http://cdn/z.png"
        );

        let body = serde_json::to_value(PredictRequest {
            content_image_public_url: "http://cdn/c.png",
            style_image_public_url: "http://cdn/s.png",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "contentImagePublicUrl": "http://cdn/c.png",
                "styleImagePublicUrl": "http://cdn/s.png"
            })
        );
    }
}
