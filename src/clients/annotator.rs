/// 外部アノテーションサービス（単語分割・品詞・固有表現タグ付け）クライアント。
///
/// タイムアウトを設定した reqwest クライアントで `POST /annotate` を呼び出します。
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// アノテーションリクエスト。
#[derive(Debug, Serialize)]
struct AnnotateRequest<'a> {
    text: &'a str,
}

/// 文単位にタグ付きトークンを並べたアノテーション結果。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnnotateResponse {
    pub sentences: Vec<Vec<TaggedToken>>,
}

/// タグ付きトークン。`ner_label` を省略した応答は "O"（固有表現なし）として扱う。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaggedToken {
    pub form: String,
    #[serde(rename = "posTag")]
    pub pos_tag: String,
    #[serde(rename = "nerLabel", default)]
    pub ner_label: Option<String>,
}

impl TaggedToken {
    /// 固有表現ラベル。欠落時は "O"。
    #[must_use]
    pub fn ner_label(&self) -> &str {
        self.ner_label.as_deref().unwrap_or("O")
    }
}

/// アノテーションサービスとの通信を抽象化するトレイト。
#[async_trait]
pub trait Annotator: Send + Sync {
    /// テキストをタグ付きトークン列に変換する。
    async fn annotate(&self, text: &str) -> Result<AnnotateResponse>;
}

/// アノテータークライアントの設定。
#[derive(Debug, Clone)]
pub struct AnnotatorConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub total_timeout: Duration,
}

/// HTTP経由のアノテータークライアント。
#[derive(Debug, Clone)]
pub struct HttpAnnotatorClient {
    client: Client,
    base_url: Url,
}

impl HttpAnnotatorClient {
    /// 新しいアノテータークライアントを作成する。
    ///
    /// # Errors
    /// URLのパースまたはHTTPクライアントの構築に失敗した場合はエラーを返します。
    pub fn new(config: AnnotatorConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.total_timeout)
            .build()
            .context("failed to build annotator HTTP client")?;

        let base_url = Url::parse(&config.base_url).context("invalid annotator base URL")?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl Annotator for HttpAnnotatorClient {
    async fn annotate(&self, text: &str) -> Result<AnnotateResponse> {
        let url = self
            .base_url
            .join("annotate")
            .context("failed to build annotate URL")?;

        let response = self
            .client
            .post(url)
            .json(&AnnotateRequest { text })
            .send()
            .await
            .context("annotator request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("annotator returned error status {}: {}", status, error_body);
        }

        let annotated: AnnotateResponse = response
            .json()
            .await
            .context("failed to deserialize annotator response")?;

        debug!(sentences = annotated.sentences.len(), "annotated text");

        Ok(annotated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> AnnotatorConfig {
        AnnotatorConfig {
            base_url,
            connect_timeout: Duration::from_secs(3),
            total_timeout: Duration::from_secs(30),
        }
    }

    #[tokio::test]
    async fn annotate_parses_tagged_tokens() {
        let server = MockServer::start().await;

        let request_body = serde_json::json!({ "text": "Bầu cử tổng thống Mỹ" });
        let response_body = serde_json::json!({
            "sentences": [
                [
                    { "form": "Bầu_cử", "posTag": "N", "nerLabel": "O" },
                    { "form": "tổng_thống", "posTag": "N", "nerLabel": "O" },
                    { "form": "Mỹ", "posTag": "Np", "nerLabel": "B-LOC" }
                ]
            ]
        });

        Mock::given(method("POST"))
            .and(path("/annotate"))
            .and(body_json(&request_body))
            .respond_with(ResponseTemplate::new(200).set_body_json(response_body))
            .mount(&server)
            .await;

        let client = HttpAnnotatorClient::new(test_config(server.uri())).expect("client builds");
        let annotated = client
            .annotate("Bầu cử tổng thống Mỹ")
            .await
            .expect("annotate succeeds");

        assert_eq!(annotated.sentences.len(), 1);
        assert_eq!(annotated.sentences[0][0].form, "Bầu_cử");
        assert_eq!(annotated.sentences[0][2].ner_label(), "B-LOC");
    }

    #[tokio::test]
    async fn annotate_defaults_missing_ner_label() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "sentences": [
                [ { "form": "giá_vàng", "posTag": "N" } ]
            ]
        });

        Mock::given(method("POST"))
            .and(path("/annotate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response_body))
            .mount(&server)
            .await;

        let client = HttpAnnotatorClient::new(test_config(server.uri())).expect("client builds");
        let annotated = client.annotate("giá vàng").await.expect("annotate succeeds");

        assert_eq!(annotated.sentences[0][0].ner_label(), "O");
    }

    #[tokio::test]
    async fn annotate_surfaces_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/annotate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("java heap space"))
            .mount(&server)
            .await;

        let client = HttpAnnotatorClient::new(test_config(server.uri())).expect("client builds");
        let error = client.annotate("tin tức").await.expect_err("must fail");

        assert!(error.to_string().contains("error status"));
    }

    #[tokio::test]
    async fn annotate_rejects_malformed_shape() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/annotate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "tokens": ["no", "sentences"] })),
            )
            .mount(&server)
            .await;

        let client = HttpAnnotatorClient::new(test_config(server.uri())).expect("client builds");
        let error = client.annotate("tin tức").await.expect_err("must fail");

        assert!(error.to_string().contains("deserialize"));
    }
}
