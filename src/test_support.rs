//! テスト共通のスタブ。

use anyhow::Result;
use async_trait::async_trait;

use crate::clients::{AnnotateResponse, Annotator, TaggedToken};

/// 空白区切りの各語を名詞トークンとして返す素朴なアノテータースタブ。
pub(crate) struct WordAnnotator;

#[async_trait]
impl Annotator for WordAnnotator {
    async fn annotate(&self, text: &str) -> Result<AnnotateResponse> {
        let tokens = text
            .split_whitespace()
            .map(|word| TaggedToken {
                form: word.to_string(),
                pos_tag: "N".to_string(),
                ner_label: Some("O".to_string()),
            })
            .collect();
        Ok(AnnotateResponse {
            sentences: vec![tokens],
        })
    }
}
