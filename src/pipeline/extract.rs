//! タイトル文字列からキーワード候補トークンを抽出する。

use std::sync::Arc;

use tracing::warn;

use crate::clients::Annotator;

use super::stopwords::StopwordSet;

/// 名詞・固有名詞（posTag が N / Np）は固有表現ラベルがなくても保持する。
const NOUN_POS_TAGS: &[&str] = &["N", "Np"];

/// 固有表現なしを表すラベル。
const NER_OUTSIDE: &str = "O";

/// 外部アノテーターとストップワードフィルタを組み合わせたキーワード抽出器。
pub struct KeywordExtractor {
    annotator: Arc<dyn Annotator>,
    stopwords: Arc<StopwordSet>,
}

impl KeywordExtractor {
    #[must_use]
    pub fn new(annotator: Arc<dyn Annotator>, stopwords: Arc<StopwordSet>) -> Self {
        Self {
            annotator,
            stopwords,
        }
    }

    /// タイトルをキーワードトークン列へ変換する。
    ///
    /// 保持条件: 固有表現ラベルが "O" 以外、または品詞が名詞／固有名詞であり、
    /// かつ表層形が3文字以上でストップワードに含まれないこと。
    /// タイトル内の重複はここでは除去しない。
    ///
    /// アノテーター呼び出しの失敗（通信・応答形状の不備）はタイトル単位で
    /// 吸収し、空列を返す。コーパス全体のスキャンを中断させないための方針。
    pub async fn extract(&self, title: &str) -> Vec<String> {
        let annotated = match self.annotator.annotate(title).await {
            Ok(annotated) => annotated,
            Err(error) => {
                warn!(error = %error, title, "annotator failed, title yields no keywords");
                return Vec::new();
            }
        };

        let mut tokens = Vec::new();
        for sentence in annotated.sentences {
            for token in sentence {
                let tagged_as_keyword = token.ner_label() != NER_OUTSIDE
                    || NOUN_POS_TAGS.contains(&token.pos_tag.as_str());
                if tagged_as_keyword
                    && token.form.chars().count() > 2
                    && !self.stopwords.contains(&token.form)
                {
                    tokens.push(token.form);
                }
            }
        }
        tokens
    }
}
