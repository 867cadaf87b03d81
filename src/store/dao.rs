//! ニュースコーパスとランキングキャッシュへのアクセス層。
//!
//! 期待するスキーマ:
//!
//! ```sql
//! CREATE TABLE articles (
//!     id BIGSERIAL PRIMARY KEY,
//!     title TEXT,
//!     pub_date TEXT,
//!     category TEXT
//! );
//! CREATE TABLE trending_keywords (
//!     id BIGSERIAL PRIMARY KEY,
//!     captured_at TIMESTAMPTZ NOT NULL,
//!     keywords JSONB NOT NULL
//! );
//! CREATE TABLE category_keywords (
//!     id BIGSERIAL PRIMARY KEY,
//!     category TEXT NOT NULL,
//!     captured_at TIMESTAMPTZ NOT NULL,
//!     keywords JSONB NOT NULL
//! );
//! ```

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use super::models::{Article, CategoryRanking, GlobalRanking, RankedKeywords};

/// 記事コーパスの読み取りとランキングキャッシュの置換・参照を提供するストア。
#[async_trait]
pub trait NewsStore: Send + Sync {
    /// 記事を射影付きで全件取得する（title / pub_date / category のみ）。
    async fn fetch_articles(&self) -> Result<Vec<Article>>;

    /// 全体ランキングを新しいレコードで置き換える。
    async fn replace_global_ranking(&self, ranking: &GlobalRanking) -> Result<()>;

    /// 最新の全体ランキングを取得する。未計算の場合は `None`。
    async fn latest_global_ranking(&self) -> Result<Option<GlobalRanking>>;

    /// カテゴリ別ランキングを一括で置き換える。
    async fn replace_category_rankings(&self, rankings: &[CategoryRanking]) -> Result<()>;

    /// 指定カテゴリの最新ランキングを取得する。存在しない場合は `None`。
    async fn latest_category_ranking(&self, category: &str) -> Result<Option<CategoryRanking>>;
}

/// Postgres 実装。
pub struct PgNewsStore {
    pool: PgPool,
}

impl PgNewsStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NewsStore for PgNewsStore {
    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query("SELECT title, pub_date, category FROM articles")
            .fetch_all(&self.pool)
            .await
            .context("failed to fetch articles")?;

        let mut articles = Vec::with_capacity(rows.len());
        for row in rows {
            let title: Option<String> = row.try_get("title")?;
            let pub_date: Option<String> = row.try_get("pub_date")?;
            let category: Option<String> = row.try_get("category")?;
            articles.push(Article {
                title: title.unwrap_or_default(),
                pub_date,
                category,
            });
        }
        Ok(articles)
    }

    async fn replace_global_ranking(&self, ranking: &GlobalRanking) -> Result<()> {
        let keywords =
            serde_json::to_value(&ranking.keywords).context("failed to encode global keywords")?;

        // delete+insert を1トランザクションにまとめ、読み手が空状態を観測しないようにする
        let mut tx = self.pool.begin().await.context("failed to begin transaction")?;
        sqlx::query("DELETE FROM trending_keywords")
            .execute(&mut *tx)
            .await
            .context("failed to clear trending_keywords")?;
        sqlx::query("INSERT INTO trending_keywords (captured_at, keywords) VALUES ($1, $2)")
            .bind(ranking.captured_at)
            .bind(keywords)
            .execute(&mut *tx)
            .await
            .context("failed to insert trending_keywords record")?;
        tx.commit().await.context("failed to commit transaction")?;
        Ok(())
    }

    async fn latest_global_ranking(&self) -> Result<Option<GlobalRanking>> {
        let row = sqlx::query(
            r"
            SELECT captured_at, keywords
            FROM trending_keywords
            ORDER BY captured_at DESC
            LIMIT 1
            ",
        )
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch latest trending_keywords record")?;

        let Some(row) = row else {
            return Ok(None);
        };
        let captured_at: DateTime<Utc> = row.try_get("captured_at")?;
        let keywords: serde_json::Value = row.try_get("keywords")?;
        let keywords: RankedKeywords =
            serde_json::from_value(keywords).context("malformed trending_keywords payload")?;

        Ok(Some(GlobalRanking {
            captured_at,
            keywords,
        }))
    }

    async fn replace_category_rankings(&self, rankings: &[CategoryRanking]) -> Result<()> {
        let mut tx = self.pool.begin().await.context("failed to begin transaction")?;
        sqlx::query("DELETE FROM category_keywords")
            .execute(&mut *tx)
            .await
            .context("failed to clear category_keywords")?;

        for ranking in rankings {
            let keywords = serde_json::to_value(&ranking.keywords)
                .with_context(|| format!("failed to encode keywords for {}", ranking.category))?;
            sqlx::query(
                "INSERT INTO category_keywords (category, captured_at, keywords) VALUES ($1, $2, $3)",
            )
            .bind(&ranking.category)
            .bind(ranking.captured_at)
            .bind(keywords)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to insert ranking for {}", ranking.category))?;
        }
        tx.commit().await.context("failed to commit transaction")?;
        Ok(())
    }

    async fn latest_category_ranking(&self, category: &str) -> Result<Option<CategoryRanking>> {
        let row = sqlx::query(
            r"
            SELECT category, captured_at, keywords
            FROM category_keywords
            WHERE category = $1
            ORDER BY captured_at DESC
            LIMIT 1
            ",
        )
        .bind(category)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch category_keywords record")?;

        let Some(row) = row else {
            return Ok(None);
        };
        let category: String = row.try_get("category")?;
        let captured_at: DateTime<Utc> = row.try_get("captured_at")?;
        let keywords: serde_json::Value = row.try_get("keywords")?;
        let keywords: RankedKeywords =
            serde_json::from_value(keywords).context("malformed category_keywords payload")?;

        Ok(Some(CategoryRanking {
            category,
            captured_at,
            keywords,
        }))
    }
}
