//! テスト・ローカル実行向けのインメモリストア実装。

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use super::dao::NewsStore;
use super::models::{Article, CategoryRanking, GlobalRanking};

/// `NewsStore` のインメモリ実装。Postgres と同じ置換セマンティクスを持つ。
#[derive(Debug, Default)]
pub struct MemoryNewsStore {
    articles: Mutex<Vec<Article>>,
    global: Mutex<Option<GlobalRanking>>,
    categories: Mutex<HashMap<String, CategoryRanking>>,
}

impl MemoryNewsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_article(&self, article: Article) {
        self.articles.lock().expect("articles lock").push(article);
    }

    pub fn push_articles(&self, articles: impl IntoIterator<Item = Article>) {
        self.articles
            .lock()
            .expect("articles lock")
            .extend(articles);
    }
}

#[async_trait]
impl NewsStore for MemoryNewsStore {
    async fn fetch_articles(&self) -> Result<Vec<Article>> {
        Ok(self.articles.lock().expect("articles lock").clone())
    }

    async fn replace_global_ranking(&self, ranking: &GlobalRanking) -> Result<()> {
        *self.global.lock().expect("global lock") = Some(ranking.clone());
        Ok(())
    }

    async fn latest_global_ranking(&self) -> Result<Option<GlobalRanking>> {
        Ok(self.global.lock().expect("global lock").clone())
    }

    async fn replace_category_rankings(&self, rankings: &[CategoryRanking]) -> Result<()> {
        let mut categories = self.categories.lock().expect("categories lock");
        categories.clear();
        for ranking in rankings {
            categories.insert(ranking.category.clone(), ranking.clone());
        }
        Ok(())
    }

    async fn latest_category_ranking(&self, category: &str) -> Result<Option<CategoryRanking>> {
        Ok(self
            .categories
            .lock()
            .expect("categories lock")
            .get(category)
            .cloned())
    }
}
