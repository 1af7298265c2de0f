use rand::Rng;
use serde::{Deserialize, Serialize};

/// Categories surfaced on the markets page
pub const MARKET_CATEGORIES: [&str; 4] = ["Markets", "Economics", "Crypto", "Technology"];

pub const LOCAL_CATEGORY: &str = "Local";

/// Positions of the seed articles that make up the personalized feed sample.
const PERSONALIZED_POSITIONS: [usize; 6] = [0, 1, 3, 6, 7, 13];

/// A news article with its mutable dashboard counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Coverage percentage, capped at 100
    pub coverage: u32,
    pub sources: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    /// Relative publication time as displayed ("15 minutes ago")
    pub timestamp: String,
    pub location: String,
    pub views: u64,
    pub bookmarked: bool,
}

/// Optional filters for [`ArticleRepository::list`]. Empty strings count as unset.
#[derive(Debug, Clone, Default)]
pub struct ArticleFilter {
    pub category: Option<String>,
    pub search: Option<String>,
}

impl ArticleFilter {
    pub fn category(category: impl Into<String>) -> Self {
        Self { category: Some(category.into()), search: None }
    }

    pub fn search(text: impl Into<String>) -> Self {
        Self { category: None, search: Some(text.into()) }
    }

    fn active_category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }

    fn active_search(&self) -> Option<String> {
        self.search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

/// Article collection in seed order. Every query returns owned copies.
#[derive(Debug, Clone, Default)]
pub struct ArticleRepository {
    articles: Vec<Article>,
}

impl ArticleRepository {
    pub fn new(articles: Vec<Article>) -> Self {
        Self { articles }
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn list(&self, filter: &ArticleFilter) -> Vec<Article> {
        let category = filter.active_category();
        let search = filter.active_search();

        self.articles
            .iter()
            .filter(|a| category.map_or(true, |c| a.category == c))
            .filter(|a| {
                search.as_deref().map_or(true, |needle| {
                    a.title.to_lowercase().contains(needle)
                        || a.category.to_lowercase().contains(needle)
                        || a.location.to_lowercase().contains(needle)
                })
            })
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Article> {
        self.articles.iter().find(|a| a.id == id).cloned()
    }

    /// First `limit` articles in storage order. Not a ranking.
    pub fn top(&self, limit: usize) -> Vec<Article> {
        self.articles.iter().take(limit).cloned().collect()
    }

    pub fn personalized(&self) -> Vec<Article> {
        PERSONALIZED_POSITIONS
            .iter()
            .filter_map(|&i| self.articles.get(i))
            .cloned()
            .collect()
    }

    pub fn market(&self) -> Vec<Article> {
        self.articles
            .iter()
            .filter(|a| MARKET_CATEGORIES.contains(&a.category.as_str()))
            .cloned()
            .collect()
    }

    pub fn local(&self) -> Vec<Article> {
        self.list(&ArticleFilter::category(LOCAL_CATEGORY))
    }

    /// Articles ordered by views, highest first. Ties keep storage order.
    pub fn trending(&self, limit: usize) -> Vec<Article> {
        let mut sorted = self.articles.clone();
        sorted.sort_by(|a, b| b.views.cmp(&a.views));
        sorted.truncate(limit);
        sorted
    }

    pub fn bookmarked(&self) -> Vec<Article> {
        self.articles.iter().filter(|a| a.bookmarked).cloned().collect()
    }

    /// Other articles of the same category, storage order.
    pub fn related(&self, id: &str, limit: usize) -> Vec<Article> {
        let Some(category) = self.articles.iter().find(|a| a.id == id).map(|a| a.category.clone()) else {
            return Vec::new();
        };
        self.articles
            .iter()
            .filter(|a| a.category == category && a.id != id)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Flips the bookmark flag. Unknown ids report `false` and change nothing.
    pub fn toggle_bookmark(&mut self, id: &str) -> bool {
        match self.articles.iter_mut().find(|a| a.id == id) {
            Some(article) => {
                article.bookmarked = !article.bookmarked;
                article.bookmarked
            }
            None => false,
        }
    }

    /// Returns whether the article exists.
    pub fn mark_viewed(&mut self, id: &str) -> bool {
        match self.articles.iter_mut().find(|a| a.id == id) {
            Some(article) => {
                article.views = article.views.saturating_add(1);
                true
            }
            None => false,
        }
    }

    pub fn categories(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for article in &self.articles {
            if !seen.iter().any(|c| c == &article.category) {
                seen.push(article.category.clone());
            }
        }
        seen
    }

    /// One liveness tick: coverage creeps towards 100, sources and views grow.
    pub fn drift<R: Rng>(&mut self, rng: &mut R) {
        for article in &mut self.articles {
            article.coverage = (article.coverage + rng.gen_range(0..3)).min(100);
            article.sources = article.sources.saturating_add(rng.gen_range(0..5));
            article.views = article.views.saturating_add(rng.gen_range(0..100));
        }
    }
}
