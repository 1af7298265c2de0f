//! In-memory news store shared by the HTTP handlers and the background updater.
//!
//! Each repository sits behind its own `RwLock`. Mutations (bookmarks, views,
//! updater ticks) take the write lock for the whole operation, so readers never
//! observe a half-applied tick. Lost updates between concurrent requests are
//! acceptable for a dashboard.

use rand::Rng;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

pub mod articles;
pub mod conversations;
pub mod index;
pub mod seed;
pub mod summary;
pub mod timeline;

pub use articles::{Article, ArticleFilter, ArticleRepository};
pub use conversations::{ChatMessage, ConversationHistory, ConversationStore, MessageRole};
pub use index::{DailyIndex, Sentiment};
pub use summary::NewsSummary;
pub use timeline::{Timeline, TimelineEvent};

pub const DEFAULT_TOP_LIMIT: usize = 6;
pub const DEFAULT_TRENDING_LIMIT: usize = 5;
pub const DEFAULT_RELATED_LIMIT: usize = 3;

pub struct NewsStore {
    articles: RwLock<ArticleRepository>,
    timelines: Vec<Timeline>,
    index: RwLock<DailyIndex>,
    summary: NewsSummary,
    conversations: RwLock<ConversationStore>,
}

// A panicked writer can only leave counters half-bumped, which is still valid data.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl NewsStore {
    pub fn new(
        articles: Vec<Article>,
        timelines: Vec<Timeline>,
        index: DailyIndex,
        summary: NewsSummary,
    ) -> Self {
        Self {
            articles: RwLock::new(ArticleRepository::new(articles)),
            timelines,
            index: RwLock::new(index),
            summary,
            conversations: RwLock::new(ConversationStore::default()),
        }
    }

    /// Store populated with the fixed startup data.
    pub fn seeded() -> Self {
        Self::new(seed::articles(), seed::timelines(), seed::daily_index(), seed::summary())
    }

    // Articles

    pub fn list_articles(&self, filter: &ArticleFilter) -> Vec<Article> {
        read(&self.articles).list(filter)
    }

    pub fn article(&self, id: &str) -> Option<Article> {
        read(&self.articles).get(id)
    }

    pub fn article_count(&self) -> usize {
        read(&self.articles).len()
    }

    pub fn top_news(&self, limit: usize) -> Vec<Article> {
        read(&self.articles).top(limit)
    }

    pub fn personalized_feed(&self) -> Vec<Article> {
        read(&self.articles).personalized()
    }

    pub fn market_news(&self) -> Vec<Article> {
        read(&self.articles).market()
    }

    pub fn local_news(&self) -> Vec<Article> {
        read(&self.articles).local()
    }

    pub fn trending_articles(&self, limit: usize) -> Vec<Article> {
        read(&self.articles).trending(limit)
    }

    pub fn bookmarked_articles(&self) -> Vec<Article> {
        read(&self.articles).bookmarked()
    }

    pub fn related_articles(&self, id: &str, limit: usize) -> Vec<Article> {
        read(&self.articles).related(id, limit)
    }

    pub fn toggle_bookmark(&self, id: &str) -> bool {
        write(&self.articles).toggle_bookmark(id)
    }

    pub fn mark_viewed(&self, id: &str) {
        if !write(&self.articles).mark_viewed(id) {
            debug!(article_id = %id, "view ignored for unknown article");
        }
    }

    pub fn categories(&self) -> Vec<String> {
        read(&self.articles).categories()
    }

    // Timelines, index, summary

    pub fn timelines(&self) -> Vec<Timeline> {
        self.timelines.clone()
    }

    pub fn daily_index(&self) -> DailyIndex {
        *read(&self.index)
    }

    pub fn news_summary(&self) -> NewsSummary {
        self.summary.clone()
    }

    // Updater ticks

    pub fn drift_articles<R: Rng>(&self, rng: &mut R) {
        write(&self.articles).drift(rng);
    }

    pub fn nudge_index<R: Rng>(&self, rng: &mut R) -> DailyIndex {
        let mut index = write(&self.index);
        index.nudge(rng);
        *index
    }

    // Conversations (not exposed over HTTP)

    pub fn save_conversation(&self, user_id: &str, messages: Vec<ChatMessage>) {
        write(&self.conversations).save(user_id, messages);
    }

    pub fn append_message(&self, user_id: &str, role: MessageRole, content: &str) -> ChatMessage {
        write(&self.conversations).append(user_id, role, content)
    }

    pub fn conversation(&self, user_id: &str) -> Vec<ChatMessage> {
        read(&self.conversations).get(user_id)
    }

    pub fn clear_conversation(&self, user_id: &str) {
        write(&self.conversations).clear(user_id);
    }

    pub fn all_conversations(&self) -> Vec<ConversationHistory> {
        read(&self.conversations).all()
    }
}

impl Default for NewsStore {
    fn default() -> Self {
        Self::seeded()
    }
}
