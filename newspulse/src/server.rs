use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rocket::figment::Figment;
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::stream::ByteStream;
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::{catch, catchers, get, post, routes, Build, FromForm, Rocket, State};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use common::Config;

use crate::error::ApiError;
use crate::relay::{ChatRelay, ChatRequest, RelayStream};
use crate::store::{
    Article, ArticleFilter, DailyIndex, NewsStore, NewsSummary, Timeline, DEFAULT_RELATED_LIMIT,
};

/// Default `limit` for the `top` and `trending` article lists.
const DEFAULT_LIST_LIMIT: usize = 20;

/// Application state stored inside Rocket managed state.
#[derive(Clone)]
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub store: Arc<NewsStore>,
    pub relay: Arc<ChatRelay>,
    pub updater_enabled: bool,
}

impl AppState {
    pub fn new(store: Arc<NewsStore>, relay: Arc<ChatRelay>, updater_enabled: bool) -> Self {
        Self {
            started_at: Utc::now(),
            store,
            relay,
            updater_enabled,
        }
    }
}

/// Response structure for `/api/v1/status`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    uptime_seconds: i64,
    articles_count: usize,
    chat_configured: bool,
    updater_enabled: bool,
}

#[derive(Serialize)]
struct ArticlesResponse {
    articles: Vec<Article>,
    count: usize,
}

impl From<Vec<Article>> for ArticlesResponse {
    fn from(articles: Vec<Article>) -> Self {
        Self {
            count: articles.len(),
            articles,
        }
    }
}

#[derive(Serialize)]
struct ArticleResponse {
    article: Article,
}

/// Query string of `GET /api/articles`.
#[derive(Debug, Default, FromForm)]
struct ArticleQuery {
    category: Option<String>,
    search: Option<String>,
    #[field(name = "type")]
    kind: Option<String>,
    limit: Option<String>,
}

impl ArticleQuery {
    fn limit(&self) -> usize {
        parse_limit(self.limit.as_deref(), DEFAULT_LIST_LIMIT)
    }
}

// Non-numeric limits fall back to the default instead of failing the request.
fn parse_limit(raw: Option<&str>, default: usize) -> usize {
    raw.and_then(|l| l.trim().parse().ok()).unwrap_or(default)
}

/// Named article lists selectable with `?type=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FeedKind {
    Top,
    Personalized,
    Market,
    Local,
    Trending,
    Bookmarked,
}

impl FeedKind {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "top" => Some(FeedKind::Top),
            "personalized" => Some(FeedKind::Personalized),
            "market" => Some(FeedKind::Market),
            "local" => Some(FeedKind::Local),
            "trending" => Some(FeedKind::Trending),
            "bookmarked" => Some(FeedKind::Bookmarked),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ArticleActionRequest {
    action: String,
}

/// Chat answer relayed as `text/event-stream`.
pub struct EventStreamRelay(pub RelayStream);

impl<'r> Responder<'r, 'r> for EventStreamRelay {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'r> {
        let mut response = ByteStream(self.0).respond_to(req)?;
        response.set_header(ContentType::new("text", "event-stream"));
        response.set_raw_header("Cache-Control", "no-cache");
        response.set_raw_header("Connection", "keep-alive");
        Ok(response)
    }
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

/// Status endpoint returning simple JSON with uptime and basic runtime info.
#[get("/v1/status")]
async fn status(state: &State<AppState>) -> Json<StatusResponse> {
    let uptime = (Utc::now() - state.started_at).num_seconds();
    Json(StatusResponse {
        status: "ok",
        uptime_seconds: uptime,
        articles_count: state.store.article_count(),
        chat_configured: state.relay.is_configured(),
        updater_enabled: state.updater_enabled,
    })
}

/// List articles. `type` selects a named list and ignores `category`/`search`.
#[get("/articles?<query..>")]
async fn list_articles(state: &State<AppState>, query: ArticleQuery) -> Json<ArticlesResponse> {
    let store = &state.store;
    let articles = match query.kind.as_deref().and_then(FeedKind::parse) {
        Some(FeedKind::Top) => store.top_news(query.limit()),
        Some(FeedKind::Personalized) => store.personalized_feed(),
        Some(FeedKind::Market) => store.market_news(),
        Some(FeedKind::Local) => store.local_news(),
        Some(FeedKind::Trending) => store.trending_articles(query.limit()),
        Some(FeedKind::Bookmarked) => store.bookmarked_articles(),
        None => store.list_articles(&ArticleFilter {
            category: query.category.clone(),
            search: query.search.clone(),
        }),
    };
    Json(articles.into())
}

#[get("/articles/<id>")]
async fn get_article(state: &State<AppState>, id: &str) -> Result<Json<ArticleResponse>, ApiError> {
    state
        .store
        .article(id)
        .map(|article| Json(ArticleResponse { article }))
        .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))
}

/// Bookmark toggle or view count for one article.
#[post("/articles/<id>", data = "<body>")]
async fn article_action(
    state: &State<AppState>,
    id: &str,
    body: Json<ArticleActionRequest>,
) -> Result<Json<Value>, ApiError> {
    match body.action.as_str() {
        "bookmark" => {
            let bookmarked = state.store.toggle_bookmark(id);
            tracing::debug!(article_id = %id, bookmarked, "bookmark toggled");
            Ok(Json(json!({ "bookmarked": bookmarked })))
        }
        "view" => {
            state.store.mark_viewed(id);
            Ok(Json(json!({ "success": true })))
        }
        other => {
            tracing::warn!(article_id = %id, action = %other, "rejected unknown article action");
            Err(ApiError::InvalidRequest("Invalid action".to_string()))
        }
    }
}

#[get("/articles/<id>/related?<limit>")]
async fn related_articles(
    state: &State<AppState>,
    id: &str,
    limit: Option<String>,
) -> Json<ArticlesResponse> {
    let limit = parse_limit(limit.as_deref(), DEFAULT_RELATED_LIMIT);
    Json(state.store.related_articles(id, limit).into())
}

#[get("/categories")]
async fn categories(state: &State<AppState>) -> Json<Value> {
    Json(json!({ "categories": state.store.categories() }))
}

#[get("/index")]
async fn daily_index(state: &State<AppState>) -> Json<DailyIndex> {
    Json(state.store.daily_index())
}

#[get("/summary")]
async fn summary(state: &State<AppState>) -> Json<NewsSummary> {
    Json(state.store.news_summary())
}

#[derive(Serialize)]
struct TimelinesResponse {
    timelines: Vec<Timeline>,
}

#[get("/timelines")]
async fn timelines(state: &State<AppState>) -> Json<TimelinesResponse> {
    Json(TimelinesResponse {
        timelines: state.store.timelines(),
    })
}

/// Relay a chat conversation to the upstream completion API.
#[post("/chat", data = "<body>")]
async fn chat(state: &State<AppState>, body: Json<ChatRequest>) -> Result<EventStreamRelay, ApiError> {
    let stream = state.relay.open_stream(body.into_inner()).await?;
    Ok(EventStreamRelay(stream))
}

/// Keep the `{"error": ...}` shape for Rocket-level failures too.
#[catch(default)]
fn json_catcher(status: Status, _req: &Request<'_>) -> (Status, Json<Value>) {
    let message = match status.code {
        400 => "Bad request",
        404 => "Not found",
        422 => "Invalid request body",
        500 => "An unexpected error occurred",
        _ => status.reason().unwrap_or("Request failed"),
    };
    (status, Json(json!({ "error": message })))
}

/// Assemble the Rocket instance with managed state, routes and catchers.
pub fn build_rocket(state: AppState, figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(state)
        .mount("/", routes![health])
        .mount(
            "/api",
            routes![
                status,
                list_articles,
                get_article,
                article_action,
                related_articles,
                categories,
                daily_index,
                summary,
                timelines,
                chat,
            ],
        )
        .register("/", catchers![json_catcher])
}

/// Rocket figment with `[server]` bind/port from the application config applied.
pub fn figment_from_config(config: &Config) -> Figment {
    let mut fig = rocket::Config::figment();
    if let Some(server) = &config.server {
        if let Some(bind) = &server.bind {
            fig = fig.merge(("address", bind.clone()));
        }
        if let Some(port) = server.port {
            fig = fig.merge(("port", port));
        }
    }
    fig
}

/// Build and launch the Rocket server.
///
/// This function blocks until the Rocket server shuts down (it awaits `rocket.launch().await`)
/// and returns an error if Rocket fails to start.
pub async fn launch_rocket(state: AppState, config: &Config) -> Result<()> {
    let rocket = build_rocket(state, figment_from_config(config));

    tracing::info!("Starting Rocket HTTP server");
    rocket
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_kind_parsing() {
        assert_eq!(FeedKind::parse("trending"), Some(FeedKind::Trending));
        assert_eq!(FeedKind::parse("bookmarked"), Some(FeedKind::Bookmarked));
        assert_eq!(FeedKind::parse("Top"), None);
        assert_eq!(FeedKind::parse(""), None);
    }

    #[test]
    fn limit_falls_back_on_garbage() {
        assert_eq!(parse_limit(Some("3"), 20), 3);
        assert_eq!(parse_limit(Some("abc"), 20), 20);
        assert_eq!(parse_limit(Some("-1"), 20), 20);
        assert_eq!(parse_limit(None, 3), 3);
    }
}
