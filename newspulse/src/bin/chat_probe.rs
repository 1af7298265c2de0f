//! Ask a running NewsPulse server one question and print the streamed answer.
//!
//! ```text
//! cargo run --bin chat_probe -- "What is moving the markets today?"
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::io::Write;

use newspulse::relay::sse::{ChatSession, ChatState};
use newspulse::relay::{ChatRequest, ContextArticle};

#[derive(Parser, Debug)]
#[command(name = "chat_probe", about = "Send one chat question to a NewsPulse server")]
struct Args {
    /// Base URL of the server
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server: String,

    /// Number of top articles sent as news context
    #[arg(long, default_value_t = 5)]
    context: usize,

    /// The question to ask
    question: String,
}

#[derive(Deserialize)]
struct ArticlesEnvelope {
    articles: Vec<ContextArticle>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: String,
}

async fn fetch_context(client: &reqwest::Client, server: &str, limit: usize) -> Result<Vec<ContextArticle>> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let url = format!("{}/api/articles?type=top&limit={}", server, limit);
    let envelope: ArticlesEnvelope = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("failed to reach {}", url))?
        .error_for_status()?
        .json()
        .await
        .context("unexpected articles payload")?;
    Ok(envelope.articles)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    let args = Args::parse();
    let server = args.server.trim_end_matches('/').to_string();
    let client = reqwest::Client::new();

    let news_context = fetch_context(&client, &server, args.context).await?;
    println!("Context: {} article(s)", news_context.len());
    for article in &news_context {
        println!("  - {} ({})", article.title, article.category);
    }

    let mut session = ChatSession::new();
    let messages = session.submit(&args.question)?;
    let request = ChatRequest {
        messages,
        news_context: Some(news_context),
    };

    println!("\n> {}\n", args.question.trim());

    let mut response = match client
        .post(format!("{}/api/chat", server))
        .json(&request)
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            session.fail(e.to_string());
            report(&session);
            bail!("chat request failed: {}", e);
        }
    };

    if !response.status().is_success() {
        let status = response.status();
        let message = response
            .json::<ErrorEnvelope>()
            .await
            .map(|e| e.error)
            .unwrap_or_else(|_| status.to_string());
        session.fail(message.clone());
        report(&session);
        bail!("server answered {}: {}", status, message);
    }

    let mut stdout = std::io::stdout();
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let text = session.on_chunk(&chunk);
                if !text.is_empty() {
                    print!("{}", text);
                    stdout.flush()?;
                }
            }
            Ok(None) => {
                print!("{}", session.finish());
                println!();
                break;
            }
            Err(e) => {
                println!();
                session.fail(e.to_string());
                report(&session);
                bail!("stream interrupted: {}", e);
            }
        }
    }

    if session.state() == &ChatState::Idle {
        let reply = session.messages().last().map(|m| m.content.len()).unwrap_or(0);
        println!("\n({} characters received)", reply);
    }
    Ok(())
}

fn report(session: &ChatSession) {
    if let Some(last) = session.messages().last() {
        eprintln!("{}", last.content);
    }
    if let ChatState::Error(reason) = session.state() {
        eprintln!("error: {}", reason);
    }
}
