//! Fixed startup data for the dashboard.

use super::articles::Article;
use super::index::DailyIndex;
use super::summary::NewsSummary;
use super::timeline::{Timeline, TimelineEvent};

#[allow(clippy::too_many_arguments)]
fn article(
    id: &str,
    title: &str,
    image_url: &str,
    category: &str,
    tag: Option<&str>,
    coverage: u32,
    sources: u32,
    timestamp: &str,
    location: &str,
    views: u64,
) -> Article {
    Article {
        id: id.to_string(),
        title: title.to_string(),
        image_url: image_url.to_string(),
        category: category.to_string(),
        tag: tag.map(str::to_string),
        coverage,
        sources,
        featured: None,
        timestamp: timestamp.to_string(),
        location: location.to_string(),
        views,
        bookmarked: false,
    }
}

pub fn articles() -> Vec<Article> {
    let mut fed = article(
        "1",
        "Federal Reserve announces interest rate decision amid inflation concerns",
        "/federal-reserve-building.png",
        "Economics",
        Some("Breaking News"),
        89,
        247,
        "15 minutes ago",
        "Washington DC",
        12453,
    );
    fed.featured = Some(true);

    vec![
        fed,
        article("2", "Tech giants report Q4 earnings, market shows mixed reactions", "/stock-market-trading-floor.png", "Markets", Some("Earnings"), 76, 189, "1 hour ago", "New York", 8932),
        article("3", "Oil prices surge as OPEC announces production cuts", "/oil-refinery-at-sunset.jpg", "Energy", None, 82, 156, "2 hours ago", "Global", 7621),
        article("4", "Cryptocurrency market rallies on new regulatory framework", "/cryptocurrency-bitcoin-golden.jpg", "Crypto", Some("Regulation"), 68, 134, "3 hours ago", "United States", 6543),
        article("5", "Major airline merger approved by regulators", "/commercial-airplane-takeoff.jpg", "Transportation", None, 54, 98, "4 hours ago", "United States", 4321),
        article("6", "Housing market shows signs of recovery in major cities", "/modern-city-skyline-residential.jpg", "Real Estate", None, 61, 112, "5 hours ago", "United States", 5234),
        article("7", "Artificial intelligence startup secures $500M funding round", "/ai-technology-startup-office.jpg", "Technology", Some("Funding"), 72, 145, "30 minutes ago", "San Francisco", 9876),
        article("8", "Global supply chain disruptions ease as ports clear backlogs", "/cargo-ships-at-port.jpg", "Business", None, 65, 128, "2 hours ago", "Global", 6789),
        article("9", "Pennsylvania announces new infrastructure investment plan", "/pennsylvania-highway-construction.jpg", "Local", Some("Infrastructure"), 45, 67, "1 hour ago", "Harrisburg, PA", 3456),
        article("10", "Bethlehem Steel historic site receives federal grant for preservation", "/historic-steel-mill-industrial-site.jpg", "Local", None, 38, 52, "3 hours ago", "Bethlehem, PA", 2876),
        article("11", "Philadelphia tech sector shows record job growth in Q4", "/philadelphia-skyline-modern-office.jpg", "Local", Some("Employment"), 41, 58, "5 hours ago", "Philadelphia, PA", 3198),
        article("12", "New electric vehicle plant opens in Pittsburgh, creates 2,000 jobs", "/ev-manufacturing-facility.png", "Local", None, 56, 89, "6 hours ago", "Pittsburgh, PA", 4567),
        article("13", "Semiconductor shortage impacts auto manufacturers nationwide", "/computer-chips-semiconductors.jpg", "Technology", None, 70, 167, "4 hours ago", "United States", 5432),
        article("14", "Renewable energy investments reach all-time high globally", "/solar-panels-wind-turbines-clean-energy.jpg", "Energy", Some("Climate"), 78, 201, "7 hours ago", "Global", 8765),
    ]
}

pub fn timelines() -> Vec<Timeline> {
    vec![
        Timeline {
            id: "1".to_string(),
            title: "Federal Reserve Interest Rate Decision".to_string(),
            events: vec![
                TimelineEvent::new("2:00 PM EST", "Fed announces decision to maintain current interest rates", 247),
                TimelineEvent::new("12:30 PM EST", "Markets show volatility ahead of Fed announcement", 189),
                TimelineEvent::new("10:00 AM EST", "Economists predict steady rates in latest forecasts", 156),
                TimelineEvent::new("9:00 AM EST", "Pre-market trading shows cautious investor sentiment", 134),
            ],
        },
        Timeline {
            id: "2".to_string(),
            title: "Tech Earnings Season Update".to_string(),
            events: vec![
                TimelineEvent::new("4:30 PM EST", "Apple reports record-breaking Q4 revenue", 312),
                TimelineEvent::new("2:15 PM EST", "Microsoft beats earnings expectations with cloud growth", 287),
                TimelineEvent::new("11:00 AM EST", "Alphabet announces AI investment expansion", 245),
                TimelineEvent::new("Yesterday", "Meta reveals increased ad revenue in quarterly report", 198),
            ],
        },
        Timeline {
            id: "3".to_string(),
            title: "Pennsylvania Infrastructure Development".to_string(),
            events: vec![
                TimelineEvent::new("3:00 PM EST", "Governor signs $2.5B infrastructure bill into law", 89),
                TimelineEvent::new("1:00 PM EST", "State legislature approves funding for highway repairs", 67),
                TimelineEvent::new("10:30 AM EST", "Transportation officials outline 5-year improvement plan", 52),
                TimelineEvent::new("Yesterday", "Local communities express support for infrastructure investment", 43),
            ],
        },
    ]
}

pub fn daily_index() -> DailyIndex {
    DailyIndex::new(91, 78)
}

pub fn summary() -> NewsSummary {
    NewsSummary {
        items: vec![
            "Federal Reserve maintains steady interest rates amid economic stability".to_string(),
            "Tech sector sees strong Q4 earnings across major companies".to_string(),
            "Energy markets react to OPEC production policy changes".to_string(),
            "Cryptocurrency adoption increases with new regulatory clarity".to_string(),
        ],
        timeframe: "24 hours".to_string(),
    }
}
