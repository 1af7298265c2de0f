use rand::Rng;
use serde::{Deserialize, Serialize};

/// Mood label derived from the index score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    /// Threshold rule: >= 70 positive, 40..=69 neutral, below 40 negative.
    pub fn from_score(score: u8) -> Self {
        match score {
            70..=u8::MAX => Sentiment::Positive,
            40..=69 => Sentiment::Neutral,
            _ => Sentiment::Negative,
        }
    }
}

/// Synthetic daily sentiment index shown in the header and sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyIndex {
    pub score: u8,
    pub sentiment: Sentiment,
    pub percentage: u8,
}

impl DailyIndex {
    pub fn new(score: u8, percentage: u8) -> Self {
        let score = score.min(100);
        Self {
            score,
            sentiment: Sentiment::from_score(score),
            percentage: percentage.min(100),
        }
    }

    /// Moves the score by -1, 0 or +1 within [0, 100] and re-derives the sentiment.
    pub fn nudge<R: Rng>(&mut self, rng: &mut R) {
        let change: i16 = rng.gen_range(-1..=1);
        self.set_score((i16::from(self.score) + change).clamp(0, 100) as u8);
    }

    pub fn set_score(&mut self, score: u8) {
        self.score = score.min(100);
        self.sentiment = Sentiment::from_score(self.score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn thresholds() {
        assert_eq!(Sentiment::from_score(100), Sentiment::Positive);
        assert_eq!(Sentiment::from_score(70), Sentiment::Positive);
        assert_eq!(Sentiment::from_score(69), Sentiment::Neutral);
        assert_eq!(Sentiment::from_score(40), Sentiment::Neutral);
        assert_eq!(Sentiment::from_score(39), Sentiment::Negative);
        assert_eq!(Sentiment::from_score(0), Sentiment::Negative);
    }

    #[test]
    fn sentiment_tracks_every_reachable_score() {
        let mut index = DailyIndex::new(50, 78);
        for score in 0..=100u8 {
            index.set_score(score);
            assert_eq!(index.sentiment, Sentiment::from_score(score));
        }
    }

    #[test]
    fn nudge_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for start in [0u8, 1, 99, 100] {
            let mut index = DailyIndex::new(start, 78);
            for _ in 0..500 {
                let before = index.score;
                index.nudge(&mut rng);
                assert!(index.score <= 100);
                assert!((i16::from(index.score) - i16::from(before)).abs() <= 1);
                assert_eq!(index.sentiment, Sentiment::from_score(index.score));
                assert_eq!(index.percentage, 78);
            }
        }
    }

    #[test]
    fn serializes_sentiment_as_label() {
        let json = serde_json::to_value(DailyIndex::new(91, 78)).unwrap();
        assert_eq!(json, serde_json::json!({"score": 91, "sentiment": "Positive", "percentage": 78}));
    }
}
