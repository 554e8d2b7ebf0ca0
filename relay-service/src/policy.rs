use relaybot_core::{BotConfig, Item};
use std::collections::HashSet;

/// Why an item may or may not be republished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Eligible,
    Adult,
    SelfPost,
    LowScore { score: i64 },
    DomainNotWhitelisted { domain: String },
}

impl Verdict {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Verdict::Eligible)
    }

    /// Rejections that may clear up on a later poll and are therefore not recorded.
    pub fn is_quality_rejection(&self) -> bool {
        matches!(
            self,
            Verdict::Adult | Verdict::SelfPost | Verdict::LowScore { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub struct PolicyFilter {
    min_score: i64,
    whitelist: HashSet<String>,
}

impl PolicyFilter {
    pub fn new<I, S>(min_score: i64, whitelist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            min_score,
            whitelist: whitelist
                .into_iter()
                .map(|domain| domain.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(config.min_score, &config.domain_whitelist)
    }

    pub fn min_score(&self) -> i64 {
        self.min_score
    }

    pub fn is_whitelisted(&self, domain: &str) -> bool {
        self.whitelist.contains(&domain.to_ascii_lowercase())
    }

    /// Checks adult, self-post, score and domain, in that order.
    pub fn evaluate(&self, item: &Item) -> Verdict {
        if item.is_adult {
            Verdict::Adult
        } else if item.is_self_post {
            Verdict::SelfPost
        } else if item.score < self.min_score {
            Verdict::LowScore { score: item.score }
        } else if !self.is_whitelisted(&item.domain) {
            Verdict::DomainNotWhitelisted {
                domain: item.domain.clone(),
            }
        } else {
            Verdict::Eligible
        }
    }

    pub fn is_eligible(&self, item: &Item) -> bool {
        self.evaluate(item).is_eligible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(score: i64, domain: &str) -> Item {
        Item {
            id: "abc".to_string(),
            domain: domain.to_string(),
            subreddit: "gifs".to_string(),
            author: "a".to_string(),
            permalink: "/r/gifs/comments/abc/t/".to_string(),
            title: "t".to_string(),
            url: "https://example.com/x".to_string(),
            score,
            is_adult: false,
            is_self_post: false,
        }
    }

    fn filter() -> PolicyFilter {
        PolicyFilter::new(5, ["example.com", "i.imgur.com"])
    }

    #[test]
    fn test_whitelisted_item_is_eligible() {
        assert_eq!(filter().evaluate(&item(10, "example.com")), Verdict::Eligible);
        assert!(filter().is_eligible(&item(5, "i.imgur.com")));
    }

    #[test]
    fn test_adult_and_self_posts_rejected() {
        let adult = Item {
            is_adult: true,
            ..item(100, "example.com")
        };
        let self_post = Item {
            is_self_post: true,
            ..item(100, "example.com")
        };

        assert_eq!(filter().evaluate(&adult), Verdict::Adult);
        assert_eq!(filter().evaluate(&self_post), Verdict::SelfPost);
    }

    #[test]
    fn test_score_threshold() {
        assert_eq!(
            filter().evaluate(&item(4, "example.com")),
            Verdict::LowScore { score: 4 }
        );
        assert_eq!(
            filter().evaluate(&item(-3, "example.com")),
            Verdict::LowScore { score: -3 }
        );
    }

    #[test]
    fn test_unlisted_domain() {
        let verdict = filter().evaluate(&item(10, "blocked.example"));
        assert_eq!(
            verdict,
            Verdict::DomainNotWhitelisted {
                domain: "blocked.example".to_string()
            }
        );
        assert!(!verdict.is_quality_rejection());
        assert!(!verdict.is_eligible());
    }

    #[test]
    fn test_quality_checks_run_before_domain() {
        // A low-scoring item from a blocked domain must not count against the domain.
        let verdict = filter().evaluate(&item(1, "blocked.example"));
        assert!(verdict.is_quality_rejection());
    }

    #[test]
    fn test_domain_match_ignores_case() {
        let filter = PolicyFilter::new(0, ["I.Imgur.com"]);
        assert!(filter.is_whitelisted("i.imgur.com"));
        assert!(filter.is_whitelisted("I.IMGUR.COM"));
    }

    #[test]
    fn test_reduced_configuration() {
        let filter = PolicyFilter::new(0, ["example.com"]);
        assert!(filter.is_eligible(&item(0, "example.com")));
        assert_eq!(filter.min_score(), 0);
    }
}
