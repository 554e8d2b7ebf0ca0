use crate::policy::{PolicyFilter, Verdict};
use crate::publisher::{ChallengeResolver, Publisher};
use chrono::{DateTime, Utc};
use database::Database;
use reddit_client::RedditClient;
use relaybot_core::{BotConfig, CoreError, Destination, ErrorReporter, Item};
use tracing::{debug, error, info, warn};

/// What happened to a single item during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Ineligible(Verdict),
    AlreadySeen,
    DomainRejected { domain: String, rejections: i64 },
    Published { succeeded: usize, failed: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub fetched: usize,
    pub failed_sources: usize,
    pub ineligible: usize,
    pub already_seen: usize,
    pub domain_rejected: usize,
    pub published: usize,
    pub failed_publications: usize,
    pub failed_items: usize,
}

impl RunReport {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            fetched: 0,
            failed_sources: 0,
            ineligible: 0,
            already_seen: 0,
            domain_rejected: 0,
            published: 0,
            failed_publications: 0,
            failed_items: 0,
        }
    }

    fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Ineligible(_) => self.ineligible += 1,
            ItemOutcome::AlreadySeen => self.already_seen += 1,
            ItemOutcome::DomainRejected { .. } => self.domain_rejected += 1,
            ItemOutcome::Published { succeeded, failed } => {
                self.published += succeeded;
                self.failed_publications += failed;
            }
        }
    }
}

/// Runs one poll: fetch every source, shuffle, and handle each item in turn.
pub struct Processor<R> {
    client: RedditClient,
    database: Database,
    publisher: Publisher<R>,
    policy: PolicyFilter,
    sources: Vec<String>,
    destinations: Vec<Destination>,
    rng: fastrand::Rng,
    reporter: ErrorReporter,
}

impl<R: ChallengeResolver> Processor<R> {
    pub fn new(
        client: RedditClient,
        database: Database,
        publisher: Publisher<R>,
        policy: PolicyFilter,
        sources: Vec<String>,
        destinations: Vec<Destination>,
    ) -> Self {
        Self {
            client,
            database,
            publisher,
            policy,
            sources,
            destinations,
            rng: fastrand::Rng::new(),
            reporter: ErrorReporter::new(),
        }
    }

    pub fn from_config(
        config: &BotConfig,
        client: RedditClient,
        database: Database,
        resolver: R,
    ) -> Self {
        let publisher = Publisher::new(resolver).with_preflight_captcha(config.preflight_captcha);
        Self::new(
            client,
            database,
            publisher,
            PolicyFilter::from_config(config),
            config.subreddits.clone(),
            config.destinations.clone(),
        )
    }

    /// Fixes the processing order, for reproducible runs.
    pub fn with_rng(mut self, rng: fastrand::Rng) -> Self {
        self.rng = rng;
        self
    }

    pub fn client(&self) -> &RedditClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn into_database(self) -> Database {
        self.database
    }

    pub async fn run(&mut self) -> RunReport {
        let mut report = RunReport::new();

        let mut items = self.fetch_sources(&mut report).await;
        report.fetched = items.len();
        self.rng.shuffle(&mut items);
        info!(
            "Fetched {} items from {} sources",
            items.len(),
            self.sources.len()
        );

        for item in &items {
            match self.process_item(item).await {
                Ok(outcome) => report.record(&outcome),
                Err(e) => {
                    report.failed_items += 1;
                    error!("Failed to process {}: {}", item.id, e);
                    self.reporter.report_error(&e);
                }
            }
        }

        let finished_at = Utc::now();
        report.finished_at = Some(finished_at);
        info!(
            "Run finished in {}s: {} published, {} ineligible, {} already seen, {} blocked by domain, {} failed",
            (finished_at - report.started_at).num_seconds(),
            report.published,
            report.ineligible,
            report.already_seen,
            report.domain_rejected,
            report.failed_items + report.failed_publications
        );
        report
    }

    /// Collects the listings of all sources. A failed source is logged and skipped.
    async fn fetch_sources(&mut self, report: &mut RunReport) -> Vec<Item> {
        let mut items = Vec::new();
        for source in &self.sources {
            match self.client.fetch_listing(source).await {
                Ok(listing) => {
                    debug!("r/{} returned {} items", source, listing.len());
                    items.extend(listing);
                }
                Err(e) => {
                    report.failed_sources += 1;
                    error!("Failed to fetch r/{}: {}", source, e);
                    self.reporter.report_error(&e);
                }
            }
        }
        items
    }

    pub async fn process_item(&mut self, item: &Item) -> Result<ItemOutcome, CoreError> {
        let verdict = self.policy.evaluate(item);
        if verdict.is_quality_rejection() {
            debug!("Skipping {}: {:?}", item.id, verdict);
            return Ok(ItemOutcome::Ineligible(verdict));
        }

        if self.database.has_seen(&item.id).await? {
            debug!("Already handled {}", item.id);
            return Ok(ItemOutcome::AlreadySeen);
        }

        if let Verdict::DomainNotWhitelisted { domain } = verdict {
            let rejections = self.database.reject_domain(&domain).await?;
            info!(
                "Domain {} is not whitelisted ({} rejections), skipping {}",
                domain, rejections, item.id
            );
            self.mark_seen(&item.id).await?;
            return Ok(ItemOutcome::DomainRejected { domain, rejections });
        }

        let mut succeeded = 0;
        let mut failed = 0;
        for destination in &self.destinations {
            let target = destination.retarget(item);
            match self
                .publisher
                .publish(&mut self.client, &target, &destination.subreddit)
                .await
            {
                Ok(published) => {
                    succeeded += 1;
                    if let Some(e) = &published.comment_error {
                        self.reporter.report_warning(e);
                    }
                }
                Err(e) => {
                    failed += 1;
                    warn!(
                        "Could not publish {} to r/{}: {}",
                        item.id, destination.subreddit, e
                    );
                    self.reporter.report_warning(&e);
                }
            }
        }

        self.mark_seen(&item.id).await?;
        Ok(ItemOutcome::Published { succeeded, failed })
    }

    async fn mark_seen(&self, item_id: &str) -> Result<(), CoreError> {
        match self.database.record_seen(item_id).await {
            Err(e) if e.is_duplicate_item() => {
                warn!("{} was already recorded", item_id);
                Ok(())
            }
            other => other,
        }
    }
}
