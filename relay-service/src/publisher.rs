use async_trait::async_trait;
use reddit_client::{RedditClient, SubmitLinkRequest, SubmitOutcome, SubmittedPost};
use relaybot_core::{CoreError, Item};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Stdin};
use tracing::{debug, info, warn};

pub const CAPTCHA_IMAGE_BASE: &str = "https://www.reddit.com/captcha";

/// Produces the answer to a captcha the server asked for.
#[async_trait]
pub trait ChallengeResolver: Send {
    async fn resolve(&mut self, captcha_id: &str) -> Result<String, CoreError>;
}

/// Shows the captcha image URL on stdout and reads the answer from `input`, stdin by default.
pub struct ConsoleChallengeResolver<I = Stdin> {
    image_base: String,
    input: BufReader<I>,
}

impl ConsoleChallengeResolver<Stdin> {
    pub fn new() -> Self {
        Self::with_input(tokio::io::stdin())
    }
}

impl<I: AsyncRead> ConsoleChallengeResolver<I> {
    /// Reads answers from `input`. Lines typed ahead stay buffered for later challenges.
    pub fn with_input(input: I) -> Self {
        Self {
            image_base: CAPTCHA_IMAGE_BASE.to_string(),
            input: BufReader::new(input),
        }
    }

    pub fn image_url(&self, captcha_id: &str) -> String {
        format!("{}/{}", self.image_base, captcha_id)
    }
}

impl Default for ConsoleChallengeResolver<Stdin> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<I> ChallengeResolver for ConsoleChallengeResolver<I>
where
    I: AsyncRead + Unpin + Send,
{
    async fn resolve(&mut self, captcha_id: &str) -> Result<String, CoreError> {
        println!("Captcha required: {}", self.image_url(captcha_id));
        print!("Captcha response: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            return Err(CoreError::InvalidInput {
                message: "input closed while waiting for a captcha response".to_string(),
            });
        }

        Ok(line.trim().to_string())
    }
}

/// Result of a successful submission. The source comment may still have failed.
#[derive(Debug)]
pub struct Published {
    pub post: SubmittedPost,
    pub challenges: u32,
    pub comment_error: Option<CoreError>,
}

pub struct Publisher<R> {
    resolver: R,
    preflight_captcha: bool,
}

impl<R: ChallengeResolver> Publisher<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            preflight_captcha: false,
        }
    }

    /// Ask whether the account needs a captcha before the first attempt.
    pub fn with_preflight_captcha(mut self, enabled: bool) -> Self {
        self.preflight_captcha = enabled;
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Submits `item` as a link to `destination`, answering captchas until the
    /// server accepts or rejects it, then comments with a link to the source.
    pub async fn publish(
        &mut self,
        client: &mut RedditClient,
        item: &Item,
        destination: &str,
    ) -> Result<Published, CoreError> {
        let mut request = SubmitLinkRequest::for_item(item, destination);
        let mut challenges = 0;

        if self.preflight_captcha && client.needs_captcha().await? {
            let captcha_id = client.new_captcha().await?;
            debug!("Account needs a captcha before submitting: {}", captcha_id);
            let answer = self.resolver.resolve(&captcha_id).await?;
            request = request.with_captcha(&captcha_id, &answer);
            challenges += 1;
        }

        let post = loop {
            match client.submit_link(&request).await? {
                SubmitOutcome::Created(post) => break post,
                SubmitOutcome::ChallengeRequired { captcha_id } => {
                    warn!(
                        "Bad captcha submitting {} to r/{}, new challenge {}",
                        item.id, destination, captcha_id
                    );
                    let answer = self.resolver.resolve(&captcha_id).await?;
                    request = request.with_captcha(&captcha_id, &answer);
                    challenges += 1;
                }
            }
        };

        info!("Submitted {} to r/{} as {}", item.id, destination, post.name);

        let comment_error = match client
            .submit_comment(&post.name, &item.source_comment())
            .await
        {
            Ok(()) => None,
            Err(e) => {
                warn!("Source comment on {} failed: {}", post.name, e);
                Some(e)
            }
        };

        Ok(Published {
            post,
            challenges,
            comment_error,
        })
    }
}
