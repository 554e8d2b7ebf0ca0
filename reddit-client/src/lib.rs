pub mod api;
pub mod auth;
pub mod config;
pub mod dispatcher;
pub mod rate_limiter;
pub mod submit;


pub use api::{RedditClient, RedditListing, RedditListingChild, RedditListingData, RedditPostData};
pub use auth::{AuthState, Authenticator, RedditToken};
pub use config::{RedditOAuth2Config, REDDIT_API_BASE, REDDIT_AUTH_BASE};
pub use dispatcher::Dispatcher;
pub use rate_limiter::RequestGate;
pub use submit::{ApiErrorEntry, SubmitLinkRequest, SubmitOutcome, SubmittedPost};
