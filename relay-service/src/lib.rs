pub mod policy;
pub mod processor;
pub mod publisher;

pub use policy::{PolicyFilter, Verdict};
pub use processor::{ItemOutcome, Processor, RunReport};
pub use publisher::{
    ChallengeResolver, ConsoleChallengeResolver, Published, Publisher, CAPTCHA_IMAGE_BASE,
};
