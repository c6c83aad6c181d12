// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! onboarder-ai: resilient generation and context caching for repo-onboarder
//!
//! This library crate wraps a black-box text generator with failure
//! classification, capped exponential backoff and cancellation, caches the
//! repository context payload per repository identity with a TTL, and
//! reduces raw responses to clean document text.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use onboarder_ai::{CommandGenerator, ResilientClient, RetryConfig, extract_document};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn demo() -> Result<(), onboarder_ai::AiError> {
//! let generator = CommandGenerator::from_command_line("gemini -p").expect("command");
//! let client = ResilientClient::new(Arc::new(generator), RetryConfig::default());
//! let raw = client.call("Describe this repository", None, &CancellationToken::new()).await?;
//! println!("{}", extract_document(&raw)?);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod clock;
pub mod command;
pub mod error;
pub mod extract;
pub mod generator;
pub mod retry;
pub mod store;
pub mod testing;
pub mod tokens;

pub use cache::{
    CacheConfig, CacheHandle, CacheStore, CacheStoreError, CacheUnavailable, CachedContent,
    ContextCache, CreateCacheRequest, RepositoryIdentity,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use command::CommandGenerator;
pub use error::{AiError, AiErrorKind, GenerateError, classify};
pub use extract::{clean_response, extract_document};
pub use generator::{GenerationOptions, Generator};
pub use retry::{ResilientClient, RetryConfig};
pub use store::{DisabledCacheStore, InMemoryCacheStore};
pub use tokens::estimate_tokens;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{CacheHandle, ContextCache, RepositoryIdentity};
    pub use crate::error::{AiError, AiErrorKind};
    pub use crate::generator::{GenerationOptions, Generator};
    pub use crate::retry::{ResilientClient, RetryConfig};
}
