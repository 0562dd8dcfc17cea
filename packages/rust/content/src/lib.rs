//! Content fetch client for the headless content API.
//!
//! This crate provides:
//! - [`PostSource`]: the raw query seam (production: [`GraphQlSource`])
//! - [`normalize`]: raw post records → canonical [`Article`](folio_shared::Article)s
//! - [`ContentClient`]: fail-open fetch operations returning typed outcomes

mod client;
mod graphql;
pub mod normalize;
mod source;

pub use client::{ArticleList, ArticleLookup, ContentClient};
pub use graphql::GraphQlSource;
pub use source::{PostSource, RawContent, RawCoverImage, RawImage, RawPost};
