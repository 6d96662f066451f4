//! # narou-mcp
//!
//! An MCP server and Rust client for the Shosetsuka ni Narou (syosetu.com)
//! novel search and ranking API.
//!
//! Provides:
//! - **Library**: async client for novel, mature-novel and user search,
//!   rankings and ranking history, with Japanese label translation
//! - **MCP server**: six read-only tools over JSON-RPC on stdio
//! - **CLI**: `narou` binary for terminal use (includes `narou serve` for MCP)
//!
//! ## Quick Start
//!
//! ```no_run
//! # async fn example() -> narou_mcp::error::Result<()> {
//! use narou_mcp::schema::NovelSearchRequest;
//! use narou_mcp::NarouClient;
//!
//! // Reads NAROU_API_BASE_URL and NAROU_HTTP_TIMEOUT_SECS when set
//! let client = NarouClient::from_env()?;
//!
//! // Tool-style arguments use Japanese labels
//! let req = NovelSearchRequest::from_args(&serde_json::json!({
//!     "word": "転生",
//!     "genre": "ハイファンタジー〔ファンタジー〕",
//!     "order": "総合ポイントの高い順",
//!     "limit": 5,
//! }))?;
//! let results = client.search_novels(&req).await?;
//! println!("{} novels matched", results.allcount);
//! # Ok(())
//! # }
//! ```
//!
//! ## Running a tool
//!
//! ```no_run
//! # async fn example() -> narou_mcp::error::Result<()> {
//! let client = narou_mcp::NarouClient::new()?;
//! let args = serde_json::json!({ "rankingType": "週間", "limit": 3 });
//! for block in narou_mcp::tools::call_tool(&client, "get_ranking", &args).await? {
//!     println!("{}", block.text());
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod client;
pub mod error;
pub mod parse;
pub mod process;
pub mod query;
pub mod ranking;
pub mod schema;
pub mod search;
pub mod tools;
pub mod types;

pub mod mcp;

// Re-export key types at the crate root.
pub use client::{Fetcher, HttpFetcher, NarouClient};
pub use error::NarouError;
pub use types::*;
