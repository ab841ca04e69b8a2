//! Anthropic Messages API analyzer.
//!
//! # Example
//!
//! ```rust,no_run
//! use sixten_inference::anthropic::{AnthropicAnalyzer, AnthropicConfig};
//! use sixten_core::{AnalysisInput, Analyzer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let analyzer = AnthropicAnalyzer::new(AnthropicConfig {
//!         api_key: Some("sk-ant-...".to_string()),
//!         ..Default::default()
//!     })
//!     .unwrap();
//!
//!     let analysis = analyzer
//!         .analyze(AnalysisInput::Text {
//!             content: "Long article text".to_string(),
//!             existing_tags: vec!["rust".to_string()],
//!         })
//!         .await
//!         .unwrap();
//!     println!("{} ({} min)", analysis.title, analysis.estimated_minutes);
//! }
//! ```

mod backend;
mod types;

pub use backend::{AnthropicAnalyzer, AnthropicConfig};
pub use types::*;
