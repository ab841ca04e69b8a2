//! # sixten-inference
//!
//! Clients for the hosted services sixten depends on:
//!
//! - [`reader::JinaReader`]: page-to-text extraction ([`ContentFetcher`])
//! - [`anthropic::AnthropicAnalyzer`]: classification and summaries ([`Analyzer`])
//!
//! plus the prompt builders and model reply parser in [`analysis`].

pub mod analysis;
pub mod anthropic;
pub mod reader;

pub use analysis::{
    decode_image_data_url, extract_json_span, parse_model_reply, truncate_chars, ImagePayload,
    ModelReply, ParseError,
};
pub use anthropic::{AnthropicAnalyzer, AnthropicConfig};
pub use reader::{JinaReader, ReaderConfig};

// Re-export core traits
pub use sixten_core::{Analyzer, ContentFetcher};
