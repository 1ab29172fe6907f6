//! Graph API normalization layer
//!
//! Everything that talks to the upstream Graph API or massages its responses
//! lives here: time-window resolution, insight parsing and numeric coercion,
//! action-taxonomy resolution, budget normalization, and error classification.

pub mod actions;
pub mod budget;
pub mod client;
pub mod error;
pub mod insights;
pub mod value;
pub mod window;

pub use client::{fetch_insights_each, GraphClient, InsightSource};
pub use error::GraphError;
pub use window::{TimeWindow, WindowResolver};
