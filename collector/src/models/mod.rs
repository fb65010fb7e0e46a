//! Data models

pub mod event;
pub mod issue;
pub mod link;

pub use event::{EventBatchIn, EventIn, IngestResponse};
pub use issue::{Issue, IssueFilter, MetricsQuery, NewIssue, RecommendationOut, ScreenMetrics};
pub use link::{LinkCodeIn, ScreenLink};
