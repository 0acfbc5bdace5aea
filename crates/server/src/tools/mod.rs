//! MCP tool implementations.
//!
//! This module contains all tools exposed by the idxwatch host.

pub mod cache_purge;
pub mod check_index_status;
pub mod page_status;
pub mod tab_indicator;
pub mod tab_updated;

pub use cache_purge::CachePurgeParams;
pub use check_index_status::CheckIndexStatusParams;
pub use page_status::PageStatusParams;
pub use tab_indicator::TabIndicatorParams;
pub use tab_updated::TabUpdatedParams;
