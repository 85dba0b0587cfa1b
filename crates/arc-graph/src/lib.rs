//! The algorithmic heart of Arc: ready-work and blocked-work resolution and
//! plan-context aggregation across the three plan patterns.
//!
//! Both live in one crate because they are pure query logic layered on
//! `arc-storage`'s repositories — neither mutates anything, and the plan
//! aggregator's "parent plan" lookup walks the same blocking-subgraph edges
//! the resolver does.

pub mod plan_context;
pub mod resolver;

pub use plan_context::{PlanContext, PlanContextAggregator};
pub use resolver::{BlockedIssue, GraphResolver, ReadyWorkOptions};
