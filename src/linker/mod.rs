pub mod usage;

pub use usage::{ResolverStats, UsageResolver};
