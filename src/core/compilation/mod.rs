mod buckets;
mod model;

pub use buckets::{BucketKind, DependencyBuckets, DependencySet};
pub use model::{AttributeAction, Compilation, CompilationId, CompilationSlot};
