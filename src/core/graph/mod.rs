mod classpath;
mod finalize;
mod project;
mod report;
mod topology;
mod wiring;

pub use classpath::ClasspathEntry;
pub use project::{LinkKind, Project, ProjectPhase};
pub use report::{CompilationReport, ProjectReport, TargetReport};
