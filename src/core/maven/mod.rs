mod artifact;
mod pom;
mod version;

pub use artifact::{MavenArtifact, ModuleId};
pub use pom::{PomDependencies, PomDependency, PomDocument};
pub use version::{compare_versions, lower_version};
