mod modules;
mod stub;

pub use modules::intersect_modules;
pub use stub::{generate_stub_jar, StubApiTask, StubInput, StubOutcome};
