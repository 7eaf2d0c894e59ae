mod kind;
mod model;

pub use kind::{ClientMode, EdgePlatform, FabricSettings, ForgeSettings, LoaderKind, TargetKind};
pub use model::{Target, TargetId, TargetState};
