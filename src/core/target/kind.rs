use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Supported mod loaders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LoaderKind {
    Fabric,
    Forge,
    NeoForge,
    Quilt,
}

impl LoaderKind {
    pub const ALL: [LoaderKind; 4] = [
        LoaderKind::Fabric,
        LoaderKind::Forge,
        LoaderKind::NeoForge,
        LoaderKind::Quilt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoaderKind::Fabric => "fabric",
            LoaderKind::Forge => "forge",
            LoaderKind::NeoForge => "neoforge",
            LoaderKind::Quilt => "quilt",
        }
    }

    /// Whether this loader can keep client code in a separate compilation.
    pub fn supports_client_split(&self) -> bool {
        matches!(self, LoaderKind::Fabric | LoaderKind::Quilt)
    }
}

impl std::fmt::Display for LoaderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields every edge target carries, whatever its loader.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EdgePlatform {
    pub minecraft_version: Option<String>,
    pub loader_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FabricSettings {
    pub platform: EdgePlatform,
    /// Ship client code inside `main` instead of a split `client` compilation.
    pub include_client: bool,
    pub access_wideners: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForgeSettings {
    pub platform: EdgePlatform,
    pub access_transformers: Vec<PathBuf>,
}

/// What a target is: shared code, or one concrete loader + Minecraft version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    Common,
    Fabric(FabricSettings),
    Quilt(FabricSettings),
    Forge(ForgeSettings),
    NeoForge(ForgeSettings),
}

/// How an edge target treats client-only code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientMode {
    /// Client code lives in its own `client` compilation.
    Split,
    /// Client code is compiled as part of `main`.
    Included,
}

impl TargetKind {
    pub fn edge(loader: LoaderKind) -> Self {
        match loader {
            LoaderKind::Fabric => TargetKind::Fabric(FabricSettings::default()),
            LoaderKind::Quilt => TargetKind::Quilt(FabricSettings::default()),
            LoaderKind::Forge => TargetKind::Forge(ForgeSettings::default()),
            LoaderKind::NeoForge => TargetKind::NeoForge(ForgeSettings::default()),
        }
    }

    pub fn is_common(&self) -> bool {
        matches!(self, TargetKind::Common)
    }

    pub fn loader(&self) -> Option<LoaderKind> {
        match self {
            TargetKind::Common => None,
            TargetKind::Fabric(_) => Some(LoaderKind::Fabric),
            TargetKind::Quilt(_) => Some(LoaderKind::Quilt),
            TargetKind::Forge(_) => Some(LoaderKind::Forge),
            TargetKind::NeoForge(_) => Some(LoaderKind::NeoForge),
        }
    }

    pub fn platform(&self) -> Option<&EdgePlatform> {
        match self {
            TargetKind::Common => None,
            TargetKind::Fabric(s) | TargetKind::Quilt(s) => Some(&s.platform),
            TargetKind::Forge(s) | TargetKind::NeoForge(s) => Some(&s.platform),
        }
    }

    pub fn platform_mut(&mut self) -> Option<&mut EdgePlatform> {
        match self {
            TargetKind::Common => None,
            TargetKind::Fabric(s) | TargetKind::Quilt(s) => Some(&mut s.platform),
            TargetKind::Forge(s) | TargetKind::NeoForge(s) => Some(&mut s.platform),
        }
    }

    /// Commons always split client code; Forge-likes never do.
    pub fn client_mode(&self) -> ClientMode {
        let splits = self.loader().map_or(true, |l| l.supports_client_split());
        match self {
            TargetKind::Fabric(s) | TargetKind::Quilt(s) if s.include_client => ClientMode::Included,
            _ if splits => ClientMode::Split,
            _ => ClientMode::Included,
        }
    }

    /// Access wideners / transformers handed to the remap pipeline.
    pub fn access_files(&self) -> &[PathBuf] {
        match self {
            TargetKind::Common => &[],
            TargetKind::Fabric(s) | TargetKind::Quilt(s) => &s.access_wideners,
            TargetKind::Forge(s) | TargetKind::NeoForge(s) => &s.access_transformers,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.loader() {
            Some(loader) => loader.as_str(),
            None => "common",
        }
    }
}
