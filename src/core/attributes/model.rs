use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::core::target::LoaderKind;

/// Classification tags attached to every resolvable/consumable bucket.
///
/// Declaration order is also the order in which ambiguities are broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttributeKey {
    Distribution,
    Data,
    ModLoader,
    MinecraftVersion,
    CommonType,
    CommonName,
}

impl AttributeKey {
    pub const ALL: [AttributeKey; 6] = [
        AttributeKey::Distribution,
        AttributeKey::Data,
        AttributeKey::ModLoader,
        AttributeKey::MinecraftVersion,
        AttributeKey::CommonType,
        AttributeKey::CommonName,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKey::Distribution => "distribution",
            AttributeKey::Data => "data",
            AttributeKey::ModLoader => "modLoader",
            AttributeKey::MinecraftVersion => "minecraftVersion",
            AttributeKey::CommonType => "commonType",
            AttributeKey::CommonName => "commonName",
        }
    }
}

/// Which side of the game a compiled variant is usable on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Usable by both client and dedicated server.
    Common,
    /// Client only.
    Client,
    /// Client and server code shipped together.
    Joined,
}

impl Distribution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Distribution::Common => "common",
            Distribution::Client => "client",
            Distribution::Joined => "joined",
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mod loader tag; `Common` marks loader-agnostic output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModLoader {
    Fabric,
    Forge,
    NeoForge,
    Quilt,
    Common,
}

impl From<LoaderKind> for ModLoader {
    fn from(kind: LoaderKind) -> Self {
        match kind {
            LoaderKind::Fabric => ModLoader::Fabric,
            LoaderKind::Forge => ModLoader::Forge,
            LoaderKind::NeoForge => ModLoader::NeoForge,
            LoaderKind::Quilt => ModLoader::Quilt,
        }
    }
}

impl fmt::Display for ModLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModLoader::Fabric => "fabric",
            ModLoader::Forge => "forge",
            ModLoader::NeoForge => "neoforge",
            ModLoader::Quilt => "quilt",
            ModLoader::Common => "common",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Distribution(Distribution),
    Data(bool),
    ModLoader(ModLoader),
    Text(String),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Distribution(d) => d.fmt(f),
            AttributeValue::Data(b) => b.fmt(f),
            AttributeValue::ModLoader(l) => l.fmt(f),
            AttributeValue::Text(s) => f.write_str(s),
        }
    }
}

/// Ordered attribute set of one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeContainer {
    values: BTreeMap<AttributeKey, AttributeValue>,
}

impl AttributeContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: AttributeKey, value: AttributeValue) -> &mut Self {
        self.values.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: AttributeKey) -> Option<AttributeValue> {
        self.values.remove(&key)
    }

    pub fn get(&self, key: AttributeKey) -> Option<&AttributeValue> {
        self.values.get(&key)
    }

    pub fn contains(&self, key: AttributeKey) -> bool {
        self.values.contains_key(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttributeKey, &AttributeValue)> {
        self.values.iter()
    }

    // ── Typed setters ───────────────────────────────────

    pub fn distribution(&mut self, value: Distribution) -> &mut Self {
        self.insert(AttributeKey::Distribution, AttributeValue::Distribution(value))
    }

    pub fn data(&mut self, value: bool) -> &mut Self {
        self.insert(AttributeKey::Data, AttributeValue::Data(value))
    }

    pub fn mod_loader(&mut self, value: ModLoader) -> &mut Self {
        self.insert(AttributeKey::ModLoader, AttributeValue::ModLoader(value))
    }

    pub fn minecraft_version(&mut self, value: &str) -> &mut Self {
        self.insert(
            AttributeKey::MinecraftVersion,
            AttributeValue::Text(value.to_string()),
        )
    }

    pub fn common_type(&mut self, value: &str) -> &mut Self {
        self.insert(AttributeKey::CommonType, AttributeValue::Text(value.to_string()))
    }

    pub fn common_name(&mut self, value: &str) -> &mut Self {
        self.insert(AttributeKey::CommonName, AttributeValue::Text(value.to_string()))
    }

    // ── Typed getters ───────────────────────────────────

    pub fn get_distribution(&self) -> Option<Distribution> {
        match self.get(AttributeKey::Distribution) {
            Some(AttributeValue::Distribution(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn get_data(&self) -> Option<bool> {
        match self.get(AttributeKey::Data) {
            Some(AttributeValue::Data(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn get_mod_loader(&self) -> Option<ModLoader> {
        match self.get(AttributeKey::ModLoader) {
            Some(AttributeValue::ModLoader(l)) => Some(*l),
            _ => None,
        }
    }

    pub fn get_text(&self, key: AttributeKey) -> Option<&str> {
        match self.get(key) {
            Some(AttributeValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn get_minecraft_version(&self) -> Option<&str> {
        self.get_text(AttributeKey::MinecraftVersion)
    }
}

impl fmt::Display for AttributeContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, (key, value)) in self.values.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", key.as_str(), value)?;
        }
        f.write_str("}")
    }
}
