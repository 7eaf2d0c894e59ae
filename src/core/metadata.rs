// ─── Mod Metadata ───
// Metadata objects declared on compilations are merged along the static-link
// closure and handed to a writer that owns the on-disk format
// (fabric.mod.json, mods.toml, ...).

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::compilation::{Compilation, CompilationId, CompilationSlot};
use crate::core::error::GraphResult;
use crate::core::graph::Project;
use crate::core::target::Target;

/// Merged metadata for one compilation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ModMetadata(pub Map<String, Value>);

impl ModMetadata {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn id(&self) -> Option<&str> {
        self.get("id").and_then(Value::as_str)
    }

    pub fn version(&self) -> Option<&str> {
        self.get("version").and_then(Value::as_str)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

/// Consumer of merged metadata, usually a descriptor file generator.
pub trait MetadataWriter {
    fn write(&mut self, target: &Target, compilation: &Compilation, metadata: &ModMetadata) -> GraphResult<()>;
}

/// Overlay `current` onto `parent`: objects merge recursively, arrays are
/// unioned (parent entries first), everything else is replaced.
pub fn merge_metadata(current: &Value, parent: &Value) -> Value {
    match (parent, current) {
        (Value::Object(base), Value::Object(overlay)) => {
            let mut merged = base.clone();
            for (key, value) in overlay {
                let next = match merged.get(key) {
                    Some(existing) => merge_metadata(value, existing),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (Value::Array(base), Value::Array(overlay)) => {
            let mut merged = base.clone();
            for value in overlay {
                if !merged.contains(value) {
                    merged.push(value.clone());
                }
            }
            Value::Array(merged)
        }
        (_, current) => current.clone(),
    }
}

impl Project {
    /// Metadata of `id` merged over everything it includes, deepest common
    /// first. `id` and `version` default to the project's coordinates.
    pub fn merged_metadata(&self, id: CompilationId) -> ModMetadata {
        let mut merged = Value::Object(Map::new());
        for member in self.source_closure(id).iter().rev() {
            let layer = Value::Object(self.compilation(*member).metadata_object().clone());
            merged = merge_metadata(&layer, &merged);
        }

        let mut object = match merged {
            Value::Object(object) => object,
            _ => Map::new(),
        };
        object
            .entry("id")
            .or_insert_with(|| Value::String(self.artifact_id().to_string()));
        object
            .entry("version")
            .or_insert_with(|| Value::String(self.version().to_string()));
        ModMetadata(object)
    }

    /// Hand every non-test edge compilation's merged metadata to `writer`.
    pub fn emit_metadata(&self, writer: &mut dyn MetadataWriter) -> GraphResult<usize> {
        let mut written = 0;
        for target in self.targets().filter(|t| !t.is_common()) {
            for slot in CompilationSlot::ALL {
                let Some(id) = target.compilation(slot) else {
                    continue;
                };
                let compilation = self.compilation(id);
                if compilation.is_test() {
                    continue;
                }
                writer.write(target, compilation, &self.merged_metadata(id))?;
                written += 1;
            }
        }
        Ok(written)
    }
}
