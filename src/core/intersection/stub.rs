// ─── Stub API Generation ───
// When a common compilation is shared by edges on different Minecraft
// versions it compiles against a jar holding only the classes every version
// has. Tasks are planned from the linked graph and skip work when their
// inputs have not changed.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha1::{Digest, Sha1};
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::core::compilation::CompilationId;
use crate::core::error::{GraphError, GraphResult};
use crate::core::graph::{ClasspathEntry, Project};
use crate::core::provider::MinecraftProvider;

/// What one contributing edge compilation brings to a stub task.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StubInput {
    pub compilation: CompilationId,
    pub minecraft_version: String,
    pub minecraft_jar: PathBuf,
    pub classpath: Vec<ClasspathEntry>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StubApiTask {
    pub compilation: CompilationId,
    pub name: String,
    pub inputs: Vec<StubInput>,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubOutcome {
    UpToDate,
    Generated { classes: usize },
}

impl StubApiTask {
    /// Distinct Minecraft jars, in input order.
    pub fn input_jars(&self) -> Vec<&Path> {
        let mut jars: Vec<&Path> = Vec::new();
        for input in &self.inputs {
            if !jars.contains(&input.minecraft_jar.as_path()) {
                jars.push(&input.minecraft_jar);
            }
        }
        jars
    }

    fn marker(&self) -> PathBuf {
        let mut name = self.output.clone().into_os_string();
        name.push(".sha1");
        PathBuf::from(name)
    }

    /// SHA-1 over every input jar's path and contents.
    pub fn fingerprint(&self) -> GraphResult<String> {
        let mut hasher = Sha1::new();
        for jar in self.input_jars() {
            let bytes = fs::read(jar).map_err(|e| GraphError::Io {
                path: jar.to_path_buf(),
                source: e,
            })?;
            hasher.update(jar.to_string_lossy().as_bytes());
            hasher.update(&bytes);
        }
        Ok(hex::encode(hasher.finalize()))
    }

    pub fn is_up_to_date(&self) -> GraphResult<bool> {
        if !self.output.exists() {
            return Ok(false);
        }
        let recorded = match fs::read_to_string(self.marker()) {
            Ok(text) => text,
            Err(_) => return Ok(false),
        };
        Ok(recorded.trim() == self.fingerprint()?)
    }

    pub fn run(&self) -> GraphResult<StubOutcome> {
        let jars = self.input_jars();
        if jars.is_empty() {
            return Err(GraphError::EmptyStubInputs(self.name.clone()));
        }
        if self.is_up_to_date()? {
            debug!("Stub API {} is up to date", self.name);
            return Ok(StubOutcome::UpToDate);
        }

        let classes = generate_stub_jar(&jars, &self.output)?;
        let marker = self.marker();
        fs::write(&marker, self.fingerprint()?).map_err(|e| GraphError::Io {
            path: marker.clone(),
            source: e,
        })?;
        info!(
            "Generated stub API {} ({} classes from {} jars)",
            self.name,
            classes,
            jars.len()
        );
        Ok(StubOutcome::Generated { classes })
    }
}

fn class_entries(jar: &Path) -> GraphResult<BTreeSet<String>> {
    let file = File::open(jar).map_err(|e| GraphError::Io {
        path: jar.to_path_buf(),
        source: e,
    })?;
    let archive = ZipArchive::new(file)?;
    Ok(archive
        .file_names()
        .filter(|name| name.ends_with(".class"))
        .map(str::to_string)
        .collect())
}

/// Write `output` with the class entries present in every jar, copied from
/// the first one. Returns the number of classes written.
pub fn generate_stub_jar(jars: &[&Path], output: &Path) -> GraphResult<usize> {
    let Some((first, rest)) = jars.split_first() else {
        return Err(GraphError::EmptyStubInputs(output.display().to_string()));
    };

    let mut shared = class_entries(first)?;
    for jar in rest {
        let entries = class_entries(jar)?;
        shared.retain(|name| entries.contains(name));
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|e| GraphError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let source = File::open(first).map_err(|e| GraphError::Io {
        path: first.to_path_buf(),
        source: e,
    })?;
    let mut source = ZipArchive::new(source)?;
    let out = File::create(output).map_err(|e| GraphError::Io {
        path: output.to_path_buf(),
        source: e,
    })?;
    let mut writer = ZipWriter::new(out);
    // Fixed timestamps keep the jar byte-identical across runs.
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    writer.start_file("META-INF/MANIFEST.MF", options)?;
    writer.write_all(b"Manifest-Version: 1.0\r\n\r\n")?;

    let mut buf = Vec::new();
    for name in &shared {
        buf.clear();
        source.by_name(name)?.read_to_end(&mut buf)?;
        writer.start_file(name.as_str(), options)?;
        writer.write_all(&buf)?;
    }
    writer.finish()?;
    Ok(shared.len())
}

impl Project {
    /// One task per common compilation whose linked edges span more than one
    /// Minecraft version.
    pub fn stub_api_tasks(
        &self,
        provider: &dyn MinecraftProvider,
        output_dir: &Path,
    ) -> GraphResult<Vec<StubApiTask>> {
        let mut tasks = Vec::new();
        for compilation in self.compilations() {
            let id = compilation.id();
            if !self.owner(id).is_common() || self.linked_minecraft_versions(id).len() < 2 {
                continue;
            }

            let distribution = self.distribution_of(id);
            let mut inputs = Vec::new();
            for edge in self.edge_source_dependents(id) {
                let owner = self.owner(edge);
                let version = owner
                    .minecraft_version()
                    .ok_or_else(|| GraphError::MissingMinecraftVersion(owner.name().to_string()))?;
                let minecraft = provider.minecraft(version, distribution)?;
                inputs.push(StubInput {
                    compilation: edge,
                    minecraft_version: minecraft.version,
                    minecraft_jar: minecraft.jar,
                    classpath: self.compile_classpath(edge, provider)?,
                });
            }

            let file = format!("{}-stub.jar", compilation.name().replace(':', "-"));
            tasks.push(StubApiTask {
                compilation: id,
                name: compilation.name().to_string(),
                inputs,
                output: output_dir.join(file),
            });
        }
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attributes::{AttributeKey, Distribution};
    use crate::core::provider::{MinecraftArtifact, StaticMinecraftProvider};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("multiloader-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_jar(path: &Path, classes: &[&str]) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for class in classes {
            writer.start_file(*class, options).unwrap();
            writer.write_all(class.as_bytes()).unwrap();
        }
        writer.start_file("assets/lang.json", options).unwrap();
        writer.write_all(b"{}").unwrap();
        writer.finish().unwrap();
    }

    fn provider(dir: &Path) -> StaticMinecraftProvider {
        let old = dir.join("minecraft-1.19.4.jar");
        let new = dir.join("minecraft-1.21.jar");
        write_jar(&old, &["net/minecraft/A.class", "net/minecraft/B.class"]);
        write_jar(&new, &["net/minecraft/A.class", "net/minecraft/C.class"]);

        let mut provider = StaticMinecraftProvider::new();
        for (version, jar) in [("1.19.4", old), ("1.21", new)] {
            for distribution in [Distribution::Common, Distribution::Client] {
                provider.register(MinecraftArtifact {
                    version: version.into(),
                    distribution,
                    jar: jar.clone(),
                    libraries: Vec::new(),
                });
            }
        }
        provider
    }

    #[test]
    fn stub_jar_keeps_shared_classes_only() {
        let dir = temp_dir("stub-jar");
        let a = dir.join("a.jar");
        let b = dir.join("b.jar");
        write_jar(&a, &["x/Shared.class", "x/OnlyA.class"]);
        write_jar(&b, &["x/Shared.class", "x/OnlyB.class"]);

        let out = dir.join("out/stub.jar");
        let count = generate_stub_jar(&[a.as_path(), b.as_path()], &out).unwrap();
        assert_eq!(count, 1);

        let archive = ZipArchive::new(File::open(&out).unwrap()).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(names.contains(&"x/Shared.class"));
        assert!(!names.contains(&"x/OnlyA.class"));
        assert!(!names.contains(&"assets/lang.json"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn shared_common_between_forge_and_neoforge() {
        let dir = temp_dir("scenario-c");
        let provider = provider(&dir);

        let mut p = Project::new("com.example", "mymod", "1.0.0");
        let common = p.common("common").unwrap();
        let forge = p.forge("forge").unwrap();
        let neo = p.neoforge("neoforge").unwrap();
        p.target_mut(forge).unwrap().set_minecraft_version("1.19.4").unwrap();
        p.target_mut(neo).unwrap().set_minecraft_version("1.21").unwrap();
        p.depends_on(forge, common).unwrap();
        p.depends_on(neo, common).unwrap();
        p.evaluate().unwrap();

        let attrs = p.attributes(p.main(common)).unwrap();
        assert!(!attrs.contains(AttributeKey::MinecraftVersion));

        let tasks = p.stub_api_tasks(&provider, &dir.join("stubs")).unwrap();
        assert_eq!(tasks.len(), 1);
        let task = &tasks[0];
        assert_eq!(task.compilation, p.main(common));
        let contributors: Vec<CompilationId> = task.inputs.iter().map(|i| i.compilation).collect();
        assert_eq!(contributors, vec![p.main(forge), p.main(neo)]);
        for input in &task.inputs {
            assert_eq!(input.classpath, p.compile_classpath(input.compilation, &provider).unwrap());
        }

        assert_eq!(task.run().unwrap(), StubOutcome::Generated { classes: 1 });
        assert_eq!(task.run().unwrap(), StubOutcome::UpToDate);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn single_version_commons_need_no_stub() {
        let dir = temp_dir("no-stub");
        let provider = provider(&dir);

        let mut p = Project::new("com.example", "mymod", "1.0.0");
        let common = p.common("common").unwrap();
        let fabric = p.fabric("fabric").unwrap();
        p.target_mut(fabric).unwrap().set_minecraft_version("1.21").unwrap();
        p.depends_on(fabric, common).unwrap();
        p.evaluate().unwrap();

        assert!(p.stub_api_tasks(&provider, &dir).unwrap().is_empty());
        let _ = fs::remove_dir_all(&dir);
    }
}
