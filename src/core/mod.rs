// ─── Multiloader Core ───
// Build model for one mod shipped to several loaders and Minecraft versions.
//
// Architecture:
//   core/
//     lazy          Deferred construction with replayed listeners
//     maven/        Coordinates, version ordering, POM model
//     target/       Common / edge targets and loader settings
//     compilation/  Compilations and their dependency buckets
//     attributes/   Variant attributes, compatibility, disambiguation
//     graph/        Project arena, link rules, classpaths, finalization
//     intersection/ Shared library intersection + stub API jars
//     provider      Minecraft provider and artifact transform interfaces
//     metadata      Mod metadata merge and writer hand-off
//     publish       Capabilities, published artifacts, POM
//     config        JSON project settings

pub mod attributes;
pub mod compilation;
pub mod config;
pub mod error;
pub mod graph;
pub mod intersection;
pub mod lazy;
pub mod maven;
pub mod metadata;
pub mod provider;
pub mod publish;
pub mod target;
