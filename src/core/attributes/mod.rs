mod matcher;
mod model;
mod rules;

pub use matcher::{is_candidate_compatible, select_variant, Candidate};
pub use model::{AttributeContainer, AttributeKey, AttributeValue, Distribution, ModLoader};
pub use rules::{disambiguate, is_compatible};
