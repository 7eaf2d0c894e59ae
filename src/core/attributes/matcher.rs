// ─── Variant Matcher ───
// Selects one candidate variant for a consumer's attribute request.

use std::collections::BTreeSet;

use tracing::debug;

use super::model::{AttributeContainer, AttributeKey, AttributeValue};
use super::rules;
use crate::core::error::{GraphError, GraphResult};

/// A producer variant offered to the matcher.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    pub name: String,
    pub attributes: &'a AttributeContainer,
}

/// Every requested attribute present on the candidate must be compatible.
/// Attributes the candidate does not carry match anything.
pub fn is_candidate_compatible(request: &AttributeContainer, candidate: &AttributeContainer) -> bool {
    request.iter().all(|(key, requested)| match candidate.get(*key) {
        Some(offered) => rules::is_compatible(*key, requested, offered),
        None => true,
    })
}

/// Select the index of the best candidate for `request`.
///
/// Incompatible candidates are dropped first; remaining ties are broken key by
/// key in [`AttributeKey::ALL`] order.
pub fn select_variant(request: &AttributeContainer, candidates: &[Candidate<'_>]) -> GraphResult<usize> {
    let mut remaining: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| is_candidate_compatible(request, c.attributes))
        .map(|(idx, _)| idx)
        .collect();

    if remaining.is_empty() {
        return Err(GraphError::NoMatchingVariant(request.to_string()));
    }

    for key in AttributeKey::ALL {
        if remaining.len() <= 1 {
            break;
        }

        let present: BTreeSet<Option<AttributeValue>> = remaining
            .iter()
            .map(|idx| candidates[*idx].attributes.get(key).cloned())
            .collect();
        if present.len() <= 1 {
            continue;
        }

        if let Some(best) = rules::disambiguate(key, request.get(key), &present) {
            debug!("Disambiguated {} to {:?}", key.as_str(), best);
            remaining.retain(|idx| candidates[*idx].attributes.get(key).cloned() == best);
        }
    }

    match remaining.as_slice() {
        [single] => Ok(*single),
        _ => Err(GraphError::AmbiguousVariants {
            request: request.to_string(),
            candidates: remaining
                .iter()
                .map(|idx| candidates[*idx].name.clone())
                .collect(),
        }),
    }
}
