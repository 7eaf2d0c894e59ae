// ─── Attribute Rules ───
// Compatibility and disambiguation for each attribute key.

use std::collections::BTreeSet;

use super::model::{AttributeKey, AttributeValue, Distribution, ModLoader};

/// Can a producer offering `candidate` satisfy a consumer requesting `requested`?
pub fn is_compatible(key: AttributeKey, requested: &AttributeValue, candidate: &AttributeValue) -> bool {
    match key {
        AttributeKey::Distribution => match (requested, candidate) {
            (_, AttributeValue::Distribution(Distribution::Common | Distribution::Joined)) => true,
            (
                AttributeValue::Distribution(Distribution::Client),
                AttributeValue::Distribution(Distribution::Client),
            ) => true,
            _ => false,
        },
        // Data and non-data variants never exclude each other; disambiguation decides.
        AttributeKey::Data => true,
        AttributeKey::ModLoader => {
            requested == candidate || *candidate == AttributeValue::ModLoader(ModLoader::Common)
        }
        AttributeKey::MinecraftVersion | AttributeKey::CommonType | AttributeKey::CommonName => {
            requested == candidate
        }
    }
}

/// Pick the preferred value among several compatible candidates.
///
/// `present` holds every distinct value seen on the remaining candidates
/// (`None` for candidates lacking the attribute). Returns `None` when the
/// rule has no preference.
pub fn disambiguate(
    key: AttributeKey,
    requested: Option<&AttributeValue>,
    present: &BTreeSet<Option<AttributeValue>>,
) -> Option<Option<AttributeValue>> {
    let has = |value: &AttributeValue| present.contains(&Some(value.clone()));

    match key {
        AttributeKey::Distribution => {
            if let Some(req) = requested {
                if has(req) {
                    return Some(Some(req.clone()));
                }
            }
            let common = AttributeValue::Distribution(Distribution::Common);
            let joined = AttributeValue::Distribution(Distribution::Joined);
            let order = match requested {
                Some(AttributeValue::Distribution(Distribution::Client)) => [joined, common],
                _ => [common, joined],
            };
            order.into_iter().find(|v| has(v)).map(Some)
        }
        AttributeKey::Data => {
            let wanted = AttributeValue::Data(true);
            if requested == Some(&wanted) && has(&wanted) {
                return Some(Some(wanted));
            }
            let plain = AttributeValue::Data(false);
            has(&plain).then_some(Some(plain))
        }
        _ => requested
            .filter(|req| has(req))
            .map(|req| Some(req.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(d: Distribution) -> AttributeValue {
        AttributeValue::Distribution(d)
    }

    fn set(values: &[AttributeValue]) -> BTreeSet<Option<AttributeValue>> {
        values.iter().cloned().map(Some).collect()
    }

    #[test]
    fn client_only_producers_only_serve_client_consumers() {
        let key = AttributeKey::Distribution;
        assert!(is_compatible(key, &dist(Distribution::Client), &dist(Distribution::Client)));
        assert!(!is_compatible(key, &dist(Distribution::Common), &dist(Distribution::Client)));
        assert!(!is_compatible(key, &dist(Distribution::Joined), &dist(Distribution::Client)));
        for requested in [Distribution::Common, Distribution::Client, Distribution::Joined] {
            assert!(is_compatible(key, &dist(requested), &dist(Distribution::Common)));
            assert!(is_compatible(key, &dist(requested), &dist(Distribution::Joined)));
        }
    }

    #[test]
    fn client_request_prefers_joined_over_common() {
        let present = set(&[dist(Distribution::Common), dist(Distribution::Joined)]);
        let chosen = disambiguate(
            AttributeKey::Distribution,
            Some(&dist(Distribution::Client)),
            &present,
        );
        assert_eq!(chosen, Some(Some(dist(Distribution::Joined))));
    }

    #[test]
    fn common_or_missing_request_prefers_common() {
        let present = set(&[dist(Distribution::Common), dist(Distribution::Joined)]);
        for requested in [Some(dist(Distribution::Common)), None] {
            let chosen = disambiguate(AttributeKey::Distribution, requested.as_ref(), &present);
            assert_eq!(chosen, Some(Some(dist(Distribution::Common))));
        }
    }

    #[test]
    fn exact_distribution_wins() {
        let present = set(&[
            dist(Distribution::Common),
            dist(Distribution::Client),
            dist(Distribution::Joined),
        ]);
        let chosen = disambiguate(
            AttributeKey::Distribution,
            Some(&dist(Distribution::Client)),
            &present,
        );
        assert_eq!(chosen, Some(Some(dist(Distribution::Client))));
    }

    #[test]
    fn data_is_always_compatible_and_prefers_false() {
        let t = AttributeValue::Data(true);
        let f = AttributeValue::Data(false);
        assert!(is_compatible(AttributeKey::Data, &t, &f));
        assert!(is_compatible(AttributeKey::Data, &f, &t));

        let present = set(&[t.clone(), f.clone()]);
        assert_eq!(disambiguate(AttributeKey::Data, None, &present), Some(Some(f.clone())));
        assert_eq!(disambiguate(AttributeKey::Data, Some(&f), &present), Some(Some(f.clone())));
        assert_eq!(disambiguate(AttributeKey::Data, Some(&t), &present), Some(Some(t.clone())));

        let only_false = set(&[f.clone()]);
        assert_eq!(disambiguate(AttributeKey::Data, Some(&t), &only_false), Some(Some(f)));
    }

    #[test]
    fn common_loader_serves_every_loader() {
        let fabric = AttributeValue::ModLoader(ModLoader::Fabric);
        let forge = AttributeValue::ModLoader(ModLoader::Forge);
        let common = AttributeValue::ModLoader(ModLoader::Common);
        assert!(is_compatible(AttributeKey::ModLoader, &fabric, &common));
        assert!(is_compatible(AttributeKey::ModLoader, &fabric, &fabric));
        assert!(!is_compatible(AttributeKey::ModLoader, &fabric, &forge));
    }
}
