//! Resolution of `key@product` overrides in rule field maps.
//!
//! Normalization is a pure transform: the input map is left untouched and a
//! product-specific map with no qualified keys is returned. Qualified keys
//! for other products are dropped.

use std::collections::BTreeSet;

use log::{debug, trace};

use crate::types::{FieldMap, FieldValue, NormalizeError};

const LOG_TARGET: &str = "cpeal::normalize";

/// How a product-qualified value interacts with an unqualified one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverridePolicy {
    /// Both values must be equal.
    Strict,
    /// Both values must hold the same set of comma-separated entries.
    StrictList,
    /// The qualified value replaces the unqualified one.
    ProductWins,
}

/// Split `field@product` into its parts. `None` for unqualified keys.
///
/// # Errors
///
/// Returns [`NormalizeError::MalformedKey`] when either side of `@` is empty
/// or the key carries more than one qualifier.
pub fn split_qualified<'k>(
    section: &str,
    key: &'k str,
) -> Result<Option<(&'k str, &'k str)>, NormalizeError> {
    let Some((field, product)) = key.split_once('@') else {
        return Ok(None);
    };
    if field.is_empty() || product.is_empty() || product.contains('@') {
        return Err(NormalizeError::MalformedKey {
            section: section.to_owned(),
            key: key.to_owned(),
        });
    }
    Ok(Some((field, product)))
}

/// Make `map` specific to `product`.
///
/// `section` names the map in error messages; nested maps extend it as
/// `section.key`. Nested maps and maps inside lists are normalized with the
/// same policy.
///
/// # Errors
///
/// Returns [`NormalizeError::ConflictingOverride`] when a policy forbids the
/// qualified and unqualified values to differ, and
/// [`NormalizeError::MalformedKey`] for unparseable keys.
pub fn normalize(
    map: &FieldMap,
    product: &str,
    section: &str,
    policy: OverridePolicy,
) -> Result<FieldMap, NormalizeError> {
    let mut out = FieldMap::new();

    for (key, value) in map.iter().filter(|(key, _)| !key.contains('@')) {
        let value = normalize_value(value, product, &format!("{section}.{key}"), policy)?;
        out.insert(key.clone(), value);
    }

    for (key, value) in map {
        let Some((field, qualifier)) = split_qualified(section, key)? else {
            continue;
        };
        if qualifier != product {
            trace!(target: LOG_TARGET, "dropping '{key}' from {section}");
            continue;
        }
        let value = normalize_value(value, product, &format!("{section}.{field}"), policy)?;
        if let Some(bare) = out.get(field) {
            if !compatible(bare, &value, policy) {
                return Err(NormalizeError::ConflictingOverride {
                    section: section.to_owned(),
                    field: field.to_owned(),
                    qualified_key: key.clone(),
                    qualified_value: value.to_string(),
                    bare_value: bare.to_string(),
                });
            }
            trace!(target: LOG_TARGET, "'{key}' overrides '{field}' in {section}");
        }
        out.insert(field.to_owned(), value);
    }

    debug!(
        target: LOG_TARGET,
        "normalized {section} for '{product}': {} keys -> {} keys",
        map.len(),
        out.len()
    );
    Ok(out)
}

fn normalize_value(
    value: &FieldValue,
    product: &str,
    section: &str,
    policy: OverridePolicy,
) -> Result<FieldValue, NormalizeError> {
    match value {
        FieldValue::Map(inner) => Ok(FieldValue::Map(normalize(inner, product, section, policy)?)),
        FieldValue::List(items) => items
            .iter()
            .map(|item| normalize_value(item, product, section, policy))
            .collect::<Result<Vec<_>, _>>()
            .map(FieldValue::List),
        other => Ok(other.clone()),
    }
}

fn compatible(bare: &FieldValue, qualified: &FieldValue, policy: OverridePolicy) -> bool {
    match policy {
        OverridePolicy::ProductWins => true,
        OverridePolicy::Strict => bare == qualified,
        OverridePolicy::StrictList => match (bare.as_str(), qualified.as_str()) {
            (Some(a), Some(b)) => list_entries(a) == list_entries(b),
            _ => bare == qualified,
        },
    }
}

/// Entries of a comma-separated multi-value field.
#[must_use]
pub fn list_entries(value: &str) -> BTreeSet<&str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, FieldValue)]) -> FieldMap {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn qualified_only_is_renamed() {
        let input = map(&[
            ("cce@rhel7", "CCE-27445-6".into()),
            ("cce@rhel8", "CCE-80901-2".into()),
        ]);
        let out = normalize(&input, "rhel7", "identifiers", OverridePolicy::Strict).unwrap();
        assert_eq!(out, map(&[("cce", "CCE-27445-6".into())]));
    }

    #[test]
    fn bare_only_is_kept() {
        let input = map(&[("cce", "CCE-27445-6".into())]);
        let out = normalize(&input, "rhel7", "identifiers", OverridePolicy::Strict).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn equal_values_merge() {
        let input = map(&[("cce", "X".into()), ("cce@p", "X".into())]);
        let out = normalize(&input, "p", "identifiers", OverridePolicy::Strict).unwrap();
        assert_eq!(out, map(&[("cce", "X".into())]));
    }

    #[test]
    fn differing_values_conflict() {
        let input = map(&[("cce", "CCE-27100-7".into()), ("cce@rhel7", "CCE-27445-6".into())]);
        let err = normalize(&input, "rhel7", "identifiers", OverridePolicy::Strict).unwrap_err();
        match err {
            NormalizeError::ConflictingOverride {
                section,
                field,
                qualified_value,
                bare_value,
                ..
            } => {
                assert_eq!(section, "identifiers");
                assert_eq!(field, "cce");
                assert_eq!(qualified_value, "CCE-27445-6");
                assert_eq!(bare_value, "CCE-27100-7");
            }
            other => panic!("expected ConflictingOverride, got {other:?}"),
        }
    }

    #[test]
    fn conflict_for_other_product_is_ignored() {
        let input = map(&[("cce", "CCE-27100-7".into()), ("cce@rhel8", "CCE-80901-2".into())]);
        let out = normalize(&input, "rhel7", "identifiers", OverridePolicy::Strict).unwrap();
        assert_eq!(out, map(&[("cce", "CCE-27100-7".into())]));
    }

    #[test]
    fn list_values_compare_as_sets() {
        let input = map(&[("nist", "AC-1,AC-2".into()), ("nist@rhel7", "AC-2, AC-1".into())]);
        let out = normalize(&input, "rhel7", "references", OverridePolicy::StrictList).unwrap();
        assert_eq!(out, map(&[("nist", "AC-2, AC-1".into())]));

        let input = map(&[("nist", "AC-1".into()), ("nist@rhel7", "AC-1,AC-3".into())]);
        assert!(normalize(&input, "rhel7", "references", OverridePolicy::StrictList).is_err());
    }

    #[test]
    fn product_wins_recurses() {
        let backends = map(&[("anaconda", true.into()), ("anaconda@rhel7", false.into())]);
        let vars = map(&[
            ("filesystem", "tmpfs".into()),
            ("filesystem@rhel7", "".into()),
            ("filesystem@rhel8", "ext4".into()),
        ]);
        let template = map(&[("backends", backends.into()), ("vars", vars.into())]);

        let out = normalize(&template, "rhel7", "template", OverridePolicy::ProductWins).unwrap();
        let backends = out["backends"].as_map().unwrap();
        assert_eq!(backends.len(), 1);
        assert_eq!(backends["anaconda"].as_bool(), Some(false));
        let vars = out["vars"].as_map().unwrap();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars["filesystem"].as_str(), Some(""));

        let out = normalize(&template, "rhel8", "template", OverridePolicy::ProductWins).unwrap();
        assert_eq!(out["backends"].as_map().unwrap()["anaconda"].as_bool(), Some(true));
        assert_eq!(out["vars"].as_map().unwrap()["filesystem"].as_str(), Some("ext4"));
    }

    #[test]
    fn nested_conflict_reports_section_path() {
        let vars = map(&[("a", "1".into()), ("a@p", "2".into())]);
        let template = map(&[("vars", vars.into())]);
        let err = normalize(&template, "p", "template", OverridePolicy::Strict).unwrap_err();
        assert!(
            matches!(err, NormalizeError::ConflictingOverride { ref section, .. } if section == "template.vars")
        );
    }

    #[test]
    fn maps_inside_lists_are_normalized() {
        let item = map(&[("path", "/a".into()), ("path@p", "/b".into())]);
        let input = map(&[("entries", FieldValue::List(vec![item.into()]))]);
        let out = normalize(&input, "p", "template", OverridePolicy::ProductWins).unwrap();
        let FieldValue::List(items) = &out["entries"] else {
            panic!("expected list");
        };
        assert_eq!(items[0].as_map().unwrap()["path"].as_str(), Some("/b"));
    }

    #[test]
    fn malformed_keys() {
        for key in ["@rhel7", "cce@", "cce@rhel7@x"] {
            let input = map(&[(key, "X".into())]);
            let err = normalize(&input, "rhel7", "identifiers", OverridePolicy::Strict).unwrap_err();
            assert!(matches!(err, NormalizeError::MalformedKey { .. }), "key {key}");
        }
    }

    #[test]
    fn normalized_output_has_no_qualifiers() {
        let input = map(&[
            ("a@x", "1".into()),
            ("a@y", "2".into()),
            ("b", "3".into()),
            ("c@y", "4".into()),
        ]);
        let out = normalize(&input, "x", "s", OverridePolicy::Strict).unwrap();
        assert!(out.keys().all(|k| !k.contains('@')));
        assert_eq!(out.len(), 2);
        assert_eq!(normalize(&out, "y", "s", OverridePolicy::Strict).unwrap(), out);
    }

    #[test]
    fn input_is_not_mutated() {
        let input = map(&[("cce@rhel7", "A".into()), ("cce@rhel8", "B".into())]);
        let rhel7 = normalize(&input, "rhel7", "identifiers", OverridePolicy::Strict).unwrap();
        let rhel8 = normalize(&input, "rhel8", "identifiers", OverridePolicy::Strict).unwrap();
        assert_eq!(rhel7["cce"].as_str(), Some("A"));
        assert_eq!(rhel8["cce"].as_str(), Some("B"));
        assert_eq!(input.len(), 2);
    }
}
