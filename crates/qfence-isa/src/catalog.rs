//! Native operation catalogs and ISA restriction.
//!
//! A device publishes which operators are physically realizable at each
//! site (`"1Q"`) and at each pair of sites (`"2Q"`). Entries for dead sites
//! or couplers never make it into an [`OperationCatalog`].

use std::collections::{BTreeMap, BTreeSet};

use qfence_ir::{QubitId, QubitPair};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, instrument};

use crate::error::{IsaError, IsaResult};

const ONE_Q: &str = "1Q";
const TWO_Q: &str = "2Q";

/// Per-site and per-pair operator sets of one device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationCatalog {
    sites: BTreeMap<QubitId, BTreeSet<String>>,
    pairs: BTreeMap<QubitPair, BTreeSet<String>>,
}

impl OperationCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single-site entry. Repeated calls extend the operator set.
    #[must_use]
    pub fn with_site<I, S>(mut self, site: impl Into<QubitId>, operators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sites
            .entry(site.into())
            .or_default()
            .extend(operators.into_iter().map(Into::into));
        self
    }

    /// Add a pair entry. Repeated calls extend the operator set.
    #[must_use]
    pub fn with_pair<I, S>(mut self, pair: QubitPair, operators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pairs
            .entry(pair)
            .or_default()
            .extend(operators.into_iter().map(Into::into));
        self
    }

    /// Parse a device ISA document.
    ///
    /// ```json
    /// {"1Q": {"0": {"gates": [{"operator": "RX"}], "dead": false}},
    ///  "2Q": {"0-1": {"gates": [{"operator": "CZ"}], "dead": false}}}
    /// ```
    ///
    /// Entries marked `"dead": true` are left out. Either section may be
    /// absent.
    pub fn from_json(document: &Value) -> IsaResult<Self> {
        let root = document.as_object().ok_or_else(|| IsaError::MalformedCatalog {
            key: "<root>".into(),
            reason: "expected an object with \"1Q\" and \"2Q\" sections".into(),
        })?;

        let mut catalog = Self::new();

        for (key, entry) in section(root, ONE_Q)?.into_iter().flatten() {
            let site = key.parse::<QubitId>().map_err(|_| IsaError::MalformedCatalog {
                key: key.clone(),
                reason: "site key is not an integer".into(),
            })?;
            if let Some(operators) = parse_entry(key, entry)? {
                catalog.sites.entry(site).or_default().extend(operators);
            }
        }

        for (key, entry) in section(root, TWO_Q)?.into_iter().flatten() {
            let pair = key.parse::<QubitPair>().map_err(|e| IsaError::MalformedCatalog {
                key: key.clone(),
                reason: e.to_string(),
            })?;
            if let Some(operators) = parse_entry(key, entry)? {
                catalog.pairs.entry(pair).or_default().extend(operators);
            }
        }

        Ok(catalog)
    }

    /// Write the catalog back in the device ISA shape.
    pub fn to_json(&self) -> Value {
        fn entry(operators: &BTreeSet<String>) -> Value {
            let gates: Vec<Value> = operators
                .iter()
                .map(|op| json!({ "operator": op }))
                .collect();
            json!({ "gates": gates, "dead": false })
        }

        let sites: Map<String, Value> = self
            .sites
            .iter()
            .map(|(site, ops)| (site.to_string(), entry(ops)))
            .collect();
        let pairs: Map<String, Value> = self
            .pairs
            .iter()
            .map(|(pair, ops)| (pair.key(), entry(ops)))
            .collect();

        json!({ ONE_Q: sites, TWO_Q: pairs })
    }

    /// Keep only the pairs offering `operator`, each mapped to `{operator}`.
    ///
    /// Single-site entries pass through unfiltered. A pair whose operator
    /// set does not contain `operator` is dropped, never left empty.
    #[instrument(skip(self), fields(pairs = self.pairs.len()))]
    pub fn restrict(&self, operator: &str) -> IsaResult<RestrictedCatalog> {
        if operator.is_empty() {
            return Err(IsaError::EmptyOperator);
        }

        let pairs: BTreeSet<QubitPair> = self
            .pairs
            .iter()
            .filter(|(_, ops)| ops.contains(operator))
            .map(|(pair, _)| *pair)
            .collect();

        debug!(
            operator,
            kept = pairs.len(),
            dropped = self.pairs.len() - pairs.len(),
            "restricted two-qubit catalog"
        );

        Ok(RestrictedCatalog {
            operator: operator.to_string(),
            sites: self.sites.clone(),
            pairs,
        })
    }

    /// Operators available at a site.
    pub fn site_operators(&self, site: QubitId) -> Option<&BTreeSet<String>> {
        self.sites.get(&site)
    }

    /// Operators available at a pair.
    pub fn pair_operators(&self, pair: &QubitPair) -> Option<&BTreeSet<String>> {
        self.pairs.get(pair)
    }

    /// Iterate over single-site entries.
    pub fn sites(&self) -> impl Iterator<Item = (QubitId, &BTreeSet<String>)> {
        self.sites.iter().map(|(s, ops)| (*s, ops))
    }

    /// Iterate over pair entries.
    pub fn pairs(&self) -> impl Iterator<Item = (QubitPair, &BTreeSet<String>)> {
        self.pairs.iter().map(|(p, ops)| (*p, ops))
    }
}

fn section<'a>(
    root: &'a Map<String, Value>,
    name: &str,
) -> IsaResult<Option<&'a Map<String, Value>>> {
    match root.get(name) {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(_) => Err(IsaError::MalformedCatalog {
            key: name.into(),
            reason: "section is not an object".into(),
        }),
    }
}

/// Operators of one catalog entry, or `None` if the entry is dead.
fn parse_entry(key: &str, entry: &Value) -> IsaResult<Option<Vec<String>>> {
    let malformed = |reason: &str| IsaError::MalformedCatalog {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    let entry = entry
        .as_object()
        .ok_or_else(|| malformed("entry is not an object"))?;

    match entry.get("dead") {
        None | Some(Value::Bool(false)) => {}
        Some(Value::Bool(true)) => return Ok(None),
        Some(_) => return Err(malformed("\"dead\" is not a boolean")),
    }

    let gates = entry
        .get("gates")
        .ok_or_else(|| malformed("missing \"gates\""))?
        .as_array()
        .ok_or_else(|| malformed("\"gates\" is not an array"))?;

    gates
        .iter()
        .map(|gate| {
            gate.get("operator")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| malformed("gate without a string \"operator\""))
        })
        .collect::<IsaResult<Vec<_>>>()
        .map(Some)
}

/// A catalog restricted to a single two-qubit operator.
///
/// Built once per device snapshot and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictedCatalog {
    operator: String,
    sites: BTreeMap<QubitId, BTreeSet<String>>,
    pairs: BTreeSet<QubitPair>,
}

impl RestrictedCatalog {
    /// The retained two-qubit operator.
    pub fn operator(&self) -> &str {
        &self.operator
    }

    /// Check whether the retained operator is available at `pair`.
    pub fn supports(&self, pair: &QubitPair) -> bool {
        self.pairs.contains(pair)
    }

    /// Retained pairs.
    pub fn pairs(&self) -> impl Iterator<Item = QubitPair> + '_ {
        self.pairs.iter().copied()
    }

    /// Number of retained pairs.
    pub fn num_pairs(&self) -> usize {
        self.pairs.len()
    }

    /// Operator set at a pair: `{operator}` when retained, otherwise `None`.
    pub fn pair_operators(&self, pair: &QubitPair) -> Option<BTreeSet<&str>> {
        self.supports(pair)
            .then(|| BTreeSet::from([self.operator.as_str()]))
    }

    /// Operators available at a site (unfiltered).
    pub fn site_operators(&self, site: QubitId) -> Option<&BTreeSet<String>> {
        self.sites.get(&site)
    }

    /// View the restriction as a plain catalog.
    pub fn to_catalog(&self) -> OperationCatalog {
        OperationCatalog {
            sites: self.sites.clone(),
            pairs: self
                .pairs
                .iter()
                .map(|p| (*p, BTreeSet::from([self.operator.clone()])))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: u32, b: u32) -> QubitPair {
        QubitPair::new(a, b).unwrap()
    }

    #[test]
    fn test_restrict_drops_pairs_without_operator() {
        let catalog = OperationCatalog::new()
            .with_pair(pair(0, 1), ["CZ", "CPHASE"])
            .with_pair(pair(1, 2), ["CPHASE"]);

        let restricted = catalog.restrict("CZ").unwrap();
        assert_eq!(restricted.pairs().collect::<Vec<_>>(), vec![pair(0, 1)]);
        assert_eq!(
            restricted.pair_operators(&pair(0, 1)),
            Some(BTreeSet::from(["CZ"]))
        );
        assert_eq!(restricted.pair_operators(&pair(1, 2)), None);
    }

    #[test]
    fn test_restrict_passes_sites_through() {
        let catalog = OperationCatalog::new()
            .with_site(0u32, ["RX", "RZ", "MEASURE"])
            .with_pair(pair(0, 1), ["XY"]);

        let restricted = catalog.restrict("CZ").unwrap();
        assert_eq!(restricted.num_pairs(), 0);
        assert_eq!(restricted.site_operators(QubitId(0)).map(BTreeSet::len), Some(3));
    }

    #[test]
    fn test_restrict_rejects_empty_operator() {
        assert!(matches!(
            OperationCatalog::new().restrict(""),
            Err(IsaError::EmptyOperator)
        ));
    }

    #[test]
    fn test_restrict_leaves_source_untouched() {
        let catalog = OperationCatalog::new().with_pair(pair(0, 1), ["CZ", "XY"]);
        let before = catalog.clone();
        let _ = catalog.restrict("CZ").unwrap();
        assert_eq!(catalog, before);
    }

    #[test]
    fn test_from_json_skips_dead_and_canonicalizes() {
        let document = json!({
            "1Q": {
                "0": {"gates": [{"operator": "RX", "duration": 50.0}], "dead": false},
                "5": {"gates": [{"operator": "RX"}], "dead": true}
            },
            "2Q": {
                "1-0": {"gates": [{"operator": "CZ"}, {"operator": "XY"}]},
                "2-3": {"gates": [{"operator": "CZ"}], "dead": true}
            }
        });

        let catalog = OperationCatalog::from_json(&document).unwrap();
        assert!(catalog.site_operators(QubitId(0)).is_some());
        assert!(catalog.site_operators(QubitId(5)).is_none());
        assert_eq!(
            catalog.pair_operators(&pair(0, 1)).map(BTreeSet::len),
            Some(2)
        );
        assert!(catalog.pair_operators(&pair(2, 3)).is_none());
    }

    #[test]
    fn test_from_json_malformed() {
        let missing_gates = json!({"2Q": {"0-1": {"dead": false}}});
        assert!(matches!(
            OperationCatalog::from_json(&missing_gates),
            Err(IsaError::MalformedCatalog { key, .. }) if key == "0-1"
        ));

        let bad_operator = json!({"2Q": {"0-1": {"gates": [{"operator": 7}]}}});
        assert!(OperationCatalog::from_json(&bad_operator).is_err());

        let bad_key = json!({"2Q": {"zero-one": {"gates": []}}});
        assert!(OperationCatalog::from_json(&bad_key).is_err());

        let self_pair = json!({"2Q": {"3-3": {"gates": []}}});
        assert!(OperationCatalog::from_json(&self_pair).is_err());

        assert!(OperationCatalog::from_json(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_to_json_reads_back() {
        let catalog = OperationCatalog::new()
            .with_site(0u32, ["RX"])
            .with_pair(pair(0, 1), ["CZ"]);
        let back = OperationCatalog::from_json(&catalog.to_json()).unwrap();
        assert_eq!(back, catalog);
    }
}
