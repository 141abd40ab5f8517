use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Metrics extracted from one quarterly report.
///
/// Every recognized field is optional: the model may omit any of them and
/// that is not a failure. Read through the accessor methods, which default
/// absent values to `0.0`.
///
/// Finite numbers and numeric strings fill the typed fields. Everything else
/// (unknown keys, `null`, `"n/a"`, `"NaN"`) stays in `extra` under its
/// original key, so the raw view shows what the model returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quarterly_revenue_bn: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_interest_income_millions: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dividend_per_share: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets_under_supervision_bn: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MetricRecord {
    pub fn revenue_bn(&self) -> f64 {
        self.quarterly_revenue_bn.unwrap_or_default()
    }

    pub fn eps_value(&self) -> f64 {
        self.eps.unwrap_or_default()
    }

    pub fn net_interest_income(&self) -> f64 {
        self.net_interest_income_millions.unwrap_or_default()
    }

    pub fn dividend(&self) -> f64 {
        self.dividend_per_share.unwrap_or_default()
    }

    pub fn assets_bn(&self) -> f64 {
        self.assets_under_supervision_bn.unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for MetricRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut extra: serde_json::Map<String, serde_json::Value> =
            Deserialize::deserialize(deserializer)?;

        let quarterly_revenue_bn = take_number(&mut extra, "quarterly_revenue_bn");
        let eps = take_number(&mut extra, "eps");
        let net_interest_income_millions = take_number(&mut extra, "net_interest_income_millions");
        let dividend_per_share = take_number(&mut extra, "dividend_per_share");
        let assets_under_supervision_bn = take_number(&mut extra, "assets_under_supervision_bn");

        Ok(Self {
            quarterly_revenue_bn,
            eps,
            net_interest_income_millions,
            dividend_per_share,
            assets_under_supervision_bn,
            extra,
        })
    }
}

/// Remove `key` from the map only if it holds a usable number.
fn take_number(map: &mut serde_json::Map<String, serde_json::Value>, key: &str) -> Option<f64> {
    let number = map.get(key).and_then(number_from_value)?;
    map.remove(key);
    Some(number)
}

fn number_from_value(value: &serde_json::Value) -> Option<f64> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    };
    number.filter(|n: &f64| n.is_finite())
}

/// Per-run aggregate: document label → extracted metrics.
///
/// Keys iterate in lexicographic order, which consumers use as chronology.
/// Inserting an existing label replaces the previous record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    records: BTreeMap<String, MetricRecord>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning the one it replaced (if any).
    pub fn insert(
        &mut self,
        label: impl Into<String>,
        record: MetricRecord,
    ) -> Option<MetricRecord> {
        self.records.insert(label.into(), record)
    }

    pub fn get(&self, label: &str) -> Option<&MetricRecord> {
        self.records.get(label)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.records.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Labels in sorted order.
    pub fn labels(&self) -> Vec<&str> {
        self.records.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Pretty JSON with 2-space indentation.
    pub fn to_pretty_json(&self) -> String {
        // Map<String, struct of f64 + JSON values> cannot fail to serialize.
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
