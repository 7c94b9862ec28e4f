use crate::error::AggregateError;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};

/// Grouping key plus the attribute names projected into each group's `properties`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelection {
    pub main_filter: String,
    /// Empty means "keep the whole attribute map".
    pub extra_fields: BTreeSet<String>,
    /// Unioned with `extra_fields` whenever `extra_fields` is non-empty.
    pub always_include: BTreeSet<String>,
}

impl FilterSelection {
    pub fn new<I, S>(main_filter: impl Into<String>, extra_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            main_filter: main_filter.into(),
            extra_fields: extra_fields.into_iter().map(Into::into).collect(),
            always_include: ["surface", "roomsNo", "createdOn"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    pub fn with_always_include<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.always_include = fields.into_iter().map(Into::into).collect();
        self
    }

    fn project(&self, info: &Map<String, Value>) -> Map<String, Value> {
        if self.extra_fields.is_empty() {
            return info.clone();
        }
        info.iter()
            .filter(|(k, _)| self.extra_fields.contains(*k) || self.always_include.contains(*k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// A listing price. Integer prices stay integers until a float or an overflow shows up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Price {
    Int(i64),
    Float(f64),
}

impl Price {
    fn from_value(value: &Value) -> Option<Price> {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Price::Int(i)),
                None => n.as_f64().map(Price::Float),
            },
            _ => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Price::Int(i) => i as f64,
            Price::Float(f) => f,
        }
    }

    fn add(self, other: Price) -> Price {
        match (self, other) {
            (Price::Int(a), Price::Int(b)) => a
                .checked_add(b)
                .map(Price::Int)
                .unwrap_or(Price::Float(a as f64 + b as f64)),
            (a, b) => Price::Float(a.as_f64() + b.as_f64()),
        }
    }

    fn lt(self, other: Price) -> bool {
        match (self, other) {
            (Price::Int(a), Price::Int(b)) => a < b,
            (a, b) => a.as_f64() < b.as_f64(),
        }
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Price::Int(i) => serializer.serialize_i64(i),
            Price::Float(f) => serializer.serialize_f64(f),
        }
    }
}

/// Rounds to two decimals, half away from zero.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Running totals for one group before the average is known.
#[derive(Debug, Clone)]
struct GroupAccumulator {
    total_price: Price,
    count: u64,
    properties: Vec<Map<String, Value>>,
    lowest_price: Price,
    highest_price: Price,
}

impl GroupAccumulator {
    fn new(price: Price) -> Self {
        Self {
            total_price: Price::Int(0),
            count: 0,
            properties: Vec::new(),
            lowest_price: price,
            highest_price: price,
        }
    }

    fn record(&mut self, price: Price, projected: Map<String, Value>) {
        self.total_price = self.total_price.add(price);
        self.count += 1;
        if price.lt(self.lowest_price) {
            self.lowest_price = price;
        }
        if self.highest_price.lt(price) {
            self.highest_price = price;
        }
        self.properties.push(projected);
    }

    fn finalize(self) -> GroupStats {
        let average = self.total_price.as_f64() / self.count as f64;
        GroupStats {
            total_price: self.total_price,
            count: self.count,
            properties: self.properties,
            lowest_price: self.lowest_price,
            highest_price: self.highest_price,
            average_price: round_cents(average),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStats {
    pub total_price: Price,
    pub count: u64,
    pub properties: Vec<Map<String, Value>>,
    pub lowest_price: Price,
    pub highest_price: Price,
    pub average_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceGroup {
    /// The main-filter value exactly as it appeared in the listings.
    pub key: Value,
    pub stats: GroupStats,
}

impl PriceGroup {
    /// The key as written to the result document.
    pub fn label(&self) -> String {
        key_label(&self.key)
    }
}

fn key_label(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Finalized groups in first-seen order, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultDocument {
    groups: Vec<PriceGroup>,
}

impl ResultDocument {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[PriceGroup] {
        &self.groups
    }

    /// Looks a group up by its raw key value.
    #[allow(dead_code)]
    pub fn get(&self, key: &Value) -> Option<&GroupStats> {
        self.groups.iter().find(|g| &g.key == key).map(|g| &g.stats)
    }

    /// Looks a group up by its document label.
    #[allow(dead_code)]
    pub fn get_by_label(&self, label: &str) -> Option<&GroupStats> {
        self.groups
            .iter()
            .find(|g| g.label() == label)
            .map(|g| &g.stats)
    }
}

impl Serialize for ResultDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.label(), &group.stats)?;
        }
        map.end()
    }
}

/// Groups listings by `selection.main_filter` and reduces each group's prices.
///
/// - Listings whose `info.price` or main-filter value is missing or null are skipped.
/// - A missing or null `info` is read as an empty attribute map.
/// - Keys are compared by exact JSON value, so `2` and `"2"` are separate groups.
pub fn aggregate_listings(
    listings: &[Value],
    selection: &FilterSelection,
) -> Result<ResultDocument, AggregateError> {
    let empty = Map::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut keys: Vec<Value> = Vec::new();
    let mut accumulators: Vec<GroupAccumulator> = Vec::new();
    let mut skipped = 0usize;

    for (position, listing) in listings.iter().enumerate() {
        let record = listing.as_object().ok_or_else(|| {
            AggregateError::shape(format!("listing #{} is not a JSON object", position))
        })?;
        let info = match record.get("info") {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(info)) => info,
            Some(_) => {
                return Err(AggregateError::shape(format!(
                    "listing #{} has a non-object `info`",
                    position
                )));
            }
        };

        let (raw_price, key) = match (info.get("price"), info.get(&selection.main_filter)) {
            (Some(p), Some(k)) if !p.is_null() && !k.is_null() => (p, k),
            _ => {
                skipped += 1;
                continue;
            }
        };
        let price = Price::from_value(raw_price).ok_or_else(|| {
            AggregateError::shape(format!(
                "listing #{} has a non-numeric price: {}",
                position, raw_price
            ))
        })?;

        // serde_json text keeps 2, 2.0 and "2" apart.
        let slot = *index.entry(key.to_string()).or_insert_with(|| {
            keys.push(key.clone());
            accumulators.push(GroupAccumulator::new(price));
            accumulators.len() - 1
        });
        accumulators[slot].record(price, selection.project(info));
    }

    log::debug!(
        "Aggregated {} listings into {} groups by `{}` ({} skipped)",
        listings.len(),
        accumulators.len(),
        selection.main_filter,
        skipped
    );

    let groups = keys
        .into_iter()
        .zip(accumulators)
        .map(|(key, acc)| PriceGroup {
            key,
            stats: acc.finalize(),
        })
        .collect();
    Ok(ResultDocument { groups })
}
