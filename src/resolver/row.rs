use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeSet;

/// Flattened record of one retained entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub entity_id: String,
    pub label: String,
    pub description: String,
    pub aliases: BTreeSet<String>,
    /// Attribute display name -> values, in discovery order.
    pub attributes: Vec<(String, Vec<String>)>,
}

impl ResultRow {
    pub fn attribute(&self, name: &str) -> Option<&[String]> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4 + self.attributes.len()))?;
        map.serialize_entry("label", &self.label)?;
        map.serialize_entry("description", &self.description)?;
        map.serialize_entry("aliases", &self.aliases)?;
        for (name, values) in &self.attributes {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

/// A failure the run tolerated under its failure policy.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Issue {
    pub entity: String,
    /// `None` when the whole entity was dropped.
    pub attribute: Option<String>,
    pub cause: String,
}

/// Outcome of one resolution run: retained rows in search order, plus
/// every failure that was tolerated along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    rows: Vec<ResultRow>,
    pub issues: Vec<Issue>,
}

impl Resolution {
    pub(crate) fn push(&mut self, row: ResultRow) {
        self.rows.push(row);
    }

    pub fn get(&self, entity_id: &str) -> Option<&ResultRow> {
        self.rows.iter().find(|r| r.entity_id == entity_id)
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.get(entity_id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.entity_id.as_str())
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Serialize for Resolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Entities<'a>(&'a [ResultRow]);

        impl Serialize for Entities<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for row in self.0 {
                    map.serialize_entry(&row.entity_id, row)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("entities", &Entities(&self.rows))?;
        map.serialize_entry("issues", &self.issues)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ResultRow {
        ResultRow {
            entity_id: "Q1".into(),
            label: "Acme".into(),
            description: "maker of things".into(),
            aliases: BTreeSet::from(["ACME".to_string()]),
            attributes: vec![
                ("country".into(), vec!["United States".into()]),
                ("inception".into(), vec!["+1949-00-00T00:00:00Z".into()]),
            ],
        }
    }

    #[test]
    fn test_row_serializes_flat_in_discovery_order() {
        let json = serde_json::to_string(&row()).unwrap();
        assert_eq!(
            json,
            r#"{"label":"Acme","description":"maker of things","aliases":["ACME"],"country":["United States"],"inception":["+1949-00-00T00:00:00Z"]}"#
        );
    }

    #[test]
    fn test_resolution_lookup_and_serialization() {
        let mut resolution = Resolution::default();
        resolution.push(row());
        resolution.issues.push(Issue {
            entity: "Q2".into(),
            attribute: None,
            cause: "malformed record Q2: record has no aliases".into(),
        });

        assert!(resolution.contains("Q1"));
        assert_eq!(resolution.get("Q1").unwrap().attribute("country").unwrap(), ["United States"]);
        let value = serde_json::to_value(&resolution).unwrap();
        assert_eq!(value["entities"]["Q1"]["label"], "Acme");
        assert_eq!(value["issues"][0]["entity"], "Q2");
    }
}
