//! Attribute inheritance from parent objects and per-solid attribute bundles.

use std::collections::{BTreeMap, HashMap};

use crate::document::{Attributes, CityObject, Document};

/// Reserved attribute bound to the object identifier.
pub const OBJECT_NAME: &str = "Object Name";

/// Reserved attribute bound to the semantic type.
pub const OBJECT_TYPE: &str = "Object Type";

/// Attributes donated by parents, keyed by child identifier.
///
/// Built once per document and shared read-only while objects are built.
#[derive(Debug, Clone, Default)]
pub struct ParentAttributes {
    by_child: HashMap<String, Attributes>,
}

impl ParentAttributes {
    /// Walks every object that declares both attributes and children.
    ///
    /// A child declared by several parents keeps the attributes of the last
    /// parent in document order.
    #[must_use]
    pub fn build(document: &Document) -> Self {
        let mut by_child = HashMap::new();
        for object in document.city_objects.values() {
            if object.attributes.is_empty() {
                continue;
            }
            for child in &object.children {
                by_child.insert(child.clone(), object.attributes.clone());
            }
        }
        Self { by_child }
    }

    /// Returns the inherited bundle of `child`, if any parent donated one.
    #[must_use]
    pub fn get(&self, child: &str) -> Option<&Attributes> {
        self.by_child.get(child)
    }

    /// Returns the number of children with inherited attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_child.len()
    }

    /// Returns `true` if no object inherits anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_child.is_empty()
    }
}

/// Resolves the attribute bundle attached to every solid of `object`.
///
/// Own attributes take precedence over inherited ones; the reserved
/// [`OBJECT_NAME`] and [`OBJECT_TYPE`] are always bound to the identifier
/// and the semantic type.
#[must_use]
pub fn resolve_attributes(
    object: &CityObject,
    inherited: Option<&Attributes>,
) -> BTreeMap<String, String> {
    let mut resolved: BTreeMap<String, String> = inherited
        .into_iter()
        .flatten()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    for (name, value) in &object.attributes {
        resolved.insert(name.clone(), value.clone());
    }
    resolved.insert(OBJECT_NAME.to_owned(), object.id.clone());
    resolved.insert(OBJECT_TYPE.to_owned(), object.kind.clone());
    resolved
}

/// Lists the attribute names a host must declare before solids arrive.
///
/// Own attribute names of every object in first-seen order, followed by the
/// reserved names.
#[must_use]
pub fn discover_attribute_names(document: &Document) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let own = document
        .city_objects
        .values()
        .flat_map(|o| o.attributes.keys());
    for name in own.map(String::as_str).chain([OBJECT_NAME, OBJECT_TYPE]) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_owned());
        }
    }
    names
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::document::decode;

    const FAMILY: &str = r#"{
        "type": "CityJSON", "version": "1.1",
        "transform": { "scale": [1, 1, 1], "translate": [0, 0, 0] },
        "vertices": [],
        "CityObjects": {
            "A": {
                "type": "Building",
                "attributes": { "height": "10", "owner": "city" },
                "children": ["B"]
            },
            "B": { "type": "BuildingPart", "attributes": { "roof": "flat" } },
            "C": { "type": "Building", "attributes": { "height": "20" }, "children": ["B", "D"] },
            "D": { "type": "BuildingPart", "attributes": { "height": "5" } },
            "E": { "type": "Building", "children": ["F"] }
        }
    }"#;

    #[test]
    fn last_declared_parent_wins() {
        let doc = decode(FAMILY).unwrap();
        let parents = ParentAttributes::build(&doc);
        let b = parents.get("B").unwrap();
        assert_eq!(b.get("height").map(String::as_str), Some("20"));
        assert!(!b.contains_key("owner"));
    }

    #[test]
    fn parents_without_attributes_donate_nothing() {
        let doc = decode(FAMILY).unwrap();
        let parents = ParentAttributes::build(&doc);
        assert!(parents.get("F").is_none());
        assert_eq!(parents.len(), 2);
    }

    #[test]
    fn own_attributes_take_precedence() {
        let doc = decode(FAMILY).unwrap();
        let parents = ParentAttributes::build(&doc);
        let d = &doc.city_objects["D"];
        let resolved = resolve_attributes(d, parents.get("D"));
        assert_eq!(resolved["height"], "5");
    }

    #[test]
    fn inherited_fills_missing_names() {
        let doc = decode(FAMILY).unwrap();
        let parents = ParentAttributes::build(&doc);
        let b = &doc.city_objects["B"];
        let resolved = resolve_attributes(b, parents.get("B"));
        assert_eq!(resolved["height"], "20");
        assert_eq!(resolved["roof"], "flat");
        assert_eq!(resolved[OBJECT_NAME], "B");
        assert_eq!(resolved[OBJECT_TYPE], "BuildingPart");
    }

    #[test]
    fn reserved_names_always_present() {
        let doc = decode(FAMILY).unwrap();
        let resolved = resolve_attributes(&doc.city_objects["E"], None);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[OBJECT_NAME], "E");
        assert_eq!(resolved[OBJECT_TYPE], "Building");
    }

    #[test]
    fn discovered_names_are_distinct_and_ordered() {
        let doc = decode(FAMILY).unwrap();
        assert_eq!(
            discover_attribute_names(&doc),
            ["height", "owner", "roof", OBJECT_NAME, OBJECT_TYPE]
        );
    }
}
