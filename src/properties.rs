//! Property schema handed to the host's settings UI.
//!
//! Only integer combo lists are needed here. A property may carry a modified
//! callback; the host calls `Properties::notify_modified` when the user
//! changes that property, and the callback may rewrite other properties'
//! option lists.

use crate::settings::Settings;
use std::collections::HashMap;
use std::sync::Arc;

/// One selectable entry in a list property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub label: String,
    pub value: i64,
}

/// A combo-box style list whose options map labels to integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Settings key this property edits
    pub name: String,
    /// Label shown next to the control
    pub description: String,
    items: Vec<ListItem>,
}

impl Property {
    fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            items: Vec::new(),
        }
    }

    pub fn add_int(&mut self, label: &str, value: i64) -> &mut Self {
        self.items.push(ListItem {
            label: label.to_string(),
            value,
        });
        self
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Called with the whole schema and the current settings. Returns `true` when
/// the UI needs to refresh.
pub type ModifiedCallback = Arc<dyn Fn(&mut Properties, &Settings) -> bool + Send + Sync>;

#[derive(Default)]
pub struct Properties {
    properties: Vec<Property>,
    modified: HashMap<String, ModifiedCallback>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a list property. An existing property with the same name is replaced.
    pub fn add_list(&mut self, name: &str, description: &str) -> &mut Property {
        self.properties.retain(|p| p.name != name);
        self.properties.push(Property::new(name, description));
        let last = self.properties.len() - 1;
        &mut self.properties[last]
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    pub fn set_modified_callback(&mut self, name: &str, callback: ModifiedCallback) {
        self.modified.insert(name.to_string(), callback);
    }

    pub fn has_modified_callback(&self, name: &str) -> bool {
        self.modified.contains_key(name)
    }

    /// Run the modified callback of `name`, if any.
    pub fn notify_modified(&mut self, name: &str, settings: &Settings) -> bool {
        let Some(callback) = self.modified.get(name).cloned() else {
            return false;
        };
        callback(self, settings)
    }
}

impl std::fmt::Debug for Properties {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Properties")
            .field("properties", &self.properties)
            .field("modified", &self.modified.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_list_keeps_order() {
        let mut props = Properties::new();
        props.add_list("a", "A");
        props.add_list("b", "B");
        let names: Vec<_> = props.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn add_list_replaces_same_name() {
        let mut props = Properties::new();
        props.add_list("a", "First").add_int("x", 1);
        props.add_list("a", "Second");
        assert_eq!(props.iter().count(), 1);
        let prop = props.get("a").expect("property");
        assert_eq!(prop.description, "Second");
        assert!(prop.is_empty());
    }

    #[test]
    fn items_and_clear() {
        let mut props = Properties::new();
        props.add_list("list", "List").add_int("one", 1).add_int("two", 2);
        let prop = props.get_mut("list").expect("property");
        assert_eq!(prop.len(), 2);
        assert_eq!(prop.items()[1], ListItem { label: "two".into(), value: 2 });
        prop.clear();
        assert!(prop.is_empty());
    }

    #[test]
    fn notify_without_callback_is_false() {
        let mut props = Properties::new();
        props.add_list("a", "A");
        assert!(!props.notify_modified("a", &Settings::new()));
    }

    #[test]
    fn callback_can_edit_other_property() {
        let mut props = Properties::new();
        props.add_list("source", "Source");
        props.add_list("target", "Target");
        props.set_modified_callback(
            "source",
            Arc::new(|props: &mut Properties, settings: &Settings| {
                let n = settings.get_int("source");
                if let Some(target) = props.get_mut("target") {
                    target.clear();
                    for i in 0..n {
                        target.add_int(&format!("item {}", i), i);
                    }
                }
                true
            }),
        );

        let mut settings = Settings::new();
        settings.set_int("source", 3);
        assert!(props.notify_modified("source", &settings));
        assert_eq!(props.get("target").unwrap().len(), 3);

        settings.set_int("source", 1);
        props.notify_modified("source", &settings);
        assert_eq!(props.get("target").unwrap().len(), 1);
    }
}
