use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{ClassifierError, Result};

/// Bidirectional mapping between class ids and human-readable names.
///
/// On disk the forward map is `{"name": id, ...}` and the optional reverse
/// map is `{"id": "name", ...}` (ids as strings, as JSON object keys must be).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassDictionary {
    by_name: HashMap<String, u32>,
    by_id: BTreeMap<u32, String>,
}

impl ClassDictionary {
    /// Builds a dictionary from `name -> id` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Result<ClassDictionary>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut dict = ClassDictionary::default();
        for (name, id) in pairs {
            let name = name.into();
            if let Some(prev) = dict.by_id.insert(id, name.clone()) {
                return Err(ClassifierError::artifact(
                    "class dictionary",
                    format!("class id {} is used by both '{}' and '{}'", id, prev, name),
                ));
            }
            if dict.by_name.insert(name.clone(), id).is_some() {
                return Err(ClassifierError::artifact(
                    "class dictionary",
                    format!("class name '{}' appears twice", name),
                ));
            }
        }
        Ok(dict)
    }

    /// Loads the forward map and, when `reverse` exists, checks it agrees.
    pub fn load(forward: impl AsRef<Path>, reverse: Option<&Path>) -> Result<ClassDictionary> {
        let forward = forward.as_ref();
        let text = std::fs::read_to_string(forward)?;
        let map: BTreeMap<String, u32> = serde_json::from_str(&text)?;
        let dict = ClassDictionary::from_pairs(map)?;

        if let Some(reverse) = reverse {
            let text = std::fs::read_to_string(reverse)?;
            let rev: BTreeMap<String, String> = serde_json::from_str(&text)?;
            dict.check_reverse(&rev)
                .map_err(|reason| ClassifierError::artifact(reverse.display().to_string(), reason))?;
        }
        Ok(dict)
    }

    fn check_reverse(&self, rev: &BTreeMap<String, String>) -> std::result::Result<(), String> {
        if rev.len() != self.by_id.len() {
            return Err(format!("{} reverse entries for {} classes", rev.len(), self.by_id.len()));
        }
        for (key, name) in rev {
            let id: u32 = key.trim().parse().map_err(|_| format!("'{}' is not a class id", key))?;
            match self.by_id.get(&id) {
                Some(expected) if expected == name => {}
                Some(expected) => {
                    return Err(format!("id {} maps to '{}' but the forward map says '{}'", id, name, expected))
                }
                None => return Err(format!("id {} is missing from the forward map", id)),
            }
        }
        Ok(())
    }

    pub fn name_of(&self, id: u32) -> Option<&str> {
        self.by_id.get(&id).map(|s| s.as_str())
    }

    pub fn id_of(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Class names in id order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_id.values().map(|s| s.as_str())
    }

    /// True when the ids are exactly `1..=len`, the positions a classifier's
    /// probability vector refers to.
    pub fn is_contiguous(&self) -> bool {
        self.by_id.keys().enumerate().all(|(i, &id)| id == i as u32 + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_work_both_ways() {
        let dict = ClassDictionary::from_pairs([("lionel_messi", 1), ("serena_williams", 2)]).unwrap();
        assert_eq!(dict.name_of(2), Some("serena_williams"));
        assert_eq!(dict.id_of("lionel_messi"), Some(1));
        assert_eq!(dict.name_of(0), None);
        assert!(dict.is_contiguous());
        assert_eq!(dict.names().collect::<Vec<_>>(), vec!["lionel_messi", "serena_williams"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        assert!(ClassDictionary::from_pairs([("a", 1), ("b", 1)]).is_err());
    }

    #[test]
    fn gaps_are_not_contiguous() {
        let dict = ClassDictionary::from_pairs([("a", 1), ("b", 3)]).unwrap();
        assert!(!dict.is_contiguous());
    }

    #[test]
    fn reverse_map_must_agree() {
        let dict = ClassDictionary::from_pairs([("a", 1), ("b", 2)]).unwrap();
        let mut rev = BTreeMap::new();
        rev.insert("1".to_owned(), "a".to_owned());
        rev.insert("2".to_owned(), "b".to_owned());
        assert!(dict.check_reverse(&rev).is_ok());
        rev.insert("2".to_owned(), "c".to_owned());
        assert!(dict.check_reverse(&rev).is_err());
    }
}
