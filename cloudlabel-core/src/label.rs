//! Class ids and the point label map

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

/// A class id in `0..=9`, one per digit key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u8")]
pub struct ClassId(u8);

impl ClassId {
    /// Number of distinct classes
    pub const COUNT: usize = 10;

    pub fn new(value: u8) -> Option<Self> {
        if (value as usize) < Self::COUNT {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Class id for a digit key
    pub fn from_digit(key: char) -> Option<Self> {
        key.to_digit(10).map(|d| Self(d as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Every class id in ascending order
    pub fn all() -> impl Iterator<Item = ClassId> {
        (0..Self::COUNT as u8).map(Self)
    }
}

impl TryFrom<u64> for ClassId {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self> {
        u8::try_from(value)
            .ok()
            .and_then(ClassId::new)
            .ok_or(Error::InvalidClass(value))
    }
}

impl From<ClassId> for u8 {
    fn from(class: ClassId) -> Self {
        class.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mapping from point index to class id.
///
/// Serializes as a flat JSON object with the decimal point index as key,
/// e.g. `{"5": 2, "9": 7}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap {
    labels: BTreeMap<usize, ClassId>,
}

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<ClassId> {
        self.labels.get(&index).copied()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.labels.contains_key(&index)
    }

    /// Label a point, returning its previous class if it had one
    pub fn insert(&mut self, index: usize, class: ClassId) -> Option<ClassId> {
        self.labels.insert(index, class)
    }

    pub fn remove(&mut self, index: usize) -> Option<ClassId> {
        self.labels.remove(&index)
    }

    /// Labels in ascending point index order
    pub fn iter(&self) -> impl Iterator<Item = (usize, ClassId)> + '_ {
        self.labels.iter().map(|(&index, &class)| (index, class))
    }

    /// Check that every labeled index addresses a point of a cloud with `len` points
    pub fn check_indices(&self, len: usize) -> Result<()> {
        match self.labels.last_key_value() {
            Some((&index, _)) if index >= len => Err(Error::LabelOutOfRange { index, len }),
            _ => Ok(()),
        }
    }
}

impl FromIterator<(usize, ClassId)> for LabelMap {
    fn from_iter<I: IntoIterator<Item = (usize, ClassId)>>(iter: I) -> Self {
        Self {
            labels: BTreeMap::from_iter(iter),
        }
    }
}

impl IntoIterator for LabelMap {
    type Item = (usize, ClassId);
    type IntoIter = btree_map::IntoIter<usize, ClassId>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(value: u8) -> ClassId {
        ClassId::new(value).unwrap()
    }

    #[test]
    fn test_class_id_range() {
        assert!(ClassId::new(9).is_some());
        assert!(ClassId::new(10).is_none());
        assert_eq!(ClassId::from_digit('7'), Some(class(7)));
        assert_eq!(ClassId::from_digit('a'), None);
        assert_eq!(ClassId::all().count(), ClassId::COUNT);
    }

    #[test]
    fn test_label_map_json_shape() {
        let labels: LabelMap = [(9, class(7)), (5, class(2))].into_iter().collect();
        let json = serde_json::to_string(&labels).unwrap();
        assert_eq!(json, r#"{"5":2,"9":7}"#);

        let parsed: LabelMap = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, labels);
    }

    #[test]
    fn test_label_map_rejects_bad_content() {
        assert!(serde_json::from_str::<LabelMap>(r#"{"1": 10}"#).is_err());
        assert!(serde_json::from_str::<LabelMap>(r#"{"1": -1}"#).is_err());
        assert!(serde_json::from_str::<LabelMap>(r#"{"1": 2.5}"#).is_err());
        assert!(serde_json::from_str::<LabelMap>(r#"{"x": 1}"#).is_err());
        assert!(serde_json::from_str::<LabelMap>(r#"{"-3": 1}"#).is_err());
        assert!(serde_json::from_str::<LabelMap>(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn test_check_indices() {
        let labels: LabelMap = [(0, class(1)), (4, class(1))].into_iter().collect();
        assert!(labels.check_indices(5).is_ok());
        assert!(matches!(
            labels.check_indices(4),
            Err(Error::LabelOutOfRange { index: 4, len: 4 })
        ));
        assert!(LabelMap::new().check_indices(0).is_ok());
    }
}
