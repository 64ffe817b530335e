use std::collections::HashMap;

pub trait StringTable {
    fn to_str(&self, id: usize) -> Option<&str>;
    fn to_id(&self, s: &str) -> Option<usize>;
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Insertion-ordered set of tags with dense ids.
///
/// Iteration order is the order tags were first inserted, which is what the
/// decoder uses to break ties between equally scored tags.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TagSet {
    v: Vec<String>,
    m: HashMap<String, usize>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `tag` unless present; returns its id either way.
    pub fn insert(&mut self, tag: &str) -> usize {
        if let Some(&id) = self.m.get(tag) {
            return id;
        }
        let id = self.v.len();
        self.m.insert(tag.to_string(), id);
        self.v.push(tag.to_string());
        id
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.m.contains_key(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.v.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.v
    }
}

impl StringTable for TagSet {
    fn to_str(&self, id: usize) -> Option<&str> {
        self.v.get(id).map(|x| x.as_str())
    }

    fn to_id(&self, s: &str) -> Option<usize> {
        self.m.get(s).copied()
    }

    fn len(&self) -> usize {
        self.v.len()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::default();
        for tag in iter {
            set.insert(tag.as_ref());
        }
        set
    }
}

impl From<Vec<String>> for TagSet {
    fn from(value: Vec<String>) -> Self {
        value.iter().collect()
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&'a String) -> &'a str>;

    fn into_iter(self) -> Self::IntoIter {
        self.v.iter().map(String::as_str as fn(&'a String) -> &'a str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_by_str() {
        let mut tags = TagSet::default();
        for (s, id) in [("NN", 0), ("DT", 1), ("VB", 2), ("JJ", 3), ("VB", 2), ("DT", 1), ("NN", 0), ("IN", 4)] {
            assert_eq!(id, tags.insert(s), "{} != {}", s, id);
        }
        assert_eq!(tags.len(), 5);
    }

    #[test]
    fn find_by_id() {
        let tags: TagSet = ["NN", "DT"].into_iter().collect();
        assert_eq!(tags.to_str(0), Some("NN"));
        assert_eq!(tags.to_str(1), Some("DT"));
        assert_eq!(tags.to_str(2), None);
        assert_eq!(tags.to_id("DT"), Some(1));
        assert!(!tags.contains("VB"));
    }

    #[test]
    fn iteration_follows_insertion() {
        let tags = TagSet::from(vec!["VB".to_string(), "NN".to_string(), "VB".to_string(), "DT".to_string()]);
        assert_eq!(tags.iter().collect::<Vec<_>>(), ["VB", "NN", "DT"]);
        assert_eq!((&tags).into_iter().count(), 3);
    }
}
