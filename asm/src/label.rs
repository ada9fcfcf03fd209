use crate::error::Error;
use indexmap::IndexMap;

/// Label name to (defining line, address), in definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels(IndexMap<String, (usize, u8)>);

impl Labels {
    pub fn new() -> Self {
        Labels(IndexMap::new())
    }

    pub fn insert(&mut self, name: &str, line: usize, addr: u8) -> Result<(), Error> {
        if let Some((first, _)) = self.0.get(name) {
            return Err(Error::RedefinedLabel {
                name: name.to_string(),
                line,
                first: *first,
            });
        }
        self.0.insert(name.to_string(), (line, addr));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<u8> {
        self.0.get(name).map(|(_, addr)| *addr)
    }

    /// Resolves `name` or fails with the line of the reference.
    pub fn resolve(&self, name: &str, line: usize) -> Result<u8, Error> {
        self.get(name).ok_or_else(|| Error::UndefinedLabel {
            name: name.to_string(),
            line,
        })
    }

    /// Labels placed at `addr`.
    pub fn names_at(&self, addr: u8) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(move |(_, (_, a))| *a == addr)
            .map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.0.iter().map(|(name, (_, addr))| (name.as_str(), *addr))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
