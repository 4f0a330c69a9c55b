use std::sync::Arc;

use crate::Bypass;

/// Logical OR over several bypass rule sets.
///
/// An empty group never matches.
#[derive(Debug, Clone, Default)]
pub struct BypassGroup {
    members: Vec<Arc<dyn Bypass>>,
}

impl BypassGroup {
    pub fn new(members: Vec<Arc<dyn Bypass>>) -> Self {
        Self { members }
    }

    pub fn push(&mut self, bypass: Arc<dyn Bypass>) {
        self.members.push(bypass);
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
}

impl Bypass for BypassGroup {
    fn contains(&self, addr: &str) -> bool {
        self.members.iter().any(|b| b.contains(addr))
    }
}

impl FromIterator<Arc<dyn Bypass>> for BypassGroup {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Bypass>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
