//! Stock line selection by collection and level.

use super::classify::StockLevel;
use super::StockLine;

/// Selects stock lines; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub collection: Option<String>,
    pub level: Option<StockLevel>,
}

impl ItemFilter {
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = Some(name.into());
        self
    }

    pub fn level(mut self, level: StockLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn matches(&self, line: &StockLine) -> bool {
        self.collection
            .as_deref()
            .map_or(true, |name| line.collection == name)
            && self.level.map_or(true, |level| line.level == level)
    }

    pub fn apply<'a>(&'a self, lines: &'a [StockLine]) -> impl Iterator<Item = &'a StockLine> + 'a {
        lines.iter().filter(move |line| self.matches(line))
    }
}
