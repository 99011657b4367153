//! Priority ordering of names, used to pick a preferred item among several.

use log::trace;
use regex::Regex;

use crate::types::ReorderError;

const LOG_TARGET: &str = "cpeal::reorder";

/// Ranks names by the first ordering entry they contain.
///
/// Names that contain no entry, or that do not match the optional pattern,
/// follow the ranked ones in their input order.
#[derive(Debug, Clone)]
pub struct PriorityOrder {
    ordering: Vec<String>,
    pattern: Option<Regex>,
}

impl PriorityOrder {
    #[must_use]
    pub fn new<I, S>(ordering: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ordering: ordering.into_iter().map(Into::into).collect(),
            pattern: None,
        }
    }

    /// Only names matching `pattern` at their start are ranked.
    ///
    /// # Errors
    ///
    /// Returns [`ReorderError::InvalidPattern`] if `pattern` does not compile.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, ReorderError> {
        self.pattern = Some(Regex::new(&format!("^(?:{pattern})"))?);
        Ok(self)
    }

    fn rank(&self, name: &str) -> Option<usize> {
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(name) {
                return None;
            }
        }
        self.ordering
            .iter()
            .position(|entry| name.contains(entry.as_str()))
    }

    /// Reorder `items`. The output is a permutation of the input.
    #[must_use]
    pub fn reorder<I, S>(&self, items: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ranked: Vec<(usize, String)> = items
            .into_iter()
            .map(|item| {
                let item = item.into();
                let rank = self.rank(&item).unwrap_or(usize::MAX);
                trace!(target: LOG_TARGET, "'{item}' ranked {rank}");
                (rank, item)
            })
            .collect();
        ranked.sort_by_key(|(rank, _)| *rank);
        ranked.into_iter().map(|(_, item)| item).collect()
    }
}

/// One-shot form of [`PriorityOrder::reorder`].
///
/// # Errors
///
/// Returns [`ReorderError::InvalidPattern`] if `pattern` does not compile.
pub fn reorder_according_to_ordering<I, S>(
    items: I,
    ordering: &[&str],
    pattern: Option<&str>,
) -> Result<Vec<String>, ReorderError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut order = PriorityOrder::new(ordering.iter().copied());
    if let Some(pattern) = pattern {
        order = order.with_pattern(pattern)?;
    }
    Ok(order.reorder(items))
}
