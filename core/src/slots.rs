//! The slot registry: user-ordered slot labels and which are locked.

use crate::{
    error::{SegError, SegResult},
    time::parse_slot_interval,
    types::{Minutes, SlotLabel},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotRegistry {
    order:  Vec<SlotLabel>,
    locked: BTreeSet<SlotLabel>,
}

impl SlotRegistry {
    pub fn new<S: Into<SlotLabel>>(labels: impl IntoIterator<Item = S>) -> Self {
        let mut registry = Self::default();
        for label in labels {
            registry.add(label);
        }
        registry
    }

    /// Append a slot. Duplicate labels are ignored (returns false).
    pub fn add(&mut self, label: impl Into<SlotLabel>) -> bool {
        let label = label.into();
        if self.contains(&label) {
            return false;
        }
        self.order.push(label);
        true
    }

    pub fn remove(&mut self, label: &str) -> SegResult<()> {
        let pos = self
            .order
            .iter()
            .position(|s| s == label)
            .ok_or_else(|| SegError::SlotNotFound { slot: label.to_string() })?;
        self.order.remove(pos);
        self.locked.remove(label);
        Ok(())
    }

    /// Replace the order. `new_order` must be a permutation of the
    /// current labels.
    pub fn reorder(&mut self, new_order: Vec<SlotLabel>) -> SegResult<()> {
        if new_order.len() != self.order.len() {
            return Err(SegError::InvalidSlotOrder {
                reason: format!("expected {} slots, got {}", self.order.len(), new_order.len()),
            });
        }
        let current: BTreeSet<&SlotLabel> = self.order.iter().collect();
        let proposed: BTreeSet<&SlotLabel> = new_order.iter().collect();
        if current != proposed {
            return Err(SegError::InvalidSlotOrder {
                reason: "new order must contain exactly the existing slots".into(),
            });
        }
        self.order = new_order;
        Ok(())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.order.iter().any(|s| s == label)
    }

    pub fn require(&self, label: &str) -> SegResult<()> {
        if self.contains(label) {
            Ok(())
        } else {
            Err(SegError::SlotNotFound { slot: label.to_string() })
        }
    }

    pub fn labels(&self) -> &[SlotLabel] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_locked(&self, label: &str) -> bool {
        self.locked.contains(label)
    }

    pub fn lock(&mut self, label: &str) {
        if self.contains(label) {
            self.locked.insert(label.to_string());
        }
    }

    pub fn unlock(&mut self, label: &str) {
        self.locked.remove(label);
    }

    pub fn clear_locks(&mut self) {
        self.locked.clear();
    }

    pub fn locked_count(&self) -> usize {
        self.locked.len()
    }

    /// First locked slot, in display order, whose end lies within
    /// `(0, window]` minutes of `now`.
    pub fn ending_soon(&self, now: Minutes, window: Minutes) -> Option<&str> {
        self.order
            .iter()
            .filter(|label| self.is_locked(label))
            .find(|label| {
                parse_slot_interval(label).is_some_and(|interval| {
                    let until_end = i64::from(interval.end) - i64::from(now);
                    until_end > 0 && until_end <= i64::from(window)
                })
            })
            .map(String::as_str)
    }
}
