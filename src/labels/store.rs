use crate::core::geo::GeoPoint;
use crate::labels::record::LabelRecord;
use crate::sync::wire::LabelAdjustment;
use fxhash::{FxHashMap, FxHashSet};

/// Authoritative label set for the current map plus the user's pending edits.
///
/// Labels are only ever replaced wholesale from a service response. Pending
/// overrides live between round trips and are dropped by every replacement;
/// the hidden set survives replacements and is only cleared by [`LabelStore::reset`].
#[derive(Debug, Clone, Default)]
pub struct LabelStore {
    labels: Vec<LabelRecord>,
    index: FxHashMap<String, usize>,
    overrides: FxHashMap<String, GeoPoint>,
    hidden: FxHashSet<String>,
}

impl LabelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts over for a freshly generated map: new labels, no overrides, nothing hidden.
    pub fn reset(&mut self, labels: Vec<LabelRecord>) {
        self.hidden.clear();
        self.replace_labels(labels);
    }

    /// Replaces the label set from a service response and drops every pending override.
    pub fn replace_labels(&mut self, labels: Vec<LabelRecord>) {
        self.index.clear();
        for (i, label) in labels.iter().enumerate() {
            self.index.entry(label.name.clone()).or_insert(i);
        }
        self.labels = labels;
        self.overrides.clear();
    }

    pub fn labels(&self) -> &[LabelRecord] {
        &self.labels
    }

    pub fn get(&self, name: &str) -> Option<&LabelRecord> {
        self.index.get(name).map(|&i| &self.labels[i])
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Where the label should currently be drawn: the override if one exists,
    /// otherwise the anchor displaced by the default offset.
    pub fn pending_position(&self, name: &str) -> Option<GeoPoint> {
        if let Some(position) = self.overrides.get(name) {
            return Some(*position);
        }
        self.get(name).map(LabelRecord::offset_position)
    }

    pub fn override_for(&self, name: &str) -> Option<GeoPoint> {
        self.overrides.get(name).copied()
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }

    /// Records a user-chosen position. Returns `false` for unknown labels.
    pub fn set_override(&mut self, name: &str, position: GeoPoint) -> bool {
        if self.get(name).is_none() {
            return false;
        }
        self.overrides.insert(name.to_string(), position);
        true
    }

    /// Returns `true` when an override was removed.
    pub fn clear_override(&mut self, name: &str) -> bool {
        self.overrides.remove(name).is_some()
    }

    /// Marks a label hidden. Returns `true` when it was visible before.
    pub fn hide(&mut self, name: &str) -> bool {
        if self.get(name).is_none() {
            return false;
        }
        self.hidden.insert(name.to_string())
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.hidden.contains(name)
    }

    /// Hidden label names in a stable order for the wire.
    pub fn hidden_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.hidden.iter().cloned().collect();
        names.sort();
        names
    }

    /// Offsets of every visible label relative to its anchor, in label order.
    pub fn adjustments(&self) -> Vec<LabelAdjustment> {
        self.labels
            .iter()
            .filter(|label| !self.is_hidden(&label.name))
            .filter_map(|label| {
                let position = self.pending_position(&label.name)?;
                let (dx, dy) = position.delta_from(&label.anchor());
                Some(LabelAdjustment {
                    city: label.name.clone(),
                    dx,
                    dy,
                })
            })
            .collect()
    }
}
