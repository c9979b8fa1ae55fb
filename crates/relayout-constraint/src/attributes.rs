//! Resolved attribute storage and axis derivation.
//!
//! The four attributes of an axis are geometrically redundant: any two of them
//! determine the other two. Whenever an attribute becomes resolved,
//! [`AttributeSet::set`] fills in whatever its axis now implies.

use relayout_core::{Attribute, Axis, AxisRole};
use tracing::trace;

/// For each newly resolved role, the order in which the other three roles of
/// the axis are tried as the second known value.
const PARTNER_PRIORITY: [[AxisRole; 3]; 4] = [
    // Low
    [AxisRole::Center, AxisRole::Extent, AxisRole::High],
    // High
    [AxisRole::Low, AxisRole::Extent, AxisRole::Center],
    // Extent
    [AxisRole::Low, AxisRole::High, AxisRole::Center],
    // Center
    [AxisRole::Low, AxisRole::High, AxisRole::Extent],
];

/// The eight optionally resolved attributes of a box.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AttributeSet {
    values: [Option<f64>; 8],
}

impl AttributeSet {
    /// Create an empty set with nothing resolved.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a resolved value.
    pub fn get(&self, attribute: Attribute) -> Option<f64> {
        self.values[attribute.index()]
    }

    /// Check whether an attribute has a value.
    pub fn is_resolved(&self, attribute: Attribute) -> bool {
        self.values[attribute.index()].is_some()
    }

    /// Resolve an attribute and derive what its axis now implies.
    ///
    /// Returns `false` without writing anything if the attribute already had
    /// a value. Derivation only fills unresolved attributes and never
    /// checks them against values that are already present.
    pub fn set(&mut self, attribute: Attribute, value: f64) -> bool {
        if self.is_resolved(attribute) {
            return false;
        }
        self.values[attribute.index()] = Some(value);
        self.derive(attribute, value);
        true
    }

    /// Number of resolved attributes.
    pub fn resolved_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Attributes from `wanted` that have no value, in the given order.
    pub fn missing(&self, wanted: &[Attribute]) -> Vec<Attribute> {
        wanted
            .iter()
            .copied()
            .filter(|a| !self.is_resolved(*a))
            .collect()
    }

    /// Iterate over resolved attributes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, f64)> + '_ {
        Attribute::ALL
            .iter()
            .filter_map(move |&a| self.get(a).map(|v| (a, v)))
    }

    /// Forget every resolved value.
    pub fn clear(&mut self) {
        self.values = [None; 8];
    }

    fn derive(&mut self, changed: Attribute, value: f64) {
        let axis = changed.axis();
        let role = changed.role();

        let partner = PARTNER_PRIORITY[role.index()]
            .iter()
            .find_map(|&r| self.get(axis.attribute(r)).map(|v| (r, v)));
        let Some(partner) = partner else {
            return;
        };
        let Some((low, extent)) = span_from_pair((role, value), partner) else {
            return;
        };

        for r in AxisRole::ALL {
            let attribute = axis.attribute(r);
            if self.is_resolved(attribute) {
                continue;
            }
            let derived = match r {
                AxisRole::Low => low,
                AxisRole::High => low + extent,
                AxisRole::Extent => extent,
                AxisRole::Center => low + extent / 2.0,
            };
            trace!(?attribute, derived, from = ?changed, "derived attribute");
            self.values[attribute.index()] = Some(derived);
        }
    }

    /// Check that every resolved pair of an axis satisfies the axis identities.
    pub fn is_consistent(&self, axis: Axis, tolerance: f64) -> bool {
        let [low, high, extent, center] = axis.attributes().map(|a| self.get(a));
        let close = |a: f64, b: f64| (a - b).abs() <= tolerance;
        let mut ok = true;
        if let (Some(l), Some(h), Some(e)) = (low, high, extent) {
            ok &= close(e, h - l);
        }
        if let (Some(l), Some(e), Some(c)) = (low, extent, center) {
            ok &= close(c, l + e / 2.0);
        }
        if let (Some(h), Some(e), Some(c)) = (high, extent, center) {
            ok &= close(c, h - e / 2.0);
        }
        ok
    }
}

/// Compute (low edge, extent) from two known roles of an axis.
fn span_from_pair(a: (AxisRole, f64), b: (AxisRole, f64)) -> Option<(f64, f64)> {
    let (a, b) = if a.0.index() <= b.0.index() { (a, b) } else { (b, a) };
    match (a, b) {
        ((AxisRole::Low, l), (AxisRole::High, h)) => Some((l, h - l)),
        ((AxisRole::Low, l), (AxisRole::Extent, e)) => Some((l, e)),
        ((AxisRole::Low, l), (AxisRole::Center, c)) => Some((l, (c - l) * 2.0)),
        ((AxisRole::High, h), (AxisRole::Extent, e)) => Some((h - e, e)),
        ((AxisRole::High, h), (AxisRole::Center, c)) => {
            let e = (h - c) * 2.0;
            Some((h - e, e))
        }
        ((AxisRole::Extent, e), (AxisRole::Center, c)) => Some((c - e / 2.0, e)),
        _ => None,
    }
}
