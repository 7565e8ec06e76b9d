//! Ground-set elements and the ground set itself.
//!
//! An [`Element`] is an identity-bearing unit of the universe from which a
//! solution subset is chosen. Identity lives entirely in the `id` field:
//! equality and hashing ignore `value`, which is display/ordering metadata
//! only and plays no part in the algorithmic contract.
//!
//! Algorithms never own elements. They hold an [`ElementSet`] of ids and a
//! shared reference to the [`GroundSet`], which stays immutable for the
//! duration of a run.

use std::collections::HashSet;

/// Unique key identifying an element of the ground set.
pub type ElementId = u64;

/// A solution subset, represented by element ids.
pub type ElementSet = HashSet<ElementId>;

/// An identity-bearing unit of the ground set.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Element {
    /// Unique identity key.
    pub id: ElementId,

    /// Scalar payload used for display and demo ordering only.
    pub value: f64,
}

impl Element {
    /// Creates an element with an explicit value.
    pub fn new(id: ElementId, value: f64) -> Self {
        Self { id, value }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Element {}

impl std::hash::Hash for Element {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}~{}", self.id, self.value)
    }
}

/// The fixed universe of candidate elements.
///
/// Membership is immutable during an optimization run: algorithms add
/// candidate ids to their own solution set, never mutate the ground set.
/// Elements keep their insertion order, which gives random sampling a stable
/// 0..n-1 indexing and BidirectionalGreedy its fixed processing order.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroundSet {
    elements: Vec<Element>,
}

impl GroundSet {
    /// Builds a ground set from explicit elements.
    ///
    /// Ids are expected to be unique; duplicate ids would make identity
    /// ambiguous for every oracle keyed on them.
    pub fn new(elements: Vec<Element>) -> Self {
        debug_assert!(
            {
                let mut seen = HashSet::new();
                elements.iter().all(|el| seen.insert(el.id))
            },
            "ground set ids must be unique"
        );
        Self { elements }
    }

    /// Generates `n` elements with sequential ids `1..=n` and value 0.
    pub fn generate(n: usize) -> Self {
        Self {
            elements: (1..=n as ElementId).map(|id| Element::new(id, 0.0)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Iterates element ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.iter().map(|el| el.id)
    }

    /// The full universe as a solution set.
    pub fn id_set(&self) -> ElementSet {
        self.ids().collect()
    }
}
