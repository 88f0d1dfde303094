//! Program Types
//!
//! The closed set of loyalty mechanics ("motors") a tenant can run. Each type
//! is identified on the wire and in storage by a short Spanish tag.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// Loyalty program type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramType {
    /// Stamp card: one stamp per visit, reward after N stamps.
    Sellos,

    /// Cashback: a percentage of each purchase credited back.
    Cashback,

    /// Multi-use pass: a prepaid bundle of uses.
    Multipase,

    /// Paid membership with recurring benefits.
    Membresia,

    /// Tiered discount by customer level.
    Descuento,

    /// Single-use coupon.
    Cupon,

    /// Gift card.
    Regalo,

    /// Affiliation / referral program.
    Afiliacion,
}

impl ProgramType {
    /// Every program type in canonical order.
    pub const ALL: [Self; 8] = [
        Self::Sellos,
        Self::Cashback,
        Self::Multipase,
        Self::Membresia,
        Self::Descuento,
        Self::Cupon,
        Self::Regalo,
        Self::Afiliacion,
    ];

    /// Stored tag for this program type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sellos => "sellos",
            Self::Cashback => "cashback",
            Self::Multipase => "multipase",
            Self::Membresia => "membresia",
            Self::Descuento => "descuento",
            Self::Cupon => "cupon",
            Self::Regalo => "regalo",
            Self::Afiliacion => "afiliacion",
        }
    }

    /// Parse a stored tag, ignoring surrounding whitespace.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();

        Self::ALL.into_iter().find(|ty| ty.as_str() == tag)
    }
}

/// Returns `true` when `tag` names one of the known program types.
pub fn is_program_type(tag: &str) -> bool {
    ProgramType::parse(tag).is_some()
}

impl fmt::Display for ProgramType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown program type tag.
#[derive(Debug, Error)]
#[error("unknown program type")]
pub struct UnknownProgramType;

impl FromStr for ProgramType {
    type Err = UnknownProgramType;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or(UnknownProgramType)
    }
}

/// Ordered, de-duplicated set of program types.
///
/// Insertion order is preserved, so the first choice a tenant made stays
/// first after normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgramTypeSet(SmallVec<[ProgramType; 8]>);

impl ProgramTypeSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Set containing every program type.
    #[must_use]
    pub fn all() -> Self {
        Self(SmallVec::from_buf(ProgramType::ALL))
    }

    /// The base capability every tenant has: stamp cards only.
    #[must_use]
    pub fn base() -> Self {
        let mut set = Self::new();

        set.insert(ProgramType::Sellos);

        set
    }

    /// Insert a type; returns `false` when it was already present.
    pub fn insert(&mut self, ty: ProgramType) -> bool {
        if self.contains(ty) {
            return false;
        }

        self.0.push(ty);

        true
    }

    /// Membership test.
    pub fn contains(&self, ty: ProgramType) -> bool {
        self.0.contains(&ty)
    }

    /// Number of types in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no types are selected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keep only the first `len` types.
    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = ProgramType> + '_ {
        self.0.iter().copied()
    }

    /// Borrow as a slice.
    pub fn as_slice(&self) -> &[ProgramType] {
        &self.0
    }

    /// Stored tags, in order.
    pub fn tags(&self) -> Vec<&'static str> {
        self.iter().map(ProgramType::as_str).collect()
    }
}

impl FromIterator<ProgramType> for ProgramTypeSet {
    fn from_iter<I: IntoIterator<Item = ProgramType>>(iter: I) -> Self {
        let mut set = Self::new();

        for ty in iter {
            set.insert(ty);
        }

        set
    }
}

impl<'a> IntoIterator for &'a ProgramTypeSet {
    type Item = ProgramType;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, ProgramType>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}
