//! Variant-scoped sets of resolved artifacts
//!
//! A `ResolvedArtifactSet` pairs one variant's attributes with the artifacts
//! resolved for it. The representation is chosen once, by cardinality, when
//! the set is built and never changes afterwards.

use crate::domain::{AttributeContainer, BuildDependencies, ResolvedArtifact};
use indexmap::IndexSet;
use std::slice;

/// Shared empty set
pub static EMPTY: ResolvedArtifactSet = ResolvedArtifactSet::Empty;

/// Receives every member of a set during traversal
pub trait ArtifactVisitor {
    fn visit_artifact(&mut self, variant: &AttributeContainer, artifact: &ResolvedArtifact);
}

impl<F> ArtifactVisitor for F
where
    F: FnMut(&AttributeContainer, &ResolvedArtifact),
{
    fn visit_artifact(&mut self, variant: &AttributeContainer, artifact: &ResolvedArtifact) {
        self(variant, artifact)
    }
}

/// Immutable collection of the artifacts resolved for one variant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResolvedArtifactSet {
    /// No artifacts; carries no variant
    #[default]
    Empty,
    /// Exactly one artifact
    Singleton {
        variant: AttributeContainer,
        artifact: ResolvedArtifact,
    },
    /// Two or more distinct artifacts
    Multiple {
        variant: AttributeContainer,
        artifacts: IndexSet<ResolvedArtifact>,
    },
}

impl ResolvedArtifactSet {
    /// Build the cheapest representation for the given artifacts
    ///
    /// Duplicates collapse before the representation is picked, so two copies
    /// of one artifact produce a singleton.
    pub fn for_variant(
        variant: AttributeContainer,
        artifacts: impl IntoIterator<Item = ResolvedArtifact>,
    ) -> Self {
        let mut artifacts: IndexSet<ResolvedArtifact> = artifacts.into_iter().collect();
        match artifacts.len() {
            0 => ResolvedArtifactSet::Empty,
            1 => match artifacts.pop() {
                Some(artifact) => ResolvedArtifactSet::Singleton { variant, artifact },
                None => ResolvedArtifactSet::Empty,
            },
            _ => ResolvedArtifactSet::Multiple { variant, artifacts },
        }
    }

    /// Variant of this set, `None` for the empty set
    pub fn variant(&self) -> Option<&AttributeContainer> {
        match self {
            ResolvedArtifactSet::Empty => None,
            ResolvedArtifactSet::Singleton { variant, .. }
            | ResolvedArtifactSet::Multiple { variant, .. } => Some(variant),
        }
    }

    /// Materialize the member artifacts
    pub fn artifacts(&self) -> IndexSet<ResolvedArtifact> {
        self.iter().cloned().collect()
    }

    /// Borrowing iterator over the members
    pub fn iter(&self) -> Iter<'_> {
        match self {
            ResolvedArtifactSet::Empty => Iter::Slice(Default::default()),
            ResolvedArtifactSet::Singleton { artifact, .. } => {
                Iter::Slice(slice::from_ref(artifact).iter())
            }
            ResolvedArtifactSet::Multiple { artifacts, .. } => Iter::Set(artifacts.iter()),
        }
    }

    /// Call the visitor once per member with this set's variant
    pub fn visit<V: ArtifactVisitor + ?Sized>(&self, visitor: &mut V) {
        match self {
            ResolvedArtifactSet::Empty => {}
            ResolvedArtifactSet::Singleton { variant, artifact } => {
                visitor.visit_artifact(variant, artifact)
            }
            ResolvedArtifactSet::Multiple { variant, artifacts } => {
                for artifact in artifacts {
                    visitor.visit_artifact(variant, artifact);
                }
            }
        }
    }

    /// Append one build dependency handle per member
    pub fn collect_build_dependencies(&self, destination: &mut Vec<BuildDependencies>) {
        destination.extend(self.iter().map(ResolvedArtifact::build_dependencies));
    }

    pub fn len(&self) -> usize {
        match self {
            ResolvedArtifactSet::Empty => 0,
            ResolvedArtifactSet::Singleton { .. } => 1,
            ResolvedArtifactSet::Multiple { artifacts, .. } => artifacts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ResolvedArtifactSet::Empty)
    }
}

impl<'a> IntoIterator for &'a ResolvedArtifactSet {
    type Item = &'a ResolvedArtifact;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`ResolvedArtifactSet::iter`]
#[derive(Debug, Clone)]
pub enum Iter<'a> {
    Slice(slice::Iter<'a, ResolvedArtifact>),
    Set(indexmap::set::Iter<'a, ResolvedArtifact>),
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a ResolvedArtifact;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Iter::Slice(it) => it.next(),
            Iter::Set(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Iter::Slice(it) => it.size_hint(),
            Iter::Set(it) => it.size_hint(),
        }
    }
}
