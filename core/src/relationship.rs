//! Links between specifications.
//!
//! A relationship is stored once on each endpoint, so queries from either
//! side see it. Both copies are kept in normalized form, i.e. with a
//! forward kind ([`Supersedes`](RelationshipKind::Supersedes) or
//! [`RefersTo`](RelationshipKind::RefersTo)); the inverse kinds only appear
//! in the perspective views returned by
//! [`AnySpec::relationships`](crate::AnySpec::relationships).

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use thiserror::Error;

use crate::spec::{AnySpec, SpecId};

/// The kind of link between two specifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    /// The subject replaces the object, which is usually deprecated.
    Supersedes,
    IsSupersededBy,
    /// The subject mentions the object for information only.
    RefersTo,
    IsReferredToBy,
}

impl RelationshipKind {
    pub fn inverse(self) -> Self {
        match self {
            Self::Supersedes => Self::IsSupersededBy,
            Self::IsSupersededBy => Self::Supersedes,
            Self::RefersTo => Self::IsReferredToBy,
            Self::IsReferredToBy => Self::RefersTo,
        }
    }

    /// Whether this is one of the two forward kinds.
    pub fn is_forward(self) -> bool {
        matches!(self, Self::Supersedes | Self::RefersTo)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Supersedes => "supersedes",
            Self::IsSupersededBy => "is superseded by",
            Self::RefersTo => "refers to",
            Self::IsReferredToBy => "is referred to by",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies a specification from inside another one.
///
/// Relationships refer to specs by id rather than by owning pointer, so two
/// specs linked to each other never keep each other alive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SpecRef {
    pub id: SpecId,
    pub name: String,
}

impl fmt::Display for SpecRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A directed edge between two specifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Relationship {
    pub subject: SpecRef,
    pub object: SpecRef,
    pub kind: RelationshipKind,
}

impl Relationship {
    pub fn new(subject: SpecRef, object: SpecRef, kind: RelationshipKind) -> Self {
        Self {
            subject,
            object,
            kind,
        }
    }

    /// The same edge seen from the object: `B is superseded by A` for
    /// `A supersedes B`.
    pub fn inverse(&self) -> Self {
        Self::new(self.object.clone(), self.subject.clone(), self.kind.inverse())
    }

    /// The edge rewritten with a forward kind.
    pub fn normalized(&self) -> Self {
        if self.kind.is_forward() {
            self.clone()
        } else {
            self.inverse()
        }
    }

    /// Whether holding both `self` and `other` would be a contradiction.
    ///
    /// Only supersession can conflict: `A supersedes B` contradicts
    /// `B supersedes A`, in whichever direction either is written.
    pub fn conflicts_with(&self, other: &Relationship) -> bool {
        let (a, b) = (self.normalized(), other.normalized());
        a.kind == RelationshipKind::Supersedes
            && b.kind == RelationshipKind::Supersedes
            && a.subject.id == b.object.id
            && a.object.id == b.subject.id
    }

    /// Whether `self` and `other` describe the same edge.
    pub fn same_edge(&self, other: &Relationship) -> bool {
        let (a, b) = (self.normalized(), other.normalized());
        a.kind == b.kind && a.subject.id == b.subject.id && a.object.id == b.object.id
    }

    /// The edge as seen from the spec identified by `id`, which must be one
    /// of its endpoints.
    pub fn from_perspective(&self, id: SpecId) -> Self {
        if self.subject.id == id {
            self.clone()
        } else {
            self.inverse()
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.kind, self.object)
    }
}

/// A relationship could not be added.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelationshipError {
    #[error("{name} cannot have a relationship with itself")]
    SelfReference { name: String },

    #[error("relationship already exists: {0}")]
    Duplicate(Relationship),

    #[error("relationship {new} conflicts with existing relationship {existing}")]
    Conflict {
        new: Relationship,
        existing: Relationship,
    },
}

/// The relationships attached to one specification.
///
/// The only state of a spec that changes after it is built.
#[derive(Debug, Default)]
pub struct RelationshipStore {
    inner: Mutex<Vec<Relationship>>,
}

impl RelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Relationship>> {
        // The list is only ever appended to, so a poisoned lock still guards
        // a consistent vector.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copies the stored relationships, in insertion order.
    pub fn snapshot(&self) -> Vec<Relationship> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

/// Links `subject` to `object`.
///
/// The relationship is checked against everything already attached to
/// either spec. On success it is appended to both; on failure neither is
/// modified.
///
/// # Examples
///
/// ```
/// use envspec_core::{AnySpec, RelationshipKind, SpecBuilder, StringSchema, add_relationship};
///
/// let old = SpecBuilder::<String>::new("DB_URL", "database url")
///     .example("postgres://localhost".to_string(), "")
///     .deprecated()
///     .done(StringSchema::new());
/// let new = SpecBuilder::<String>::new("DATABASE_URL", "database url")
///     .example("postgres://localhost".to_string(), "")
///     .done(StringSchema::new());
///
/// add_relationship(&new, &old, RelationshipKind::Supersedes).unwrap();
/// assert_eq!(old.superseded_by()[0].name, "DATABASE_URL");
///
/// // The mirror image is a contradiction.
/// assert!(add_relationship(&old, &new, RelationshipKind::Supersedes).is_err());
/// ```
pub fn add_relationship(
    subject: &dyn AnySpec,
    object: &dyn AnySpec,
    kind: RelationshipKind,
) -> Result<Relationship, RelationshipError> {
    if subject.id() == object.id() {
        return Err(RelationshipError::SelfReference {
            name: subject.name().to_string(),
        });
    }

    let relationship = Relationship::new(subject.spec_ref(), object.spec_ref(), kind).normalized();
    let inverse = relationship.inverse();

    // Lock in id order so concurrent calls on the same pair cannot deadlock.
    let (first, second) = if subject.id() < object.id() {
        (subject.relationship_store(), object.relationship_store())
    } else {
        (object.relationship_store(), subject.relationship_store())
    };
    let mut first = first.lock();
    let mut second = second.lock();

    for existing in first.iter().chain(second.iter()) {
        if existing.same_edge(&relationship) {
            return Err(RelationshipError::Duplicate(existing.clone()));
        }
        let conflict = [&relationship, &inverse]
            .iter()
            .any(|new| new.conflicts_with(existing) || existing.conflicts_with(new));
        if conflict {
            return Err(RelationshipError::Conflict {
                new: relationship,
                existing: existing.clone(),
            });
        }
    }

    first.push(relationship.clone());
    second.push(relationship.clone());
    tracing::debug!(relationship = %relationship, "added relationship");
    Ok(relationship)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StringSchema;
    use crate::spec::{Spec, SpecBuilder};

    fn spec(name: &str) -> Spec<String> {
        SpecBuilder::new(name, "test variable")
            .example("value".to_string(), "")
            .done(StringSchema::new())
    }

    #[test]
    fn test_kind_inverse_and_text() {
        for kind in [
            RelationshipKind::Supersedes,
            RelationshipKind::IsSupersededBy,
            RelationshipKind::RefersTo,
            RelationshipKind::IsReferredToBy,
        ] {
            assert_eq!(kind.inverse().inverse(), kind);
            assert_ne!(kind.is_forward(), kind.inverse().is_forward());
        }
        assert_eq!(RelationshipKind::IsReferredToBy.to_string(), "is referred to by");
    }

    #[test]
    fn test_stored_symmetrically() {
        let (a, b) = (spec("A"), spec("B"));
        let rel = add_relationship(&a, &b, RelationshipKind::RefersTo).unwrap();
        assert_eq!(rel.to_string(), "A refers to B");
        assert_eq!(a.relationship_store().snapshot(), vec![rel.clone()]);
        assert_eq!(b.relationship_store().snapshot(), vec![rel]);
        assert_eq!(a.refers_to()[0].name, "B");
        assert_eq!(b.referred_to_by()[0].name, "A");
        assert!(a.referred_to_by().is_empty());
    }

    #[test]
    fn test_inverse_kind_is_normalized() {
        let (a, b) = (spec("A"), spec("B"));
        let rel = add_relationship(&a, &b, RelationshipKind::IsSupersededBy).unwrap();
        assert_eq!(rel.subject.name, "B");
        assert_eq!(rel.kind, RelationshipKind::Supersedes);
        assert_eq!(b.supersedes()[0].name, "A");
    }

    #[test]
    fn test_mirror_supersession_conflicts_without_mutation() {
        let (a, b) = (spec("A"), spec("B"));
        add_relationship(&a, &b, RelationshipKind::Supersedes).unwrap();

        let err = add_relationship(&b, &a, RelationshipKind::Supersedes).unwrap_err();
        assert!(matches!(err, RelationshipError::Conflict { .. }));
        assert_eq!(
            err.to_string(),
            "relationship B supersedes A conflicts with existing relationship A supersedes B"
        );
        assert_eq!(a.relationships().len(), 1);
        assert_eq!(b.relationships().len(), 1);

        // Same contradiction written with the inverse kind.
        let err = add_relationship(&a, &b, RelationshipKind::IsSupersededBy).unwrap_err();
        assert!(matches!(err, RelationshipError::Conflict { .. }));
    }

    #[test]
    fn test_refers_to_never_conflicts() {
        let (a, b) = (spec("A"), spec("B"));
        add_relationship(&a, &b, RelationshipKind::Supersedes).unwrap();
        add_relationship(&a, &b, RelationshipKind::RefersTo).unwrap();
        add_relationship(&b, &a, RelationshipKind::RefersTo).unwrap();
        assert_eq!(a.relationships().len(), 3);
        assert_eq!(b.relationships().len(), 3);
    }

    #[test]
    fn test_duplicates_and_self_references_rejected() {
        let (a, b) = (spec("A"), spec("B"));
        add_relationship(&a, &b, RelationshipKind::Supersedes).unwrap();
        assert!(matches!(
            add_relationship(&b, &a, RelationshipKind::IsSupersededBy),
            Err(RelationshipError::Duplicate(_))
        ));
        assert_eq!(
            add_relationship(&a, &a, RelationshipKind::RefersTo).unwrap_err(),
            RelationshipError::SelfReference { name: "A".into() }
        );
        assert_eq!(a.relationships().len(), 1);
    }

    #[test]
    fn test_perspective() {
        let (a, b) = (spec("A"), spec("B"));
        let rel = add_relationship(&a, &b, RelationshipKind::Supersedes).unwrap();
        let seen_by_b = rel.from_perspective(b.id());
        assert_eq!(seen_by_b.subject.name, "B");
        assert_eq!(seen_by_b.kind, RelationshipKind::IsSupersededBy);
        assert_eq!(rel.from_perspective(a.id()), rel);
    }
}
