use crate::artifacts::objects::object_id::ObjectId;

/// What a merge does with one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Leave the current version (or its absence) untouched
    Keep,
    /// Write the other side's blob and stage it
    TakeOther(ObjectId),
    /// Delete the file and stage its removal
    Remove,
    /// Both sides changed the path in different ways
    Conflict,
}

impl Resolution {
    /// Whether applying this resolution writes a file into the working tree
    pub fn writes_working_file(&self) -> bool {
        matches!(self, Resolution::TakeOther(_) | Resolution::Conflict)
    }
}

/// Decide the fate of a path from its split point, current and other blob ids
///
/// An absent side is a value of its own: deleting a file on one side while editing it on the
/// other is a conflict, and so is adding it with different content on both sides.
pub fn classify(
    split: Option<&ObjectId>,
    current: Option<&ObjectId>,
    other: Option<&ObjectId>,
) -> Resolution {
    if current == other || split == other {
        return Resolution::Keep;
    }

    if split == current {
        return match other {
            Some(oid) => Resolution::TakeOther(oid.clone()),
            None => Resolution::Remove,
        };
    }

    Resolution::Conflict
}
