use super::NodeId;

/// What kind of change a [`MutationRecord`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Children were added to and/or removed from `target`.
    ChildList,
    /// The character data of the text node `target` changed.
    CharacterData,
}

/// Who made a change.
///
/// The scan trigger reacts only to `External` records so that the
/// annotator's own rewrites never feed back into another scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    External,
    Annotator,
}

/// One entry in the document's mutation journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub target: NodeId,
    pub added: Vec<NodeId>,
    pub removed: Vec<NodeId>,
    pub origin: Origin,
}

impl MutationRecord {
    pub(crate) fn child_list(
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
        origin: Origin,
    ) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target,
            added,
            removed,
            origin,
        }
    }

    pub(crate) fn character_data(target: NodeId) -> Self {
        Self {
            kind: MutationKind::CharacterData,
            target,
            added: Vec::new(),
            removed: Vec::new(),
            origin: Origin::External,
        }
    }
}
