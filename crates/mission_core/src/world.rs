use crate::{Area, DroidFilter, LabelId, LabelTarget, ObjectRef, PlayerId, StructureType};

/// Read-only queries the engine makes against the host simulation.
///
/// Commands flow the other way, as returned `Effect`s.
pub trait WorldView {
    fn resolve_label(&self, label: &LabelId) -> Option<LabelTarget>;

    fn count_droids(&self, player: PlayerId, filter: DroidFilter) -> u32;

    fn count_structures(&self, player: PlayerId, structure: &StructureType) -> u32;

    fn objects_in_area(&self, area: &Area) -> Vec<ObjectRef>;
}

impl LabelTarget {
    pub fn kind_name(&self) -> &'static str {
        match self {
            LabelTarget::Position { .. } => "position",
            LabelTarget::Area { .. } => "area",
            LabelTarget::Group { .. } => "group",
            LabelTarget::Object { .. } => "object",
        }
    }
}
