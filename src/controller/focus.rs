//! Focus protection for editable fields.

use super::view::{EditableFields, FieldId};

/// Read-only predicate over the current field focus.
///
/// A background refresh may overwrite a field's displayed value only when
/// the operator is not typing into it. The guard borrows the field state and
/// never mutates it.
#[derive(Debug, Clone, Copy)]
pub struct FocusGuard<'a> {
    fields: &'a EditableFields,
}

impl<'a> FocusGuard<'a> {
    pub fn new(fields: &'a EditableFields) -> Self {
        Self { fields }
    }

    /// True iff `field` is not the target of active input.
    pub fn may_sync(&self, field: FieldId) -> bool {
        !self.fields.get(field).focused
    }
}
