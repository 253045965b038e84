//! Cell-level comparison logic

use std::borrow::Cow;

use crate::model::CellValue;

/// Separator placed between the old and new value of a changed cell
pub const CHANGE_ARROW: &str = " ---> ";

/// Strip surrounding whitespace from text cells; other values pass through.
pub fn normalize(value: &CellValue) -> Cow<'_, CellValue> {
    match value {
        CellValue::String(s) => {
            let trimmed = s.trim();
            if trimmed.len() == s.len() {
                Cow::Borrowed(value)
            } else {
                Cow::Owned(CellValue::from(trimmed))
            }
        }
        _ => Cow::Borrowed(value),
    }
}

/// Compare two cells after normalization.
///
/// Missing values are equal to each other whatever their encoding.
pub fn cells_equal(old: &CellValue, new: &CellValue) -> bool {
    if old.is_missing() && new.is_missing() {
        return true;
    }
    normalize(old) == normalize(new)
}

/// Output cell for one column of a changed row: the shared value when the
/// cells compare equal, else `"{old} ---> {new}"` from the raw values.
pub fn render_cell(old: &CellValue, new: &CellValue) -> CellValue {
    if cells_equal(old, new) {
        old.clone()
    } else {
        CellValue::from(format!("{}{}{}", old.display(), CHANGE_ARROW, new.display()))
    }
}
