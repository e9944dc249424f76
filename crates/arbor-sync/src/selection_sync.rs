//! Selection translation for the wire boundary.

use arbor_model::TreeView;

use crate::ids::RenderIdSource;
use crate::render_state::RenderState;

/// Translate the current selection to a comma-joined list of element ids.
///
/// Only visible selections are emitted. A selected path that is not visible
/// has no client element yet; it is recorded in the render state's
/// unsent-selection set and resolves lazily once the path becomes visible
/// and sent.
pub fn selection_string(
    view: &TreeView,
    state: &RenderState,
    ids: &mut dyn RenderIdSource,
) -> String {
    let mut out = String::new();
    for path in view.selection().selection_paths() {
        if view.is_path_visible(&path) {
            let id = ids.render_id(Some(&path), 0);
            state.remove_unsent_selection(&path);
            if !out.is_empty() {
                out.push(',');
            }
            out.push_str(id.as_str());
        } else {
            state.add_unsent_selection(path);
        }
    }
    out
}
