//! Terminal stand-in for the embedded graph view.
//!
//! The view keeps its own copy of each highlight set. The host drives it
//! through [`GraphControls`]; the panel reports its own changes back as
//! messages.

use std::cell::RefCell;
use std::rc::Rc;

use braintrace_core::{
    GraphControls, GraphSyncBridge, HighlightKind, HighlightSet, HighlightSets, Msg,
};
use braintrace_logging::bt_info;

/// Shared handle to the panel. One clone is registered with the host bridge,
/// the app keeps another for rendering and graph-side actions.
#[derive(Debug, Clone, Default)]
pub struct GraphView {
    panel: Rc<RefCell<HighlightSets>>,
}

impl GraphView {
    /// Mounts the view and hands its controls to the host.
    pub fn mount(bridge: &mut GraphSyncBridge) -> Self {
        let view = Self::default();
        bridge.register(Box::new(view.clone()));
        bt_info!("Graph view registered with host");
        view
    }

    pub fn snapshot(&self) -> HighlightSets {
        self.panel.borrow().clone()
    }

    /// The graph view's own close button. Returns the message that tells the
    /// host about it.
    pub fn clear_own(&self, kind: HighlightKind) -> Msg {
        self.panel.borrow_mut().hide(kind);
        Msg::GraphHighlightCleared(kind)
    }

    /// Entities that appeared after a graph update. An empty report changes
    /// nothing here or on the host.
    pub fn report_new(&self, names: Vec<String>) -> Option<Msg> {
        if names.is_empty() {
            return None;
        }
        self.panel.borrow_mut().newly_added = HighlightSet {
            visible: true,
            names: names.clone(),
        };
        Some(Msg::NewlyAddedReported(names))
    }
}

impl GraphControls for GraphView {
    fn set_referenced_visible(&mut self, visible: bool) {
        self.panel.borrow_mut().referenced.visible = visible;
    }

    fn set_referenced_names(&mut self, names: Vec<String>) {
        self.panel.borrow_mut().referenced.names = names;
    }

    fn set_focus_visible(&mut self, visible: bool) {
        self.panel.borrow_mut().focus.visible = visible;
    }

    fn set_focus_names(&mut self, names: Vec<String>) {
        self.panel.borrow_mut().focus.names = names;
    }

    fn set_newly_added_visible(&mut self, visible: bool) {
        self.panel.borrow_mut().newly_added.visible = visible;
    }

    fn set_newly_added_names(&mut self, names: Vec<String>) {
        self.panel.borrow_mut().newly_added.names = names;
    }
}
