//! Host half of the graph sync bridge: the three highlight sets and the
//! typed control surface the graph view hands over when it mounts.

use std::fmt;

use braintrace_logging::{bt_debug, bt_warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    Referenced,
    Focus,
    NewlyAdded,
}

impl HighlightKind {
    pub const ALL: [HighlightKind; 3] = [
        HighlightKind::Referenced,
        HighlightKind::Focus,
        HighlightKind::NewlyAdded,
    ];

    pub fn label(self) -> &'static str {
        match self {
            HighlightKind::Referenced => "referenced",
            HighlightKind::Focus => "focus",
            HighlightKind::NewlyAdded => "newly added",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HighlightSet {
    pub visible: bool,
    pub names: Vec<String>,
}

impl HighlightSet {
    /// Whether the popup for this set is shown.
    pub fn is_shown(&self) -> bool {
        self.visible && !self.names.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HighlightSets {
    pub referenced: HighlightSet,
    pub focus: HighlightSet,
    pub newly_added: HighlightSet,
}

impl HighlightSets {
    pub fn get(&self, kind: HighlightKind) -> &HighlightSet {
        match kind {
            HighlightKind::Referenced => &self.referenced,
            HighlightKind::Focus => &self.focus,
            HighlightKind::NewlyAdded => &self.newly_added,
        }
    }

    fn get_mut(&mut self, kind: HighlightKind) -> &mut HighlightSet {
        match kind {
            HighlightKind::Referenced => &mut self.referenced,
            HighlightKind::Focus => &mut self.focus,
            HighlightKind::NewlyAdded => &mut self.newly_added,
        }
    }

    /// Replaces the names of `kind` and makes it visible. An empty list is
    /// ignored and returns false.
    pub fn supply(&mut self, kind: HighlightKind, names: Vec<String>) -> bool {
        if names.is_empty() {
            return false;
        }
        let set = self.get_mut(kind);
        set.names = names;
        set.visible = true;
        true
    }

    /// Hides `kind`; newly-added also drops its names. Idempotent; returns
    /// whether anything changed.
    pub fn hide(&mut self, kind: HighlightKind) -> bool {
        let set = self.get_mut(kind);
        let before = set.clone();
        set.visible = false;
        if kind == HighlightKind::NewlyAdded {
            set.names.clear();
        }
        *set != before
    }

    /// Graph rebuilt: previously highlighted names may be gone.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Host-to-graph instruction carried by `Effect::Graph`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphCommand {
    Show {
        kind: HighlightKind,
        names: Vec<String>,
    },
    Hide(HighlightKind),
    ResetAll,
}

/// Control functions the graph view exposes to its host at mount time.
pub trait GraphControls {
    fn set_referenced_visible(&mut self, visible: bool);
    fn set_referenced_names(&mut self, names: Vec<String>);
    fn set_focus_visible(&mut self, visible: bool);
    fn set_focus_names(&mut self, names: Vec<String>);
    fn set_newly_added_visible(&mut self, visible: bool);
    fn set_newly_added_names(&mut self, names: Vec<String>);
}

/// Holds the registered controls. Every call is a no-op until the graph
/// view has registered.
#[derive(Default)]
pub struct GraphSyncBridge {
    controls: Option<Box<dyn GraphControls>>,
}

impl fmt::Debug for GraphSyncBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphSyncBridge")
            .field("registered", &self.is_registered())
            .finish()
    }
}

impl GraphSyncBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-time handshake from the graph view.
    pub fn register(&mut self, controls: Box<dyn GraphControls>) {
        if self.controls.is_some() {
            bt_warn!("graph view registered twice; replacing previous controls");
        }
        self.controls = Some(controls);
    }

    pub fn is_registered(&self) -> bool {
        self.controls.is_some()
    }

    pub fn apply(&mut self, command: &GraphCommand) {
        let Some(controls) = self.controls.as_mut() else {
            bt_debug!("graph view not registered; dropping {:?}", command);
            return;
        };
        match command {
            GraphCommand::Show { kind, names } => {
                set_names(controls.as_mut(), *kind, names.clone());
                set_visible(controls.as_mut(), *kind, true);
            }
            GraphCommand::Hide(kind) => {
                set_visible(controls.as_mut(), *kind, false);
                if *kind == HighlightKind::NewlyAdded {
                    controls.set_newly_added_names(Vec::new());
                }
            }
            GraphCommand::ResetAll => {
                for kind in HighlightKind::ALL {
                    set_visible(controls.as_mut(), kind, false);
                    set_names(controls.as_mut(), kind, Vec::new());
                }
            }
        }
    }
}

fn set_visible(controls: &mut dyn GraphControls, kind: HighlightKind, visible: bool) {
    match kind {
        HighlightKind::Referenced => controls.set_referenced_visible(visible),
        HighlightKind::Focus => controls.set_focus_visible(visible),
        HighlightKind::NewlyAdded => controls.set_newly_added_visible(visible),
    }
}

fn set_names(controls: &mut dyn GraphControls, kind: HighlightKind, names: Vec<String>) {
    match kind {
        HighlightKind::Referenced => controls.set_referenced_names(names),
        HighlightKind::Focus => controls.set_focus_names(names),
        HighlightKind::NewlyAdded => controls.set_newly_added_names(names),
    }
}
