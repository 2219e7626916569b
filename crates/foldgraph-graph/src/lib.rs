pub mod engine;
pub mod graph;
pub mod history;
pub mod host;
pub mod operation;
pub mod options;
pub mod registry;
pub mod viewport;

pub use engine::FoldEngine;
pub use graph::{CompoundGraph, GraphDocument, GraphSnapshot};
pub use history::{
    Command, CommandHistory, DEFAULT_HISTORY_SIZE, TransitionCommand, TransitionKind,
};
pub use host::{GraphHost, LayoutSpec, Layouter};
pub use operation::{ExpandCollapse, Operation, OperationOutput};
pub use options::{BoxPosition, ExpandCollapseOptions, OptionKey, PlacementFn};
pub use registry::{CollapsedEntry, FoldRegistry, SynthesizedEdge};
pub use viewport::Viewport;
