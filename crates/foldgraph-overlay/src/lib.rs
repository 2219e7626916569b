pub mod debounce;
pub mod geometry;
pub mod hit_tester;
pub mod overlay;
pub mod plugin;
pub mod surface;

pub use debounce::{Debouncer, RESIZE_DEBOUNCE};
pub use geometry::{BAR_WIDTH, HIT_MARGIN, HandleGeometry};
pub use hit_tester::{HandleBounds, HandleHitTester};
pub use overlay::Overlay;
pub use plugin::ExpandCollapsePlugin;
#[cfg(feature = "egui")]
pub use surface::EguiSurface;
pub use surface::{DrawCommand, DrawList, Surface};
