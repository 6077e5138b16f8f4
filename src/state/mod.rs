pub mod gesture;
pub mod input;
pub mod session;
pub mod viewport;

pub use gesture::{GestureController, GestureState};
pub use input::{CanvasRect, PointerFrame, PointerPhase};
pub use session::{LoadOutcome, Session};
pub use viewport::ViewportState;
