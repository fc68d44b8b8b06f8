//! claude-grid-core: pure grid geometry and the on-disk session record.
//! No automation IO lives here; everything is deterministic and testable.

pub mod error;
pub mod grid;
pub mod session;

pub use error::{GridError, SessionError};
pub use grid::{
    GridLayout, ScreenRect, WindowBounds, calculate_grid, calculate_window_bounds,
    min_cell_size, parse_layout,
};
pub use session::{SessionRecord, SessionStore, WindowRef, WorktreeRef, default_base_dir};
