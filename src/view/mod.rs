pub mod route_guard;
pub mod task_board;
pub mod theme;

pub use route_guard::{RouteDecision, RouteGuard};
pub use task_board::{FormState, TaskBoard, TaskForm};
pub use theme::{Appearance, Theme, ThemePreference};
