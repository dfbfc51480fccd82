//! Pure nutrition arithmetic shared by the meal, plan and progress routes.

pub mod planner;
pub mod progress;
pub mod targets;
pub mod totals;
pub mod trend;
pub mod value;
