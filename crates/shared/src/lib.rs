pub mod access;
pub mod export;
pub mod messages;
pub mod model;
pub mod report;
pub mod validate;

pub use access::{can_access, navigation, resolve, NavItem, View};
pub use export::{ExportError, ExportFormat};
pub use messages::*;
pub use model::*;
pub use report::{DashboardSummary, ReportData, UserStats};
pub use validate::ValidationError;
