pub mod battery;
pub mod error;
pub mod registry;
pub mod schema;
pub mod variable;

pub use battery::{BatteryGroup, BatteryItem};
pub use error::{ModelError, Result};
pub use registry::{ScanPlan, SurveyInfo, VariableRegistry};
pub use variable::{CodedVariable, VariableRole};
