pub mod io;
pub mod model;
pub mod validation;

pub use io::read_config;
pub use model::{DataGroupConfig, ReportConfig, Statistic, XAxis};
pub use validation::validate_config;
