pub mod loader;
pub mod model;
pub mod parser;

pub use loader::{load_group, load_groups, resolve_group_files};
pub use model::{
    BenchmarkArgs, BenchmarkRun, DataGroup, DistributionSummary, RequestRecord, RequestSets,
    StatusDistribution, Strategy,
};
pub use parser::{benchmark_values, parse_benchmark_document};
