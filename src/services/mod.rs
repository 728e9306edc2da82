pub mod cpu_estimator;
pub mod host_probes;
pub mod identity;
pub mod process_reader;
pub mod process_table;
pub mod procfs;
pub mod snapshot_collector;
pub mod system_info;

pub use identity::IdentityResolver;
pub use process_table::{CommandFilter, ProcessSource, RankedProcessTable};
pub use procfs::ProcRoot;
pub use snapshot_collector::{CollectorConfig, SnapshotCollector};
