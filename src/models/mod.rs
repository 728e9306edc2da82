pub mod process;
pub mod snapshot;
pub mod system;

pub use process::ProcessSample;
pub use snapshot::{DiskUsage, HostSnapshot, MemoryUsage};
pub use system::{FilesystemEntry, SystemInfo};
