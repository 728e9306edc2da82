use crate::cli::CommandArgs;
use crate::services::{
    CollectorConfig, IdentityResolver, ProcRoot, RankedProcessTable, SnapshotCollector,
};
use std::path::PathBuf;
use std::sync::Arc;

pub struct AppStateInner {
    pub collector: SnapshotCollector,
    pub ranked: RankedProcessTable,
    pub os_release: PathBuf,
}

pub type AppState = Arc<AppStateInner>;

pub fn new_state(args: &CommandArgs) -> AppState {
    let config = CollectorConfig {
        proc_root: ProcRoot::new(&args.proc_root),
        disk_path: args.disk_path.clone(),
        scan_timeout: args.scan_timeout(),
    };
    let identities = Arc::new(IdentityResolver::system());

    Arc::new(AppStateInner {
        collector: SnapshotCollector::new(config, identities),
        ranked: RankedProcessTable::new(&args.ps_program),
        os_release: args.os_release.clone(),
    })
}
