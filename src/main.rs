use actix_web::{web, App, HttpServer};
use clap::Parser;

mod models;
mod services;
mod state;
mod api;
mod cli;
mod metrics;

use state::new_state;
use api::{
    cpu, disk, filesystems, get_metrics, health, list_processes, memory, monitor,
    ranked_processes, system, uptime,
};
use cli::CommandArgs;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CommandArgs::parse();

    if nix::unistd::geteuid().is_root() && !args.allow_root {
        log::error!("❌ Refusing to run as root, pass --allow-root to override");
        return Ok(());
    }

    let bind_address = args.bind_address();
    let state = new_state(&args);

    // 先取一次 CPU 计数作为基线，首个请求得到的是启动以来的使用率
    match state.collector.try_cpu_usage() {
        Some(_) => log::info!("✓ CPU baseline primed from {}/stat", args.proc_root.display()),
        None => log::warn!(
            "Could not read {}/stat, CPU usage will report 0 until it becomes readable",
            args.proc_root.display()
        ),
    }

    print_banner(&args);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .route("/api/monitor", web::get().to(monitor))
            .route("/api/cpu", web::get().to(cpu))
            .route("/api/memory", web::get().to(memory))
            .route("/api/uptime", web::get().to(uptime))
            .route("/api/disk", web::get().to(disk))
            .route("/api/process", web::get().to(list_processes))
            .route("/api/processes", web::get().to(ranked_processes))
            .route("/api/system", web::get().to(system))
            .route("/api/df", web::get().to(filesystems))
            .route("/metrics", web::get().to(get_metrics))
            .route("/health", web::get().to(health))
    })
        .bind(&bind_address)?
        .run()
        .await
}

fn print_banner(args: &CommandArgs) {
    println!("╔═══════════════════════════════════════════════════════════╗");
    println!("║      Host Monitor v{:<39}║", env!("CARGO_PKG_VERSION"));
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();
    println!("🚀 Server starting on http://{}", args.bind_address());
    println!();
    println!("📋 Available endpoints:");
    println!("  GET    /api/monitor    - Full host snapshot");
    println!("  GET    /api/cpu        - CPU usage");
    println!("  GET    /api/memory     - Memory usage");
    println!("  GET    /api/uptime     - Seconds since boot");
    println!("  GET    /api/disk       - Disk usage of {}", args.disk_path.display());
    println!("  GET    /api/process    - Process table (?filter=regex)");
    println!("  GET    /api/processes  - Processes ranked by CPU (ps)");
    println!("  GET    /api/system     - Hostname, distribution, kernel");
    println!("  GET    /api/df         - Filesystem summary (df)");
    println!("  GET    /metrics        - Prometheus metrics");
    println!("  GET    /health         - Health check");
    println!();
    println!("💡 Sources:");
    println!("  • procfs at {}", args.proc_root.display());
    match args.scan_timeout() {
        Some(t) => println!("  • process scan limited to {} ms", t.as_millis()),
        None => println!("  • process scan unbounded"),
    }
    println!("═══════════════════════════════════════════════════════════");
}
