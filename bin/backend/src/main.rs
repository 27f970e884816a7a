//! Registration Backend Binary
//!
//! Reads JWT_SECRET, DB_URL, and BIND_ADDR from the environment
//! and serves account registration.

#[tokio::main]
async fn main() {
    enroll_core::log();
    enroll_core::kys();
    if let Err(e) = enroll_server::run().await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
