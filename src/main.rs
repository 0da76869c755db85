mod app;
mod catalog;
mod config;
mod filter;
mod library;
mod playlist;
mod runtime;
mod session;
mod storage;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
