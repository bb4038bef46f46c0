//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        eprintln!("outlets: failed to load .env: {err}");
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = outlet_cli::run() {
        eprintln!("outlets: {err}");
        std::process::exit(1);
    }
}
