use std::process;

fn main() {
    if let Err(e) = datadeck_erd::cli::run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
