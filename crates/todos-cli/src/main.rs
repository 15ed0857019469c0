mod cli;

use todos_core::error::TodoError;

fn main() {
    if let Err(e) = cli::run() {
        if e.downcast_ref::<TodoError>().is_some_and(TodoError::is_cancelled) {
            std::process::exit(130);
        }
        eprintln!("{e:#}"); // pretty anyhow chain
        std::process::exit(1);
    }
}
