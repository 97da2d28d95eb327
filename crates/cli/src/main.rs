use std::process::ExitCode;

fn main() -> ExitCode {
    bookstore_cli::run()
}
