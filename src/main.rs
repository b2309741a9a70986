use std::process::ExitCode;

fn main() -> ExitCode {
    match fundex_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fundex: {e}");
            ExitCode::FAILURE
        }
    }
}
