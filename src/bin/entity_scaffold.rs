use std::process::ExitCode;

fn main() -> ExitCode {
    entity_scaffold::cli::run_cli()
}
