use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    log_focus::run()
}
