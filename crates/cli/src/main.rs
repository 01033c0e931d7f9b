use std::process::ExitCode;

fn main() -> ExitCode {
    agentdir_cli::run()
}
