use pulsewrap::core;
use pulsewrap::status::ExitStatus;

/// Entry point; returns ExitStatus directly, which implements Termination
fn main() -> ExitStatus {
    let args: Vec<String> = std::env::args().collect();
    core::run(args)
}
