use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    kinic_driver_lib::run()
}
