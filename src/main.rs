use std::process;

use salsify::shell::Shell;

fn main() {
    env_logger::init();
    process::exit(Shell::new().run_interactive());
}
