use std::process;

fn main() {
    process::exit(paka::run_cli());
}
