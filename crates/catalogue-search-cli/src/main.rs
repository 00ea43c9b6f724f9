#![forbid(unsafe_code)]

fn main() {
    std::process::exit(catalogue_search_cli::run());
}
