fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match onec_search_core::runtime::parse_cli_args(&args) {
        Ok(options) => options,
        Err(error) => {
            eprintln!("[onec-search] {error}");
            std::process::exit(2);
        }
    };

    if let Err(error) = onec_search_core::runtime::run_with_options(options) {
        eprintln!("[onec-search] runtime failed: {error}");
        std::process::exit(1);
    }
}
