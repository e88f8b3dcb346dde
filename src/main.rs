use std::env;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let raw_args: Vec<String> = env::args().collect();
    match raw_args.get(1).map(|s| s.as_str()) {
        Some("serve") => {
            let port = raw_args
                .get(2)
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(8080);
            if let Err(e) = fers::api::run_http_server(port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Some("simulate") => {
            let mut cli_args = vec!["fers".to_string()];
            cli_args.extend(raw_args.iter().skip(2).cloned());
            match fers::api::run_cli_simulation(&cli_args) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("{e}");
                    std::process::exit(1);
                }
            }
        }
        _ => {
            eprintln!("Usage: cargo run -- serve [port] | simulate [flags]");
            std::process::exit(1);
        }
    }
}
