//! ruta CLI — driving adapter for the ruta dispatch engine.
//!
//! Subcommands:
//! - `resolve <table> <method> <path> [options]` — resolve a request against a route table
//! - `check <table>` — validate a route table loads without errors
//! - `routes <table>` — print the registered mappings

use std::process;

use ruta::config::RouteTable;
use ruta::{Dispatcher, HttpMethod, Resolution, RouteRequest};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "resolve" => cmd_resolve(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "routes" => cmd_routes(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_resolve(args: &[String]) -> Result<(), String> {
    if args.len() < 3 {
        return Err("resolve requires <table> <method> <path>".into());
    }

    let dispatcher = load_dispatcher(&args[0])?;
    let request = parse_request(&args[1], &args[2], &args[3..])?;

    match dispatcher.dispatch(&request) {
        Ok(Resolution::Match(m)) => {
            println!("{}", m.handler());
            if let Some(pattern) = m.best_pattern() {
                println!("  pattern: {pattern}");
            }
            let mut variables: Vec<_> = m.path_variables().iter().collect();
            variables.sort();
            for (name, value) in variables {
                println!("  {name} = {value}");
            }
        }
        Ok(Resolution::Options { allowed }) => {
            let tokens: Vec<&str> = allowed.iter().map(|m| m.as_str()).collect();
            println!("(options) allow: {}", tokens.join(", "));
        }
        Ok(Resolution::PreflightAmbiguous) => {
            println!("(pre-flight, ambiguous)");
        }
        Err(e) => return Err(format!("no handler: {e}")),
    }

    Ok(())
}

fn cmd_check(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("check requires a route table path".into());
    }

    let dispatcher = load_dispatcher(&args[0])?;
    println!("Table valid ({} routes)", dispatcher.registry().len());
    Ok(())
}

fn cmd_routes(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err("routes requires a route table path".into());
    }

    let dispatcher = load_dispatcher(&args[0])?;
    let mut lines: Vec<String> = dispatcher
        .registry()
        .registrations()
        .iter()
        .map(|r| format!("{} -> {}", r.mapping(), r.handler()))
        .collect();
    lines.sort();
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Table loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_dispatcher(path: &str) -> Result<Dispatcher, String> {
    let table = load_table(path)?;
    let dispatcher = Dispatcher::new();
    table
        .load_into(&dispatcher)
        .map_err(|e| format!("table load failed: {e}"))?;
    Ok(dispatcher)
}

fn load_table(path: &str) -> Result<RouteTable, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    let is_json = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(&content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_request(method: &str, path: &str, options: &[String]) -> Result<RouteRequest, String> {
    let method: HttpMethod = method
        .parse()
        .map_err(|e| format!("invalid method: {e}"))?;
    let mut builder = RouteRequest::builder(method, path);

    let mut i = 0;
    while i < options.len() {
        match options[i].as_str() {
            "--header" => {
                i += 1;
                let pair = options
                    .get(i)
                    .ok_or_else(|| "--header requires name:value".to_string())?;
                let (name, value) = pair
                    .split_once(':')
                    .ok_or_else(|| format!("invalid header \"{pair}\", expected name:value"))?;
                builder = builder.header(name.trim(), value.trim());
            }
            "--query" => {
                i += 1;
                let pair = options
                    .get(i)
                    .ok_or_else(|| "--query requires key=value".to_string())?;
                let (key, value) = pair
                    .split_once('=')
                    .ok_or_else(|| format!("invalid query pair \"{pair}\", expected key=value"))?;
                builder = builder.query(key, value);
            }
            other => return Err(format!("unexpected argument \"{other}\"")),
        }
        i += 1;
    }

    Ok(builder.build())
}

fn print_usage() {
    eprintln!(
        "Usage: ruta <command> [options]

Commands:
  resolve <table> <method> <path> [--header name:value]... [--query key=value]...
                                           Resolve a request against a route table
  check <table>                            Validate a route table
  routes <table>                           Print the registered mappings
  help                                     Show this help"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn parse_request_plain() {
        let request = parse_request("GET", "/items", &[]).unwrap();
        assert_eq!(request.method(), HttpMethod::Get);
        assert_eq!(request.path(), "/items");
    }

    #[test]
    fn parse_request_headers_and_queries() {
        let options = strings(&[
            "--header",
            "Accept: application/json",
            "--query",
            "mode=fast",
        ]);
        let request = parse_request("post", "/items", &options).unwrap();
        assert_eq!(
            request.header("accept"),
            Some("application/json")
        );
        assert_eq!(
            request.query_values("mode"),
            Some(&["fast".to_string()][..])
        );
    }

    #[test]
    fn parse_request_bad_method() {
        assert!(parse_request("FETCH", "/items", &[]).is_err());
    }

    #[test]
    fn parse_request_bad_header() {
        let options = strings(&["--header", "noseparator"]);
        assert!(parse_request("GET", "/items", &options).is_err());
    }

    #[test]
    fn parse_request_unexpected_argument() {
        let options = strings(&["--bogus"]);
        assert!(parse_request("GET", "/items", &options).is_err());
    }
}
