//! Interactive HTTP client.
//!
//! A prompt loop over stdin: `get <path>`, `post <path> <k=v&k=v>`,
//! `register <user> <pass>`, `login <user> <pass>`, `exit`. A failed request
//! is printed and the loop continues.

use std::io::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};

use courier::client::{ClientSession, FetchResult, Outcome};
use courier::config::Config;
use courier::http::request::Method;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load();
    let session = ClientSession::new(&cfg.client);

    println!("Courier client, talking to {}.", cfg.client.target_addr);
    println!(
        "Commands: get <path>, post <path> <k=v&k=v>, register <user> <pass>, login <user> <pass>, exit"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") {
            break;
        }

        let Some((method, path, params)) = parse_command(input) else {
            println!("Invalid command.");
            continue;
        };

        match session.send(&method, &path, &params).await {
            Ok(FetchResult::Done(outcome)) => print_outcome(&outcome),
            Ok(FetchResult::RedirectLimitExceeded { hops }) => {
                println!("Too many redirects ({hops} hops).");
            }
            Err(e) => println!("Error: {e}"),
        }
    }

    println!("Client stopped.");
    Ok(())
}

fn parse_command(input: &str) -> Option<(Method, String, String)> {
    let mut parts = input.splitn(3, ' ');
    let command = parts.next()?.to_lowercase();
    let second = parts.next();
    let third = parts.next();

    match (command.as_str(), second, third) {
        ("get", Some(path), _) => Some((Method::GET, path.to_string(), String::new())),
        ("post", Some(path), Some(params)) => {
            Some((Method::POST, path.to_string(), params.to_string()))
        }
        ("register", Some(user), Some(pass)) => {
            Some((Method::POST, "/register".to_string(), credentials(user, pass)))
        }
        ("login", Some(user), Some(pass)) => {
            Some((Method::POST, "/login".to_string(), credentials(user, pass)))
        }
        _ => None,
    }
}

fn credentials(user: &str, pass: &str) -> String {
    format!("username={user}&password={pass}")
}

fn print_outcome(outcome: &Outcome) {
    println!("Status: {} {}", outcome.status, outcome.reason);
    for (name, value) in &outcome.headers {
        println!("  {name}: {value}");
    }

    if outcome.content_type().starts_with("image/") {
        println!("Body: binary image data ({} bytes)", outcome.body.len());
        if let Some(artifact) = &outcome.artifact {
            println!("Image saved to {artifact}");
        }
    } else {
        // text/* and anything unrecognized is shown as decoded text
        println!("Body: {}", outcome.body_text());
    }

    if outcome.from_cache {
        println!("(served from cache)");
    } else if outcome.status == 304 {
        println!("304 but no cached copy available.");
    }

    if outcome.is_error() {
        println!("Request failed: {} {}", outcome.status, outcome.reason);
    }
}
