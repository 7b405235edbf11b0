use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Send calls through a running API relay", long_about = None)]
struct Cli {
    /// Base URL of the relay.
    #[arg(short, long, default_value = "http://localhost:8000")]
    relay: String,

    /// Relay access key (sent as x-api-key).
    #[arg(short, long, env = "RELAY_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the relay is up
    Health,
    /// Forward one call to a target URL
    Send {
        /// Target URL
        url: String,

        /// Upstream credential
        #[arg(short, long, env = "RELAY_TOKEN")]
        token: String,

        /// Forwarding method (defaults to the relay's policy)
        #[arg(short, long)]
        method: Option<String>,

        /// JSON object to forward as the payload (query string for GET)
        #[arg(short, long)]
        body: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let relay = cli.relay.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert("x-api-key", HeaderValue::from_str(key)?);
    }

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", relay)).send().await?;
            print_response(res).await?;
        }
        Commands::Send {
            url,
            token,
            method,
            body,
        } => {
            let body: Option<Map<String, Value>> = body
                .map(|raw| serde_json::from_str(&raw))
                .transpose()
                .map_err(|e| format!("--body must be a JSON object: {}", e))?;

            let mut payload = json!({ "url": url, "token": token });
            if let Some(method) = method {
                payload["method"] = Value::String(method);
            }
            if let Some(body) = body {
                payload["body"] = Value::Object(body);
            }

            let res = client
                .post(format!("{}/relay", relay))
                .headers(headers)
                .json(&payload)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Relay returned status {}", status);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
