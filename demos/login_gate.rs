//! Runs one inbound request URL through the login gate.
//!
//! ```text
//! cargo run --example login_gate -- demos/login_gate.yaml "http://localhost:5000/login?code=..."
//! ```

use nila_oidc_gate::prelude::*;
use std::fs;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,nila_oidc_gate=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "demos/login_gate.yaml".to_string());
    let request_url = args.next().unwrap_or_else(|| "http://localhost:5000/login".to_string());

    // --- Load Configuration from YAML ---
    let settings: ClientSettings = serde_yaml::from_str(&fs::read_to_string(&config_path)?)?;
    let config = Config::try_from(settings)?;

    // Discovery failure is fatal here, the gate cannot run without endpoints.
    let oidc = OidcClient::connect(config).await?;

    let login = oidc
        .require_login(|authenticated: AuthenticatedRequest| async move {
            serde_json::json!({ "message": "success", "sub": authenticated.identity.subject() })
        })
        .with_user_info();

    match login.call(InboundRequest::parse(&request_url)?).await? {
        Gated::Redirect(url) => println!("303 See Other\nLocation: {}", url),
        Gated::Handled(body) => println!("200 OK\n{}", body),
    }
    Ok(())
}
