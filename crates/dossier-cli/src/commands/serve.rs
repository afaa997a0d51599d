use dossier_config::{DossierConfig, Secret};
use dossier_core::AgentStore;
use dossier_server::ServerConfig;

pub async fn run(
    store: AgentStore,
    config: &DossierConfig,
    host: Option<String>,
    port: Option<u16>,
    api_key: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut server = ServerConfig::from_config(config);
    if let Some(host) = host {
        server.host = host;
    }
    if let Some(port) = port {
        server.port = port;
    }
    if let Some(key) = api_key {
        server.api_key = Some(Secret::from(key));
    }

    eprintln!(
        "Starting Dossier REST API server on http://{}:{}",
        server.host, server.port
    );
    eprintln!("Endpoints: /health, /status, /agents, /api/generate_codename, /nuke, /openapi");

    dossier_server::serve(store, server).await
}
