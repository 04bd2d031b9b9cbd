use backend_api::run_server;
use settings_loader::AppSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Build the configuration once; everything downstream receives it
    // explicitly instead of reading the environment.
    let settings = AppSettings::from_env()?;

    println!("Upload Analytics API");
    println!("====================");
    println!("Listening on: {}:{}", settings.host, settings.port);
    println!("Allowed origins: {}", settings.allowed_origins.join(", "));
    println!(
        "Credit metering: {}",
        if settings.credits_configured() { "enabled" } else { "disabled (soft-allow)" }
    );
    println!(
        "LLM narration: {}",
        if settings.llm_api_key.is_some() { "enabled" } else { "disabled (rule-based only)" }
    );
    println!();

    run_server(settings).await
}
