use clap::Parser;
use soap_bridge::utils::logger;
use soap_bridge::{CliConfig, ErrorKind, SoapBridge};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    let (verbose, json_logs) = config.logging();
    if json_logs {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("Starting soap-bridge");
    if verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    let settings = match config.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    tracing::info!("Calling {} on {}", settings.operation, settings.wsdl);
    let bridge = SoapBridge::new(settings.wsdl.clone(), settings.options.clone());

    match bridge.process(&settings.operation, &settings.arguments).await {
        Ok(value) => {
            let json = value.to_json();
            let output = if config.pretty {
                serde_json::to_string_pretty(&json)?
            } else {
                serde_json::to_string(&json)?
            };
            println!("{}", output);
            tracing::info!("✅ {} decoded successfully", settings.operation);
        }
        Err(e) => {
            tracing::error!("❌ {} failed: {} (Kind: {:?})", settings.operation, e, e.root_cause().kind());
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 依失敗階段決定退出碼
            let exit_code = match e.root_cause().kind() {
                ErrorKind::Request => 2,
                ErrorKind::Parse => 3,
                _ => 1,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}
