use clap::Parser;
use price_sync::utils::logger;
use price_sync::{run_sync, CliConfig, LocalStorage, SyncReport, SyncSettings};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose, config.log_format);

    tracing::info!("Starting price-sync");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 設定與金鑰都在任何網路請求之前處理
    let result = match SyncSettings::resolve(&config) {
        Ok(settings) => {
            tracing::debug!("Resolved settings: {:?}", settings);
            run_sync(settings, LocalStorage::working_dir()).await
        }
        Err(e) => Err(e),
    };

    let report = SyncReport::from_result(&result);

    match &result {
        Ok(receipt) => {
            let body = serde_json::to_string_pretty(&receipt.response)
                .unwrap_or_else(|_| receipt.response.to_string());
            // --json 時 stdout 只輸出報告
            if config.json {
                eprintln!("✅ JSON bin update successful!");
                eprintln!("Response: {}", body);
            } else {
                println!("✅ JSON bin update successful!");
                println!("Response: {}", body);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Sync failed: {} (Kind: {:?}, Category: {:?})",
                e,
                e.kind(),
                e.category()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        }
    }

    if config.json {
        match serde_json::to_string(&report) {
            Ok(line) => println!("{}", line),
            Err(e) => tracing::error!("Could not encode report: {}", e),
        }
    }

    if report.exit_code != 0 {
        std::process::exit(report.exit_code);
    }
}
