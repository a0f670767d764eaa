use anyhow::Context;
use clap::Parser;
use site_scout::utils::monitor::SystemMonitor;
use site_scout::utils::{logger, validation::Validate};
use site_scout::{AssessmentEngine, CliConfig, LocalStorage, MapplsClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting site-scout CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let monitor = SystemMonitor::new(config.monitor);

    // 合併 CLI、TOML 與環境變數
    let plan = config
        .into_plan()
        .context("failed to resolve run configuration")?;

    let storage = LocalStorage::new(plan.output_path.clone());
    let client = MapplsClient::new(plan.source.clone());
    let engine = AssessmentEngine::new(client, storage, plan.engine.clone());

    match engine.run(&plan.request).await {
        Ok(report) => {
            println!(
                "✅ Assessment completed: {} / '{}' within {}m",
                report.city, report.category, report.radius_meters
            );
            println!("🏪 Competitors: {}", report.counts.competitors);
            println!(
                "🍽️ Restaurants: {}  🛍️ Malls: {}  💪 Gyms: {}",
                report.counts.restaurants, report.counts.malls, report.counts.gyms
            );
            println!(
                "📈 Demand: {:.2}  🚶 Accessibility: {:.2}",
                report.scores.demand_score, report.scores.accessibility_score
            );
            println!(
                "🎯 Final score: {:.2} ({})",
                report.scores.final_score, report.scores.rating
            );
            println!(
                "📁 Report bundle: {}/{}",
                plan.output_path, plan.engine.bundle_name
            );
        }
        Err(e) => {
            tracing::error!("❌ Assessment failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    monitor.log_summary();

    Ok(())
}
