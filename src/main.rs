use sftp_etl::utils::{logger, validation::Validate};
use sftp_etl::{ApiToSftpPipeline, EtlEngine, PipelineConfig, PipelineStage, SshConnector};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 讀取設定（含憑證），一律來自環境
    let config = match PipelineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    };

    // 初始化日誌：主控台 + 日誌檔
    logger::init_pipeline_logger(&config.log_file, config.log_json)?;
    tracing::debug!("Pipeline config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }

    // 組裝管道與引擎
    let pipeline = ApiToSftpPipeline::new(
        config.api_url.clone(),
        config.sftp_target(),
        SshConnector::new(),
        config.retry_policy(),
    );
    let engine = EtlEngine::new(pipeline);

    if let Err(e) = engine.run().await {
        match e.stage() {
            PipelineStage::Fetch => {
                tracing::error!("❌ Data pipeline failed at the Fetch Data stage.");
            }
            PipelineStage::Transform => {
                tracing::error!("🏁 ❌ Data pipeline failed while processing the fetched data!");
            }
            PipelineStage::Upload => {
                tracing::info!(
                    "🏁 ❌ Data pipeline completed without uploading data to SFTP server!"
                );
            }
            PipelineStage::Config => {
                tracing::error!("❌ Data pipeline failed during startup: {}", e);
            }
        }
        eprintln!("❌ {}", e);
        std::process::exit(e.exit_code());
    }

    Ok(())
}
