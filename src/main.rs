use clap::Parser;
use wsdl2soapui::utils::{logger, validation::Validate};
use wsdl2soapui::{CliConfig, GeneratorEngine, LocalStorage, TestGenPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting wsdl2soapui");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let wsdl_text = std::fs::read_to_string(&config.wsdl_file)?;
    tracing::debug!("Read {} bytes of WSDL from {}", wsdl_text.len(), config.wsdl_file);

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = TestGenPipeline::new(&config);
    let engine = GeneratorEngine::new(pipeline);

    match engine.run(&wsdl_text, &config.requirements).await {
        Ok(document) => {
            let path = storage.write_project(&document).await?;
            tracing::info!("✅ SoapUI project generated successfully");
            println!("✅ SoapUI project written to {}", path.display());
        }
        Err(e) => {
            tracing::error!("❌ Project generation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
