use clap::Parser;
use site_deploy::config::cli::LogFormat;
use site_deploy::core::pipeline::PlannedStep;
use site_deploy::utils::{logger, validation::Validate};
use site_deploy::{standard_pipeline, CliArgs, DeployConfig, PipelineContext, SystemRunner};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    // 初始化日誌
    match args.log_format {
        LogFormat::Compact => logger::init_cli_logger(args.verbose),
        LogFormat::Json => logger::init_json_logger(args.verbose),
    }

    tracing::info!("Starting site-deploy");

    let config = match DeployConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(e.exit_code());
    }

    if args.verbose {
        tracing::debug!("Deploy config: {:?}", config);
    }

    let pipeline = standard_pipeline();

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be executed");
        display_plan(&config, &pipeline.plan(&config));
        return;
    }

    let execution_id = format!("deploy-{}", chrono::Utc::now().format("%Y%m%dT%H%M%SZ"));
    let mut context = PipelineContext::new(execution_id, config, Arc::new(SystemRunner::new()));

    match pipeline.execute_all(&mut context).await {
        Ok(report) => {
            for tolerated in report.tolerated_failures() {
                eprintln!(
                    "⚠️ {} failed but the deployment continued (see log above)",
                    tolerated.name
                );
            }

            if args.json {
                match serde_json::to_string_pretty(&report.summary()) {
                    Ok(summary) => println!("{}", summary),
                    Err(e) => tracing::warn!("Could not render summary: {}", e),
                }
            } else {
                println!("✅ Deployment {} completed", report.execution_id);
            }
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Deployment failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            std::process::exit(e.exit_code());
        }
    }
}

fn display_plan(config: &DeployConfig, plan: &[PlannedStep]) {
    println!("📋 Deployment Plan:");
    println!("  Project: {} ({})", config.project.name, config.project_dir().display());
    println!("  Virtualenv: {}", config.venv_dir().display());
    println!("  Apps: {}", config.app_labels().join(", "));
    println!("  Service: {}", config.service_name());
    println!();

    for (index, step) in plan.iter().enumerate() {
        println!("{}. {} [{}]", index + 1, step.name, step.policy);
        for action in &step.actions {
            println!("     {}", action);
        }
    }

    println!();
    println!("✅ Dry run complete. Re-run without --dry-run to deploy.");
}
