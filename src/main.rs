use clap::Parser;
use yard_checkin::config::cli::Command;
use yard_checkin::core::reporting::{
    render_activity_feed, render_sms_history, write_activity_csv, Reporter,
};
use yard_checkin::core::sweep::{ExpirySweep, SweepResponse};
use yard_checkin::core::{Clock, SystemClock, VehicleStore};
use yard_checkin::utils::error::{ErrorSeverity, YardError};
use yard_checkin::utils::{logger, validation::Validate};
use yard_checkin::{CliConfig, ConsoleSink, SupabaseStore, YardWorkflow};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting yard CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(config: CliConfig) -> Result<(), YardError> {
    // 依主機名稱選擇環境
    let resolved = config.load_profiles()?.resolve(&config.host);
    resolved.validate()?;

    let store = SupabaseStore::from_config(&resolved)?;
    let ctx = config.operator_context();
    if ctx.operator_id.is_none() {
        tracing::warn!("No operator set; log entries will carry no operator");
    }

    match config.command {
        Command::CheckIn(args) => {
            let workflow = YardWorkflow::new(store, ConsoleSink);
            let outcome = workflow.submit_vehicle(&args.into(), &ctx).await?;
            println!(
                "✅ {} checked in (id {})",
                outcome.vehicle.registration, outcome.vehicle.id
            );
        }
        Command::Notify { vehicle_id } => {
            let workflow = YardWorkflow::new(store, ConsoleSink);
            let outcome = workflow.notify(&vehicle_id, &ctx).await?;
            println!("✅ {} notified", outcome.vehicle.registration);
        }
        Command::Release { vehicle_id } => {
            let workflow = YardWorkflow::new(store, ConsoleSink);
            let outcome = workflow.release(&vehicle_id, &ctx).await?;
            println!(
                "✅ {} released after {} mins",
                outcome.vehicle.registration,
                outcome.duration_minutes.unwrap_or_default()
            );
        }
        Command::Vehicles => {
            let vehicles = store.list_open_vehicles().await?;
            println!("{} vehicle(s) on site", vehicles.len());
            for vehicle in vehicles {
                println!(
                    "{}  {:<10} {:<12} {:?}  in {}",
                    vehicle.id,
                    vehicle.registration,
                    vehicle.po_or_placeholder(),
                    vehicle.status,
                    vehicle.check_in_time.format("%H:%M")
                );
            }
        }
        Command::History { vehicle_id } => {
            let history = Reporter::new(store).vehicle_sms_history(&vehicle_id).await;
            if history.is_empty() {
                println!("No SMS recorded for {}", vehicle_id);
            } else {
                println!("{}", render_sms_history(&history));
            }
        }
        Command::Stats => {
            let stats = Reporter::new(store).today_sms_stats().await;
            println!("📊 SMS Sent Today: {}", stats.total);
            for (kind, count) in &stats.by_type {
                println!("    {}: {}", kind, count);
            }
        }
        Command::Activity { csv } => {
            let items = Reporter::new(store).recent_activity().await;
            if csv {
                write_activity_csv(&items, std::io::stdout().lock())?;
            } else {
                print!("{}", render_activity_feed(&items));
            }
        }
        Command::Sweep => {
            let result = ExpirySweep::new(store).run(SystemClock.now()).await;
            let response = SweepResponse::from_result(&result);
            println!("{}", response.body_json()?);
            result?;
        }
    }

    Ok(())
}
