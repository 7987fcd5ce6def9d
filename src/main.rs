use anyhow::{Context, Result};
use meterlink::acquisition::AcquisitionController;
use meterlink::bridge::{Bridge, BridgeMessage};
use meterlink::config::Config;
use meterlink::logging::{get_device_logger, init_logging};
use meterlink::modbus::ModbusClient;
use meterlink::schedule::TelemetrySchedule;
use meterlink::uplink::LogUplink;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let logger = get_device_logger("main", &config.device);
    logger.info(&format!("meterlink {} starting", meterlink::APP_VERSION));

    let device_info = config.device_info()?.clone();
    let schedule = TelemetrySchedule::new(config.telemetry.interval_secs)?;
    let transport = ModbusClient::new(&config.modbus);
    let controller = AcquisitionController::new(transport, &config.modbus, &config.registers)
        .with_device(&config.device);

    let mut bridge = Bridge::new(
        controller,
        device_info,
        schedule,
        config.telemetry.buffer_size,
        LogUplink::new(),
    )
    .with_device(&config.device);

    // No cloud session is attached; keep the sender alive so the inbound
    // branch simply stays idle.
    let (_inbound_tx, inbound_rx) = mpsc::unbounded_channel::<BridgeMessage>();
    let (shutdown_tx, shutdown_rx) = mpsc::unbounded_channel::<()>();

    let signal_logger = logger.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => signal_logger.info("Ctrl-C received"),
            Err(e) => signal_logger.error(&format!("Failed to listen for Ctrl-C: {}", e)),
        }
        shutdown_tx.send(()).ok();
    });

    match bridge.run(inbound_rx, shutdown_rx).await {
        Ok(()) => {
            logger.info("Bridge shutdown complete");
            Ok(())
        }
        Err(e) => {
            logger.error(&format!("Bridge failed with error: {}", e));
            Err(anyhow::anyhow!("Bridge error: {}", e))
        }
    }
}
