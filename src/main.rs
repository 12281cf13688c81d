use std::env;
use std::io;
use std::sync::Arc;

use payment_charge::charge::{GatewayProbe, StaticGateway, TcpGateway};
use payment_charge::csv::{read_charges, write_outcomes};
use payment_charge::store::{CsvRecordStore, InMemoryRecordStore, RecordStore};
use payment_charge::{AppConfig, ChargeProcessor};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let path = env::args()
        .nth(1)
        .expect("usage: payment-charge <charges.csv>");

    if !path.ends_with(".csv") {
        warn!(path, "input file seems to not be a csv file");
    }

    let config = AppConfig::from_env();
    info!(?config, "configuration resolved");

    let probe: Box<dyn GatewayProbe> = match &config.gateway_addr {
        Some(addr) => Box::new(TcpGateway::new(addr.clone())),
        None => Box::new(StaticGateway::healthy()),
    };
    let store: Arc<dyn RecordStore> = match &config.retry_records_path {
        Some(records) => Arc::new(CsvRecordStore::new(records.clone())),
        None => Arc::new(InMemoryRecordStore::new()),
    };
    let processor = ChargeProcessor::with_defaults(probe, config.gateway_timeout, store);

    let charges = match read_charges(path.clone()) {
        Ok(charges) => charges,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let (charge_sender, charge_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in charges {
            match result {
                Ok(charge) => {
                    if charge_sender.send(charge).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    let outcomes = processor
        .run(ReceiverStream::new(charge_receiver), &config.fault)
        .await;

    match processor.store().find_all().await {
        Ok(records) => info!(count = records.len(), "retry records on file"),
        Err(e) => warn!(reason = %e, "could not list retry records"),
    }

    if let Err(e) = write_outcomes(io::stdout().lock(), &outcomes) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
