use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use booking_client::{BookingWorkflow, HttpBookingApi, SubmitOutcome};
use chrono::NaiveDate;
use clap::Parser;
use shared::domain::{FieldUpdate, VehicleId};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod view;

use config::{load_settings, parse_endpoint};

#[derive(Parser, Debug)]
#[command(about = "Reserve a rental vehicle")]
struct Args {
    #[arg(long, default_value = "booking.toml")]
    config: PathBuf,
    #[arg(long)]
    catalog_url: Option<String>,
    #[arg(long)]
    booking_url: Option<String>,
    /// Vehicle to preselect, as when arriving from its detail page.
    #[arg(long)]
    car: Option<String>,
    #[arg(long)]
    pickup: Option<NaiveDate>,
    #[arg(long = "return")]
    return_date: Option<NaiveDate>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    /// Print the catalog and exit without booking.
    #[arg(long)]
    list: bool,
}

impl Args {
    fn field_updates(&self) -> Vec<FieldUpdate> {
        [
            self.pickup.map(|date| FieldUpdate::PickupDate(Some(date))),
            self.return_date.map(|date| FieldUpdate::ReturnDate(Some(date))),
            self.name.clone().map(FieldUpdate::ContactName),
            self.email.clone().map(FieldUpdate::ContactEmail),
            self.phone.clone().map(FieldUpdate::ContactPhone),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    if let Some(url) = &args.catalog_url {
        settings.catalog_url = url.clone();
    }
    if let Some(url) = &args.booking_url {
        settings.booking_url = url.clone();
    }

    let api = HttpBookingApi::new(
        parse_endpoint(&settings.catalog_url, "catalog")?,
        parse_endpoint(&settings.booking_url, "booking")?,
    );
    info!(
        catalog_url = %api.catalog_url(),
        booking_url = %api.booking_url(),
        "booking endpoints configured"
    );
    let seed = args
        .car
        .as_deref()
        .map(VehicleId::new)
        .transpose()
        .context("invalid --car value")?;

    let workflow = BookingWorkflow::new(Arc::new(api), seed);
    if let Some(catalog_task) = workflow.start().await {
        catalog_task.await.context("catalog fetch task failed")?;
    }

    let snapshot = workflow.snapshot().await;
    println!("{}", view::render_catalog(&snapshot));
    if args.list {
        workflow.teardown().await;
        return Ok(());
    }

    for update in args.field_updates() {
        workflow.update_field(update).await?;
    }
    let outcome = workflow.submit().await?;

    let snapshot = workflow.snapshot().await;
    println!("{}", view::render_state(&snapshot.state, &snapshot.catalog));
    workflow.teardown().await;

    match outcome {
        SubmitOutcome::Confirmed => Ok(()),
        SubmitOutcome::Rejected(cause) => bail!("booking not submitted: {cause}"),
        SubmitOutcome::Failed => bail!("booking service did not accept the reservation"),
    }
}
