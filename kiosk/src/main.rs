//! Headless kiosk runner
//!
//! Logs in, runs one scripted customer session (survey answers, items and
//! payment method from the command line) and prints the ticket.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use kiosk::cli::Args;
use kiosk::{Kiosk, KioskConfig, KioskState, SurveyCapture};
use kiosk_client::{ClientConfig, HttpClient, KioskApi};
use shared::Demographics;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let _log_guard = kiosk::logger::init_logger(args.log_dir.as_deref())
        .context("Failed to initialise logging")?;

    let client = ClientConfig::new(&args.api_url)
        .with_timeout(args.timeout)
        .build_http_client()
        .context("Failed to build HTTP client")?;
    let credentials = client.credentials().clone();
    let api: Arc<dyn KioskApi> = Arc::new(client);

    let survey = SurveyCapture::new(Demographics::new(args.age_group, args.gender));
    let config = KioskConfig::from_env();
    let mut kiosk = Kiosk::new(api, credentials, Arc::new(survey), config);

    let shutdown = CancellationToken::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received");
            ctrl_c.cancel();
        }
    });

    let result = run_session(&mut kiosk, &args, &shutdown).await;
    kiosk.shutdown();
    result
}

async fn run_session(kiosk: &mut Kiosk, args: &Args, shutdown: &CancellationToken) -> anyhow::Result<()> {
    kiosk
        .login(&args.username, &args.password)
        .await
        .context("Login failed")?;
    kiosk.start().await.context("Attribute capture failed")?;

    for spec in &args.items {
        let line = kiosk
            .add_to_cart(spec.item_id, &spec.option_ids)
            .with_context(|| format!("Cannot add item {}", spec.item_id))?;
        tracing::info!(item = %line.item.name, quantity = line.quantity, "Added to cart");
    }
    tracing::info!(total = kiosk.cart_total(), "Sending order");
    kiosk.send_order().await.context("Sending order failed")?;

    kiosk.open_payment()?;
    kiosk.select_payment_method(args.payment)?;
    kiosk.confirm_payment_method()?;
    kiosk.complete_payment_action()?;
    kiosk
        .run_until(shutdown, |k| k.state() != KioskState::Ordering || k.payment().is_none())
        .await?;

    if kiosk.state() != KioskState::Ticket {
        let reason = kiosk
            .notification()
            .map(|n| n.message.clone())
            .unwrap_or_else(|| "interrupted".to_string());
        anyhow::bail!("Payment did not complete: {}", reason);
    }
    if let Some(text) = kiosk.render_ticket() {
        println!("{}", text);
    }

    kiosk
        .run_until(shutdown, |k| k.state() != KioskState::Ticket)
        .await?;
    Ok(())
}
