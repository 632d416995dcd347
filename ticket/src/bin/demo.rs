//! GreedTicket demo binary
//!
//! Issues a ticket through the async store, lets the expiry clock tick a
//! few times, prints the visual code, then regenerates and cancels it.
//!
//! Run with: cargo run --bin greed-ticket-demo
//! Tune with the `GREED_TICKET_*` variables (a `.env` file is honoured).

use anyhow::{Context, Result};
use greed_ticket::{
    IssueRequest, LocationId, Purpose, StaticWallet, TicketAction, TicketConfig,
    TicketEnvironment, encode, ticket_store,
};
use greed_ticket_core::environment::SystemClock;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "greed_ticket=debug,greed_ticket_runtime=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = TicketConfig::from_env();
    tracing::info!(?config, "Loaded ticket configuration");

    let tick_interval = config.tick_interval();
    let grid_size = config.grid_size;
    let env = TicketEnvironment::new(
        Arc::new(SystemClock),
        Arc::new(StaticWallet::new("demo-user", 12_000)),
        config,
    );
    let store = ticket_store(env);

    println!("=== GreedTicket ===\n");

    let purpose: Purpose = std::env::args()
        .nth(1)
        .map_or(Ok(Purpose::GadgetRedemption), |arg| arg.parse())
        .context("first argument must be a redemption purpose")?;

    println!(">>> Issuing {} ticket for 5000 coins", purpose.label());
    store
        .send(TicketAction::IssueTicket {
            request: IssueRequest::new(purpose, 5000, LocationId::new("main-counter")),
        })
        .await?;
    if let Some(error) = store.state(|s| s.last_error.clone()).await {
        return Err(error).context("ticket was not issued");
    }

    let ticket = store
        .state(|s| s.current.clone())
        .await
        .context("store holds no ticket after issuing")?;
    println!("Ticket code: {}", ticket.display_code());
    println!("Expires at:  {}\n", ticket.expires_at());
    println!("{}\n", serde_json::to_string_pretty(&ticket)?);

    let matrix = encode(ticket.payload(), grid_size)?;
    println!("{}", matrix.render_text('█', ' '));

    for _ in 0..3 {
        tokio::time::sleep(tick_interval).await;
        let (remaining, low_time) = store.state(|s| (s.remaining, s.low_time)).await;
        println!(
            "Remaining: {:02}:{:02}{}",
            remaining.num_minutes(),
            remaining.num_seconds() % 60,
            if low_time { " (hurry!)" } else { "" }
        );
    }

    println!("\n>>> Regenerating");
    store.send(TicketAction::RegenerateTicket).await?;
    let fresh = store
        .state(|s| s.current.clone())
        .await
        .context("store holds no ticket after regenerating")?;
    println!("New ticket code: {}", fresh.display_code());

    println!("\n>>> Cancelling");
    store.send(TicketAction::InvalidateTicket).await?;
    let retired = store.state(|s| s.history.len()).await;
    println!("Retired tickets: {retired}");

    // Pending ticks see the retired ticket and stop re-arming
    store
        .shutdown(tick_interval + Duration::from_secs(1))
        .await?;

    println!("\n=== Done ===");
    Ok(())
}
