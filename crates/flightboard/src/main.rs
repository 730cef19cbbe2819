//! `flightboard` - CLI for the flight-information client
//!
//! This binary renders departure and arrival boards, shows the traffic notice,
//! and subscribes an email address to flight updates.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use tracing::warn;

use flightboard::board::{self, BoardKind};
use flightboard::cli::{BoardCommand, Cli, Command, FollowCommand, TrafficCommand};
use flightboard::{init_logging, DataService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match &cli.command {
        // Config commands load the configuration themselves, if at all.
        Command::Config(config_cmd) => {
            print!("{}", config_cmd.run(|| cli.load_config(), &cli.config_path())?);
            Ok(())
        }
        Command::Departures(cmd) => {
            handle_board(&data_service(&cli)?, BoardKind::Departures, cmd).await
        }
        Command::Arrivals(cmd) => {
            handle_board(&data_service(&cli)?, BoardKind::Arrivals, cmd).await
        }
        Command::Traffic(cmd) => handle_traffic(&data_service(&cli)?, cmd).await,
        Command::Follow(cmd) => handle_follow(&data_service(&cli)?, cmd).await,
    }
}

fn data_service(cli: &Cli) -> anyhow::Result<DataService> {
    let config = cli.load_config()?;
    Ok(DataService::from_config(&config)?)
}

/// Boards never fail: a broken source shows an empty board and a notice.
async fn handle_board(
    service: &DataService,
    kind: BoardKind,
    cmd: &BoardCommand,
) -> anyhow::Result<()> {
    let mut degraded = match kind {
        BoardKind::Departures => service.departures_or_empty().await,
        BoardKind::Arrivals => service.arrivals_or_empty().await,
    };

    for rejected in degraded.response.data.retain_valid() {
        warn!("Skipping flight: {rejected}");
    }

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&degraded)?);
        return Ok(());
    }

    if let Some(err) = &degraded.error {
        eprintln!("{}", err.user_friendly_message());
    }

    let traffic = if cmd.no_traffic || degraded.error.is_some() {
        None
    } else {
        service.traffic_or_none().await
    };

    print!(
        "{}",
        board::render(kind, &degraded.response.data, traffic.as_ref())
    );
    Ok(())
}

async fn handle_traffic(service: &DataService, cmd: &TrafficCommand) -> anyhow::Result<()> {
    let response = service
        .traffic_status()
        .await
        .map_err(|err| {
            let friendly = err.user_friendly_message();
            anyhow::Error::new(err).context(friendly)
        })?;

    if cmd.json {
        println!("{}", response.to_json_pretty()?);
    } else {
        println!("{}", board::render_traffic(&response.data));
    }
    Ok(())
}

async fn handle_follow(service: &DataService, cmd: &FollowCommand) -> anyhow::Result<()> {
    let response = service
        .follow_flight(&cmd.flight_number, &cmd.email)
        .await
        .with_context(|| format!("could not follow flight {}", cmd.flight_number))?;

    if cmd.json {
        println!("{}", response.to_json_pretty()?);
    } else {
        let sub = &response.data;
        println!("Following flight {}", sub.flight_number);
        println!("  Email:           {}", sub.email);
        println!("  Subscription id: {}", sub.subscription_id);
        println!("  Status:          {}", sub.status);
    }
    Ok(())
}
