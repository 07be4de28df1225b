mod config;

use anyhow::Result;
use clap::Parser;
use discovery_core::{PlaceDirectory, PlacesClient};
use shared::domain::{Coordinate, SearchRequest};

#[derive(Parser, Debug)]
struct Args {
    /// Places backend base URL; falls back to discovery.toml / APP__SERVER_URL.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long)]
    latitude: f64,
    #[arg(long)]
    longitude: f64,
    #[arg(long)]
    radius: Option<i32>,
    /// Also fetch the narrated history for the first result.
    #[arg(long, default_value_t = false)]
    with_history: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = config::load_settings();

    let server_url = args.server_url.unwrap_or(settings.server_url);
    let radius = args.radius.unwrap_or(settings.radius_meters);
    let center = Coordinate::new(args.latitude, args.longitude)?;

    let client = PlacesClient::new(server_url);
    let locations = client
        .nearby(&SearchRequest::with_radius(center, radius))
        .await?;

    if locations.is_empty() {
        println!("No locations found here.");
        return Ok(());
    }

    for location in &locations {
        let rating = location
            .rating
            .map(|r| format!("{r:.1}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<40} rating {:>4}  ({:.4}, {:.4})",
            location.name, rating, location.position.latitude, location.position.longitude
        );
    }

    if args.with_history {
        let first = &locations[0];
        let history = client.history(&first.place_id, &first.name).await?;
        println!("\n{}\n{history}", first.name);
    }

    Ok(())
}
