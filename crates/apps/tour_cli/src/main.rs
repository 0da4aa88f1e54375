use std::sync::Arc;

use clap::{Parser, Subcommand};
use foundation::math::Coordinate;
use places::sample::SampleCatalogue;
use places::{gather_nearby, Geocoder, NearbyPois, LISTING_RADIUS_MILES};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tour::{
    plan, AnalyticsSink, Speed, TourConfig, TourDriver, TourMetrics, TourPlayer, TourUpdate,
    TracingAnalytics, TracingSurface, Waypoint,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan and play neighbourhood tours")]
struct Args {
    /// Pretend the places service is down (plans the fallback loop)
    #[arg(long, global = true)]
    offline: bool,

    /// Override the proximity threshold in miles (TOUR_PROXIMITY_MILES)
    #[arg(long, global = true)]
    proximity: Option<f64>,

    /// Radius of the nearby-place search in miles
    #[arg(long, global = true, default_value_t = LISTING_RADIUS_MILES)]
    search_radius: f64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the sample properties
    Properties,

    /// Print the planned route as JSON
    Plan {
        /// Address text to geocode
        #[arg(long, conflicts_with = "property")]
        address: Option<String>,

        /// Sample property id
        #[arg(long, default_value_t = 1)]
        property: u32,
    },

    /// Plan a route and play it in real time
    Play {
        #[arg(long, conflicts_with = "property")]
        address: Option<String>,

        #[arg(long, default_value_t = 1)]
        property: u32,

        /// slow, normal or fast
        #[arg(long, default_value = "normal")]
        speed: String,

        /// Use one dwell time for every speed (milliseconds)
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Aggregate analytics and print them when the tour ends
        #[arg(long)]
        metrics: bool,
    },
}

#[derive(Serialize)]
struct PlanOutput<'a> {
    address: &'a str,
    center: Coordinate,
    fallback: bool,
    waypoints: &'a [Waypoint],
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = TourConfig::from_env()?;
    if let Some(miles) = args.proximity {
        config.planner.proximity_miles = miles;
    }

    // The planner applies the walking threshold; search never narrows below it.
    let search_radius = args.search_radius.max(config.planner.proximity_miles);
    let catalogue = if args.offline {
        SampleCatalogue::offline()
    } else {
        SampleCatalogue::new()
    };

    match args.command {
        Command::Properties => {
            for p in SampleCatalogue::new().properties() {
                println!(
                    "{}\t{}\t{}\t{} bd / {} ba",
                    p.id, p.address, p.price, p.beds, p.baths
                );
            }
        }
        Command::Plan { address, property } => {
            config.validate()?;
            let (formatted, center) = locate(&catalogue, address.as_deref(), property).await?;
            let nearby = gather_nearby(&catalogue, center, search_radius).await;
            let waypoints = plan(center, nearby.as_ref(), &config.planner);
            let out = PlanOutput {
                address: &formatted,
                center,
                fallback: nearby.is_none(),
                waypoints: &waypoints,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Command::Play {
            address,
            property,
            speed,
            delay_ms,
            metrics,
        } => {
            if let Some(ms) = delay_ms {
                config.speeds.slow_ms = ms;
                config.speeds.normal_ms = ms;
                config.speeds.fast_ms = ms;
            }
            config.validate()?;
            let speed = Speed::parse_or_default(&speed);

            let (formatted, center) = locate(&catalogue, address.as_deref(), property).await?;
            let nearby = gather_nearby(&catalogue, center, search_radius).await;
            log_nearby(nearby.as_ref());
            let waypoints = plan(center, nearby.as_ref(), &config.planner);
            info!("touring {formatted} ({} stops)", waypoints.len());

            let tour_metrics = Arc::new(TourMetrics::new());
            let sink: Arc<dyn AnalyticsSink> = if metrics {
                tour_metrics.clone()
            } else {
                Arc::new(TracingAnalytics)
            };

            let (tx, mut rx) = mpsc::unbounded_channel();
            let player = TourPlayer::new(config.speeds)
                .with_surface(Arc::new(TracingSurface::new()))
                .with_analytics(sink)
                .with_observer(tx);
            let (handle, task) = TourDriver::spawn(player);
            handle.start(waypoints, speed).await?;

            while let Some(update) = rx.recv().await {
                match update {
                    TourUpdate::Step {
                        waypoint,
                        index,
                        total,
                        progress_percent,
                        ..
                    } => {
                        println!(
                            "[{progress_percent:>3}%] {}/{} {}",
                            index + 1,
                            total,
                            waypoint.label
                        );
                    }
                    TourUpdate::Completed { elapsed_seconds } => {
                        println!("tour complete in {elapsed_seconds:.1}s");
                        break;
                    }
                    TourUpdate::Stopped { progress_percent } => {
                        println!("tour stopped at {progress_percent}%");
                        break;
                    }
                    TourUpdate::Aborted {
                        error,
                        progress_percent,
                    } => {
                        println!("tour aborted at {progress_percent}%: {error}");
                        break;
                    }
                }
            }

            handle.shutdown();
            task.await?;
            if metrics {
                for (name, value) in tour_metrics.snapshot().counters {
                    println!("{name}\t{value}");
                }
            }
        }
    }

    Ok(())
}

/// Resolves the tour center from an address or a sample property id.
async fn locate(
    catalogue: &SampleCatalogue,
    address: Option<&str>,
    property: u32,
) -> Result<(String, Coordinate), Box<dyn std::error::Error>> {
    if let Some(address) = address {
        let hit = catalogue.geocode(address).await?;
        return Ok((hit.formatted_address, hit.coordinate));
    }
    let p = SampleCatalogue::new()
        .property(property)
        .cloned()
        .ok_or_else(|| format!("no sample property with id {property}"))?;
    Ok((p.address, p.coordinate))
}

fn log_nearby(nearby: Option<&NearbyPois>) {
    match nearby {
        Some(n) => info!(
            schools = n.schools.len(),
            transit = n.transit.len(),
            cafes = n.cafes.len(),
            amenities = n.amenities.len(),
            "nearby places"
        ),
        None => warn!("places unavailable; touring a fixed loop"),
    }
}
