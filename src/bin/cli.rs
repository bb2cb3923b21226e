use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use artishine_discovery::core::{map_center, MapBounds};
use artishine_discovery::providers::ApiClient;
use artishine_discovery::{
    Coordinate, Decision, DiscoveryConfig, DiscoveryEngine, DiscoveryError, GeoRanker, Listing,
    Ranker, SessionStore, SqliteSessionStore, UserRole,
};

#[derive(Parser)]
#[command(name = "artishine")]
#[command(about = "Artishine discovery CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML config file (environment variables still override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Session database path
    #[arg(short, long)]
    db: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank a JSON file of listings by distance
    Rank {
        /// JSON array of listings
        #[arg(short, long)]
        listings: PathBuf,

        /// Viewer latitude
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Viewer longitude
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,

        /// Near/far boundary in km
        #[arg(long)]
        near_km: Option<f64>,

        /// Print the ranked queue as JSON
        #[arg(long)]
        json: bool,
    },

    /// Map bounds and centre of a JSON file of listings
    Bounds {
        #[arg(short, long)]
        listings: PathBuf,
    },

    /// Swipe through marketplace listings
    Explore {
        /// Decide every listing the same way instead of prompting
        #[arg(long, value_enum)]
        auto: Option<AutoDecision>,
    },

    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        #[arg(short, long, default_value = "buyer")]
        role: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the stored session
    Whoami,
}

#[derive(Clone, Copy, ValueEnum)]
enum AutoDecision {
    Accept,
    Reject,
}

impl From<AutoDecision> for Decision {
    fn from(auto: AutoDecision) -> Self {
        match auto {
            AutoDecision::Accept => Decision::Accept,
            AutoDecision::Reject => Decision::Reject,
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<DiscoveryConfig> {
    let base = match &cli.config {
        Some(path) => DiscoveryConfig::from_yaml_file(path)?,
        None => DiscoveryConfig::default(),
    };
    let mut config = base.with_overrides(|key| std::env::var(key).ok())?;

    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    Ok(config)
}

fn read_listings(path: &Path) -> anyhow::Result<Vec<Listing>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Next decision from stdin: `a` accept, `r` reject, `q` quit
async fn prompt<R>(lines: &mut tokio::io::Lines<R>) -> anyhow::Result<Option<Decision>>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    loop {
        println!("   [a]ccept / [r]eject / [q]uit?");
        match lines.next_line().await? {
            None => return Ok(None),
            Some(line) => match line.trim().to_lowercase().as_str() {
                "a" | "accept" | "y" => return Ok(Some(Decision::Accept)),
                "r" | "reject" | "n" => return Ok(Some(Decision::Reject)),
                "q" | "quit" => return Ok(None),
                other => println!("   Unknown choice: {}", other),
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "artishine_discovery=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Rank { listings, lat, lng, near_km, json } => {
            let listings = read_listings(&listings)?;
            let viewer = match (lat, lng) {
                (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)?),
                _ => None,
            };
            let ranker = GeoRanker::with_threshold(near_km.unwrap_or(config.near_threshold_km))?;

            let ranked = ranker.rank(&listings, viewer.as_ref());

            if json {
                println!("{}", serde_json::to_string_pretty(&ranked)?);
            } else {
                println!("📍 Ranked {} listings:", ranked.len());
                for (i, item) in ranked.iter().enumerate() {
                    println!(
                        "   {}. {} [{}] {}",
                        i + 1,
                        item.listing().display_name(),
                        item.band(),
                        item.distance_label()
                    );
                }
            }
        }

        Commands::Bounds { listings } => {
            let listings = read_listings(&listings)?;
            let coords: Vec<Coordinate> = listings.iter().filter_map(|l| l.coordinate).collect();
            let center = map_center(&coords);

            println!("🗺️  {} of {} listings have coordinates", coords.len(), listings.len());
            println!("   Centre: {:.4}, {:.4}", center.lat(), center.lng());
            match MapBounds::from_coordinates(&coords) {
                Some(b) => println!(
                    "   Bounds: N {:.4} S {:.4} E {:.4} W {:.4}",
                    b.north, b.south, b.east, b.west
                ),
                None => println!("   Bounds: none"),
            }
        }

        Commands::Explore { auto } => {
            let store = SqliteSessionStore::new(&config.db_path).await?;
            let session = store.load().await?;
            if !session.is_authenticated() {
                println!("ℹ️  Not logged in: accepted items will not be saved");
            }

            let engine = Arc::new(DiscoveryEngine::from_config(&config)?);
            let mut discovery = engine.start_session(session).await?;
            let mut lines = BufReader::new(tokio::io::stdin()).lines();

            while let Some(item) = discovery.current() {
                println!("\n🎨 {}", item.listing().display_name());
                println!("   {} ({})", item.distance_label(), item.band());

                let decision = match auto {
                    Some(auto) => auto.into(),
                    None => match prompt(&mut lines).await? {
                        Some(decision) => decision,
                        None => break,
                    },
                };

                match discovery.decide(decision).await {
                    Ok(decided) if decided.decision == Decision::Accept => {
                        println!("   ❤️  Added {}", decided.listing.listing().display_name());
                    }
                    Ok(_) => println!("   ⏭️  Skipped"),
                    Err(DiscoveryError::WishlistFailed { decided, source }) => println!(
                        "   ⚠️  Could not save {}: {}",
                        decided.listing.listing().display_name(),
                        source
                    ),
                    Err(e) => println!("   ⚠️  {}", e),
                }
            }

            let tally = discovery.tally();
            if discovery.is_exhausted() {
                println!("\n✨ You've explored all crafts!");
            }
            println!("   Accepted: {}  Rejected: {}", tally.accepted, tally.rejected);
        }

        Commands::Login { email, password, role } => {
            let role: UserRole = role.parse()?;
            let client = ApiClient::new(&config.api_base_url, config.http_timeout())?;
            let session = client.login(&email, &password, role).await?;

            let store = SqliteSessionStore::new(&config.db_path).await?;
            store.save(&session).await?;

            println!("✅ Logged in as {} ({})", session.user_id.as_deref().unwrap_or("?"), role.as_str());
        }

        Commands::Logout => {
            let store = SqliteSessionStore::new(&config.db_path).await?;
            store.clear().await?;
            println!("👋 Logged out");
        }

        Commands::Whoami => {
            let store = SqliteSessionStore::new(&config.db_path).await?;
            let session = store.load().await?;

            match (&session.user_id, session.role) {
                (Some(user_id), role) if session.is_authenticated() => {
                    println!("👤 {} ({})", user_id, role.map(|r| r.as_str()).unwrap_or("unknown role"));
                    if let Some(updated) = store.updated_at().await? {
                        println!("   Since: {}", updated.format("%Y-%m-%d %H:%M:%S"));
                    }
                }
                _ => println!("👤 Not logged in"),
            }
        }
    }

    Ok(())
}
