use std::path::PathBuf;

use chrono::{Duration, Utc};
use dotenvy::dotenv;
use log::{error, info, warn};

use ozon_performance::models::parse_list;
use ozon_performance::models::requests::DEFAULT_METRICS;
use ozon_performance::{Ad, AdGroup, Campaign, Config, OzonClient, StatsQuery};

const DEFAULT_CONFIG_PATH: &str = "config.json";

fn main() {
    // Load .env file
    dotenv().ok();

    let config_path = std::env::var("OZON_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let config = match Config::load(Some(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logger
    let default_level = if config.debug { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(default_level));

    if let Err(e) = run(&config) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = OzonClient::from_config(config)?;
    info!("Using Ozon Performance API at {}", client.base_url());

    let today = Utc::now().date_naive();
    let date_to = config.date_to.unwrap_or(today);
    let date_from = config.date_from.unwrap_or(date_to - Duration::days(7));
    let query = StatsQuery::new(date_from, date_to, DEFAULT_METRICS)?;

    let campaigns: Vec<Campaign> = parse_list(client.get_campaigns()?)?;
    println!("Found {} campaigns", campaigns.len());

    let Some(campaign) = campaigns.first() else {
        warn!("No campaigns available");
        return Ok(());
    };
    println!("First campaign: {} (ID: {})", campaign.name, campaign.id);

    let stats = client.get_campaign_stats(campaign.id, &query)?;
    println!("Campaign stats {}..{}: {}", date_from, date_to, stats);

    let ad_groups: Vec<AdGroup> = parse_list(client.get_ad_groups(campaign.id)?)?;
    println!("Found {} ad groups", ad_groups.len());

    let Some(ad_group) = ad_groups.first() else {
        return Ok(());
    };
    println!("First ad group: {} (ID: {})", ad_group.name, ad_group.id);

    let ads: Vec<Ad> = parse_list(client.get_ads(campaign.id, ad_group.id)?)?;
    println!("Found {} ads", ads.len());

    if let Some(ad) = ads.first() {
        println!("First ad: (ID: {})", ad.id);
        let ad_stats = client.get_ad_stats(campaign.id, ad_group.id, ad.id, &query)?;
        println!("Ad stats: {}", ad_stats);
    }

    Ok(())
}
