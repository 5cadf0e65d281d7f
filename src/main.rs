use homes_search::models::PropertyRecord;
use homes_search::{
    ClientConfig, FilterState, FilterUpdate, HttpApi, ListView, PropertySearch, SessionContext,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏠 Homes Search");
    info!("===============");

    let config = ClientConfig::from_env()?;
    let api = HttpApi::new(&config, SessionContext::new())?;

    // Arguments: a listing URL query string (e.g. "city=Nairobi&bedrooms__gte=2")
    // and optional free text
    let query = std::env::args().nth(1).unwrap_or_default();
    let mut filter = FilterState::from_query_string(&query);
    if let Some(text) = std::env::args().nth(2) {
        filter.apply(FilterUpdate::Search(text));
    }

    info!("Searching {} with ?{}", config.base_url, filter.to_query_string());
    let search = PropertySearch::open(Arc::new(api), filter, &config);

    let mut view = search.settled().await;
    print_page(&view);

    // Walk forward through the remaining pages
    while view.result.as_ref().is_some_and(|r| r.has_next()) && view.error.is_none() {
        let next = search.filter().page() + 1;
        search.set_page(next);
        view = search.settled().await;
        print_page(&view);
    }

    info!("🔗 Listing URL query: ?{}", search.filter().to_query_string());
    Ok(())
}

fn print_page(view: &ListView<PropertyRecord>) {
    if let Some(error) = &view.error {
        warn!("{}", error);
    }
    let Some(result) = &view.result else {
        return;
    };
    if result.is_empty() {
        println!("No properties found. Try adjusting your filters.");
        return;
    }

    println!(
        "Page {}/{} ({} properties)\n",
        result.page, result.total_pages, result.total_count
    );
    for (i, property) in result.items.iter().enumerate() {
        let number = (result.page - 1) * result.page_size + i as u32 + 1;
        let price = property
            .display_price()
            .map(|p| format!("{p:.0}"))
            .unwrap_or_else(|| "-".to_string());
        println!("{}. {} ({})", number, property.title, price);
        println!(
            "   {} beds, {} baths, {} sqft",
            property.bedrooms.unwrap_or(0),
            property.bathrooms.unwrap_or(0.0),
            property.total_area.unwrap_or(0.0)
        );
        if let Some(place) = property.place() {
            println!("   Location: {}", place);
        }
        if property.featured {
            println!("   ⭐ Featured");
        }
        println!("   ID: {} · {} views", property.id, property.views_count);
        println!();
    }
}
