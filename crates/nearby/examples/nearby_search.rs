//! Register a user and search around an address
//!
//! This example demonstrates the end-to-end workflows against live collaborators:
//! - Loading the directory listing
//! - Registering a user at a geocoded address
//! - Searching for users within a radius and drawing the result
//!
//! Point it at your own backend with `NEARBY_DIRECTORY_URL`. Without one, the directory
//! calls fail and clearly marked demo data is shown instead.

use nearby::{
    MapScene, MapViewConfig, NearbySearchForm, OrchestratorConfigBuilder, RegistrationForm,
    SearchOrchestrator, ServicesConfig,
};
use tracing::Level;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    nearby::init_logging(Level::INFO)?;

    let services = ServicesConfig::from_env();
    let config = OrchestratorConfigBuilder::demo().build()?;
    let mut orchestrator = SearchOrchestrator::from_services(&services, config)?;

    println!("{}", orchestrator.load_users().await);

    let mut form = RegistrationForm::new("PuppyParent", "Kenmore, WA");
    println!("{}", orchestrator.register(&mut form).await);

    let search = NearbySearchForm::new("Bothell, WA", 5.0);
    println!("{}", orchestrator.search_nearby(&search).await);

    let projection = orchestrator.projection();
    println!("\nNearby Users Found:");
    for username in projection.nearby_usernames() {
        println!("  - {username}");
    }

    let scene = MapScene::from_projection(&projection, &MapViewConfig::default());
    println!("\nMap scene ({} markers):", scene.markers.len());
    for marker in &scene.markers {
        println!(
            "  {:<14} ({:.4}, {:.4}) {}",
            marker.key, marker.latitude, marker.longitude, marker.popup
        );
    }
    if let Some(circle) = scene.circle {
        println!("  circle radius: {:.0} m", circle.radius_meters);
    }

    Ok(())
}
