//! Seed data script - populates the database with a demo station
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates:
//! - an admin and a super admin account
//! - 4 pumps
//! - shop inventory
//!
//! Records are matched by email or name, so running it twice changes nothing.

use anyhow::Context;
use clap::Parser;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use gas_station_api::{
    auth::{AuthError, AuthService, Role},
    events::EventSender,
    models::PumpStatus,
    services::{
        inventory::{CreateInventoryItemRequest, InventoryFilter, InventoryService},
        pump_ledger::{CreatePumpRequest, PumpLedgerService},
    },
};

#[derive(Debug, Parser)]
#[command(name = "seed-data", about = "Seed a demo gas station")]
struct Args {
    /// Database URL; defaults to the configured one
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Run migrations before seeding
    #[arg(long)]
    migrate: bool,

    #[arg(long, default_value = "admin@gasstation.com")]
    admin_email: String,

    #[arg(long, default_value = "Admin123!")]
    admin_password: String,

    #[arg(long, default_value = "superadmin@gasstation.com")]
    super_admin_email: String,

    #[arg(long, default_value = "SuperAdmin123!")]
    super_admin_password: String,
}

const PUMPS: [(&str, &str, f64, PumpStatus); 4] = [
    ("Pompe 1", "Sans Plomb", 2.525, PumpStatus::Available),
    ("Pompe 2", "Sans Plomb Premium", 2.775, PumpStatus::Available),
    ("Pompe 3", "Gasoil", 2.205, PumpStatus::Available),
    ("Pompe 4", "Gasoil 50", 2.380, PumpStatus::Maintenance),
];

// name, category, quantity, unit price, supplier, low stock threshold
const INVENTORY: [(&str, &str, i32, f64, &str, i32); 6] = [
    ("Huile Moteur 5W30", "Accessoires Auto", 50, 25.99, "AutoSupplies", 10),
    ("Lave-Glace", "Accessoires Auto", 35, 4.99, "AutoSupplies", 8),
    ("Boisson Energisante", "Boissons", 120, 2.49, "RefreshCo", 20),
    ("Eau Minerale 1.5L", "Boissons", 200, 0.90, "RefreshCo", 40),
    ("Barre Chocolatee", "Snacks", 80, 1.50, "SnackCorp", 15),
    ("Liquide de Refroidissement", "Accessoires Auto", 25, 12.50, "AutoSupplies", 5),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();
    let mut cfg = gas_station_api::config::load_config().context("failed to load configuration")?;
    if let Some(url) = args.database_url.clone() {
        cfg.database_url = url;
    }

    info!("=== Gas Station Seed Data ===");
    let db = gas_station_api::db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to the database")?;
    if args.migrate || cfg.auto_migrate {
        gas_station_api::db::run_migrations(&db).await?;
    }
    let db = Arc::new(db);

    // Events are only logged by the server; the seed keeps the receiver alive and ignores it.
    let (events, _event_rx) = EventSender::channel(cfg.event_channel_capacity);

    let auth = AuthService::new((&cfg).into(), db.clone());
    seed_user(&auth, "Admin User", &args.admin_email, &args.admin_password, Role::Admin).await?;
    seed_user(
        &auth,
        "Super Admin",
        &args.super_admin_email,
        &args.super_admin_password,
        Role::SuperAdmin,
    )
    .await?;

    let pumps = PumpLedgerService::new(db.clone(), events.clone(), cfg.station_offset());
    let created = seed_pumps(&pumps).await?;
    info!("  Created {} pumps", created);

    let inventory = InventoryService::new(db.clone(), events);
    let created = seed_inventory(&inventory).await?;
    info!("  Created {} inventory items", created);

    info!("=== Seed Data Complete ===");
    info!("Log in with {} / {}", args.admin_email, args.admin_password);
    info!("Or explore interactively at: http://localhost:{}/swagger-ui", cfg.port);

    Ok(())
}

async fn seed_user(
    auth: &AuthService,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<()> {
    match auth.create_user(name, email, password, role).await {
        Ok(user) => info!("  Created {} account {}", user.role, user.email),
        Err(AuthError::EmailTaken) => info!("  Account {} already exists", email),
        Err(e) => return Err(anyhow::anyhow!("failed to create {}: {}", email, e)),
    }
    Ok(())
}

async fn seed_pumps(service: &PumpLedgerService) -> anyhow::Result<usize> {
    let existing: HashSet<String> = service
        .list_pumps()
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();

    let mut created = 0;
    for (name, fuel_type, price, status) in PUMPS {
        if existing.contains(name) {
            continue;
        }
        service
            .create_pump(CreatePumpRequest {
                name: name.to_string(),
                fuel_type: fuel_type.to_string(),
                price_per_liter: price,
                current_index: None,
                previous_index: None,
                status: Some(status),
            })
            .await?;
        created += 1;
    }
    Ok(created)
}

async fn seed_inventory(service: &InventoryService) -> anyhow::Result<usize> {
    let existing: HashSet<String> = service
        .list(InventoryFilter::default())
        .await?
        .into_iter()
        .map(|i| i.item.name)
        .collect();

    let mut created = 0;
    for (name, category, quantity, unit_price, supplier, threshold) in INVENTORY {
        if existing.contains(name) {
            continue;
        }
        service
            .create(CreateInventoryItemRequest {
                name: name.to_string(),
                category: category.to_string(),
                quantity: Some(quantity),
                unit_price,
                supplier: Some(supplier.to_string()),
                low_stock_threshold: Some(threshold),
            })
            .await?;
        created += 1;
    }
    Ok(created)
}
