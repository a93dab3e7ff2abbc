//! Seed script for development: populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` (reads .env).

use adserve::models::ad::CreateAd;
use adserve::services::ads;
use sqlx::PgPool;

const DEMO_APP_ID: &str = "demo_app";

const CATEGORIES: [(&str, &str, &str); 3] = [
    ("SPORT", "Sport", "Sports-related video ads"),
    ("FOOD", "Food", "Food & restaurants video ads"),
    ("TECH", "Tech", "Technology & apps video ads"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL")?;
    let pool = adserve::db::create_pool(&db_url, 5).await?;

    // Run migrations first
    adserve::db::migrate(&pool).await?;

    println!("=== Ad server seed ===");

    seed_categories(&pool).await?;
    seed_sample_ad(&pool).await?;

    println!("\n=== Seed complete! ===");
    Ok(())
}

async fn seed_categories(pool: &PgPool) -> anyhow::Result<()> {
    for (id, display_name, description) in CATEGORIES {
        sqlx::query(
            "INSERT INTO categories (id, display_name, description) VALUES ($1, $2, $3)
             ON CONFLICT (id) DO UPDATE SET display_name = EXCLUDED.display_name,
                                            description = EXCLUDED.description",
        )
        .bind(id)
        .bind(display_name)
        .bind(description)
        .execute(pool)
        .await?;
    }

    println!("[done] Upserted {} categories", CATEGORIES.len());
    Ok(())
}

async fn seed_sample_ad(pool: &PgPool) -> anyhow::Result<()> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM ads WHERE app_id = $1 AND ad_id = 'ad_sport_001')",
    )
    .bind(DEMO_APP_ID)
    .fetch_one(pool)
    .await?;

    if exists {
        println!("[skip] Sample ad already exists");
        return Ok(());
    }

    let sample = CreateAd {
        ad_id: Some("ad_sport_001".to_string()),
        app_id: Some(DEMO_APP_ID.to_string()),
        category_id: Some("SPORT".to_string()),
        title: Some("Sport Shoes Ad".to_string()),
        video_url: Some("https://samplelib.com/lib/preview/mp4/sample-5s.mp4".to_string()),
        click_url: None,
        status: None,
    }
    .validate(DEMO_APP_ID)?;

    ads::create(pool, &sample).await?;
    println!("[done] Created sample ad ad_sport_001 for {DEMO_APP_ID}");
    Ok(())
}
