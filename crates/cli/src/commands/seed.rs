//! Seed the database with synthetic development data.
//!
//! Rows are created sequentially, each awaited before the next, so the
//! post-seed counts always equal the targets below. Fixed password for
//! every seeded account is `secret`.

use chrono::{DateTime, TimeZone, Utc};
use fake::Fake;
use fake::faker::address::en::{BuildingNumber, CityName, CountryName, StreetName, ZipCode};
use fake::faker::company::en::{Buzzword, CompanyName};
use fake::faker::lorem::en::{Sentence, Word};
use fake::faker::name::en::{FirstName, LastName};
use fake::faker::phone_number::en::PhoneNumber;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use secrecy::SecretString;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use marzipan_core::RoleKind;

use marzipan_api::auth::hash_password;
use marzipan_api::db::catalog::CatalogRepository;
use marzipan_api::db::create_pool;
use marzipan_api::db::orders::{self, CartRepository, OrderRepository};
use marzipan_api::db::users::{self, NewUser, UserRepository};
use marzipan_api::models::order::Order;
use marzipan_api::models::user::AddressFieldsInput;

const USERS: usize = 100;
const INVENTORY_GROUPS: usize = 100;
const CATEGORIES: usize = 35;
const DELIVERY_SERVICE_PROVIDERS: usize = 5;
const IMAGES: usize = 500;

const SEED_PASSWORD: &str = "secret";

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/120.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_2) AppleWebKit/605.1.15 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 17_2 like Mac OS X) Mobile/15E148",
    "curl/8.5.0",
];

/// Seed the full dataset.
///
/// # Errors
///
/// Returns the first infrastructure or insert error; nothing is rolled
/// back, partial data stays in place.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| "DATABASE_URL not set")?;

    let pool = create_pool(&database_url).await?;
    info!("Connected to database");

    seed_all(&pool).await?;

    info!("Seeding complete");
    Ok(())
}

async fn seed_all(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
    let mut rng = StdRng::from_entropy();

    info!("Seeding roles");
    for kind in [RoleKind::Admin, RoleKind::Customer] {
        users::insert_role(pool, kind.name()).await?;
    }

    info!("Seeding {USERS} users");
    let user_uids = seed_users(pool, &mut rng).await?;

    info!("Seeding {CATEGORIES} categories");
    let catalog = CatalogRepository::new(pool);
    let mut category_ids = Vec::with_capacity(CATEGORIES);
    for _ in 0..CATEGORIES {
        let name: String = Word().fake();
        category_ids.push(catalog.insert_category(&name).await?.id);
    }

    info!("Seeding {DELIVERY_SERVICE_PROVIDERS} delivery service providers");
    let mut provider_ids = Vec::with_capacity(DELIVERY_SERVICE_PROVIDERS);
    for _ in 0..DELIVERY_SERVICE_PROVIDERS {
        let name: String = CompanyName().fake();
        let provider = catalog
            .insert_delivery_service_provider(&name, Utc::now())
            .await?;
        provider_ids.push(provider.id);
    }

    info!("Seeding {IMAGES} images");
    for i in 0..IMAGES {
        catalog
            .insert_image(&format!("https://img.marzipan.example/{i}.jpg"))
            .await?;
        log_progress("images", i + 1, IMAGES);
    }

    info!("Seeding {INVENTORY_GROUPS} inventory groups");
    let group_ids = seed_inventory_groups(pool, &mut rng, &category_ids).await?;

    info!("Seeding per-user associations");
    seed_user_associations(pool, &mut rng, &user_uids, &group_ids, &provider_ids).await?;

    Ok(())
}

async fn seed_users(
    pool: &PgPool,
    rng: &mut StdRng,
) -> Result<Vec<Uuid>, Box<dyn std::error::Error>> {
    let users = UserRepository::new(pool);
    // Every seeded account shares one password, so one hash is enough.
    let password_hash = hash_password(SEED_PASSWORD)?;

    let mut uids = Vec::with_capacity(USERS);
    for i in 0..USERS {
        let firstname: String = FirstName().fake();
        let lastname: String = LastName().fake();
        // Indexed local part keeps the unique email constraint satisfied.
        let email = format!(
            "{}.{}.{i}@seed.marzipan.example",
            firstname.to_lowercase(),
            lastname.to_lowercase()
        );
        let user = users
            .create(NewUser {
                email,
                password_hash: password_hash.clone(),
                firstname,
                lastname,
                last_user_agent: USER_AGENTS.choose(rng).map(|ua| (*ua).to_owned()),
                phone_number: PhoneNumber().fake(),
                role_id: RoleKind::Customer.id().as_i32(),
            })
            .await?;
        uids.push(user.uid);
        log_progress("users", i + 1, USERS);
    }
    Ok(uids)
}

async fn seed_inventory_groups(
    pool: &PgPool,
    rng: &mut StdRng,
    category_ids: &[i32],
) -> Result<Vec<i32>, Box<dyn std::error::Error>> {
    let catalog = CatalogRepository::new(pool);

    let mut group_ids = Vec::with_capacity(INVENTORY_GROUPS);
    for i in 0..INVENTORY_GROUPS {
        let item_name = format!("{} {}", Buzzword().fake::<String>(), Word().fake::<String>());
        let price = f64::from(rng.gen_range(100..50_000)) / 100.0;
        let amount = rng.gen_range(1..=50);
        let group = catalog
            .insert_group(&item_name, price, amount, amount, rng.gen_bool(0.2))
            .await?;
        group_ids.push(group.id);
        log_progress("inventory groups", i + 1, INVENTORY_GROUPS);
    }

    // Distinct draws keep the unique barcode constraint satisfied.
    let barcodes = make_barcodes(rng, INVENTORY_GROUPS);

    for (i, &group_id) in group_ids.iter().enumerate() {
        if let Some(&category_id) = category_ids.choose(rng) {
            catalog.link_category(group_id, category_id).await?;
        }

        let image = catalog
            .insert_image(&format!(
                "https://img.marzipan.example/groups/{group_id}.jpg"
            ))
            .await?;
        catalog.link_image(group_id, image.id).await?;

        if let Some(&related_id) = group_ids.choose(rng) {
            catalog.link_related(group_id, related_id).await?;
        }

        let note: String = Sentence(3..8).fake();
        let arrived_at = compose_arrival_date(rng.gen_range(1..=12), rng.gen_range(1..=28));
        catalog
            .insert_item(barcodes[i], &note, arrived_at, group_id)
            .await?;
        log_progress("group associations", i + 1, INVENTORY_GROUPS);
    }

    Ok(group_ids)
}

async fn seed_user_associations(
    pool: &PgPool,
    rng: &mut StdRng,
    user_uids: &[Uuid],
    group_ids: &[i32],
    provider_ids: &[i32],
) -> Result<(), Box<dyn std::error::Error>> {
    let orders_repo = OrderRepository::new(pool);
    let cart = CartRepository::new(pool);

    for (i, &uid) in user_uids.iter().enumerate() {
        let street = format!(
            "{} {}",
            BuildingNumber().fake::<String>(),
            StreetName().fake::<String>()
        );
        users::insert_address(
            pool,
            &street,
            &CityName().fake::<String>(),
            &ZipCode().fake::<String>(),
            &CountryName().fake::<String>(),
            uid,
        )
        .await?;

        let (Some(&group_id), Some(&provider_id)) =
            (group_ids.choose(rng), provider_ids.choose(rng))
        else {
            return Err("cannot seed associations without groups and providers".into());
        };

        let description: String = Sentence(3..10).fake();
        orders::insert_review(pool, uid, group_id, &description, random_rating(rng)).await?;

        let order = orders_repo
            .place_order(
                uid,
                &AddressFieldsInput {
                    street,
                    city: CityName().fake(),
                    zip: ZipCode().fake(),
                    country: CountryName().fake(),
                },
                provider_id,
                &[group_id],
            )
            .await?;

        // Seeded orders represent completed history, not open checkouts.
        orders_repo
            .save(Order {
                confirmed: true,
                ..order
            })
            .await?;

        cart.create(group_id, uid, 1).await?;
        log_progress("user associations", i + 1, user_uids.len());
    }

    Ok(())
}

/// Log progress at every tenth of the total.
fn log_progress(label: &str, done: usize, total: usize) {
    let step = (total / 10).max(1);
    if done % step == 0 || done == total {
        info!("{label}: {}%", as_percent(done, total));
    }
}

/// Completed share of `total`, in whole percent.
fn as_percent(done: usize, total: usize) -> usize {
    done * 100 / total.max(1)
}

/// A seeded review rating, in `0..=4`.
fn random_rating(rng: &mut StdRng) -> i32 {
    rng.gen_range(0..=4)
}

/// Draw `count` distinct barcodes in `0..=999_999`.
fn make_barcodes(rng: &mut StdRng, count: usize) -> Vec<i64> {
    index::sample(rng, 1_000_000, count)
        .into_iter()
        .map(|i| i as i64)
        .collect()
}

/// An arrival timestamp composed from a month and a day-of-month.
fn compose_arrival_date(month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, month, day, 8, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_whole_and_bounded() {
        assert_eq!(as_percent(0, 100), 0);
        assert_eq!(as_percent(35, 100), 35);
        assert_eq!(as_percent(100, 100), 100);
        assert_eq!(as_percent(1, 3), 33);
        // A zero total cannot divide by zero.
        assert_eq!(as_percent(0, 0), 0);
    }

    #[test]
    fn barcodes_are_distinct_and_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let barcodes = make_barcodes(&mut rng, 100);
        assert_eq!(barcodes.len(), 100);
        assert!(barcodes.iter().all(|&b| (0..1_000_000).contains(&b)));
        let mut sorted = barcodes.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), barcodes.len());
    }

    #[test]
    fn ratings_stay_within_the_generated_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1_000 {
            let rating = random_rating(&mut rng);
            assert!((0..=4).contains(&rating), "rating {rating} out of range");
        }
    }

    #[test]
    fn arrival_date_uses_given_month_and_day() {
        use chrono::Datelike;
        let date = compose_arrival_date(3, 14);
        assert_eq!(date.month(), 3);
        assert_eq!(date.day(), 14);
    }
}
