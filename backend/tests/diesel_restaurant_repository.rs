//! Diesel restaurant and dish adapters against embedded PostgreSQL.
//!
//! Each test provisions its own database from the migrated template and
//! drives the adapters from a dedicated runtime, so cluster bootstrap never
//! runs inside an async context.

use pg_embedded_setup_unpriv::TemporaryDatabase;
use restaurants::domain::ports::{
    DeleteOutcome, DishRepository, DishRepositoryError, RestaurantRepository,
    RestaurantRepositoryError, UpdateOutcome,
};
use restaurants::domain::{
    Address, Dish, DishDraft, DishId, NewDish, NewRestaurant, Price, RestaurantId,
    RestaurantUpdate,
};
use restaurants::outbound::persistence::{
    DbPool, DieselDishRepository, DieselRestaurantRepository, PoolConfig,
};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

mod support;

use support::{handle_cluster_setup_failure, provision_database, shared_cluster};

/// Adapters over one temporary database.
///
/// Field order matters: the runtime and pooled connections go before the
/// database guard drops it.
struct DieselWorld {
    runtime: Runtime,
    restaurants: DieselRestaurantRepository,
    dishes: DieselDishRepository,
    _database: TemporaryDatabase,
}

impl DieselWorld {
    fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

fn setup_world() -> Result<DieselWorld, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = provision_database(cluster)?;

    let config = PoolConfig::new(database.url()).with_max_size(2);
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    Ok(DieselWorld {
        runtime,
        restaurants: DieselRestaurantRepository::new(pool.clone()),
        dishes: DieselDishRepository::new(pool),
        _database: database,
    })
}

#[fixture]
fn diesel_world() -> Option<DieselWorld> {
    match setup_world() {
        Ok(world) => Some(world),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn draft(name: &str, cents: i64) -> DishDraft {
    DishDraft {
        name: name.to_owned(),
        description: format!("{name} of the day"),
        price: Price::from_cents(cents),
        kilo_calories: Some(450.0),
    }
}

fn chipotle(dishes: Vec<DishDraft>) -> NewRestaurant {
    NewRestaurant {
        name: "Chipotle".to_owned(),
        description: "Burritos".to_owned(),
        category: "Mexican".to_owned(),
        has_delivery: true,
        contact_email: Some("hello@chipotle.test".to_owned()),
        contact_phone: None,
        address: Some(Address {
            street: "Main Street 1".to_owned(),
            city: "Warsaw".to_owned(),
            zip_code: "00950".to_owned(),
            country: "Poland".to_owned(),
        }),
        dishes,
    }
}

#[rstest]
fn create_then_find_returns_every_field(diesel_world: Option<DieselWorld>) {
    let Some(world) = diesel_world else {
        return;
    };
    let new = chipotle(vec![draft("Burrito", 1250), draft("Taco", 299)]);

    let (id, found, listed) = world.block_on(async {
        let id = world.restaurants.create(&new).await.expect("insert");
        let found = world.restaurants.find_by_id(&id).await.expect("select");
        let listed = world.restaurants.list_all().await.expect("list");
        (id, found, listed)
    });

    let restaurant = found.expect("restaurant stored");
    assert_eq!(restaurant.id, id);
    assert_eq!(restaurant.name, new.name);
    assert_eq!(restaurant.category, new.category);
    assert_eq!(restaurant.contact_email, new.contact_email);
    assert_eq!(restaurant.contact_phone, None);
    assert_eq!(restaurant.address, new.address);
    let names: Vec<&str> = restaurant.dishes.iter().map(|dish| dish.name.as_str()).collect();
    assert_eq!(names, ["Burrito", "Taco"]);
    assert!(restaurant.dishes.iter().all(|dish| dish.restaurant_id == id));
    assert_eq!(listed, vec![restaurant]);
}

#[rstest]
fn failing_dish_insert_rolls_back_the_restaurant(diesel_world: Option<DieselWorld>) {
    let Some(world) = diesel_world else {
        return;
    };
    // The price check constraint rejects the second dish.
    let new = chipotle(vec![draft("Burrito", 1250), draft("Water", 0)]);

    let (created, listed) = world.block_on(async {
        let created = world.restaurants.create(&new).await;
        let listed = world.restaurants.list_all().await.expect("list");
        (created, listed)
    });

    assert!(matches!(
        created,
        Err(RestaurantRepositoryError::Query { .. })
    ));
    assert!(listed.is_empty());
}

#[rstest]
fn missing_restaurants_report_not_found(diesel_world: Option<DieselWorld>) {
    let Some(world) = diesel_world else {
        return;
    };
    let missing = RestaurantId::random();
    let update = RestaurantUpdate {
        name: Some("Ghost Kitchen".to_owned()),
        ..RestaurantUpdate::default()
    };

    let (found, updated, deleted, listed) = world.block_on(async {
        (
            world.restaurants.find_by_id(&missing).await.expect("select"),
            world.restaurants.update(&missing, &update).await.expect("update"),
            world.restaurants.delete(&missing).await.expect("delete"),
            world.restaurants.list_all().await.expect("list"),
        )
    });

    assert!(found.is_none());
    assert_eq!(updated, UpdateOutcome::NotFound);
    assert_eq!(deleted, DeleteOutcome::NotFound);
    assert!(listed.is_empty());
}

#[rstest]
fn update_overwrites_supplied_columns_idempotently(diesel_world: Option<DieselWorld>) {
    let Some(world) = diesel_world else {
        return;
    };
    let update = RestaurantUpdate {
        name: Some("Chipotle Grill".to_owned()),
        has_delivery: Some(false),
        contact_email: Some(None),
        ..RestaurantUpdate::default()
    };

    let (first, second, stored) = world.block_on(async {
        let id = world.restaurants.create(&chipotle(Vec::new())).await.expect("insert");
        let first = world.restaurants.update(&id, &update).await.expect("update");
        let once = world.restaurants.find_by_id(&id).await.expect("select");
        let second = world.restaurants.update(&id, &update).await.expect("update again");
        let twice = world.restaurants.find_by_id(&id).await.expect("select");
        assert_eq!(once, twice);
        (first, second, twice)
    });

    assert_eq!(first, UpdateOutcome::Updated);
    assert_eq!(second, UpdateOutcome::Updated);
    let restaurant = stored.expect("restaurant stored");
    assert_eq!(restaurant.name, "Chipotle Grill");
    assert!(!restaurant.has_delivery);
    assert_eq!(restaurant.contact_email, None);
    assert_eq!(restaurant.category, "Mexican");
}

#[rstest]
fn deleting_a_restaurant_cascades_to_its_dishes(diesel_world: Option<DieselWorld>) {
    let Some(world) = diesel_world else {
        return;
    };

    let (deleted, remaining, orphan) = world.block_on(async {
        let id = world
            .restaurants
            .create(&chipotle(vec![draft("Burrito", 1250)]))
            .await
            .expect("insert");
        let dish_id = world
            .dishes
            .list_for_restaurant(&id)
            .await
            .expect("list dishes")
            .first()
            .map(|dish| dish.id)
            .expect("dish stored");
        let deleted = world.restaurants.delete(&id).await.expect("delete");
        let remaining = world.dishes.list_for_restaurant(&id).await.expect("list dishes");
        let orphan = world.dishes.get_by_id(&dish_id).await;
        (deleted, remaining, orphan)
    });

    assert_eq!(deleted, DeleteOutcome::Deleted);
    assert!(remaining.is_empty());
    assert!(matches!(orphan, Err(DishRepositoryError::NotFound { .. })));
}

#[rstest]
fn dish_for_missing_restaurant_is_a_referential_failure(diesel_world: Option<DieselWorld>) {
    let Some(world) = diesel_world else {
        return;
    };
    let missing = RestaurantId::random();

    let created = world.block_on(world.dishes.create(&NewDish {
        restaurant_id: missing,
        dish: draft("Taco", 299),
    }));

    assert_eq!(
        created,
        Err(DishRepositoryError::RestaurantNotFound {
            restaurant_id: missing
        })
    );
}

#[rstest]
fn dishes_are_addressed_through_their_owner(diesel_world: Option<DieselWorld>) {
    let Some(world) = diesel_world else {
        return;
    };

    let (foreign_update, foreign_delete, own_update, stored) = world.block_on(async {
        let owner = world.restaurants.create(&chipotle(Vec::new())).await.expect("owner");
        let other = world.restaurants.create(&chipotle(Vec::new())).await.expect("other");
        let dish_id = world
            .dishes
            .create(&NewDish {
                restaurant_id: owner,
                dish: draft("Taco", 299),
            })
            .await
            .expect("dish");

        let mut replacement = Dish::from_draft(dish_id, other, draft("Nachos", 650));
        let foreign_update = world.dishes.update(&replacement).await.expect("update");
        let foreign_delete = world.dishes.delete(&other, &dish_id).await.expect("delete");
        replacement.restaurant_id = owner;
        let own_update = world.dishes.update(&replacement).await.expect("update");
        let stored = world.dishes.get_by_id(&dish_id).await.expect("select");
        (foreign_update, foreign_delete, own_update, stored)
    });

    assert_eq!(foreign_update, UpdateOutcome::NotFound);
    assert_eq!(foreign_delete, DeleteOutcome::NotFound);
    assert_eq!(own_update, UpdateOutcome::Updated);
    assert_eq!(stored.name, "Nachos");
    assert_eq!(stored.price, Price::from_cents(650));
}

#[rstest]
fn longest_accepted_values_fit_their_columns(diesel_world: Option<DieselWorld>) {
    let Some(world) = diesel_world else {
        return;
    };
    let mut new = chipotle(Vec::new());
    new.contact_email = Some(format!("{}@chipotle.test", "a".repeat(306)));
    new.contact_phone = Some("1".repeat(32));
    if let Some(address) = new.address.as_mut() {
        address.country = "P".repeat(100);
    }

    let stored = world.block_on(async {
        let id = world.restaurants.create(&new).await.expect("insert");
        world.restaurants.find_by_id(&id).await.expect("select")
    });

    let restaurant = stored.expect("restaurant stored");
    assert_eq!(restaurant.contact_email, new.contact_email);
    assert_eq!(restaurant.contact_phone, new.contact_phone);
}

#[rstest]
fn unknown_dish_is_not_found(diesel_world: Option<DieselWorld>) {
    let Some(world) = diesel_world else {
        return;
    };
    let missing = DishId::random();

    let found = world.block_on(world.dishes.get_by_id(&missing));

    assert_eq!(found, Err(DishRepositoryError::NotFound { dish_id: missing }));
}
