//! Builders selecting the storage adapters behind the dispatcher.

use std::sync::Arc;

use actix_web::web;
use tracing::info;

use restaurants::domain::{AmbientUserContext, DomainPorts, build_dispatcher};
use restaurants::inbound::http::state::HttpState;
use restaurants::outbound::memory::InMemoryStore;
use restaurants::outbound::persistence::{
    DbPool, DieselDishRepository, DieselIdentityStore, DieselRestaurantRepository,
};

use super::ServerConfig;

/// Select ports built from `pool` when present, otherwise a fresh
/// [`InMemoryStore`] behind every port.
fn build_ports_with_pool<Pool>(
    pool: Option<&Pool>,
    make_ports: impl FnOnce(&Pool) -> DomainPorts,
) -> DomainPorts {
    match pool {
        Some(pool) => make_ports(pool),
        None => {
            info!("no database configured; serving from the in-memory store");
            let store = InMemoryStore::new();
            DomainPorts {
                restaurants: Arc::new(store.clone()),
                dishes: Arc::new(store.clone()),
                identity: Arc::new(store),
                user_context: Arc::new(AmbientUserContext),
            }
        }
    }
}

fn diesel_ports(pool: &DbPool) -> DomainPorts {
    DomainPorts {
        restaurants: Arc::new(DieselRestaurantRepository::new(pool.clone())),
        dishes: Arc::new(DieselDishRepository::new(pool.clone())),
        identity: Arc::new(DieselIdentityStore::new(pool.clone())),
        user_context: Arc::new(AmbientUserContext),
    }
}

/// Build the shared HTTP state around a fully wired dispatcher.
///
/// # Errors
/// Returns [`std::io::Error`] when the handler registrations are inconsistent.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let ports = build_ports_with_pool(config.db_pool.as_ref(), diesel_ports);
    let dispatcher = build_dispatcher(ports)
        .map_err(|err| std::io::Error::other(format!("dispatcher wiring failed: {err}")))?;
    Ok(web::Data::new(HttpState::new(Arc::new(dispatcher))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use restaurants::domain::ports::FixtureRestaurantRepository;
    use restaurants::domain::{CreateRestaurant, GetAllRestaurants, RequestContext};
    use rstest::rstest;

    fn create_request(name: &str) -> CreateRestaurant {
        CreateRestaurant {
            name: name.to_owned(),
            description: String::new(),
            category: "Italian".to_owned(),
            has_delivery: false,
            contact_email: String::new(),
            contact_phone: String::new(),
            address: None,
            dishes: Vec::new(),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn pool_absent_serves_from_memory() {
        let ports = build_ports_with_pool::<()>(None, |_| unreachable!("no pool"));
        let dispatcher = build_dispatcher(ports).expect("wiring is consistent");

        dispatcher
            .send(create_request("Trattoria"), &RequestContext::new())
            .await
            .expect("create succeeds");
        let all = dispatcher
            .send(GetAllRestaurants, &RequestContext::new())
            .await
            .expect("list succeeds");
        assert_eq!(all.len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn pool_present_uses_supplied_ports() {
        let ports = build_ports_with_pool(Some(&()), |_| {
            let store = InMemoryStore::new();
            DomainPorts {
                restaurants: Arc::new(FixtureRestaurantRepository),
                dishes: Arc::new(store.clone()),
                identity: Arc::new(store),
                user_context: Arc::new(AmbientUserContext),
            }
        });
        let dispatcher = build_dispatcher(ports).expect("wiring is consistent");

        let all = dispatcher
            .send(GetAllRestaurants, &RequestContext::new())
            .await
            .expect("fixture lists");
        assert!(all.is_empty());
    }
}
