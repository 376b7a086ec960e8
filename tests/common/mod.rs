#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::test::TestRequest;
use actix_web::web::Data;
use actix_web::{App, Error};

use drs::auth::jwt::generate_access_token;
use drs::config::Config;
use drs::model::user::{ExtraFields, User};
use drs::routes;
use drs::service::accounts::create_user;
use drs::store::{MemoryStore, Store};

pub const SECRET: &str = "integration-secret";
pub const PASSWORD: &str = "correct horse battery staple";

pub struct TestEnv {
    pub store: Arc<dyn Store>,
    pub config: Config,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_config(Config::for_memory(SECRET))
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            config,
        }
    }

    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = Error,
            InitError = (),
        > + use<>,
    > {
        let config = self.config.clone();
        App::new()
            .app_data(Data::from(self.store.clone()))
            .app_data(Data::new(self.config.clone()))
            .configure(move |cfg| routes::configure(cfg, &config))
    }

    pub async fn user(&self, email: &str, is_staff: bool) -> User {
        let extra = ExtraFields {
            is_staff: Some(is_staff),
            ..ExtraFields::default()
        };
        create_user(self.store.as_ref(), email, Some(PASSWORD), extra)
            .await
            .unwrap()
    }

    pub async fn superuser(&self, email: &str) -> User {
        let extra = ExtraFields {
            is_staff: Some(true),
            is_superuser: Some(true),
            ..ExtraFields::default()
        };
        create_user(self.store.as_ref(), email, Some(PASSWORD), extra)
            .await
            .unwrap()
    }

    pub fn token(&self, user: &User) -> String {
        generate_access_token(user, SECRET, 900).unwrap()
    }
}

fn peer() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

/// Request from a fixed peer address; the rate limiter keys on it.
pub fn request() -> TestRequest {
    TestRequest::default().peer_addr(peer())
}

pub fn get(uri: &str, token: &str) -> TestRequest {
    TestRequest::get()
        .uri(uri)
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {token}")))
}

pub fn post(uri: &str, token: &str) -> TestRequest {
    TestRequest::post()
        .uri(uri)
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {token}")))
}

pub fn put(uri: &str, token: &str) -> TestRequest {
    TestRequest::put()
        .uri(uri)
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {token}")))
}

pub fn delete(uri: &str, token: &str) -> TestRequest {
    TestRequest::delete()
        .uri(uri)
        .peer_addr(peer())
        .insert_header(("Authorization", format!("Bearer {token}")))
}
