#![deny(clippy::all)]
#![warn(clippy::nursery)]
#![warn(clippy::pedantic)]
#![warn(clippy::todo)]
// #![warn(clippy::cargo)]
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]

#[tokio::main]
async fn main() {
    app::run().await;
}


pub mod cfg {
    mod app_settings;
    mod database_settings;
    mod jwt_settings;
    mod server_settings;
    mod streaming_settings;

    pub use app_settings::*;
    pub use database_settings::*;
    pub use jwt_settings::*;
    pub use server_settings::*;
    pub use streaming_settings::*;
}

pub mod core {
    mod context;
    mod dbpool;

    pub use context::*;
    pub use dbpool::*;
}

pub mod auth {
    mod jwt;
    mod password;

    pub use jwt::*;
    pub use password::*;
}

pub mod db {
    mod playlists;
    mod repository;
    mod store;
    mod tenants;
    mod tracks;
    mod users;

    pub use playlists::*;
    pub use repository::*;
    pub use store::*;
    pub use tenants::*;
    pub use tracks::*;
    pub use users::*;
}

pub mod services {
    pub mod audit;
    pub mod auth;
    pub mod catalog;
    pub mod plan_gate;
    pub mod playlists;
    pub mod signer;
    pub mod streaming;
    pub mod tenants;
}

pub mod routes {
    pub mod auth;
    pub mod health;
    pub mod playlists;
    pub mod tenant;
    pub mod tracks;
}

pub mod app {
    mod cli;
    mod migrations;
    mod router;
    mod server;

    pub use cli::*;
    pub use migrations::*;
    pub use router::*;
    pub use server::*;
}
