use std::sync::Arc;

use crate::auth;
use crate::cfg;
use crate::db;
use crate::services::signer;

pub type ArcContext = Arc<Context>;

#[derive(Clone)]
pub struct Context {
    pub store: db::Store,
    pub jwt: auth::JwtContext,
    pub signer: Arc<dyn signer::UrlSigner>,
    pub settings: cfg::AppSettings,
}

impl Context {
    #[must_use]
    pub fn new(
        store: db::Store,
        jwt: auth::JwtContext,
        signer: Arc<dyn signer::UrlSigner>,
        settings: cfg::AppSettings,
    ) -> ArcContext {
        Self {
            store,
            jwt,
            signer,
            settings,
        }
        .into()
    }
}
