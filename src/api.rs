// src/api.rs
//! Typed call groups over the [`Gateway`].
//!
//! `Api::call` is the one place a `RequestFailed` is shown to the user.
//! Callers receive the same error back and must not notify again.

use crate::error::ApiError;
use crate::gateway::{ApiRequest, Gateway};
use crate::models::{Ack, Credentials, FundScheme, NewHolding, PortfolioSnapshot, Token, UserOut};
use crate::notify::Notifier;
use log::{error, info};
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub const FIRST_PAGE: u32 = 1;

#[derive(Clone)]
pub struct Api {
    gateway: Gateway,
    notifier: Arc<dyn Notifier>,
}

impl Api {
    pub fn new(gateway: Gateway, notifier: Arc<dyn Notifier>) -> Self {
        Self { gateway, notifier }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { api: self }
    }

    pub fn funds(&self) -> FundsApi<'_> {
        FundsApi { api: self }
    }

    pub fn portfolio(&self) -> PortfolioApi<'_> {
        PortfolioApi { api: self }
    }

    async fn call<T>(&self, request: ApiRequest) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Default,
    {
        match self.gateway.send(request).await {
            Ok(value) => Ok(value),
            Err(e) => Err(self.report(e)),
        }
    }

    /// Shows a request failure once and hands it back for propagation.
    pub fn report(&self, e: ApiError) -> ApiError {
        error!("API error: {}", e);
        self.notifier.error(e.message());
        e
    }
}

pub struct AuthApi<'a> {
    api: &'a Api,
}

impl AuthApi<'_> {
    pub async fn register(&self, credentials: &Credentials) -> Result<UserOut, ApiError> {
        let request = ApiRequest::post(["auth", "register"])
            .json(credentials)
            .map_err(|e| self.api.report(e))?;
        let user: UserOut = self.api.call(request).await?;
        info!("Registered user {}", user.id);
        Ok(user)
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Token, ApiError> {
        let request = ApiRequest::post(["auth", "login"])
            .json(credentials)
            .map_err(|e| self.api.report(e))?;
        self.api.call(request).await
    }
}

pub struct FundsApi<'a> {
    api: &'a Api,
}

impl FundsApi<'_> {
    /// Schemes offered by `fund_house`; `page` defaults to the first page.
    pub async fn get_schemes(
        &self,
        fund_house: &str,
        page: Option<u32>,
    ) -> Result<Vec<FundScheme>, ApiError> {
        let request = ApiRequest::get(["funds", "schemes", fund_house])
            .param("page", page.unwrap_or(FIRST_PAGE));
        let schemes: Vec<FundScheme> = self.api.call(request).await?;
        info!("Fetched {} schemes for {}", schemes.len(), fund_house);
        Ok(schemes)
    }
}

pub struct PortfolioApi<'a> {
    api: &'a Api,
}

impl PortfolioApi<'_> {
    pub async fn get_portfolio(&self, token: &str) -> Result<PortfolioSnapshot, ApiError> {
        let request = ApiRequest::get(["portfolio", ""]).bearer(token);
        let snapshot: PortfolioSnapshot = self.api.call(request).await?;
        info!("Portfolio retrieved with {} holdings.", snapshot.items.len());
        Ok(snapshot)
    }

    /// The backend also expects the token as a query parameter on this call.
    pub async fn add_holding(&self, token: &str, holding: &NewHolding) -> Result<Ack, ApiError> {
        let request = ApiRequest::post(["portfolio", ""])
            .json(holding)
            .map_err(|e| self.api.report(e))?
            .bearer(token)
            .param("token", token);
        let ack: Ack = self.api.call(request).await?;
        info!("Holding added for {}.", holding.fund_name);
        Ok(ack)
    }
}
