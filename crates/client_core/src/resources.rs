//! Account and transaction endpoints.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use shared::{
    domain::{Account, AccountId, Identity, Transaction, TransactionId},
    protocol::{FormData, Reply},
};

use crate::{
    error::RequestError,
    transport::{Request, RequestClient},
};

#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Accounts owned by `owner`, in server order.
    async fn list(&self, owner: &Identity) -> Result<Reply<Vec<Account>>, RequestError>;
    async fn get(&self, id: AccountId, options: &FormData) -> Result<Reply<Account>, RequestError>;
    async fn create(&self, fields: &FormData) -> Result<Reply, RequestError>;
    async fn remove(&self, id: AccountId, options: &FormData) -> Result<Reply, RequestError>;
}

#[async_trait]
pub trait TransactionApi: Send + Sync {
    async fn list(&self, options: &FormData) -> Result<Reply<Vec<Transaction>>, RequestError>;
    async fn create(&self, fields: &FormData) -> Result<Reply, RequestError>;
    async fn remove(&self, id: TransactionId, options: &FormData)
        -> Result<Reply, RequestError>;
}

/// CRUD calls shared by every collection under one path.
#[derive(Debug, Clone)]
struct Endpoint {
    client: RequestClient,
    url: String,
}

impl Endpoint {
    fn new(client: RequestClient, base_url: &str, path: &str) -> Self {
        Self {
            client,
            url: format!("{}/{path}", base_url.trim_end_matches('/')),
        }
    }

    async fn list<T: DeserializeOwned>(&self, data: FormData) -> Result<Reply<T>, RequestError> {
        self.client
            .send_json(Request::get(self.url.as_str()).with_data(data))
            .await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        id: impl std::fmt::Display,
        data: FormData,
    ) -> Result<Reply<T>, RequestError> {
        self.client
            .send_json(Request::get(format!("{}/{id}", self.url)).with_data(data))
            .await
    }

    async fn create(&self, data: FormData) -> Result<Reply, RequestError> {
        self.client
            .send_json(Request::put(self.url.as_str()).with_data(data))
            .await
    }

    async fn remove(&self, data: FormData) -> Result<Reply, RequestError> {
        self.client
            .send_json(Request::delete(self.url.as_str()).with_data(data))
            .await
    }
}

#[derive(Debug, Clone)]
pub struct RemoteAccounts {
    endpoint: Endpoint,
}

impl RemoteAccounts {
    pub fn new(client: RequestClient, base_url: &str) -> Self {
        Self {
            endpoint: Endpoint::new(client, base_url, "account"),
        }
    }
}

#[async_trait]
impl AccountApi for RemoteAccounts {
    async fn list(&self, owner: &Identity) -> Result<Reply<Vec<Account>>, RequestError> {
        self.endpoint.list(FormData::from(owner)).await
    }

    async fn get(&self, id: AccountId, options: &FormData) -> Result<Reply<Account>, RequestError> {
        self.endpoint.get(id, options.clone()).await
    }

    async fn create(&self, fields: &FormData) -> Result<Reply, RequestError> {
        self.endpoint.create(fields.clone()).await
    }

    async fn remove(&self, id: AccountId, options: &FormData) -> Result<Reply, RequestError> {
        self.endpoint
            .remove(FormData::new().with("id", id).merge(options))
            .await
    }
}

#[derive(Debug, Clone)]
pub struct RemoteTransactions {
    endpoint: Endpoint,
}

impl RemoteTransactions {
    pub fn new(client: RequestClient, base_url: &str) -> Self {
        Self {
            endpoint: Endpoint::new(client, base_url, "transaction"),
        }
    }
}

#[async_trait]
impl TransactionApi for RemoteTransactions {
    async fn list(&self, options: &FormData) -> Result<Reply<Vec<Transaction>>, RequestError> {
        self.endpoint.list(options.clone()).await
    }

    async fn create(&self, fields: &FormData) -> Result<Reply, RequestError> {
        self.endpoint.create(fields.clone()).await
    }

    async fn remove(
        &self,
        id: TransactionId,
        options: &FormData,
    ) -> Result<Reply, RequestError> {
        self.endpoint
            .remove(FormData::new().with("id", id).merge(options))
            .await
    }
}

#[cfg(test)]
#[path = "tests/resources_tests.rs"]
mod tests;
