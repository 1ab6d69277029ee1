use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::{DirectoryClient, DirectoryError};
use crate::{
    ServicesError,
    config::ServicesConfig,
    models::{NearbyQuery, NewUser, User},
    wire::{SignupResponse, rejection_message},
};

const USERS_PATH: &str = "/users/";
const SIGNUP_PATH: &str = "/signup";
const NEARBY_PATH: &str = "/nearby";

/// reqwest-backed [`DirectoryClient`] for the JSON directory API.
#[derive(Debug, Clone)]
pub struct HttpDirectoryClient {
    client: Client,
    users_url: String,
    signup_url: String,
    nearby_url: String,
}

impl HttpDirectoryClient {
    pub fn new(config: &ServicesConfig) -> Result<Self, ServicesError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: &ServicesConfig) -> Self {
        Self {
            client,
            users_url: config.directory_endpoint(USERS_PATH),
            signup_url: config.directory_endpoint(SIGNUP_PATH),
            nearby_url: config.directory_endpoint(NEARBY_PATH),
        }
    }

    /// Map a response to a decoded body or a directory error.
    ///
    /// 4xx answers are rejections carrying the directory's own wording, anything else
    /// that is not a success is treated as the directory being unavailable.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, DirectoryError> {
        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            let message = rejection_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request rejected")
                    .to_string()
            });
            info!(%status, reason = %message, "Directory rejected request");
            return Err(DirectoryError::rejected(message));
        }
        if !status.is_success() {
            warn!(%status, "Directory answered with a server error");
            return Err(DirectoryError::unreachable(format!(
                "directory answered {status}"
            )));
        }
        response.json::<T>().await.map_err(|e| {
            warn!(error = %e, "Directory returned an unreadable body");
            DirectoryError::unreachable(e)
        })
    }

    /// [`Self::decode`] for reads: a refused read is an unusable directory, not a verdict.
    async fn decode_read<T: DeserializeOwned>(response: Response) -> Result<T, DirectoryError> {
        Self::decode(response).await.map_err(|e| match e {
            DirectoryError::Rejected { message } => {
                warn!(reason = %message, "Directory refused a read");
                DirectoryError::unreachable(message)
            }
            other => other,
        })
    }

    fn transport_error(e: &reqwest::Error) -> DirectoryError {
        warn!(error = %e, timeout = e.is_timeout(), "Directory request failed");
        DirectoryError::unreachable(e)
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    #[instrument(name = "List directory users", skip(self), level = "debug")]
    async fn list_users(&self) -> Result<Vec<User>, DirectoryError> {
        let response = self
            .client
            .get(&self.users_url)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;
        let users: Vec<User> = Self::decode_read(response).await?;
        debug!(count = users.len(), "Directory listing received");
        Ok(users)
    }

    #[instrument(name = "Register directory user", skip(self), fields(username = %new_user.username), level = "debug")]
    async fn register_user(&self, new_user: &NewUser) -> Result<User, DirectoryError> {
        let response = self
            .client
            .post(&self.signup_url)
            .json(new_user)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;
        let signup: SignupResponse = Self::decode(response).await?;
        let reported = signup.into_user();
        let username = reported.username.clone();

        if let Some(user) = reported.into_user(new_user.latitude, new_user.longitude) {
            return Ok(user);
        }

        // No id in the acknowledgement: look the new record up by its unique username.
        // The signup already happened, so a failed lookup must not read as an outage.
        debug!(username = %username, "Signup response carried no id, re-reading directory");
        match self.list_users().await {
            Ok(users) => users
                .into_iter()
                .find(|user| user.username == username)
                .ok_or_else(|| {
                    warn!(username = %username, "Created user missing from directory listing");
                    DirectoryError::unconfirmed(username)
                }),
            Err(e) => {
                warn!(username = %username, error = %e, "Could not read back created user");
                Err(DirectoryError::unconfirmed(username))
            }
        }
    }

    #[instrument(name = "Search directory nearby", skip(self), level = "debug")]
    async fn search_nearby(&self, query: &NearbyQuery) -> Result<Vec<User>, DirectoryError> {
        let response = self
            .client
            .post(&self.nearby_url)
            .json(query)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;
        let users: Vec<User> = Self::decode_read(response).await?;
        debug!(count = users.len(), "Nearby users received");
        Ok(users)
    }
}
