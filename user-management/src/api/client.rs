//! Admin REST client

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;

use super::error::{ErrorResponse, RequestError, RequestInfo};
use crate::model::{Headers, PageRequest, User};

const USERS_URL: &str = "api/users";
const ADMIN_USERS_URL: &str = "api/admin/users";
const AUTHORITIES_URL: &str = "api/authorities";
const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One REST call against the user administration API.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    /// `GET api/users`
    ListUsers(PageRequest),
    /// `GET api/admin/users`
    ListUsersAsAdmin(PageRequest),
    /// `GET api/authorities`
    ListAuthorities,
    /// `GET api/admin/users/{login}`
    GetUser(String),
    /// `POST api/admin/users`
    CreateUser(User),
    /// `PUT api/admin/users`
    UpdateUser(User),
    /// `DELETE api/admin/users/{login}`
    DeleteUser(String),
}

impl Call {
    pub fn method(&self) -> Method {
        match self {
            Call::ListUsers(_)
            | Call::ListUsersAsAdmin(_)
            | Call::ListAuthorities
            | Call::GetUser(_) => Method::GET,
            Call::CreateUser(_) => Method::POST,
            Call::UpdateUser(_) => Method::PUT,
            Call::DeleteUser(_) => Method::DELETE,
        }
    }

    /// Path relative to the API base URL.
    pub fn path(&self) -> String {
        match self {
            Call::ListUsers(_) => USERS_URL.to_string(),
            Call::ListUsersAsAdmin(_) | Call::CreateUser(_) | Call::UpdateUser(_) => {
                ADMIN_USERS_URL.to_string()
            }
            Call::ListAuthorities => AUTHORITIES_URL.to_string(),
            Call::GetUser(login) | Call::DeleteUser(login) => {
                format!("{}/{}", ADMIN_USERS_URL, urlencoding::encode(login))
            }
        }
    }
}

/// Decoded body of a successful call.
#[derive(Debug, Clone, PartialEq)]
pub enum Data {
    /// A page of users plus the total from `x-total-count`
    Users { users: Vec<User>, total: u64 },
    Authorities(Vec<String>),
    User(User),
    Empty,
}

/// A successful (2xx) response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub data: Data,
}

impl Response {
    pub fn new(status: u16, headers: Headers, data: Data) -> Self {
        Self {
            status,
            headers,
            data,
        }
    }
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a config for the given API base URL.
    ///
    /// Endpoint paths are joined onto the base, so a missing trailing slash
    /// is added.
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Anything that can run a [`Call`].
///
/// Effect handlers are generic over this so tests can run the slice
/// without a server.
pub trait Backend: Send + Sync + 'static {
    fn execute(&self, call: Call) -> impl Future<Output = Result<Response, RequestError>> + Send;
}

/// HTTP client for the user administration API
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: Client,
    config: ClientConfig,
}

impl AdminClient {
    /// Create a client.
    ///
    /// # Errors
    ///
    /// Fails if the underlying HTTP client cannot be built (TLS backend
    /// initialization).
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run a call and decode its response.
    pub async fn execute(&self, call: Call) -> Result<Response, RequestError> {
        let path = call.path();
        let url = self.config.base_url.join(&path);
        let request = RequestInfo {
            method: call.method(),
            url: url
                .as_ref()
                .map(Url::to_string)
                .unwrap_or_else(|_| path.clone()),
            path,
        };
        let url = url.map_err(|e| RequestError::no_response(&request, e.to_string()))?;

        let mut builder = self.http.request(request.method.clone(), url);
        if let Some(token) = &self.config.token {
            builder = builder.bearer_auth(token);
        }
        builder = match &call {
            Call::ListUsers(page) | Call::ListUsersAsAdmin(page) => builder.query(&page.query()),
            Call::CreateUser(user) | Call::UpdateUser(user) => builder.json(user),
            _ => builder,
        };

        tracing::debug!(request = %request, "sending request");
        let response = builder
            .send()
            .await
            .map_err(|e| RequestError::from_transport(&request, e))?;

        let status = response.status();
        let headers = Headers::from(response.headers());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(request = %request, status = status.as_u16(), "request failed");
            return Err(RequestError::Status {
                request,
                response: ErrorResponse::new(status.as_u16(), headers, body),
            });
        }

        let data = match call {
            Call::ListUsers(_) | Call::ListUsersAsAdmin(_) => {
                let total = total_count(&headers).ok_or_else(|| {
                    RequestError::no_response(
                        &request,
                        "missing or invalid x-total-count header",
                    )
                })?;
                let users = decode(&request, response).await?;
                Data::Users { users, total }
            }
            Call::ListAuthorities => Data::Authorities(decode(&request, response).await?),
            Call::GetUser(_) | Call::CreateUser(_) | Call::UpdateUser(_) => {
                Data::User(decode(&request, response).await?)
            }
            Call::DeleteUser(_) => Data::Empty,
        };

        Ok(Response::new(status.as_u16(), headers, data))
    }

    pub async fn list_users(&self, page: PageRequest) -> Result<Response, RequestError> {
        self.execute(Call::ListUsers(page)).await
    }

    pub async fn list_users_as_admin(&self, page: PageRequest) -> Result<Response, RequestError> {
        self.execute(Call::ListUsersAsAdmin(page)).await
    }

    pub async fn list_authorities(&self) -> Result<Response, RequestError> {
        self.execute(Call::ListAuthorities).await
    }

    pub async fn get_user(&self, login: impl Into<String>) -> Result<Response, RequestError> {
        self.execute(Call::GetUser(login.into())).await
    }

    pub async fn create_user(&self, user: User) -> Result<Response, RequestError> {
        self.execute(Call::CreateUser(user)).await
    }

    pub async fn update_user(&self, user: User) -> Result<Response, RequestError> {
        self.execute(Call::UpdateUser(user)).await
    }

    pub async fn delete_user(&self, login: impl Into<String>) -> Result<Response, RequestError> {
        self.execute(Call::DeleteUser(login.into())).await
    }
}

impl Backend for AdminClient {
    fn execute(&self, call: Call) -> impl Future<Output = Result<Response, RequestError>> + Send {
        AdminClient::execute(self, call)
    }
}

fn total_count(headers: &Headers) -> Option<u64> {
    headers.get(TOTAL_COUNT_HEADER)?.trim().parse().ok()
}

async fn decode<T: DeserializeOwned>(
    request: &RequestInfo,
    response: reqwest::Response,
) -> Result<T, RequestError> {
    response
        .json::<T>()
        .await
        .map_err(|e| RequestError::no_response(request, format!("invalid response body: {e}")))
}
