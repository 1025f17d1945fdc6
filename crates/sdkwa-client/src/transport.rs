//! Request plumbing shared by every endpoint wrapper.

use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder};
use sdkwa_core::error::SdkwaError;
use sdkwa_core::messenger::RequestOptions;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::Client;

impl Client {
    /// Full URL of an instance-scoped endpoint.
    pub(crate) fn instance_url(&self, endpoint: &str, opts: RequestOptions) -> String {
        format!(
            "{}/{}/{}/{}",
            self.api_host,
            opts.resolve(self.messenger_type),
            self.id_instance,
            endpoint
        )
    }

    fn instance_request(&self, method: Method, endpoint: &str, opts: RequestOptions) -> RequestBuilder {
        self.http
            .request(method, self.instance_url(endpoint, opts))
            .bearer_auth(&self.api_token)
    }

    /// Send a request and return the raw body of a 2xx response.
    async fn execute(&self, req: RequestBuilder, endpoint: &str) -> Result<String, SdkwaError> {
        let resp = req
            .send()
            .await
            .map_err(|e| SdkwaError::Transport(format!("{endpoint} request failed: {e}")))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| SdkwaError::Transport(format!("{endpoint} body read failed: {e}")))?;

        if !status.is_success() {
            debug!("sdkwa: {endpoint} returned {status}");
            return Err(SdkwaError::from_response(status.as_u16(), &body));
        }

        Ok(body)
    }

    /// GET returning the undecoded body.
    pub(crate) async fn get_raw(&self, endpoint: &str, opts: RequestOptions) -> Result<String, SdkwaError> {
        let req = self.instance_request(Method::GET, endpoint, opts);
        self.execute(req, endpoint).await
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        opts: RequestOptions,
    ) -> Result<T, SdkwaError> {
        let body = self.get_raw(endpoint, opts).await?;
        decode(endpoint, &body)
    }

    /// GET carrying a JSON body, as `getContactInfo` expects.
    pub(crate) async fn get_with_body<B, T>(
        &self,
        endpoint: &str,
        params: &B,
        opts: RequestOptions,
    ) -> Result<T, SdkwaError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.instance_request(Method::GET, endpoint, opts).json(params);
        let body = self.execute(req, endpoint).await?;
        decode(endpoint, &body)
    }

    pub(crate) async fn post<B, T>(
        &self,
        endpoint: &str,
        params: &B,
        opts: RequestOptions,
    ) -> Result<T, SdkwaError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.instance_request(Method::POST, endpoint, opts).json(params);
        let body = self.execute(req, endpoint).await?;
        decode(endpoint, &body)
    }

    /// POST whose response body carries nothing the caller needs.
    pub(crate) async fn post_unit<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &B,
        opts: RequestOptions,
    ) -> Result<(), SdkwaError> {
        let req = self.instance_request(Method::POST, endpoint, opts).json(params);
        self.execute(req, endpoint).await.map(|_| ())
    }

    pub(crate) async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        opts: RequestOptions,
    ) -> Result<T, SdkwaError> {
        let req = self.instance_request(Method::DELETE, endpoint, opts);
        let body = self.execute(req, endpoint).await?;
        decode(endpoint, &body)
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        form: Form,
        opts: RequestOptions,
    ) -> Result<T, SdkwaError> {
        let req = self.instance_request(Method::POST, endpoint, opts).multipart(form);
        let body = self.execute(req, endpoint).await?;
        decode(endpoint, &body)
    }

    /// POST to a user-management path with `x-user-id` / `x-user-token`.
    ///
    /// Fails before sending anything when the session has no user credentials.
    pub(crate) async fn post_user<B, T>(&self, path: &str, params: Option<&B>) -> Result<T, SdkwaError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let (user_id, user_token) = match (self.user_id.as_deref(), self.user_token.as_deref()) {
            (Some(id), Some(token)) => (id, token),
            _ => {
                return Err(SdkwaError::Config(
                    "user_id and user_token are required for instance management".into(),
                ))
            }
        };

        let mut req = self
            .http
            .post(format!("{}{}", self.api_host, path))
            .header("x-user-id", user_id)
            .header("x-user-token", user_token);
        if let Some(params) = params {
            req = req.json(params);
        }

        let body = self.execute(req, path).await?;
        decode(path, &body)
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, SdkwaError> {
    serde_json::from_str(body)
        .map_err(|e| SdkwaError::Decode(format!("{endpoint} response parse failed: {e}")))
}
