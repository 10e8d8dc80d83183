use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::types::*;
use super::ControllerError;

/// Lab controller API client. Each call is one HTTP round trip against
/// `base_url + /v2 + path`; a non-2xx response becomes
/// `ControllerError::Api` carrying the status and body.
pub struct ControllerClient {
    base_url: String,
    client: Client,
}

impl ControllerClient {
    pub fn new(url: &str) -> Result<Self, ControllerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v2{}", self.base_url, path)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ControllerError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(ControllerError::Api { status, body })
        }
    }

    /// GET `path`, decoding the JSON response body.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ControllerError> {
        let resp = self.client.get(self.api_url(path)).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// POST `path` with a JSON body, decoding the JSON response body.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ControllerError>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let resp = self.client.post(self.api_url(path)).json(body).send().await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    /// POST `path` with a JSON body, discarding the response payload.
    pub async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), ControllerError> {
        let resp = self.client.post(self.api_url(path)).json(body).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// POST `path` with no body, discarding the response payload.
    pub async fn post_empty(&self, path: &str) -> Result<(), ControllerError> {
        let resp = self.client.post(self.api_url(path)).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// DELETE `path`, discarding the response payload.
    pub async fn delete(&self, path: &str) -> Result<(), ControllerError> {
        let resp = self.client.delete(self.api_url(path)).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    // --- Typed endpoints ---

    pub async fn version(&self) -> Result<Version, ControllerError> {
        self.get("/version").await
    }

    pub async fn templates(&self) -> Result<Vec<TemplateInfo>, ControllerError> {
        self.get("/templates").await
    }

    pub async fn computes(&self) -> Result<Vec<Compute>, ControllerError> {
        self.get("/computes").await
    }

    pub async fn projects(&self) -> Result<Vec<Project>, ControllerError> {
        self.get("/projects").await
    }

    pub async fn create_project(&self, name: &str) -> Result<Project, ControllerError> {
        self.post("/projects", &ProjectCreate { name: name.to_string() }).await
    }

    pub async fn close_project(&self, project_id: &str) -> Result<(), ControllerError> {
        self.post_empty(&format!("/projects/{}/close", project_id)).await
    }

    pub async fn delete_project(&self, project_id: &str) -> Result<(), ControllerError> {
        self.delete(&format!("/projects/{}", project_id)).await
    }

    /// Instantiate a node from a template inside a project.
    pub async fn create_node_from_template(
        &self,
        project_id: &str,
        template_id: &str,
        node: &NodeCreate,
    ) -> Result<NodeInfo, ControllerError> {
        self.post(&format!("/projects/{}/templates/{}", project_id, template_id), node)
            .await
    }

    pub async fn nodes(&self, project_id: &str) -> Result<Vec<NodeInfo>, ControllerError> {
        self.get(&format!("/projects/{}/nodes", project_id)).await
    }

    pub async fn node(&self, project_id: &str, node_id: &str) -> Result<NodeInfo, ControllerError> {
        self.get(&format!("/projects/{}/nodes/{}", project_id, node_id)).await
    }

    pub async fn start_node(&self, project_id: &str, node_id: &str) -> Result<(), ControllerError> {
        self.post_empty(&format!("/projects/{}/nodes/{}/start", project_id, node_id))
            .await
    }

    pub async fn create_link(
        &self,
        project_id: &str,
        a: LinkEndpoint,
        b: LinkEndpoint,
    ) -> Result<(), ControllerError> {
        let payload = LinkCreate { nodes: vec![a, b] };
        self.post_unit(&format!("/projects/{}/links", project_id), &payload)
            .await
    }
}
