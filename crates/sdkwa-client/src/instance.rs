//! Instance management. Authenticated with the user id/token pair rather
//! than the instance token, and not scoped to an instance path.

use sdkwa_core::error::SdkwaError;
use serde::Serialize;
use serde_json::json;

use crate::{Client, JsonObject};

const INSTANCES_LIST: &str = "/api/v1/instance/user/instances/list";
const CREATE_BY_ORDER: &str = "/api/v1/instance/user/instance/createByOrder";
const EXTEND_BY_ORDER: &str = "/api/v1/instance/user/instance/extendByOrder";
const DELETE: &str = "/api/v1/instance/user/instance/delete";
const RESTORE: &str = "/api/v1/instance/user/instance/restore";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstanceParams {
    pub tariff: String,
    pub period: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendInstanceParams {
    pub id_instance: i64,
    pub tariff: String,
    pub period: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,
}

impl Client {
    pub async fn get_instances(&self) -> Result<JsonObject, SdkwaError> {
        self.post_user::<(), _>(INSTANCES_LIST, None).await
    }

    pub async fn create_instance(
        &self,
        params: &CreateInstanceParams,
    ) -> Result<JsonObject, SdkwaError> {
        self.post_user(CREATE_BY_ORDER, Some(params)).await
    }

    pub async fn extend_instance(
        &self,
        params: &ExtendInstanceParams,
    ) -> Result<JsonObject, SdkwaError> {
        self.post_user(EXTEND_BY_ORDER, Some(params)).await
    }

    pub async fn delete_instance(&self, id_instance: i64) -> Result<JsonObject, SdkwaError> {
        self.post_user(DELETE, Some(&json!({ "idInstance": id_instance })))
            .await
    }

    pub async fn restore_instance(&self, id_instance: i64) -> Result<JsonObject, SdkwaError> {
        self.post_user(RESTORE, Some(&json!({ "idInstance": id_instance })))
            .await
    }
}
