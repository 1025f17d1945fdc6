//! Group management endpoints.

use reqwest::multipart::Form;
use sdkwa_core::error::SdkwaError;
use sdkwa_core::messenger::RequestOptions;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{Client, FileUpload, JsonObject};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParticipantParams<'a> {
    group_id: &'a str,
    participant_chat_id: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateGroupNameResponse {
    pub update_group_name: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LeaveGroupResponse {
    pub leave_group: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SetGroupAdminResponse {
    pub set_group_admin: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoveGroupParticipantResponse {
    pub remove_participant: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RemoveAdminResponse {
    pub remove_admin: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddGroupParticipantResponse {
    pub add_participant: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateGroupResponse {
    pub created: bool,
    pub chat_id: String,
    pub group_invite_link: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SetGroupPictureResponse {
    pub set_group_picture: bool,
    pub url_avatar: String,
    pub reason: String,
}

impl Client {
    pub async fn update_group_name(
        &self,
        group_id: &str,
        group_name: &str,
        opts: RequestOptions,
    ) -> Result<UpdateGroupNameResponse, SdkwaError> {
        let params = json!({ "groupId": group_id, "groupName": group_name });
        self.post("updateGroupName", &params, opts).await
    }

    pub async fn get_group_data(
        &self,
        group_id: &str,
        opts: RequestOptions,
    ) -> Result<JsonObject, SdkwaError> {
        self.post("getGroupData", &json!({ "groupId": group_id }), opts)
            .await
    }

    pub async fn leave_group(
        &self,
        group_id: &str,
        opts: RequestOptions,
    ) -> Result<LeaveGroupResponse, SdkwaError> {
        self.post("leaveGroup", &json!({ "groupId": group_id }), opts)
            .await
    }

    pub async fn set_group_admin(
        &self,
        group_id: &str,
        participant_chat_id: &str,
        opts: RequestOptions,
    ) -> Result<SetGroupAdminResponse, SdkwaError> {
        let params = ParticipantParams {
            group_id,
            participant_chat_id,
        };
        self.post("setGroupAdmin", &params, opts).await
    }

    pub async fn remove_group_participant(
        &self,
        group_id: &str,
        participant_chat_id: &str,
        opts: RequestOptions,
    ) -> Result<RemoveGroupParticipantResponse, SdkwaError> {
        let params = ParticipantParams {
            group_id,
            participant_chat_id,
        };
        self.post("removeGroupParticipant", &params, opts).await
    }

    pub async fn remove_admin(
        &self,
        group_id: &str,
        participant_chat_id: &str,
        opts: RequestOptions,
    ) -> Result<RemoveAdminResponse, SdkwaError> {
        let params = ParticipantParams {
            group_id,
            participant_chat_id,
        };
        self.post("removeAdmin", &params, opts).await
    }

    /// Create a group with the given members.
    pub async fn create_group(
        &self,
        group_name: &str,
        chat_ids: &[String],
        opts: RequestOptions,
    ) -> Result<CreateGroupResponse, SdkwaError> {
        let params = json!({ "groupName": group_name, "chatIds": chat_ids });
        self.post("createGroup", &params, opts).await
    }

    pub async fn add_group_participant(
        &self,
        group_id: &str,
        participant_chat_id: &str,
        opts: RequestOptions,
    ) -> Result<AddGroupParticipantResponse, SdkwaError> {
        let params = ParticipantParams {
            group_id,
            participant_chat_id,
        };
        self.post("addGroupParticipant", &params, opts).await
    }

    pub async fn set_group_picture(
        &self,
        group_id: &str,
        file: FileUpload,
        opts: RequestOptions,
    ) -> Result<SetGroupPictureResponse, SdkwaError> {
        let form = Form::new()
            .text("groupId", group_id.to_string())
            .part("file", file.into_part()?);
        self.post_multipart("setGroupPicture", form, opts).await
    }
}
