//! Google Drive v3 backend over HTTPS.
//!
//! Uses the blocking `reqwest` client: the shell runs one command at a time
//! and every call here completes (or fails) before control returns.

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::{Body, Client, RequestBuilder, Response};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::settings::RemoteConfig;
use crate::remote::query::{children_query, FOLDER_MIME};
use crate::remote::{
    Account, ChildQuery, DriveApi, ItemKind, Page, RemoteError, RemoteItem, RemoteResult,
};

const ITEM_FIELDS: &str = "id,name,mimeType,parents,trashed";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResource {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    mime_type: String,
    #[serde(default)]
    parents: Vec<String>,
    #[serde(default)]
    trashed: bool,
}

impl From<FileResource> for RemoteItem {
    fn from(f: FileResource) -> Self {
        let kind = if f.mime_type == FOLDER_MIME {
            ItemKind::Folder
        } else {
            ItemKind::File
        };
        Self {
            id: f.id,
            name: f.name,
            kind,
            parents: f.parents,
            trashed: f.trashed,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<FileResource>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AboutUser {
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    email_address: String,
}

#[derive(Debug, Deserialize)]
struct About {
    user: AboutUser,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Authenticated client for the Drive v3 REST API.
pub struct GoogleDrive {
    client: Client,
    access_token: String,
    api_base: String,
    upload_base: String,
    timeout: Duration,
}

impl GoogleDrive {
    /// Builds a client that authenticates every request with `access_token`.
    pub fn new(access_token: &str, config: &RemoteConfig) -> RemoteResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        // Transfers may outlive any fixed timeout; metadata calls set their own.
        let client = Client::builder()
            .connect_timeout(timeout)
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| RemoteError::Http(e.to_string()))?;
        Ok(Self {
            client,
            access_token: access_token.to_string(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            upload_base: config.upload_base.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn files_url(&self, file_id: Option<&str>) -> String {
        match file_id {
            Some(id) => format!("{}/files/{}", self.api_base, id),
            None => format!("{}/files", self.api_base),
        }
    }

    fn send(&self, request: RequestBuilder) -> RemoteResult<Response> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .map_err(|e| RemoteError::Http(e.to_string()))?;
        check_status(response)
    }

    fn send_json<T: for<'de> Deserialize<'de>>(&self, request: RequestBuilder) -> RemoteResult<T> {
        self.send(request.timeout(self.timeout))?
            .json::<T>()
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

fn check_status(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(RemoteError::Unauthorized);
    }
    let text = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .map(|b| b.error.message)
        .unwrap_or(text);
    Err(RemoteError::Status {
        status: status.as_u16(),
        message,
    })
}

impl DriveApi for GoogleDrive {
    fn list_children(
        &self,
        parent_id: &str,
        query: &ChildQuery,
        page_size: usize,
        page_token: Option<&str>,
    ) -> RemoteResult<Page> {
        let q = children_query(parent_id, query);
        let page_size = page_size.to_string();
        let fields = format!("nextPageToken,files({ITEM_FIELDS})");
        let mut params = vec![
            ("q", q.as_str()),
            ("pageSize", page_size.as_str()),
            ("orderBy", "folder,name"),
            ("fields", fields.as_str()),
            ("supportsAllDrives", "true"),
            ("includeItemsFromAllDrives", "true"),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }
        tracing::debug!(query = %q, "files.list");
        let list: FileList =
            self.send_json(self.client.get(self.files_url(None)).query(&params))?;
        Ok(Page {
            items: list.files.into_iter().map(RemoteItem::from).collect(),
            next_page_token: list.next_page_token,
        })
    }

    fn open_file(&self, file_id: &str) -> RemoteResult<Box<dyn Read>> {
        let request = self
            .client
            .get(self.files_url(Some(file_id)))
            .query(&[("alt", "media"), ("supportsAllDrives", "true")]);
        Ok(Box::new(self.send(request)?))
    }

    fn create_folder(&self, name: &str, parent_id: Option<&str>) -> RemoteResult<RemoteItem> {
        let mut body = serde_json::json!({ "name": name, "mimeType": FOLDER_MIME });
        if let Some(parent) = parent_id {
            body["parents"] = serde_json::json!([parent]);
        }
        let request = self
            .client
            .post(self.files_url(None))
            .query(&[("fields", ITEM_FIELDS), ("supportsAllDrives", "true")])
            .json(&body);
        let created: FileResource = self.send_json(request)?;
        Ok(created.into())
    }

    fn create_file(
        &self,
        name: &str,
        parent_id: Option<&str>,
        content: Box<dyn Read + Send>,
        len: u64,
    ) -> RemoteResult<RemoteItem> {
        let mut metadata = serde_json::json!({ "name": name });
        if let Some(parent) = parent_id {
            metadata["parents"] = serde_json::json!([parent]);
        }
        let start = self
            .client
            .post(format!("{}/files", self.upload_base))
            .query(&[("uploadType", "resumable"), ("supportsAllDrives", "true")])
            .header("X-Upload-Content-Length", len)
            .json(&metadata)
            .timeout(self.timeout);
        let session = self.send(start)?;
        let location = session
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| RemoteError::Decode("upload session without location".to_string()))?
            .to_string();

        let upload = self
            .client
            .put(location)
            .query(&[("fields", ITEM_FIELDS)])
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(Body::sized(content, len));
        let created: FileResource = self
            .send(upload)?
            .json()
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(created.into())
    }

    fn trash(&self, file_id: &str) -> RemoteResult<RemoteItem> {
        let request = self
            .client
            .patch(self.files_url(Some(file_id)))
            .query(&[("fields", ITEM_FIELDS), ("supportsAllDrives", "true")])
            .json(&serde_json::json!({ "trashed": true }));
        let updated: FileResource = self.send_json(request)?;
        Ok(updated.into())
    }

    fn metadata(&self, file_id: &str) -> RemoteResult<RemoteItem> {
        let request = self
            .client
            .get(self.files_url(Some(file_id)))
            .query(&[("fields", ITEM_FIELDS), ("supportsAllDrives", "true")]);
        let item: FileResource = self.send_json(request)?;
        Ok(item.into())
    }

    fn account(&self) -> RemoteResult<Account> {
        let request = self
            .client
            .get(format!("{}/about", self.api_base))
            .query(&[("fields", "user")]);
        let about: About = self.send_json(request)?;
        Ok(Account {
            display_name: about.user.display_name,
            email: about.user.email_address,
        })
    }
}
