//! A Dropbox API stand-in built on wiremock

use std::path::Path;
use std::time::Duration;

use paper_export::Config;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const TOKEN: &str = "sl.integration-token";

/// Config pointing both Dropbox hosts at `server` and saving into `output_dir`
pub fn config_for(server: &MockServer, output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.api.api_base_url = server.uri();
    config.api.content_base_url = server.uri();
    config.export.output_dir = output_dir.to_path_buf();
    config.export.item_delay = Duration::ZERO;
    config
}

/// Listing entry for a Paper file
pub fn file_entry(path_display: &str) -> Value {
    let name = path_display.rsplit('/').next().unwrap_or(path_display);
    json!({
        ".tag": "file",
        "name": name,
        "id": format!("id:{}", name),
        "path_lower": path_display.to_lowercase(),
        "path_display": path_display,
    })
}

/// Listing entry for a folder
pub fn folder_entry(path_display: &str) -> Value {
    let name = path_display.rsplit('/').next().unwrap_or(path_display);
    json!({
        ".tag": "folder",
        "name": name,
        "path_lower": path_display.to_lowercase(),
        "path_display": path_display,
    })
}

/// Exact match on the whole `Dropbox-API-Arg` value (the JSON contains commas)
fn api_arg_is(expected: String) -> impl Fn(&Request) -> bool + Send + Sync {
    move |request: &Request| {
        request
            .headers
            .get("Dropbox-API-Arg")
            .and_then(|value| value.to_str().ok())
            == Some(expected.as_str())
    }
}

pub async fn mount_account(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/2/users/get_current_account"))
        .and(header("Authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "account_id": "dbid:AAH4f99T0taONIb-OurWxbNQ6ywGRopQngc",
            "name": { "display_name": "Franz Ferdinand" },
            "email": "franz@example.com"
        })))
        .mount(server)
        .await;
}

pub async fn mount_rejected_account(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/2/users/get_current_account"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error_summary": "invalid_access_token/...",
            "error": { ".tag": "invalid_access_token" }
        })))
        .mount(server)
        .await;
}

/// Serve `pages` in order: the first from list_folder, the rest from list_folder/continue
pub async fn mount_listing(server: &MockServer, pages: Vec<Vec<Value>>) {
    let count = pages.len();
    for (index, entries) in pages.into_iter().enumerate() {
        let has_more = index + 1 < count;
        let body = json!({
            "entries": entries,
            "cursor": format!("cursor-{}", index + 1),
            "has_more": has_more,
        });

        let mock = if index == 0 {
            Mock::given(method("POST"))
                .and(path("/2/files/list_folder"))
                .and(body_json(json!({ "path": "", "recursive": true })))
        } else {
            Mock::given(method("POST"))
                .and(path("/2/files/list_folder/continue"))
                .and(body_json(json!({ "cursor": format!("cursor-{}", index) })))
        };
        mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }
}

/// Serve `markdown` for the export of `path_lower`
pub async fn mount_export(server: &MockServer, path_lower: &str, markdown: &str) {
    let arg = json!({ "path": path_lower, "export_format": "markdown" }).to_string();
    Mock::given(method("POST"))
        .and(path("/2/files/export"))
        .and(api_arg_is(arg))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Dropbox-API-Result",
                    json!({ "export_metadata": { "name": "doc.md" } })
                        .to_string()
                        .as_str(),
                )
                .set_body_string(markdown),
        )
        .expect(1)
        .mount(server)
        .await;
}

/// Answer the export of `path_lower` with Dropbox's not-found error
pub async fn mount_export_not_found(server: &MockServer, path_lower: &str) {
    let arg = json!({ "path": path_lower, "export_format": "markdown" }).to_string();
    Mock::given(method("POST"))
        .and(path("/2/files/export"))
        .and(api_arg_is(arg))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error_summary": "path/not_found/..",
            "error": { ".tag": "path", "path": { ".tag": "not_found" } }
        })))
        .mount(server)
        .await;
}
