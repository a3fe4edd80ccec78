pub mod status;

use crate::api::responses::ErrorResp;
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder, Identity};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io::{Error, ErrorKind};
use std::str::FromStr;
use std::time::Duration;

fn _version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
fn _pkg_name() -> &'static str {
    env!("CARGO_PKG_NAME")
}

pub fn version() -> String {
    format!("{}: {}", _pkg_name(), _version())
}

#[test]
fn test_version() {
    assert!(version().starts_with("dg_sync_clients: "));
}

pub fn get_url(host: &str, port: u16, use_tls: bool, request_uri: &str) -> String {
    format!(
        "{scheme}://{host}:{port}/{request_uri}",
        scheme = if use_tls { "https" } else { "http" },
        host = host,
        port = port,
        request_uri = request_uri
    )
}

pub fn load_identity(ssl_path: &str) -> Result<Identity, Error> {
    let mut pem = fs::read(format!("{}/{}", ssl_path, "daemon/private_daemon.crt"))?;
    pem.extend(fs::read(format!(
        "{}/{}",
        ssl_path, "daemon/private_daemon.key"
    ))?);
    Identity::from_pem(&pem).map_err(|e| Error::new(ErrorKind::InvalidData, format!("{:?}", e)))
}

pub fn get_client(ssl_path: Option<&str>, timeout: Duration) -> Result<Client, Error> {
    let builder = ClientBuilder::new()
        .danger_accept_invalid_certs(true)
        .user_agent(version())
        .timeout(timeout);
    let builder = if let Some(ssl_path) = ssl_path {
        builder.identity(load_identity(ssl_path)?)
    } else {
        builder
    };
    builder
        .build()
        .map_err(|e| Error::new(ErrorKind::Other, format!("{:?}", e)))
}

pub fn build_headers(
    additional_headers: &Option<HashMap<String, String>>,
) -> Result<HeaderMap, Error> {
    let mut header_map = HeaderMap::new();
    if let Some(m) = additional_headers {
        for (k, v) in m {
            header_map.insert(
                HeaderName::from_str(k).map_err(|e| {
                    Error::new(
                        ErrorKind::InvalidData,
                        format!("Failed to Parse Header Name {},\r\n {}", k, e),
                    )
                })?,
                HeaderValue::from_str(v).map_err(|e| {
                    Error::new(
                        ErrorKind::InvalidData,
                        format!("Failed to Parse Header value {},\r\n {}", v, e),
                    )
                })?,
            );
        }
    }
    Ok(header_map)
}

pub fn parse_body<T>(body: &str) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    if let Ok(ErrorResp {
        success: false,
        error,
    }) = serde_json::from_str::<ErrorResp>(body)
    {
        return Err(Error::new(
            ErrorKind::Other,
            format!(
                "Backend reported failure: {}",
                error.unwrap_or_else(|| String::from("no message"))
            ),
        ));
    }
    serde_json::from_str(body).map_err(|e| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Failed to Parse Json {},\r\n {}", body, e),
        )
    })
}

pub async fn post<T>(
    client: &Client,
    url: &str,
    data: &Map<String, Value>,
    additional_headers: &Option<HashMap<String, String>>,
) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    let header_map = build_headers(additional_headers)?;
    debug!("Posting to {url}");
    match client.post(url).headers(header_map).json(data).send().await {
        Ok(resp) => match resp.status() {
            reqwest::StatusCode::OK => {
                let body = resp
                    .text()
                    .await
                    .map_err(|e| Error::new(ErrorKind::InvalidData, e.to_string()))?;
                parse_body(body.as_str())
            }
            _ => Err(Error::new(
                ErrorKind::InvalidData,
                format!("Bad Status Code: {:?}, for URL {:?}", resp.status(), url),
            )),
        },
        Err(err) => Err(Error::new(ErrorKind::ConnectionRefused, format!("{:?}", err))),
    }
}
