use super::{Message, Messaging};
use crate::core::config::MatrixConfig;
use crate::core::error::{ApiError, ConfigError, ReleaseError, ReleaseResult};
use reqwest::Url;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct RoomIdResponse {
  room_id: String,
}

#[derive(Deserialize)]
struct LoginResponse {
  access_token: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
  #[serde(default)]
  chunk: Vec<Event>,
}

#[derive(Deserialize)]
struct Event {
  #[serde(rename = "type")]
  kind: String,
  sender: String,
  #[serde(default)]
  content: EventContent,
}

#[derive(Deserialize, Default)]
struct EventContent {
  #[serde(default)]
  body: Option<String>,
}

pub struct MatrixClient {
  http: Client,
  homeserver: Url,
  access_token: String,
}

impl MatrixClient {
  pub fn new(homeserver: &str, access_token: &str) -> ReleaseResult<Self> {
    let homeserver = Url::parse(homeserver).map_err(|e| {
      ReleaseError::Config(ConfigError::Invalid {
        field: "matrix.homeserver".to_string(),
        reason: e.to_string(),
      })
    })?;
    let http = Client::builder()
      .user_agent(concat!("releaser/", env!("CARGO_PKG_VERSION")))
      .build()?;

    Ok(Self {
      http,
      homeserver,
      access_token: access_token.to_string(),
    })
  }

  /// Log in with a password and keep the issued access token
  pub fn login(homeserver: &str, user: &str, password: &str) -> ReleaseResult<Self> {
    let mut client = Self::new(homeserver, "")?;
    let url = client.endpoint(&["login"]);
    tracing::debug!("logging in to {} as {}", client.homeserver, user);

    let response = client
      .http
      .post(url.clone())
      .json(&json!({
        "type": "m.login.password",
        "identifier": { "type": "m.id.user", "user": user },
        "password": password,
      }))
      .send()?;
    let login: LoginResponse = check(response, "POST", &url)?.json()?;
    client.access_token = login.access_token;
    Ok(client)
  }

  /// Token when configured, otherwise password login
  pub fn from_config(config: &MatrixConfig) -> ReleaseResult<Self> {
    if let Some(token) = &config.access_token {
      return Self::new(&config.homeserver, token);
    }
    match (&config.user, &config.password) {
      (Some(user), Some(password)) => Self::login(&config.homeserver, user, password),
      _ => Err(ReleaseError::Config(ConfigError::MissingCredential {
        field: "matrix.access_token".to_string(),
        env: "MATRIX_TOKEN (or MATRIX_USER and MATRIX_PASSWORD)".to_string(),
      })),
    }
  }

  /// `<homeserver>/_matrix/client/v3/<segments...>` with each segment percent-encoded
  fn endpoint(&self, segments: &[&str]) -> Url {
    let mut url = self.homeserver.clone();
    if let Ok(mut path) = url.path_segments_mut() {
      path.pop_if_empty().extend(["_matrix", "client", "v3"]).extend(segments);
    }
    url
  }

  fn get(&self, url: Url) -> ReleaseResult<Response> {
    tracing::debug!("GET {}", url);
    let response = self.http.get(url.clone()).bearer_auth(&self.access_token).send()?;
    check(response, "GET", &url)
  }
}

fn check(response: Response, method: &str, url: &Url) -> ReleaseResult<Response> {
  let status = response.status();
  if status.is_success() {
    return Ok(response);
  }
  Err(ReleaseError::Api(ApiError::Status {
    method: method.to_string(),
    url: url.to_string(),
    status: status.as_u16(),
    message: response.text().unwrap_or_default(),
  }))
}

impl Messaging for MatrixClient {
  fn room_id(&self, alias: &str) -> ReleaseResult<String> {
    let url = self.endpoint(&["directory", "room", alias]);
    let resolved: RoomIdResponse = self.get(url)?.json()?;
    Ok(resolved.room_id)
  }

  fn latest_messages_by(
    &self,
    alias: &str,
    sender: &str,
    limit: usize,
    contains: Option<&str>,
  ) -> ReleaseResult<Vec<Message>> {
    let room = self.room_id(alias)?;
    let mut url = self.endpoint(&["rooms", &room, "messages"]);
    let filter = json!({ "types": ["m.room.message"], "senders": [sender] }).to_string();
    url
      .query_pairs_mut()
      .append_pair("dir", "b")
      .append_pair("limit", &limit.to_string())
      .append_pair("filter", &filter);

    let messages: MessagesResponse = self.get(url)?.json()?;
    Ok(
      messages
        .chunk
        .into_iter()
        .filter(|e| e.kind == "m.room.message" && e.sender == sender)
        .filter_map(|e| {
          e.content.body.map(|body| Message {
            sender: e.sender,
            body,
          })
        })
        .filter(|m| contains.is_none_or(|needle| m.body.contains(needle)))
        .collect(),
    )
  }
}
