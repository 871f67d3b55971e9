use launcher_core::{AuthMode, ClientError, ClientFactory, ConnectionSettings, RemoteClient};
use launcher_engine::{RestClientFactory, RestSettings};
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{basic_auth, bearer_token, body_string, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The client blocks on its own runtime, so the mock server lives on a
/// separate one and tests stay synchronous.
struct Harness {
    server: MockServer,
    runtime: Runtime,
}

impl Harness {
    fn start() -> Self {
        let runtime = Runtime::new().unwrap();
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    fn settings(&self, auth_mode: AuthMode) -> ConnectionSettings {
        ConnectionSettings {
            url: self.server.uri(),
            auth_mode,
            user_id: "alice".to_string(),
            secret: "pw".to_string(),
        }
    }
}

fn factory() -> RestClientFactory {
    RestClientFactory::new(RestSettings {
        page_size: 2,
        ..RestSettings::default()
    })
    .unwrap()
}

#[test]
fn basic_connection_is_verified_with_discovery_call() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/rest/v1/"))
            .and(basic_auth("alice", "pw"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "data": ["projects", "items", "users"] })),
            ),
    );

    let client = factory().connect(&harness.settings(AuthMode::Basic)).unwrap();

    assert_eq!(client.base_url(), harness.server.uri());
    assert_eq!(
        client.available_endpoints().unwrap(),
        vec!["projects", "items", "users"]
    );
}

#[test]
fn rejected_credentials_map_to_unauthorized() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/rest/v1/"))
            .respond_with(ResponseTemplate::new(401)),
    );

    let client = factory().connect(&harness.settings(AuthMode::Basic)).unwrap();

    assert_eq!(
        client.available_endpoints().unwrap_err(),
        ClientError::Unauthorized(401)
    );
}

#[test]
fn oauth_exchanges_credentials_for_a_bearer_token() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/rest/oauth/token"))
            .and(basic_auth("alice", "pw"))
            .and(body_string("grant_type=client_credentials"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "access_token": "tok-123", "token_type": "bearer" })),
            ),
    );
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/rest/v1/"))
            .and(bearer_token("tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} }))),
    );

    let client = factory().connect(&harness.settings(AuthMode::OAuth)).unwrap();

    assert_eq!(client.available_endpoints().unwrap(), Vec::<String>::new());
}

#[test]
fn failed_token_exchange_fails_the_connection() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/rest/oauth/token"))
            .respond_with(ResponseTemplate::new(403)),
    );

    let err = factory()
        .connect(&harness.settings(AuthMode::OAuth))
        .unwrap_err();

    assert_eq!(err, ClientError::Unauthorized(403));
}

#[test]
fn get_all_walks_every_page() {
    let harness = Harness::start();
    let page = |start: &str, names: &[&str]| {
        let data: Vec<_> = names
            .iter()
            .map(|name| json!({ "fields": { "name": name } }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/rest/v1/projects"))
            .and(query_param("startAt", start))
            .and(query_param("maxResults", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "meta": { "pageInfo": { "startIndex": start.parse::<u64>().unwrap(), "totalResults": 3 } },
                "data": data,
            })))
    };
    harness.mount(page("0", &["alpha", "beta"]));
    harness.mount(page("2", &["gamma"]));

    let client = factory().connect(&harness.settings(AuthMode::Basic)).unwrap();
    let projects = client.get_all("projects").unwrap();

    let names: Vec<_> = projects
        .iter()
        .map(|project| project["fields"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["alpha", "beta", "gamma"]);
}

#[test]
fn page_without_data_is_malformed() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/rest/v1/projects"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "meta": {} }))),
    );

    let client = factory().connect(&harness.settings(AuthMode::Basic)).unwrap();

    assert!(matches!(
        client.get_all("projects"),
        Err(ClientError::Malformed(_))
    ));
}

#[test]
fn unreachable_endpoint_is_a_transport_error() {
    let settings = ConnectionSettings {
        url: "http://127.0.0.1:9".to_string(),
        auth_mode: AuthMode::Basic,
        user_id: "alice".to_string(),
        secret: "pw".to_string(),
    };

    let client = factory().connect(&settings).unwrap();

    assert!(matches!(
        client.available_endpoints(),
        Err(ClientError::Transport(_))
    ));
}
