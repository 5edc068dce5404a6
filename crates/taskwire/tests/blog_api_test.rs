//! A small blog API client exercised end to end against stubs.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use taskwire::prelude::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlogPost {
    user_id: u64,
    id: u64,
    title: String,
    body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Comment {
    post_id: u64,
    id: u64,
    email: String,
    body: String,
}

struct BlogApi {
    config: ClientConfig,
    loader: SharedLoader,
}

impl BlogApi {
    fn new(loader: SharedLoader) -> Self {
        let config = ClientConfig::new("https://jsonplaceholder.typicode.com")
            .with_default_header("Content-type", "application/json; charset=UTF-8");
        Self { config, loader }
    }

    fn posts(&self) -> Result<HttpTask<Vec<BlogPost>>> {
        Ok(self
            .request("posts", Method::GET, None, None)?
            .decoding_value_as())
    }

    fn post(&self, id: u64) -> Result<HttpTask<BlogPost>> {
        let path = UrlPath::join(["posts".to_string(), id.to_string()]);
        Ok(self.request(path, Method::GET, None, None)?.decoding_value_as())
    }

    fn comments(&self, post_id: u64) -> Result<HttpTask<Vec<Comment>>> {
        let parameters = RequestParameters::url(json!({ "postId": post_id }));
        Ok(self
            .request("comments", Method::GET, Some(parameters), None)?
            .decoding_value_as())
    }

    fn create_post(&self, title: &str, body: &str, user_id: u64) -> Result<HttpTask<BlogPost>> {
        let parameters = RequestParameters::json(json!({
            "title": title,
            "body": body,
            "userId": user_id,
        }));
        Ok(self
            .request("posts", Method::POST, Some(parameters), None)?
            .decoding_value_as())
    }
}

impl ApiClient for BlogApi {
    fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn loader(&self) -> SharedLoader {
        self.loader.clone()
    }

    fn default_headers(&self) -> HeaderMap {
        self.config.header_map().unwrap_or_default()
    }
}

/// Counts loads and forwards to the wrapped loader.
struct CountingLoader {
    inner: SharedLoader,
    loads: AtomicUsize,
}

#[async_trait]
impl RequestLoader for CountingLoader {
    fn can_respond(&self, request: &OutgoingRequest) -> bool {
        self.inner.can_respond(request)
    }

    async fn load(&self, request: Arc<OutgoingRequest>) -> HttpResponse<Bytes> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.inner.load(request).await
    }
}

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

fn post_json(id: u64) -> serde_json::Value {
    json!({
        "userId": 1,
        "id": id,
        "title": "sunt aut facere",
        "body": "quia et suscipit",
    })
}

fn posts_matcher() -> RequestMatcher {
    RequestMatcher::combine([
        RequestMatcher::path_equals("posts"),
        RequestMatcher::method_equals(Method::GET),
    ])
}

fn stub_api() -> (BlogApi, Arc<InMemoryStubProvider>) {
    let provider = Arc::new(InMemoryStubProvider::new());
    let loader = Arc::new(StubLoader::new(provider.clone()));
    (BlogApi::new(loader), provider)
}

#[tokio::test]
async fn unknown_post_fails_with_no_stub_found() {
    let (api, _provider) = stub_api();

    let err = api.post(12).unwrap().value().await.unwrap_err();

    match err {
        Error::NoStubFound { method, uri } => {
            assert_eq!(method, Method::GET);
            assert_eq!(uri.path(), "/posts/12");
        }
        other => panic!("expected NoStubFound, got {:?}", other),
    }
}

#[tokio::test]
async fn stubbed_post_list_decodes() {
    let (api, provider) = stub_api();
    provider.add_stub(
        ResponseStub::success(StubBody::json(json!([post_json(1)])).unwrap()),
        posts_matcher(),
    );

    let posts = api.posts().unwrap().value().await.unwrap();

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, 1);
}

#[tokio::test]
async fn invalid_json_keeps_response_metadata() {
    let (api, provider) = stub_api();
    provider.add_stub(
        ResponseStub::success(StubBody::bytes("<html>not json</html>")).header(
            taskwire::http::header::CONTENT_TYPE,
            taskwire::http::HeaderValue::from_static("text/html"),
        ),
        posts_matcher(),
    );

    let raw = api.request("posts", Method::GET, None, None).unwrap();
    let before = raw.response().await;
    let decoded = raw
        .decoding(Transform::new(|response: HttpResponse<Bytes>| {
            let body = response.value().map(|b| &b[..]).unwrap_or_default();
            let posts: Vec<BlogPost> = serde_json::from_slice(body)
                .map_err(|e| Error::transform::<Bytes, Vec<BlogPost>>(e.to_string()))?;
            Ok(response.with_result(Ok(posts)))
        }))
        .response()
        .await;

    assert!(matches!(decoded.error(), Some(err) if err.is_transform()));
    assert!(Arc::ptr_eq(
        decoded.request.as_ref().unwrap(),
        before.request.as_ref().unwrap()
    ));
    assert_eq!(decoded.headers(), before.headers());
    assert_eq!(decoded.status(), Some(StatusCode::OK));
    assert_eq!(decoded.data, before.data);
}

#[tokio::test]
async fn requests_carry_default_headers() {
    let (api, provider) = stub_api();
    provider.add_stub(
        ResponseStub::success(StubBody::json(post_json(1)).unwrap()),
        RequestMatcher::headers_equal([("content-type", "application/json; charset=UTF-8")]),
    );

    let post = api.post(1).unwrap().value().await.unwrap();
    assert_eq!(post.title, "sunt aut facere");
}

#[tokio::test]
async fn comments_are_matched_by_query() {
    let (api, provider) = stub_api();
    let comment = Comment {
        post_id: 1,
        id: 7,
        email: "Eliseo@gardner.biz".to_string(),
        body: "laudantium enim quasi".to_string(),
    };
    provider.add_stub(
        ResponseStub::success(StubBody::encodable(&[comment.clone()]).unwrap()),
        RequestMatcher::path_equals("comments").and(RequestMatcher::query_matching(|query| {
            query.iter().any(|(key, value)| key == "postId" && value == "1")
        })),
    );

    assert_eq!(api.comments(1).unwrap().value().await.unwrap(), vec![comment]);
    assert!(matches!(
        api.comments(2).unwrap().value().await,
        Err(Error::NoStubFound { .. })
    ));
}

#[tokio::test]
async fn created_post_is_matched_by_body() {
    let (api, provider) = stub_api();
    provider.add_stub(
        ResponseStub::new(StatusCode::CREATED, StubBody::json(post_json(101)).unwrap()),
        RequestMatcher::method_equals(Method::POST).and(RequestMatcher::body_matching(|body| {
            body.and_then(|b| serde_json::from_slice::<serde_json::Value>(b).ok())
                .map_or(false, |value| value["title"] == "foo")
        })),
    );

    let task = api.create_post("foo", "bar", 1).unwrap();
    let response = task.response().await;

    assert_eq!(response.status(), Some(StatusCode::CREATED));
    assert_eq!(response.result.unwrap().id, 101);
}

#[tokio::test]
async fn resource_stub_from_fixture_file() {
    let (api, provider) = stub_api();
    provider.add_stub(
        ResponseStub::success(StubBody::resource("posts", "json", fixtures()).unwrap()),
        posts_matcher(),
    );

    let posts = api.posts().unwrap().value().await.unwrap();
    assert_eq!(posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);

    let missing = StubBody::resource("users", "json", fixtures()).unwrap_err();
    assert!(matches!(missing, Error::ResourceNotFound(name) if name == "users.json"));
}

#[tokio::test]
async fn stubs_take_priority_over_fallback() {
    let provider = Arc::new(InMemoryStubProvider::new());
    provider.add_stub(
        ResponseStub::success(StubBody::json(json!([post_json(1)])).unwrap()),
        posts_matcher(),
    );
    let stubs: SharedLoader = Arc::new(StubLoader::new(provider));
    let api = BlogApi::new(Arc::new(combine_loaders([
        stubs,
        Arc::new(DummyLoader::new()) as SharedLoader,
    ])));

    assert_eq!(api.posts().unwrap().value().await.unwrap().len(), 1);

    // The dummy loader answers with an empty body, which is not a post.
    let err = api.post(3).unwrap().value().await.unwrap_err();
    assert!(err.is_transform());
}

#[tokio::test]
async fn observing_twice_loads_twice() {
    let (_, provider) = stub_api();
    provider.add_stub(
        ResponseStub::success(StubBody::json(json!([post_json(1)])).unwrap()),
        posts_matcher(),
    );
    let counting = Arc::new(CountingLoader {
        inner: Arc::new(StubLoader::new(provider)),
        loads: AtomicUsize::new(0),
    });
    let api = BlogApi::new(counting.clone());

    let posts = api.posts().unwrap();
    assert_eq!(counting.loads.load(Ordering::SeqCst), 0);

    posts.value().await.unwrap();
    posts.value().await.unwrap();
    assert_eq!(counting.loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn titles_via_map_value() {
    let (api, provider) = stub_api();
    provider.add_stub(
        ResponseStub::success(StubBody::resource("posts", "json", fixtures()).unwrap()),
        posts_matcher(),
    );

    let titles = api
        .posts()
        .unwrap()
        .map_value(|posts| posts.into_iter().map(|p| p.title).collect::<Vec<_>>());

    assert_eq!(titles.value().await.unwrap()[1], "qui est esse");
}

#[tokio::test]
async fn stub_delay_comes_from_config() {
    let provider = Arc::new(InMemoryStubProvider::new());
    provider.add_stub(
        ResponseStub::success(StubBody::json(json!([])).unwrap()),
        posts_matcher(),
    );
    let config = ClientConfig::new("https://jsonplaceholder.typicode.com")
        .with_stubs(true)
        .with_stub_delay(std::time::Duration::from_millis(20));
    let loader = Arc::new(StubLoader::with_config(
        provider,
        StubLoaderConfig::from_client(&config),
    ));
    let api = BlogApi::new(loader.clone());

    let started = std::time::Instant::now();
    assert!(api.posts().unwrap().value().await.unwrap().is_empty());
    assert!(started.elapsed() >= std::time::Duration::from_millis(20));

    loader.set_enabled(false);
    assert!(matches!(
        api.posts().unwrap().value().await,
        Err(Error::StubbingDisabled)
    ));
}
