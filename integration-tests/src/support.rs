use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use commentdesk::{Comment, Endpoints, HttpFetcher, Post};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// What a mock endpoint answers with.
#[derive(Clone, Debug)]
pub enum Reply {
    Json(Value),
    Status(u16),
    Raw(String),
}

impl Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Json(value) => (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], value.to_string()).into_response(),
            Reply::Status(code) => StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR).into_response(),
            Reply::Raw(body) => (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        }
    }
}

#[derive(Clone)]
struct MockState {
    comments: Arc<Mutex<Reply>>,
    posts: Arc<Mutex<Reply>>,
    hits: Arc<AtomicUsize>,
}

/// In-process stand-in for the remote API serving `/comments` and `/posts`.
pub struct MockApi {
    pub addr: SocketAddr,
    state: MockState,
}

impl MockApi {
    pub async fn start(comments: Reply, posts: Reply) -> Self {
        let state = MockState {
            comments: Arc::new(Mutex::new(comments)),
            posts: Arc::new(Mutex::new(posts)),
            hits: Arc::new(AtomicUsize::new(0)),
        };
        let app = Router::new()
            .route("/comments", get(comments_handler))
            .route("/posts", get(posts_handler))
            .with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock api");
        let addr = listener.local_addr().expect("mock api addr");
        tokio::spawn(async move { axum::serve(listener, app.into_make_service()).await.expect("serve mock api") });
        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn fetcher(&self) -> HttpFetcher {
        HttpFetcher::new(Endpoints::from_base(&self.base_url()))
    }

    pub fn set_comments(&self, reply: Reply) {
        *self.state.comments.lock().expect("mock state poisoned") = reply;
    }

    pub fn set_posts(&self, reply: Reply) {
        *self.state.posts.lock().expect("mock state poisoned") = reply;
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }
}

async fn comments_handler(State(state): State<MockState>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let reply = state.comments.lock().expect("mock state poisoned").clone();
    reply.into_response()
}

async fn posts_handler(State(state): State<MockState>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let reply = state.posts.lock().expect("mock state poisoned").clone();
    reply.into_response()
}

pub fn sample_comments(n: u64) -> Vec<Comment> {
    (1..=n)
        .map(|i| Comment {
            id: i,
            post_id: (i - 1) / 5 + 1,
            name: format!("comment {i}"),
            email: format!("user{i}@example.com"),
            body: format!("body of comment {i}"),
        })
        .collect()
}

pub fn sample_posts(n: u64) -> Vec<Post> {
    (1..=n).map(|i| Post { id: i, title: format!("post {i}") }).collect()
}

/// Wire shape of the comments collection, including the `postId` key.
pub fn comments_json(comments: &[Comment]) -> Value {
    serde_json::to_value(comments).expect("serialize comments")
}

/// Wire shape of the posts collection with the extra fields the real API sends.
pub fn posts_json(posts: &[Post]) -> Value {
    Value::Array(posts.iter().map(|p| json!({ "userId": 1, "id": p.id, "title": p.title, "body": "ignored" })).collect())
}
