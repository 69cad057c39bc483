use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::Config;
use crate::files;
use crate::game_manager::{GameManager, Page};
use crate::http::request::{Method, Request};
use crate::http::response::{Response, content_type_for};
use crate::render;

/// Turns a parsed request into the response for it.
#[derive(Clone)]
pub struct RequestHandler {
    config: Arc<Config>,
    game_manager: Arc<GameManager>,
}

impl RequestHandler {
    pub fn new(config: Arc<Config>, game_manager: Arc<GameManager>) -> Self {
        Self {
            config,
            game_manager,
        }
    }

    pub async fn handle(&self, request: Request) -> Response {
        match request.method {
            Method::Get => self.handle_get(&request).await,
            Method::Post => self.handle_post(&request).await,
            Method::Other => {
                warn!("Unsupported request method");
                not_found()
            }
        }
    }

    async fn handle_get(&self, request: &Request) -> Response {
        if let Some(path) = files::resolve(&self.config.document_root, &request.path) {
            match files::read_file(&path).await {
                Ok(body) => {
                    debug!("Serving {} ({} bytes)", path.display(), body.len());
                    return Response::ok(content_type_for(request.type_hint.as_deref()), body);
                }
                Err(e) => debug!("Cannot open {}: {}", path.display(), e),
            }
        } else {
            debug!("Path {:?} does not name a servable file", request.path);
        }

        self.login_page().await
    }

    async fn handle_post(&self, request: &Request) -> Response {
        match self.game_manager.handle_form(&request.form).await {
            Page::Game(view) => Response::html(render::game_page(&view)),
            Page::Login => self.login_page().await,
            Page::NotFound => not_found(),
        }
    }

    async fn login_page(&self) -> Response {
        let path = self.config.login_page_path();
        match files::read_file(&path).await {
            Ok(body) => Response::html(body),
            Err(e) => {
                warn!("Login page {} unavailable: {}", path.display(), e);
                not_found()
            }
        }
    }
}

pub fn not_found() -> Response {
    Response::not_found(render::NOT_FOUND_PAGE)
}
