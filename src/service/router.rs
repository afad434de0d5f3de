use crate::http::Handler;
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::service::users::UserService;

/// Fixed validator handed out by the /cached route.
const CACHED_ETAG: &str = "fixed-2025";
const CACHED_BODY: &str = "cached content";

/// Minimal PNG file signature, enough to exercise a non-text content type.
const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Routes requests to the demo pages and the register/login flows.
pub struct AppRouter {
    users: UserService,
}

impl AppRouter {
    pub fn new() -> Self {
        Self {
            users: UserService::new(),
        }
    }

    fn handle_get(&self, request: &Request) -> Response {
        match request.path.as_str() {
            "/" | "/index" => self.home_page(),
            "/user/count" => {
                Response::ok_text(&format!("Current user count: {}", self.users.user_count()))
            }
            "/redirect" => Response::moved_permanently("/index"),
            "/temp-redirect" => Response::found("/index"),
            "/cached" => self.cached_page(request),
            "/image" => Response::ok_image(PNG_SIGNATURE.to_vec(), "png"),
            _ => Response::not_found(),
        }
    }

    fn handle_post(&self, request: &Request) -> Response {
        match request.path.as_str() {
            "/register" => self.handle_register(request),
            "/login" => self.handle_login(request),
            _ => Response::not_found(),
        }
    }

    /// Answers 304 to a matching conditional request, otherwise a fresh 200
    /// carrying the fixed validator.
    fn cached_page(&self, request: &Request) -> Response {
        let expected = format!("\"{CACHED_ETAG}\"");
        if request.header("If-None-Match") == Some(expected.as_str()) {
            return Response::not_modified();
        }

        let mut response = Response::ok_text(CACHED_BODY);
        response.set_etag(CACHED_ETAG);
        response
    }

    fn handle_register(&self, request: &Request) -> Response {
        let username = request.parameter("username").unwrap_or_default();
        let password = request.parameter("password").unwrap_or_default();

        if username.is_empty() || password.is_empty() {
            return Response::bad_request("username and password must not be empty");
        }

        if self.users.username_exists(username) {
            return Response::conflict();
        }

        if self.users.register(username, password) {
            Response::ok_text(&format!("Welcome, {username}"))
        } else {
            Response::internal_server_error()
        }
    }

    fn handle_login(&self, request: &Request) -> Response {
        let username = request.parameter("username").unwrap_or_default();
        let password = request.parameter("password").unwrap_or_default();

        if username.is_empty() || password.is_empty() {
            return Response::bad_request("username and password must not be empty");
        }

        if self.users.login(username, password) {
            Response::ok_text(&format!("Welcome back, {username}"))
        } else {
            Response::unauthorized()
        }
    }

    fn home_page(&self) -> Response {
        let html = format!(
            "<html><body>\
             <h1>Courier demo server</h1>\
             <p>Registered users: {}</p>\
             <ul>\
             <li>POST /register - register (params: username, password)</li>\
             <li>POST /login - log in (params: username, password)</li>\
             <li>GET /user/count - number of registered users</li>\
             </ul>\
             </body></html>",
            self.users.user_count()
        );
        Response::ok_html(&html)
    }
}

impl Default for AppRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for AppRouter {
    fn handle(&self, request: &Request) -> Response {
        match request.method {
            Method::GET => self.handle_get(request),
            Method::POST => self.handle_post(request),
            _ => Response::method_not_allowed(),
        }
    }
}
