use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
};

/// Member-only scope guard. Anonymous visitors are sent to the login page,
/// which brings them back to the requested path afterwards.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    if crate::auth::session::get_user_id(&req.get_session()).is_some() {
        return next.call(req).await.map(|res| res.map_into_left_body());
    }

    let location = login_redirect(req.path());
    let response = HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish();
    Ok(req.into_response(response).map_into_right_body())
}

/// `/login?next=<path>`; the path is only kept when it is local.
pub fn login_redirect(path: &str) -> String {
    match safe_next(path) {
        Some(next) => format!("/login?next={next}"),
        None => "/login".to_string(),
    }
}

/// Accept only same-site absolute paths made of URL-safe characters.
pub fn safe_next(path: &str) -> Option<&str> {
    let local = path.starts_with('/') && !path.starts_with("//");
    let plain = path
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'));
    (local && plain && path != "/login").then_some(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_keeps_local_paths() {
        assert_eq!(login_redirect("/profile"), "/login?next=/profile");
        assert_eq!(
            login_redirect("/admin/membership-requests/4/process"),
            "/login?next=/admin/membership-requests/4/process"
        );
    }

    #[test]
    fn redirect_drops_foreign_targets() {
        assert_eq!(login_redirect("//evil.example/x"), "/login");
        assert_eq!(login_redirect("/a?b=c"), "/login");
        assert_eq!(login_redirect("/login"), "/login");
        assert_eq!(safe_next("https://evil.example"), None);
    }
}
