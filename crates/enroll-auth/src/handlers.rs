use super::*;
use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::web;

/// `POST /api/users`
pub async fn register<S>(
    registrar: web::Data<Registrar<S>>,
    req: web::Json<RegisterRequest>,
) -> impl Responder
where
    S: Accounts + 'static,
{
    let errors = validate(&req);
    if !errors.is_empty() {
        return HttpResponse::BadRequest().json(ErrorList::from(errors));
    }
    let email = Email::from(req.email.as_str());
    match registrar.register(req.name.trim(), email, &req.password).await {
        Ok(issued) => HttpResponse::Ok().json(TokenResponse {
            token: issued.into(),
        }),
        Err(RegisterError::DuplicateIdentifier) => HttpResponse::BadRequest()
            .json(ErrorList::from(vec![FieldError::general(DUPLICATE_MESSAGE)])),
        Err(e @ RegisterError::SigningFailed(_)) => {
            log::error!("signing key misconfigured: {}", e);
            HttpResponse::InternalServerError().body("Server error")
        }
        Err(e) => {
            log::error!("registration failed: {}", e);
            HttpResponse::InternalServerError().body("Server error")
        }
    }
}

/// Mounts the registration route.
pub fn routes<S>(cfg: &mut web::ServiceConfig)
where
    S: Accounts + 'static,
{
    cfg.route("/api/users", web::post().to(register::<S>));
}
