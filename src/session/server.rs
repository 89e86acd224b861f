use super::socket;
use crate::table::Registry;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpRequest;
use actix_web::HttpResponse;
use actix_web::HttpServer;
use actix_web::Responder;
use actix_web::middleware::Logger;
use actix_web::web;
use std::sync::Arc;

pub struct Server;

impl Server {
    pub async fn run(addr: &str, registry: Arc<Registry>) -> Result<(), std::io::Error> {
        let state = web::Data::from(registry);
        log::info!("listening on {}", addr);
        HttpServer::new(move || {
            App::new()
                .wrap(Logger::new("%r %s %Ts"))
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(state.clone())
                .route("/ws", web::get().to(upgrade))
                .route("/health", web::get().to(health))
        })
        .workers(2)
        .bind(addr)?
        .run()
        .await
    }
}

/// 200 once the process can accept connections
async fn health(registry: web::Data<Registry>) -> impl Responder {
    match registry.healthy().await {
        true => HttpResponse::Ok().body("ok"),
        false => HttpResponse::ServiceUnavailable().finish(),
    }
}

async fn upgrade(
    registry: web::Data<Registry>,
    req: HttpRequest,
    body: web::Payload,
) -> impl Responder {
    match actix_ws::handle(&req, body) {
        Ok((response, session, stream)) => {
            actix_web::rt::spawn(socket::serve(registry.into_inner(), session, stream));
            response
        }
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}
