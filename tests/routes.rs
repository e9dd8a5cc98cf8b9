use actix_web::{
    App,
    http::{Method, StatusCode},
    test, web,
};

use payguard::routes;

#[actix_web::test]
async fn unsupported_methods_on_users_are_405() {
    let app = test::init_service(
        App::new().service(web::scope("/api").configure(routes::api::scoped_config)),
    )
    .await;

    for method in [Method::DELETE, Method::PUT, Method::PATCH] {
        let req = test::TestRequest::with_uri("/api/users")
            .method(method.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
    }
}

#[actix_web::test]
async fn unknown_paths_are_404() {
    let app = test::init_service(
        App::new().service(web::scope("/api").configure(routes::api::scoped_config)),
    )
    .await;

    let req = test::TestRequest::with_uri("/api/unknown").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
