mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
    response::Response,
};
use restaurant_ordering_api::{
    authz::{CallerContext, guest::ORDER_TOKEN_HEADER},
    dto::orders::CreateOrderRequest,
    routes::create_api_router,
    services::order_service,
    state::AppState,
};
use rust_decimal::Decimal;
use tower::ServiceExt;
use uuid::Uuid;

use common::{create_category, create_dish, create_restaurant, create_table, setup_state};

fn app(state: &AppState) -> Router {
    Router::new()
        .nest("/api/v1", create_api_router(state))
        .with_state(state.clone())
}

async fn send(
    app: Router,
    method: Method,
    uri: String,
    headers: &[(&str, &str)],
    body: Body,
) -> anyhow::Result<Response> {
    let mut request = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    Ok(app.oneshot(request.body(body)?).await?)
}

async fn body_text(response: Response) -> anyhow::Result<String> {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[tokio::test]
async fn order_routes_require_the_matching_order_token() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (restaurant, admin) = create_restaurant(&state, "terrasse").await?;
    let table = create_table(&state, &admin, restaurant.id, "4").await?;

    let mut tokens = Vec::new();
    for _ in 0..2 {
        let created = order_service::create_order(
            &state,
            &CallerContext::anonymous(),
            table.id,
            CreateOrderRequest::default(),
        )
        .await?;
        let token = created
            .token
            .ok_or_else(|| anyhow::anyhow!("anonymous order without token"))?;
        tokens.push((created.data.id, token));
    }
    let (order_id, token) = &tokens[0];
    let (_, other_token) = &tokens[1];
    let uri = format!("/api/v1/tables/{}/commandes/{}", table.id, order_id);

    let ok = send(
        app(&state),
        Method::GET,
        uri.clone(),
        &[(ORDER_TOKEN_HEADER, token.as_str())],
        Body::empty(),
    )
    .await?;
    assert_eq!(ok.status(), StatusCode::OK);
    assert!(body_text(ok).await?.contains(&order_id.to_string()));

    // A token is bound to the order it was issued for.
    let wrong = send(
        app(&state),
        Method::GET,
        uri.clone(),
        &[(ORDER_TOKEN_HEADER, other_token.as_str())],
        Body::empty(),
    )
    .await?;
    assert_eq!(wrong.status(), StatusCode::FORBIDDEN);

    let garbage = send(
        app(&state),
        Method::GET,
        uri.clone(),
        &[(ORDER_TOKEN_HEADER, "not-a-token")],
        Body::empty(),
    )
    .await?;
    assert_eq!(garbage.status(), StatusCode::FORBIDDEN);

    let missing = send(app(&state), Method::GET, uri.clone(), &[], Body::empty()).await?;
    assert_eq!(missing.status(), StatusCode::FORBIDDEN);

    // An Authorization header skips the gate, so a bad bearer is rejected by authentication.
    let bad_bearer = send(
        app(&state),
        Method::GET,
        uri,
        &[(header::AUTHORIZATION.as_str(), "Bearer garbage")],
        Body::empty(),
    )
    .await?;
    assert_eq!(bad_bearer.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn guest_token_opens_the_item_routes_of_its_order() -> anyhow::Result<()> {
    let Some(state) = setup_state().await? else {
        return Ok(());
    };

    let (restaurant, admin) = create_restaurant(&state, "comptoir").await?;
    let table = create_table(&state, &admin, restaurant.id, "9").await?;
    let category = create_category(&state, &admin, restaurant.id, "Plats").await?;
    let dish = create_dish(&state, &admin, category.id, "Quiche", Decimal::new(950, 2)).await?;

    let created = order_service::create_order(
        &state,
        &CallerContext::anonymous(),
        table.id,
        CreateOrderRequest::default(),
    )
    .await?;
    let order_id = created.data.id;
    let token = created
        .token
        .ok_or_else(|| anyhow::anyhow!("anonymous order without token"))?;

    let payload = serde_json::json!({
        "item_type": "plat",
        "item_id": dish.id,
        "quantite": 2,
    })
    .to_string();
    let json = header::CONTENT_TYPE.as_str();

    let added = send(
        app(&state),
        Method::POST,
        format!("/api/v1/commandes/{order_id}/items"),
        &[(ORDER_TOKEN_HEADER, token.as_str()), (json, "application/json")],
        Body::from(payload.clone()),
    )
    .await?;
    assert_eq!(added.status(), StatusCode::CREATED);

    // Same token, different order id in the path.
    let elsewhere = send(
        app(&state),
        Method::POST,
        format!("/api/v1/commandes/{}/items", Uuid::new_v4()),
        &[(ORDER_TOKEN_HEADER, token.as_str()), (json, "application/json")],
        Body::from(payload),
    )
    .await?;
    assert_eq!(elsewhere.status(), StatusCode::FORBIDDEN);

    let listed = send(
        app(&state),
        Method::GET,
        format!("/api/v1/commandes/{order_id}/items"),
        &[(ORDER_TOKEN_HEADER, token.as_str())],
        Body::empty(),
    )
    .await?;
    assert_eq!(listed.status(), StatusCode::OK);
    assert!(body_text(listed).await?.contains(&dish.id.to_string()));

    Ok(())
}
