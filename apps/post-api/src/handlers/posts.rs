//! Post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use posts_core::domain::Post;
use posts_shared::dto::{CreatePostRequest, ListPostsQuery, PostResponse};

use crate::middleware::error::{AppError, AppResult};
use crate::middleware::identity::Identity;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 100;
const MAX_PAGE_SIZE: u64 = 500;

fn to_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        user_id: post.owner_id,
        title: post.title,
        content: post.content,
        created_at: post.created_at,
    }
}

/// POST /posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    tracing::info!(user_id = %identity.user_id, "Create post request");

    let req = body.into_inner();
    let post = state
        .service
        .create_post(&identity.user_id, &req.title, &req.content)
        .await?;

    Ok(HttpResponse::Created().json(to_response(post)))
}

/// GET /posts?page=&size=
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let page = query.page.unwrap_or(0);
    let size = query.size.unwrap_or(DEFAULT_PAGE_SIZE);

    if size < 1 || size > MAX_PAGE_SIZE {
        return Err(AppError::BadRequest(format!(
            "size must be between 1 and {MAX_PAGE_SIZE}"
        )));
    }

    tracing::info!(page, size, "List posts request");

    let posts = state.service.list_posts(page, size).await?;
    let body: Vec<PostResponse> = posts.into_iter().map(to_response).collect();

    Ok(HttpResponse::Ok().json(body))
}

/// DELETE /posts/{post_id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    tracing::info!(post_id = %post_id, user_id = %identity.user_id, "Delete post request");

    state.service.delete_post(post_id, &identity.user_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::json;

    use posts_core::PostService;
    use posts_infra::InMemoryPostRepository;

    use crate::handlers::configure_routes;

    fn test_state() -> AppState {
        let posts: Arc<InMemoryPostRepository> = Arc::new(InMemoryPostRepository::new());
        AppState {
            service: PostService::new(posts.clone()),
            posts,
        }
    }

    macro_rules! test_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .configure(configure_routes),
            )
            .await
        };
    }

    fn create_req(user_id: &str, title: &str, content: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/posts")
            .insert_header(("X-User-Id", user_id))
            .set_json(json!({ "title": title, "content": content }))
    }

    #[actix_web::test]
    async fn create_post_returns_created_with_assigned_fields() {
        let state = test_state();
        let app = test_app!(state);

        let resp = test::call_service(&app, create_req("alice", "T", "C").to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let post: PostResponse = test::read_body_json(resp).await;
        assert_eq!(post.user_id, "alice");
        assert_eq!(post.title, "T");
        assert_eq!(post.content, "C");
    }

    #[actix_web::test]
    async fn create_post_without_identity_header_is_unauthorized() {
        let state = test_state();
        let app = test_app!(state);

        let req = test::TestRequest::post()
            .uri("/posts")
            .set_json(json!({ "title": "T", "content": "C" }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn create_post_with_blank_title_is_bad_request() {
        let state = test_state();
        let app = test_app!(state);

        let resp = test::call_service(&app, create_req("alice", "  ", "C").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn list_posts_returns_newest_first() {
        let state = test_state();
        let app = test_app!(state);

        for title in ["first", "second", "third"] {
            let resp = test::call_service(&app, create_req("alice", title, "C").to_request()).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get().uri("/posts").to_request();
        let posts: Vec<PostResponse> = test::call_and_read_body_json(&app, req).await;

        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);
    }

    #[actix_web::test]
    async fn list_posts_rejects_out_of_bounds_size() {
        let state = test_state();
        let app = test_app!(state);

        for uri in ["/posts?size=0", "/posts?size=501"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[actix_web::test]
    async fn delete_post_hides_existence_behind_forbidden() {
        let state = test_state();
        let app = test_app!(state);

        let resp = test::call_service(&app, create_req("alice", "T", "C").to_request()).await;
        let post: PostResponse = test::read_body_json(resp).await;

        // Wrong owner and missing post are indistinguishable to the caller.
        let req = test::TestRequest::delete()
            .uri(&format!("/posts/{}", post.id))
            .insert_header(("X-User-Id", "bob"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );

        let req = test::TestRequest::delete()
            .uri(&format!("/posts/{}", Uuid::new_v4()))
            .insert_header(("X-User-Id", "bob"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );
    }

    #[actix_web::test]
    async fn owner_can_delete_and_repeat_delete_is_forbidden() {
        let state = test_state();
        let app = test_app!(state);

        let resp = test::call_service(&app, create_req("alice", "T", "C").to_request()).await;
        let post: PostResponse = test::read_body_json(resp).await;

        let req = test::TestRequest::delete()
            .uri(&format!("/posts/{}", post.id))
            .insert_header(("X-User-Id", "alice"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::NO_CONTENT
        );

        let req = test::TestRequest::get().uri("/posts").to_request();
        let posts: Vec<PostResponse> = test::call_and_read_body_json(&app, req).await;
        assert!(posts.is_empty());

        let req = test::TestRequest::delete()
            .uri(&format!("/posts/{}", post.id))
            .insert_header(("X-User-Id", "alice"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN
        );
    }
}
