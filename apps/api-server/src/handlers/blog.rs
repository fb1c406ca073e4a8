//! Blog post handlers - the public reader and the admin dashboard.
//!
//! Every handler delegates to [`blog_core::services::BlogService`]; this module only
//! translates between wire types and domain values.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use blog_core::domain::{BlogPost, PostDraft, Section};
use blog_core::policy::{Page, PageRequest};
use blog_shared::ApiResponse;
use blog_shared::dto::{
    BlogPostRequest, BlogPostResponse, DeletedResponse, PageQuery, PaginatedResponse,
    PublishRequest, SectionDto,
};

use crate::config::BlogSettings;
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn page_request(settings: &BlogSettings, query: PageQuery) -> AppResult<PageRequest> {
    let page = query.page.unwrap_or(1).max(1);
    let size = query
        .limit
        .unwrap_or(settings.page_size)
        .clamp(1, settings.max_page_size.max(1));
    Ok(PageRequest::new(page, size)?)
}

fn post_response(post: BlogPost) -> BlogPostResponse {
    BlogPostResponse {
        id: post.id,
        author_id: post.author_id,
        title: post.title,
        introduction: post.introduction,
        sections: post
            .sections
            .into_iter()
            .map(|s| SectionDto {
                heading: s.heading,
                content: s.content,
                examples: s.examples,
            })
            .collect(),
        is_published: post.is_published,
        published_at: post.published_at,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn paginated(page: Page<BlogPost>) -> PaginatedResponse<BlogPostResponse> {
    let page = page.map(post_response);
    PaginatedResponse {
        items: page.items,
        total_count: page.total_count,
        total_pages: page.total_pages,
        current_page: page.page,
        page_size: page.page_size,
    }
}

/// Validate a request body into a draft, returning the requested publication flag too.
fn draft_from_request(req: BlogPostRequest) -> AppResult<(PostDraft, Option<bool>)> {
    let sections = req
        .sections
        .into_iter()
        .map(|s| Section {
            heading: s.heading,
            content: s.content,
            examples: s.examples,
        })
        .collect();
    let draft = PostDraft::new(req.title, req.introduction, sections)?;
    Ok((draft, req.is_published))
}

/// GET /api/blogs?page=&limit=
pub async fn list_published(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let request = page_request(&state.settings, query.into_inner())?;
    let page = state.blog.list_published(request).await?;

    Ok(HttpResponse::Ok().json(paginated(page)))
}

/// GET /api/blogs/{id}
///
/// Authors also see their own drafts. Anything else that is not published answers
/// exactly like an unknown id.
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    caller: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let post = state
        .blog
        .get_visible(path.into_inner(), caller.admin_id())
        .await?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// GET /api/admin/blogs?page=&limit=
pub async fn list_own(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let request = page_request(&state.settings, query.into_inner())?;
    let page = state.blog.list_authored(identity.admin_id, request).await?;

    Ok(HttpResponse::Ok().json(paginated(page)))
}

/// POST /api/admin/blogs
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<BlogPostRequest>,
) -> AppResult<HttpResponse> {
    let (draft, publish) = draft_from_request(body.into_inner())?;
    let post = state
        .blog
        .create(identity.admin_id, draft, publish.unwrap_or(false))
        .await?;

    Ok(HttpResponse::Created().json(post_response(post)))
}

/// PUT /api/admin/blogs/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<BlogPostRequest>,
) -> AppResult<HttpResponse> {
    let (draft, publish) = draft_from_request(body.into_inner())?;
    let post = state
        .blog
        .update(path.into_inner(), Some(identity.admin_id), draft, publish)
        .await?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// PATCH /api/admin/blogs/{id}/publish
pub async fn set_published(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PublishRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .blog
        .set_published(path.into_inner(), Some(identity.admin_id), body.is_published)
        .await?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// DELETE /api/admin/blogs/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.blog.delete(id, Some(identity.admin_id)).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        DeletedResponse { id },
        "Blog post deleted",
    )))
}
