
use actix_web::{http::StatusCode, test};
use mockall::predicate::eq;
use portfolio_cms::{
    entities::{
        option_fields::OptionField,
        project::ProjectDetailResponse,
        resume::{ResumeAdminResponse, ResumeFilter},
    },
    errors::AppError,
};
use serde_json::{json, Value};
use test_utils::*;

#[actix_rt::test]
async fn admin_routes_require_the_bearer_token() {
    let mut projects = MockProjectRepo::new();
    projects.expect_list_projects().never();

    let state = build_state(&test_config(), projects, MockResumeRepo::new(), local_like_storage());
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/admin/projects").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/admin/projects")
        .insert_header(("Authorization", "Bearer not-the-admin-token"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/admin/projects")
        .insert_header(("Authorization", ADMIN_TOKEN))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn admin_index_describes_the_site() {
    let state = build_state(&test_config(), MockProjectRepo::new(), MockResumeRepo::new(), local_like_storage());
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/admin/")
        .insert_header(bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["site_header"], "Siri Tech Portfolio Admin");
    assert_eq!(body["site_title"], "Siri Tech Admin");
    assert_eq!(body["index_title"], "Portfolio Management");
    assert_eq!(body["resources"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["resources"][1]["search_fields"], json!(["title"]));
    assert_eq!(body["resources"][1]["list_filter"], json!(["is_active"]));
}

#[actix_rt::test]
async fn admin_list_passes_search_and_featured_filters() {
    let mut projects = MockProjectRepo::new();
    projects
        .expect_list_projects()
        .withf(|filter| {
            filter.featured_only && filter.search.as_deref() == Some("rust") && filter.limit.is_none()
        })
        .times(1)
        .returning(|_| Ok(vec![project(1, "Rust CLI", true, 0)]));

    let state = build_state(&test_config(), projects, MockResumeRepo::new(), local_like_storage());
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/admin/projects?search=%20rust%20&featured=1")
        .insert_header(bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Vec<ProjectDetailResponse> = test::read_body_json(resp).await;
    assert_eq!(body[0].description, "Rust CLI description");
}

#[actix_rt::test]
async fn create_project_validates_and_returns_detail() {
    let mut projects = MockProjectRepo::new();
    projects
        .expect_create_project()
        .withf(|insert| {
            insert.title == "New Project"
                && insert.github_url.is_none()
                && insert.live_url.as_deref() == Some("https://example.com")
                && insert.display_order == 2
        })
        .times(1)
        .returning(|insert| {
            let mut p = project(10, &insert.title, insert.featured, insert.display_order);
            p.github_url = insert.github_url.clone();
            p.live_url = insert.live_url.clone();
            Ok(p)
        });

    let state = build_state(&test_config(), projects, MockResumeRepo::new(), local_like_storage());
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/admin/projects")
        .insert_header(bearer())
        .set_json(json!({
            "title": "New Project",
            "description": "Something worth showing",
            "github_url": "  ",
            "live_url": "https://example.com",
            "technologies": "Rust",
            "featured": true,
            "order": 2
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: ProjectDetailResponse = test::read_body_json(resp).await;
    assert_eq!(body.id, 10);
    assert_eq!(body.order, 2);
    assert_eq!(body.github_url, None);
}

#[actix_rt::test]
async fn create_project_rejects_invalid_fields() {
    let mut projects = MockProjectRepo::new();
    projects.expect_create_project().never();

    let state = build_state(&test_config(), projects, MockResumeRepo::new(), local_like_storage());
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/admin/projects")
        .insert_header(bearer())
        .set_json(json!({
            "title": "",
            "description": "ok",
            "github_url": "ftp://example.com/repo",
            "order": -1
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Validation failed");

    let fields: Vec<&str> = body["details"]
        .as_array()
        .map(|details| details.iter().filter_map(|d| d["field"].as_str()).collect())
        .unwrap_or_default();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"github_url"));
    assert!(fields.contains(&"display_order"));
}

#[actix_rt::test]
async fn malformed_json_is_a_400() {
    let state = build_state(&test_config(), MockProjectRepo::new(), MockResumeRepo::new(), local_like_storage());
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/admin/projects")
        .insert_header(bearer())
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap_or_default().starts_with("JSON payload error"));
}

#[actix_rt::test]
async fn patch_distinguishes_absent_and_null_fields() {
    let mut projects = MockProjectRepo::new();
    projects
        .expect_update_project()
        .withf(|id, patch| {
            *id == 3
                && patch.github_url == OptionField::SetToNull
                && patch.live_url == OptionField::SetToNull
                && patch.featured == OptionField::SetToValue(true)
                && patch.title.is_unchanged()
                && patch.description.is_unchanged()
        })
        .times(1)
        .returning(|id, _| Ok(project(id, "Patched", true, 0)));

    let state = build_state(&test_config(), projects, MockResumeRepo::new(), local_like_storage());
    let app = init_app!(state);

    let req = test::TestRequest::patch()
        .uri("/admin/projects/3")
        .insert_header(bearer())
        .set_json(json!({ "github_url": null, "live_url": "", "featured": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn patch_rejects_null_required_fields_and_empty_bodies() {
    let mut projects = MockProjectRepo::new();
    projects.expect_update_project().never();

    let state = build_state(&test_config(), projects, MockResumeRepo::new(), local_like_storage());
    let app = init_app!(state);

    let req = test::TestRequest::patch()
        .uri("/admin/projects/3")
        .insert_header(bearer())
        .set_json(json!({ "title": null }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::patch()
        .uri("/admin/projects/3")
        .insert_header(bearer())
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn uploading_an_image_replaces_and_removes_the_old_file() {
    let mut projects = MockProjectRepo::new();
    projects.expect_get_project_by_id().with(eq(4)).returning(|id| {
        let mut p = project(id, "Shot", false, 0);
        p.image = Some("projects/old-00000000.png".to_string());
        Ok(p)
    });
    projects
        .expect_set_project_image()
        .withf(|id, image| *id == 4 && image.as_deref() == Some("projects/screenshot-12345678.png"))
        .times(1)
        .returning(|id, image| {
            let mut p = project(id, "Shot", false, 0);
            p.image = image;
            Ok(p)
        });

    let mut storage = local_like_storage();
    storage
        .expect_store()
        .withf(|directory, file_name, bytes| {
            directory.to_string() == "projects" && file_name.to_string() == "screenshot.png" && !bytes.is_empty()
        })
        .times(1)
        .returning(|_, _, _| Ok("projects/screenshot-12345678.png".to_string()));
    storage
        .expect_delete()
        .withf(|key| key.to_string() == "projects/old-00000000.png")
        .times(1)
        .returning(|_| Ok(()));

    let state = build_state(&test_config(), projects, MockResumeRepo::new(), storage);
    let app = init_app!(state);

    let body = multipart_body(&[Part::File {
        name: "image",
        file_name: "screenshot.png",
        content_type: "image/png",
        bytes: PNG_BYTES,
    }]);
    let req = test::TestRequest::put()
        .uri("/admin/projects/4/image")
        .insert_header(bearer())
        .insert_header(("Host", TEST_HOST))
        .insert_header(multipart_content_type())
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: ProjectDetailResponse = test::read_body_json(resp).await;
    assert_eq!(
        body.image.as_deref(),
        Some("http://portfolio.test/media/projects/screenshot-12345678.png")
    );
}

#[actix_rt::test]
async fn removing_an_image_clears_the_field_and_deletes_the_file() {
    let mut projects = MockProjectRepo::new();
    projects.expect_get_project_by_id().with(eq(4)).returning(|id| {
        let mut p = project(id, "Shot", false, 0);
        p.image = Some("projects/old-00000000.png".to_string());
        Ok(p)
    });
    projects
        .expect_set_project_image()
        .with(eq(4), eq(None::<String>))
        .times(1)
        .returning(|id, _| Ok(project(id, "Shot", false, 0)));

    let mut storage = local_like_storage();
    storage
        .expect_delete()
        .withf(|key| key.to_string() == "projects/old-00000000.png")
        .times(1)
        .returning(|_| Ok(()));

    let state = build_state(&test_config(), projects, MockResumeRepo::new(), storage);
    let app = init_app!(state);

    let req = test::TestRequest::delete()
        .uri("/admin/projects/4/image/")
        .insert_header(bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], 4);
    assert!(body["image"].is_null());
}

#[actix_rt::test]
async fn uploading_a_non_image_is_rejected() {
    let mut projects = MockProjectRepo::new();
    projects.expect_set_project_image().never();

    let mut storage = local_like_storage();
    storage.expect_store().never();

    let state = build_state(&test_config(), projects, MockResumeRepo::new(), storage);
    let app = init_app!(state);

    let body = multipart_body(&[Part::File {
        name: "image",
        file_name: "notes.png",
        content_type: "image/png",
        bytes: b"just some text pretending to be an image",
    }]);
    let req = test::TestRequest::put()
        .uri("/admin/projects/4/image")
        .insert_header(bearer())
        .insert_header(multipart_content_type())
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn deleting_a_project_removes_its_image() {
    let mut projects = MockProjectRepo::new();
    projects.expect_delete_project().with(eq(8)).times(1).returning(|id| {
        let mut p = project(id, "Old", false, 0);
        p.image = Some("projects/old.png".to_string());
        Ok(p)
    });

    let mut storage = local_like_storage();
    storage
        .expect_delete()
        .withf(|key| key.to_string() == "projects/old.png")
        .times(1)
        .returning(|_| Ok(()));

    let state = build_state(&test_config(), projects, MockResumeRepo::new(), storage);
    let app = init_app!(state);

    let req = test::TestRequest::delete()
        .uri("/admin/projects/8/")
        .insert_header(bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_rt::test]
async fn resume_upload_stores_pdf_and_activates_by_default() {
    let mut resumes = MockResumeRepo::new();
    resumes
        .expect_create_resume()
        .withf(|insert| {
            insert.title == "Resume" && insert.is_active && insert.file == "resume/cv-abcdef12.pdf"
        })
        .times(1)
        .returning(|insert| Ok(resume(9, &insert.title, &insert.file, insert.is_active)));

    let mut storage = local_like_storage();
    storage
        .expect_store()
        .withf(|directory, _, _| directory.to_string() == "resume")
        .times(1)
        .returning(|_, _, _| Ok("resume/cv-abcdef12.pdf".to_string()));

    let state = build_state(&test_config(), MockProjectRepo::new(), resumes, storage);
    let app = init_app!(state);

    let body = multipart_body(&[Part::File {
        name: "file",
        file_name: "cv.pdf",
        content_type: "application/pdf",
        bytes: PDF_BYTES,
    }]);
    let req = test::TestRequest::post()
        .uri("/admin/resumes")
        .insert_header(bearer())
        .insert_header(multipart_content_type())
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: ResumeAdminResponse = test::read_body_json(resp).await;
    assert!(body.is_active);
    assert_eq!(body.file, "resume/cv-abcdef12.pdf");
}

#[actix_rt::test]
async fn resume_upload_honours_title_and_inactive_flag() {
    let mut resumes = MockResumeRepo::new();
    resumes
        .expect_create_resume()
        .withf(|insert| insert.title == "Backend CV" && !insert.is_active)
        .times(1)
        .returning(|insert| Ok(resume(9, &insert.title, &insert.file, insert.is_active)));

    let mut storage = local_like_storage();
    storage
        .expect_store()
        .returning(|_, _, _| Ok("resume/cv.pdf".to_string()));

    let state = build_state(&test_config(), MockProjectRepo::new(), resumes, storage);
    let app = init_app!(state);

    let body = multipart_body(&[
        Part::File { name: "file", file_name: "cv.pdf", content_type: "application/pdf", bytes: PDF_BYTES },
        Part::Text { name: "title", value: "Backend CV" },
        Part::Text { name: "is_active", value: "false" },
    ]);
    let req = test::TestRequest::post()
        .uri("/admin/resumes")
        .insert_header(bearer())
        .insert_header(multipart_content_type())
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[actix_rt::test]
async fn resume_upload_rejects_non_pdf_files() {
    let mut resumes = MockResumeRepo::new();
    resumes.expect_create_resume().never();

    let mut storage = local_like_storage();
    storage.expect_store().never();

    let state = build_state(&test_config(), MockProjectRepo::new(), resumes, storage);
    let app = init_app!(state);

    let body = multipart_body(&[Part::File {
        name: "file",
        file_name: "cv.pdf",
        content_type: "application/pdf",
        bytes: PNG_BYTES,
    }]);
    let req = test::TestRequest::post()
        .uri("/admin/resumes")
        .insert_header(bearer())
        .insert_header(multipart_content_type())
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn failed_resume_insert_removes_the_stored_file() {
    let mut resumes = MockResumeRepo::new();
    resumes
        .expect_create_resume()
        .returning(|_| Err(AppError::Conflict("Database conflict occurred".into())));

    let mut storage = local_like_storage();
    storage
        .expect_store()
        .returning(|_, _, _| Ok("resume/cv.pdf".to_string()));
    storage
        .expect_delete()
        .withf(|key| key.to_string() == "resume/cv.pdf")
        .times(1)
        .returning(|_| Ok(()));

    let state = build_state(&test_config(), MockProjectRepo::new(), resumes, storage);
    let app = init_app!(state);

    let body = multipart_body(&[Part::File {
        name: "file",
        file_name: "cv.pdf",
        content_type: "application/pdf",
        bytes: PDF_BYTES,
    }]);
    let req = test::TestRequest::post()
        .uri("/admin/resumes")
        .insert_header(bearer())
        .insert_header(multipart_content_type())
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn activating_a_resume_goes_through_the_store() {
    let mut resumes = MockResumeRepo::new();
    resumes
        .expect_update_resume()
        .withf(|id, patch| *id == 2 && patch.is_active == OptionField::SetToValue(true) && patch.title.is_unchanged())
        .times(1)
        .returning(|id, _| Ok(resume(id, "Resume", "resume/cv.pdf", true)));

    let state = build_state(&test_config(), MockProjectRepo::new(), resumes, local_like_storage());
    let app = init_app!(state);

    let req = test::TestRequest::patch()
        .uri("/admin/resumes/2")
        .insert_header(bearer())
        .set_json(json!({ "is_active": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: ResumeAdminResponse = test::read_body_json(resp).await;
    assert!(body.is_active);
}

#[actix_rt::test]
async fn resume_list_and_delete() {
    let mut resumes = MockResumeRepo::new();
    resumes.expect_list_resumes().with(eq(ResumeFilter::all())).returning(|_| {
        Ok(vec![
            resume(2, "Newer", "resume/b.pdf", true),
            resume(1, "Older", "resume/a.pdf", false),
        ])
    });
    resumes
        .expect_delete_resume()
        .with(eq(1))
        .returning(|id| Ok(resume(id, "Older", "resume/a.pdf", false)));

    let mut storage = local_like_storage();
    storage
        .expect_delete()
        .withf(|key| key.to_string() == "resume/a.pdf")
        .times(1)
        .returning(|_| Ok(()));

    let state = build_state(&test_config(), MockProjectRepo::new(), resumes, storage);
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/admin/resumes")
        .insert_header(bearer())
        .insert_header(("Host", TEST_HOST))
        .to_request();
    let body: Vec<ResumeAdminResponse> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.len(), 2);
    assert_eq!(body[0].url.as_deref(), Some("http://portfolio.test/media/resume/b.pdf"));

    let req = test::TestRequest::delete()
        .uri("/admin/resumes/1")
        .insert_header(bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

#[actix_rt::test]
async fn resume_list_passes_search_and_active_filters() {
    let mut resumes = MockResumeRepo::new();
    resumes
        .expect_list_resumes()
        .withf(|filter| filter.search.as_deref() == Some("backend") && filter.is_active == Some(false))
        .times(1)
        .returning(|_| Ok(vec![resume(3, "Backend CV", "resume/backend.pdf", false)]));

    let state = build_state(&test_config(), MockProjectRepo::new(), resumes, local_like_storage());
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/admin/resumes?search=%20backend%20&is_active=false")
        .insert_header(bearer())
        .to_request();
    let body: Vec<ResumeAdminResponse> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.len(), 1);
    assert_eq!(body[0].title, "Backend CV");

    let req = test::TestRequest::get()
        .uri("/admin/resumes?is_active=maybe")
        .insert_header(bearer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn single_resume_is_fetched_by_id() {
    let mut resumes = MockResumeRepo::new();
    resumes
        .expect_get_resume_by_id()
        .with(eq(5))
        .returning(|id| Ok(resume(id, "Current", "resume/current.pdf", true)));
    resumes
        .expect_get_resume_by_id()
        .with(eq(6))
        .returning(|_| Err(AppError::NotFound("Resume not found".into())));

    let state = build_state(&test_config(), MockProjectRepo::new(), resumes, local_like_storage());
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/admin/resumes/5")
        .insert_header(bearer())
        .insert_header(("Host", TEST_HOST))
        .to_request();
    let body: ResumeAdminResponse = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.id, 5);
    assert!(body.is_active);
    assert_eq!(body.url.as_deref(), Some("http://portfolio.test/media/resume/current.pdf"));

    for uri in ["/admin/resumes/6", "/admin/resumes/abc"] {
        let req = test::TestRequest::get().uri(uri).insert_header(bearer()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}
