pub mod data;
pub mod department;
pub mod employee;
pub mod image;

use actix_web::web;

/// Mounts every route under `/api`. Expects `RecordStore`, `DirectoryLoader`,
/// `ImageGateway` and `AttributeIndex` as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(web::resource("/employees").route(web::get().to(employee::get_employees)))
            .service(
                web::resource("/employees/search").route(web::get().to(employee::search_employees)),
            )
            .service(
                web::resource("/employees/filter").route(web::get().to(employee::filter_employees)),
            )
            .service(
                web::resource("/employees/{emp_code}/attendance")
                    .route(web::get().to(employee::get_attendance)),
            )
            .service(
                web::resource("/employees/{emp_code}/image")
                    .route(web::post().to(image::upload_image))
                    .route(web::get().to(image::get_image))
                    .route(web::delete().to(image::delete_image)),
            )
            .service(
                web::resource("/department/{name}/employees")
                    .route(web::get().to(department::get_department_employees)),
            )
            .service(web::resource("/field-values").route(web::get().to(data::get_field_values)))
            .service(web::resource("/refresh-data").route(web::post().to(data::refresh_data)))
            .service(web::resource("/upload-data").route(web::post().to(data::upload_data)))
            .service(
                web::resource("/data-source-info").route(web::get().to(data::get_data_source_info)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde_json::Value;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::ImagePolicy;
    use crate::directory::index::AttributeIndex;
    use crate::directory::loader::{DataSource, DirectoryLoader};
    use crate::directory::store::RecordStore;
    use crate::images::tests::PNG;
    use crate::images::{ImageGateway, MemoryImageStore};

    const BOUNDARY: &str = "XdirectoryBoundaryX";

    const DIRECTORY_CSV: &str =
        "EMP ID,EMP NAME,DEPARTMENT,LOCATION,GRADE,MOBILE,EXTENSION NUMBER,EMAIL ID\n\
        81096,ANIRUDH VERMA,IT,IFC,IT EXECUTIVE,8929987500,1001,anirudh@example.com\n\
        80957,BINAY KUMAR,IT,IFC,IT EXECUTIVE,8929987501,1002,\n\
        80176,NEERAJ KALRA,IT,IFC,SENIOR MANAGER,8929987502,,\n\
        12346,Jane Smith,HR,Los Angeles,Manager,5550102,,jane@example.com\n\
        12347,Mike Johnson,Finance,Chicago,Analyst,5550103,,\n";

    struct Fixture {
        records: web::Data<RecordStore>,
        loader: web::Data<DirectoryLoader>,
        images: web::Data<ImageGateway>,
        index: web::Data<AttributeIndex>,
        source_file: tempfile::NamedTempFile,
    }

    async fn fixture(max_image_size: usize) -> Fixture {
        let mut source = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        source.write_all(DIRECTORY_CSV.as_bytes()).unwrap();

        let loader = DirectoryLoader::new(
            DataSource::Csv { path: source.path().to_path_buf() },
            None,
            Duration::from_secs(1),
        )
        .unwrap();
        let records = RecordStore::new();
        loader.reload(&records).await;

        let policy = ImagePolicy {
            max_size_bytes: max_image_size,
            ..ImagePolicy::default()
        };

        Fixture {
            records: web::Data::new(records),
            loader: web::Data::new(loader),
            images: web::Data::new(ImageGateway::new(Arc::new(MemoryImageStore::new()), policy)),
            index: web::Data::new(AttributeIndex::new()),
            source_file: source,
        }
    }

    macro_rules! service {
        ($fx:expr) => {
            test::init_service(
                App::new()
                    .app_data($fx.records.clone())
                    .app_data($fx.loader.clone())
                    .app_data($fx.images.clone())
                    .app_data($fx.index.clone())
                    .configure(configure),
            )
            .await
        };
    }

    fn multipart_body(file_name: &str, content: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        write!(
            body,
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .unwrap();
        body.extend_from_slice(content);
        write!(body, "\r\n--{BOUNDARY}--\r\n").unwrap();
        body
    }

    fn multipart_request(uri: &str, file_name: &str, content: &[u8]) -> test::TestRequest {
        test::TestRequest::post()
            .uri(uri)
            .insert_header(("content-type", format!("multipart/form-data; boundary={BOUNDARY}")))
            .set_payload(multipart_body(file_name, content))
    }

    fn codes(body: &Value) -> Vec<String> {
        body["employees"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["emp_code"].as_str().unwrap().to_string())
            .collect()
    }

    #[actix_web::test]
    async fn lists_all_employees() {
        let fx = fixture(1024).await;
        let app = service!(fx);

        let req = test::TestRequest::get().uri("/api/employees").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(codes(&body).len(), 5);
        assert_eq!(body["employees"][0]["extension_number"], "1001");
        assert!(body["employees"][2]["email"].is_null());
    }

    #[actix_web::test]
    async fn search_returns_ranked_suggestions_and_all_matches() {
        let fx = fixture(1024).await;
        let app = service!(fx);

        let req = test::TestRequest::get()
            .uri("/api/employees/search?q=man&field=designation")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["suggestions"], serde_json::json!(["Manager", "SENIOR MANAGER"]));
        assert_eq!(codes(&body), vec!["80176", "12346"]);

        let req = test::TestRequest::get().uri("/api/employees/search?q=chicago").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["suggestions"], serde_json::json!([]));
        assert_eq!(codes(&body), vec!["12347"]);

        let req = test::TestRequest::get().uri("/api/employees/search").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(codes(&body).len(), 5);
    }

    #[actix_web::test]
    async fn overly_long_search_is_rejected() {
        let fx = fixture(1024).await;
        let app = service!(fx);

        let req = test::TestRequest::get()
            .uri(&format!("/api/employees/search?q={}", "a".repeat(300)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn filter_matches_exact_values_and_ignores_unknown_params() {
        let fx = fixture(1024).await;
        let app = service!(fx);

        let req = test::TestRequest::get()
            .uri("/api/employees/filter?department=it&designation=IT%20EXECUTIVE&colour=blue")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(codes(&body), vec!["81096", "80957"]);

        let req = test::TestRequest::get()
            .uri("/api/employees/filter?extension_number=1002")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(codes(&body), vec!["80957"]);

        let req = test::TestRequest::get().uri("/api/employees/filter").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(codes(&body).len(), 5);
    }

    #[actix_web::test]
    async fn department_count_matches_employee_list() {
        let fx = fixture(1024).await;
        let app = service!(fx);

        let req = test::TestRequest::get().uri("/api/department/it/employees").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["department"], "it");
        assert_eq!(body["count"], 3);
        assert_eq!(codes(&body).len(), 3);
    }

    #[actix_web::test]
    async fn attendance_requires_a_known_employee() {
        let fx = fixture(1024).await;
        let app = service!(fx);

        let req = test::TestRequest::get().uri("/api/employees/81096/attendance").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["attendance"]["emp_code"], "81096");
        assert_eq!(body["attendance"]["emp_name"], "ANIRUDH VERMA");
        let status = body["attendance"]["status"].as_str().unwrap();
        assert!(["Present", "Late", "Half Day", "Absent"].contains(&status));

        let req = test::TestRequest::get().uri("/api/employees/99999/attendance").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn field_values_cover_searchable_fields() {
        let fx = fixture(1024).await;
        let app = service!(fx);

        let req = test::TestRequest::get().uri("/api/field-values").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["departments"], serde_json::json!(["Finance", "HR", "IT"]));
        assert_eq!(body["extension_numbers"], serde_json::json!(["1001", "1002"]));
        assert_eq!(body["emails"].as_array().unwrap().len(), 2);
        assert_eq!(body["emp_codes"].as_array().unwrap().len(), 5);
    }

    #[actix_web::test]
    async fn image_lifecycle_over_http() {
        let fx = fixture(1024).await;
        let app = service!(fx);

        let req = multipart_request("/api/employees/81096/image", "photo.png", PNG).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        let uploaded = body["image_url"].as_str().unwrap().to_string();

        let req = test::TestRequest::get().uri("/api/employees/81096/image").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["image_url"], uploaded.as_str());
        let encoded = uploaded.strip_prefix("data:image/png;base64,").unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), PNG);

        // Listings carry the stored image.
        let req = test::TestRequest::get().uri("/api/employees/filter?emp_code=81096").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["employees"][0]["image_url"], uploaded.as_str());

        let req = test::TestRequest::delete().uri("/api/employees/81096/image").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);

        let req = test::TestRequest::get().uri("/api/employees/81096/image").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::delete().uri("/api/employees/81096/image").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn image_upload_validation_failures() {
        let fx = fixture(64).await;
        let app = service!(fx);

        let req = multipart_request("/api/employees/81096/image", "big.png", &[0u8; 200])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = multipart_request("/api/employees/81096/image", "notes.txt", b"just some text")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = multipart_request("/api/employees/404/image", "photo.png", PNG).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn refresh_keeps_data_when_the_source_disappears() {
        let fx = fixture(1024).await;
        let app = service!(fx);

        let req = test::TestRequest::post().uri("/api/refresh-data").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["source"], "csv");
        assert_eq!(body["count"], 5);
        assert!(body["message"].as_str().unwrap().contains("5 employees"));

        let path = PathBuf::from(fx.source_file.path());
        std::fs::remove_file(&path).unwrap();

        let req = test::TestRequest::post().uri("/api/refresh-data").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["outcome"], "kept_previous");
        assert_eq!(body["count"], 5);

        let req = test::TestRequest::get().uri("/api/data-source-info").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data_source"], "csv");
        assert_eq!(body["employees_count"], 5);
        assert_eq!(body["file_exists"], false);
    }

    #[actix_web::test]
    async fn uploaded_data_replaces_the_directory() {
        let fx = fixture(1024).await;
        let app = service!(fx);

        let csv = "EMP ID,EMP NAME,DEPARTMENT,LOCATION,GRADE,MOBILE\n1,A,D,L,G,M\n2,B,D,L,G,\n";
        let req =
            multipart_request("/api/upload-data", "directory.csv", csv.as_bytes()).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["source"], "upload");
        assert_eq!(body["count"], 1);

        let req = test::TestRequest::get().uri("/api/employees").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(codes(&body), vec!["1"]);
        assert_eq!(body["employees"][0]["designation"], "G");

        let req =
            multipart_request("/api/upload-data", "directory.csv", b"EMP ID\n9\n").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(fx.records.len(), 1);
    }

    #[actix_web::test]
    async fn whitespace_query_is_a_search_not_a_browse() {
        let fx = fixture(1024).await;
        let app = service!(fx);

        let req = test::TestRequest::get()
            .uri("/api/employees/search?q=%20&field=department")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["suggestions"], serde_json::json!([]));
        assert!(codes(&body).is_empty());

        let req = test::TestRequest::get()
            .uri("/api/employees/search?q=&field=department")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(codes(&body).len(), 5);
    }

    #[actix_web::test]
    async fn unbounded_image_limit_still_accepts_uploads() {
        let fx = fixture(usize::MAX).await;
        let app = service!(fx);

        let req = multipart_request("/api/employees/81096/image", "photo.png", PNG).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
    }

    #[actix_web::test]
    async fn corrupt_image_body_is_rejected() {
        let fx = fixture(1024).await;
        let app = service!(fx);

        let mut corrupt = b"\x89PNG\r\n\x1a\n".to_vec();
        corrupt.extend_from_slice(b"garbage after a valid signature");
        let req =
            multipart_request("/api/employees/81096/image", "photo.png", &corrupt).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn data_upload_honours_the_configured_limit() {
        let mut fx = fixture(1024).await;
        let loader = DirectoryLoader::new(
            DataSource::Csv { path: fx.source_file.path().to_path_buf() },
            None,
            Duration::from_secs(1),
        )
        .unwrap()
        .with_upload_limit(32);
        fx.loader = web::Data::new(loader);
        let app = service!(fx);

        let csv = "EMP ID,EMP NAME,DEPARTMENT,LOCATION,GRADE,MOBILE\n1,A,D,L,G,M\n";
        let req =
            multipart_request("/api/upload-data", "directory.csv", csv.as_bytes()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(fx.records.len(), 5);
    }
}
