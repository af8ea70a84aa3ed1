//! End-to-end requests against the router, backed by in-memory storage.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use database_layer::models::{AppointmentStatus, Patient, Role, Specialization, User};
use database_layer::RecordFilter;
use serde_json::{json, Value};
use tower::ServiceExt;

use clinic_server::{create_app, ClinicConfig, ClinicServer};

struct TestClinic {
    server: ClinicServer,
    app: Router,
}

impl TestClinic {
    fn new() -> Self {
        let server = ClinicServer::in_memory(ClinicConfig::default());
        let app = create_app(server.clone());
        Self { server, app }
    }

    async fn user(&self, username: &str, role: Role) -> (User, String) {
        let mut user = User::new(username, role);
        if role == Role::Doctor {
            user.specialization = Some(Specialization::GeneralPractitioner);
        }
        let user = self.server.repos.users.insert(user).await.unwrap();
        let token = self.server.jwt.issue(&user).unwrap();
        (user, token)
    }

    /// A patient account with its profile, optionally assigned to a doctor.
    async fn patient(&self, username: &str, doctor: Option<&User>) -> (Patient, String) {
        let (user, token) = self.user(username, Role::Patient).await;
        let mut profile = Patient::new(user.id);
        profile.assigned_doctor_id = doctor.map(|d| d.id);
        let profile = self.server.repos.patients.insert(profile).await.unwrap();
        (profile, token)
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request(method, uri, token, body)).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn id_of(body: &Value) -> String {
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn requests_without_a_token_are_rejected() {
    let clinic = TestClinic::new();
    let (status, body) = clinic.send(Method::GET, "/api/v1/patients", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_type"], "authentication_error");
}

#[tokio::test]
async fn health_is_public() {
    let clinic = TestClinic::new();
    let (status, body) = clinic.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn concurrent_bookings_of_one_slot_admit_exactly_one() {
    let clinic = TestClinic::new();
    let (doctor, _) = clinic.user("dr_achieng", Role::Doctor).await;
    let (_, desk) = clinic.user("front_desk", Role::Receptionist).await;
    let (first, _) = clinic.patient("amina", None).await;
    let (second, _) = clinic.patient("juma", None).await;

    let book = |patient_id: uuid::Uuid| {
        let app = clinic.app.clone();
        let body = json!({
            "patient_id": patient_id,
            "doctor_id": doctor.id,
            "date": "2026-03-14",
            "time": "09:30:00",
        });
        let req = request(Method::POST, "/api/v1/appointments", Some(&desk), Some(body));
        tokio::spawn(async move { app.oneshot(req).await.unwrap().status() })
    };

    let (a, b) = tokio::join!(book(first.id), book(second.id));
    let mut statuses = [a.unwrap(), b.unwrap()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn patients_always_book_for_themselves() {
    let clinic = TestClinic::new();
    let (doctor, _) = clinic.user("dr_kamau", Role::Doctor).await;
    let (me, token) = clinic.patient("wanjiru", None).await;
    let (someone_else, _) = clinic.patient("otieno", None).await;

    let (status, body) = clinic
        .send(
            Method::POST,
            "/api/v1/appointments",
            Some(&token),
            Some(json!({
                "patient_id": someone_else.id,
                "doctor_id": doctor.id,
                "date": "2026-04-01",
                "time": "11:00:00",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["patient_id"], me.id.to_string());
    assert_eq!(body["data"]["requested_by_patient"], true);
}

#[tokio::test]
async fn declined_appointments_cannot_be_approved() {
    let clinic = TestClinic::new();
    let (doctor, doctor_token) = clinic.user("dr_mwangi", Role::Doctor).await;
    let (_, token) = clinic.patient("halima", None).await;

    let (_, body) = clinic
        .send(
            Method::POST,
            "/api/v1/appointments",
            Some(&token),
            Some(json!({ "doctor_id": doctor.id, "date": "2026-05-02", "time": "14:00:00" })),
        )
        .await;
    let id = id_of(&body);

    let (status, _) = clinic
        .send(Method::POST, &format!("/api/v1/appointments/{id}/decline"), Some(&doctor_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = clinic
        .send(Method::POST, &format!("/api/v1/appointments/{id}/approve"), Some(&doctor_token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("Declined"));
}

#[tokio::test]
async fn invoices_are_paid_once_and_must_be_positive() {
    let clinic = TestClinic::new();
    let (_, desk) = clinic.user("cashier", Role::Receptionist).await;
    let (patient, _) = clinic.patient("neema", None).await;

    let (status, body) = clinic
        .send(
            Method::POST,
            "/api/v1/invoices",
            Some(&desk),
            Some(json!({ "patient_id": patient.id, "amount": "0", "description": "Consultation" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");

    let (status, body) = clinic
        .send(
            Method::POST,
            "/api/v1/invoices",
            Some(&desk),
            Some(json!({ "patient_id": patient.id, "amount": "1500.00", "description": "Consultation" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "unpaid");
    let id = id_of(&body);

    let uri = format!("/api/v1/invoices/{id}/mark-paid");
    let (status, body) = clinic.send(Method::POST, &uri, Some(&desk), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "paid");

    let (status, body) = clinic.send(Method::POST, &uri, Some(&desk), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Invoice is already marked as paid.");
}

#[tokio::test]
async fn invoices_download_as_pdf_attachments() {
    let clinic = TestClinic::new();
    let (_, desk) = clinic.user("billing", Role::Receptionist).await;
    let (patient, _) = clinic.patient("zawadi", None).await;

    let (_, body) = clinic
        .send(
            Method::POST,
            "/api/v1/invoices",
            Some(&desk),
            Some(json!({ "patient_id": patient.id, "amount": "250.00", "description": "Lab panel" })),
        )
        .await;
    let id = id_of(&body);

    let response = clinic
        .app
        .clone()
        .oneshot(request(Method::GET, &format!("/api/v1/invoices/{id}/download"), Some(&desk), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment;"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn medical_records_belong_to_the_assigned_doctor() {
    let clinic = TestClinic::new();
    let (author, author_token) = clinic.user("dr_njeri", Role::Doctor).await;
    let (_, other_token) = clinic.user("dr_ouma", Role::Doctor).await;
    let (patient, _) = clinic.patient("imani", Some(&author)).await;

    let (status, body) = clinic
        .send(
            Method::POST,
            "/api/v1/medical-records",
            Some(&author_token),
            Some(json!({ "patient_id": patient.id, "symptoms": "Fever", "diagnosis": "Malaria" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = id_of(&body);
    let uri = format!("/api/v1/medical-records/{id}");

    let (status, _) = clinic
        .send(Method::PUT, &uri, Some(&other_token), Some(json!({ "diagnosis": "Typhoid" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = clinic
        .send(Method::PUT, &uri, Some(&author_token), Some(json!({ "notes": "Review in a week" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["diagnosis"], "Malaria");
    assert_eq!(body["data"]["created_by"], author.id.to_string());
}

#[tokio::test]
async fn prescriptions_are_hidden_from_unrelated_doctors() {
    let clinic = TestClinic::new();
    let (doctor, doctor_token) = clinic.user("dr_wekesa", Role::Doctor).await;
    let (_, stranger_token) = clinic.user("dr_chebet", Role::Doctor).await;
    let (patient, patient_token) = clinic.patient("baraka", Some(&doctor)).await;

    let (_, body) = clinic
        .send(
            Method::POST,
            "/api/v1/medical-records",
            Some(&doctor_token),
            Some(json!({ "patient_id": patient.id, "symptoms": "Cough", "diagnosis": "Bronchitis" })),
        )
        .await;
    let record_id = id_of(&body);

    let (status, body) = clinic
        .send(
            Method::POST,
            "/api/v1/prescriptions",
            Some(&doctor_token),
            Some(json!({
                "patient_id": patient.id,
                "medical_record_id": record_id,
                "medication_name": "Amoxicillin",
                "dosage": "500mg",
                "duration": "7 days",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "PENDING");
    let uri = format!("/api/v1/prescriptions/{}", id_of(&body));

    let (status, body) = clinic.send(Method::GET, &uri, Some(&doctor_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["medication_name"], "Amoxicillin");
    assert_eq!(body["data"]["dosage"], "500mg");
    assert_eq!(body["data"]["duration"], "7 days");

    let (status, _) = clinic.send(Method::GET, &uri, Some(&patient_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = clinic.send(Method::GET, &uri, Some(&stranger_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rejected_signup_leaves_the_username_free() {
    let clinic = TestClinic::new();
    let (status, body) = clinic
        .send(
            Method::POST,
            "/api/v1/auth/signup",
            None,
            Some(json!({ "username": "amani", "gender": "X" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "validation_error");

    let (status, body) = clinic
        .send(
            Method::POST,
            "/api/v1/auth/signup",
            None,
            Some(json!({ "username": "amani", "gender": "F" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user"]["username"], "amani");
    assert_eq!(body["data"]["patient"]["user_id"], body["data"]["user"]["id"]);

    let profiles = clinic.server.repos.patients.count(&RecordFilter::all()).await.unwrap();
    assert_eq!(profiles, 1);
}

#[tokio::test]
async fn refusals_look_the_same_for_existing_and_unknown_ids() {
    let clinic = TestClinic::new();
    let (doctor, doctor_token) = clinic.user("dr_otieno", Role::Doctor).await;
    let (_, desk) = clinic.user("reception", Role::Receptionist).await;
    let (patient, owner_token) = clinic.patient("rehema", Some(&doctor)).await;
    let (_, stranger_token) = clinic.patient("musa", None).await;

    let (_, body) = clinic
        .send(
            Method::POST,
            "/api/v1/medical-records",
            Some(&doctor_token),
            Some(json!({ "patient_id": patient.id, "symptoms": "Headache", "diagnosis": "Migraine" })),
        )
        .await;
    let record_id = id_of(&body);

    let (_, body) = clinic
        .send(
            Method::POST,
            "/api/v1/appointments",
            Some(&owner_token),
            Some(json!({ "doctor_id": doctor.id, "date": "2026-06-03", "time": "10:00:00" })),
        )
        .await;
    let appointment_id = id_of(&body);
    let unknown = uuid::Uuid::new_v4();

    let cases = [
        (Method::PUT, "/api/v1/medical-records/{}", desk.as_str(), Some(json!({ "diagnosis": "Tension" }))),
        (Method::DELETE, "/api/v1/appointments/{}", stranger_token.as_str(), None),
        (Method::POST, "/api/v1/appointments/{}/approve", stranger_token.as_str(), None),
        (Method::POST, "/api/v1/appointments/{}/cancel", stranger_token.as_str(), None),
    ];
    for (method, template, token, body) in cases {
        let existing = if template.contains("medical-records") { &record_id } else { &appointment_id };
        let (found, _) = clinic
            .send(method.clone(), &template.replace("{}", existing), Some(token), body.clone())
            .await;
        let (missing, _) = clinic
            .send(method.clone(), &template.replace("{}", &unknown.to_string()), Some(token), body)
            .await;
        assert_eq!(found, missing, "{method} {template}");
        assert_eq!(found, StatusCode::NOT_FOUND, "{method} {template}");
    }

    let appointment = clinic
        .server
        .repos
        .appointments
        .get(appointment_id.parse().unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Requested);
}

#[tokio::test]
async fn bed_assignment_is_refused_before_the_patient_is_looked_up() {
    let clinic = TestClinic::new();
    let (_, nurse_token) = clinic.user("nurse_akinyi", Role::Nurse).await;
    let (_, doctor_token) = clinic.user("dr_kiprop", Role::Doctor).await;
    let (patient, _) = clinic.patient("faraji", None).await;

    let (status, body) = clinic
        .send(
            Method::POST,
            "/api/v1/ward/beds",
            Some(&nurse_token),
            Some(json!({ "ward": "Maternity", "bed_number": "4" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/v1/ward/beds/{}/assign", id_of(&body));

    let (status, _) = clinic
        .send(Method::POST, &uri, Some(&nurse_token), Some(json!({ "patient_id": patient.id })))
        .await;
    assert_eq!(status, StatusCode::OK);

    for patient_id in [patient.id, uuid::Uuid::new_v4()] {
        let (status, body) = clinic
            .send(Method::POST, &uri, Some(&doctor_token), Some(json!({ "patient_id": patient_id })))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error_type"], "authorization_error");
    }
}

#[tokio::test]
async fn openapi_document_is_served() {
    let clinic = TestClinic::new();
    let (status, body) = clinic.send(Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/invoices/{id}/download"].is_object());
}
