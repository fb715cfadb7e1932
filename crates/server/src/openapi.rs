use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct ProfileDoc {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub picture_url: Option<String>,
}

#[derive(ToSchema)]
pub struct CredentialsDoc {
    pub password: Option<String>,
}

#[derive(ToSchema)]
pub struct PatientMetadataDoc {
    pub dni: String,
    #[schema(value_type = Option<Object>)]
    pub clinical_profile: Option<serde_json::Value>,
}

#[derive(ToSchema)]
pub struct CreatePatientRequest {
    pub profile: ProfileDoc,
    pub metadata: PatientMetadataDoc,
    pub credentials: Option<CredentialsDoc>,
}

#[derive(ToSchema)]
pub struct DoctorMetadataDoc {
    pub cmp: String,
    pub specialty: String,
    pub dni: Option<String>,
}

#[derive(ToSchema)]
pub struct CreateDoctorRequest {
    pub profile: ProfileDoc,
    pub metadata: DoctorMetadataDoc,
    pub credentials: Option<CredentialsDoc>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::users::create_patient,
        crate::routes::users::list_patients,
        crate::routes::users::create_doctor,
        crate::routes::users::list_doctors,
    ),
    components(
        schemas(
            ProfileDoc,
            CredentialsDoc,
            PatientMetadataDoc,
            CreatePatientRequest,
            DoctorMetadataDoc,
            CreateDoctorRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "users")
    )
)]
pub struct ApiDoc;
