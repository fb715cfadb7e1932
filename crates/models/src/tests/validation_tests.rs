use serde_json::json;

use crate::doctor::DoctorMetadata;
use crate::patient::{normalize_clinical_profile, PatientMetadata};
use crate::user::{validate_email, Role, UserProfile};

fn profile(full_name: &str, email: &str) -> UserProfile {
    UserProfile {
        full_name: full_name.into(),
        email: email.into(),
        phone: None,
        birth_date: None,
        picture_url: None,
    }
}

#[test]
fn email_plausibility() {
    assert!(validate_email("ana@example.com").is_ok());
    assert!(validate_email("  ana@example.com  ").is_ok());
    assert!(validate_email("ana@example").is_err());
    assert!(validate_email("@example.com").is_err());
    assert!(validate_email("ana@").is_err());
    assert!(validate_email("ana ruiz@example.com").is_err());
    assert!(validate_email("").is_err());
}

#[test]
fn profile_normalization_trims_and_lowercases() {
    let p = UserProfile {
        full_name: "  Ana Ruiz  ".into(),
        email: "Ana@Example.COM".into(),
        phone: Some("  ".into()),
        birth_date: Some("1975-04-02".into()),
        picture_url: Some(" https://cdn.example.com/a.png ".into()),
    }
    .normalized()
    .unwrap();

    assert_eq!(p.full_name, "Ana Ruiz");
    assert_eq!(p.email, "ana@example.com");
    assert_eq!(p.phone, None);
    assert_eq!(p.birth_date.as_deref(), Some("1975-04-02"));
    assert_eq!(p.picture_url.as_deref(), Some("https://cdn.example.com/a.png"));
}

#[test]
fn profile_rejects_blank_name_and_bad_dates() {
    assert!(profile("   ", "a@b.com").normalized().is_err());

    let mut p = profile("Ana", "a@b.com");
    p.birth_date = Some("02-04-1975".into());
    assert!(p.normalized().is_err());

    let mut p = profile("Ana", "a@b.com");
    p.birth_date = Some("1975-13-40".into());
    assert!(p.normalized().is_err());
}

#[test]
fn role_wire_values() {
    assert_eq!(serde_json::to_value(Role::Patient).unwrap(), json!("paciente"));
    assert_eq!(serde_json::to_value(Role::Doctor).unwrap(), json!("doctor"));
    assert_eq!(Role::Patient.as_str(), "paciente");
}

#[test]
fn patient_metadata_requires_dni() {
    let m = PatientMetadata { dni: "  ".into(), clinical_profile: None };
    assert!(m.normalized().is_err());

    let m = PatientMetadata { dni: " 12345678 ".into(), clinical_profile: None };
    assert_eq!(m.normalized().unwrap().dni, "12345678");
}

#[test]
fn clinical_profile_accepts_object_or_encoded_string() {
    let obj = normalize_clinical_profile(Some(json!({"allergies": ["penicillin"]}))).unwrap();
    assert!(obj.unwrap().is_object());

    let from_str =
        normalize_clinical_profile(Some(json!(r#"{"allergies":[]}"#))).unwrap();
    assert!(from_str.unwrap().is_object());

    assert!(normalize_clinical_profile(Some(json!("not json"))).is_err());
    assert_eq!(normalize_clinical_profile(None).unwrap(), None);
    assert_eq!(normalize_clinical_profile(Some(json!(null))).unwrap(), None);
}

#[test]
fn doctor_metadata_requires_cmp_and_specialty() {
    let m = DoctorMetadata { cmp: "".into(), specialty: "gyn".into(), dni: None };
    assert!(m.normalized().is_err());

    let m = DoctorMetadata { cmp: "C123".into(), specialty: " ".into(), dni: None };
    assert!(m.normalized().is_err());

    let m = DoctorMetadata {
        cmp: " C123 ".into(),
        specialty: " Ginecología ".into(),
        dni: Some("".into()),
    }
    .normalized()
    .unwrap();
    assert_eq!(m.cmp, "C123");
    assert_eq!(m.specialty, "Ginecología");
    assert_eq!(m.dni, None);
}
