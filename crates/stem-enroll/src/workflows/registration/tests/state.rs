use crate::workflows::registration::domain::LocationId;
use crate::workflows::registration::state::{
    FormStep, LocationAnswers, PersonalAnswers, RegistrationForm,
};

#[test]
fn fresh_forms_start_at_identity() {
    let form = RegistrationForm::new();
    assert_eq!(form.step(), FormStep::Identity);
    assert_eq!(form.step().number(), Some(1));
}

#[test]
fn selecting_a_state_clears_district_and_city() {
    let mut location = LocationAnswers::default();
    location.select_country("India".to_string(), LocationId(1));
    location.select_state("Maharashtra".to_string(), LocationId(10));
    location.select_district("Pune".to_string(), LocationId(100));
    location.select_city_category("Tier 1".to_string(), LocationId(501));
    assert_eq!(location.location_id(), Some(LocationId(501)));

    location.select_state("Delhi".to_string(), LocationId(20));

    assert_eq!(location.state(), Some("Delhi"));
    assert_eq!(location.district(), None);
    assert_eq!(location.city_category(), None);
    assert_eq!(location.location_id(), Some(LocationId(20)));
}

#[test]
fn selecting_a_country_resets_the_whole_chain() {
    let mut location = LocationAnswers::default();
    location.select_country("India".to_string(), LocationId(1));
    location.select_state("Maharashtra".to_string(), LocationId(10));
    location.select_district("Pune".to_string(), LocationId(100));

    location.select_country("Nepal".to_string(), LocationId(505));

    assert_eq!(location.country(), Some("Nepal"));
    assert_eq!(location.state(), None);
    assert_eq!(location.district(), None);
    assert_eq!(location.city_category(), None);
    assert_eq!(location.location_id(), Some(LocationId(505)));
}

#[test]
fn location_id_tracks_the_most_specific_level() {
    let mut location = LocationAnswers::default();
    location.select_country("India".to_string(), LocationId(1));
    assert_eq!(location.location_id(), Some(LocationId(1)));
    location.select_state("Maharashtra".to_string(), LocationId(10));
    assert_eq!(location.location_id(), Some(LocationId(10)));
    location.select_district("Pune".to_string(), LocationId(100));
    assert_eq!(location.location_id(), Some(LocationId(100)));
    location.select_city_category("Tier 1".to_string(), LocationId(501));
    assert_eq!(location.location_id(), Some(LocationId(501)));
}

#[test]
fn changing_subject_area_invalidates_the_sub_field() {
    let mut personal = PersonalAnswers::default();
    personal.select_future_subject_area("Physical Sciences".to_string());
    personal.future_sub_field = Some(crate::workflows::registration::domain::SubjectChoice {
        name: "Physics".to_string(),
        id: crate::workflows::registration::domain::SubjectId(401),
    });

    personal.select_future_subject_area("Life Sciences".to_string());

    assert_eq!(personal.future_subject_area.as_deref(), Some("Life Sciences"));
    assert_eq!(personal.future_sub_field, None);
}

#[test]
fn reselecting_the_same_area_keeps_the_sub_field() {
    let mut personal = PersonalAnswers::default();
    personal.select_future_subject_area("Physical Sciences".to_string());
    personal.future_sub_field = Some(crate::workflows::registration::domain::SubjectChoice {
        name: "Physics".to_string(),
        id: crate::workflows::registration::domain::SubjectId(401),
    });

    personal.select_future_subject_area("Physical Sciences".to_string());

    assert!(personal.future_sub_field.is_some());
}

#[test]
fn back_rewinds_one_step_and_keeps_answers() {
    let mut form = RegistrationForm::new();
    form.identity.email = "someone@gmail.com".to_string();
    form.set_step(FormStep::Personal);
    form.personal.phone = "9876543210".to_string();

    assert!(form.back());
    assert_eq!(form.step(), FormStep::Academics);
    assert!(form.back());
    assert_eq!(form.step(), FormStep::Identity);
    assert!(!form.back());

    assert_eq!(form.identity.email, "someone@gmail.com");
    assert_eq!(form.personal.phone, "9876543210");
}

#[test]
fn confirmed_forms_cannot_rewind() {
    let mut form = RegistrationForm::new();
    form.confirm();
    assert!(!form.back());
    assert_eq!(form.step(), FormStep::Confirmed);
    assert_eq!(form.step().number(), None);
}

#[test]
fn forms_round_trip_through_json() {
    let mut form = RegistrationForm::new();
    form.identity.email = "someone@gmail.com".to_string();
    form.identity.identifies_as_woman = Some(true);
    form.set_step(FormStep::Academics);

    let encoded = serde_json::to_string(&form).expect("serializes");
    let decoded: RegistrationForm = serde_json::from_str(&encoded).expect("deserializes");
    assert_eq!(decoded, form);
    assert_eq!(decoded.step(), FormStep::Academics);
}
