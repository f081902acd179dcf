//! Specifications for seeding the reference catalog from CSV exports.

use stem_enroll::workflows::registration::{
    LocationSelection, ReferenceCatalog, ReferenceDirectory,
};

const COURSES_CSV: &str = "\
course_id,display_name,course_duration
31,B.Sc. Nursing,4
32,Short Certificate,1
33,M.Sc.,2
";

const SUBJECTS_CSV: &str = "\
id,subject_area,sub_field
601,Health Sciences,Nursing
602,Health Sciences,Pharmacology
603,Data Sciences,Statistics
";

const LOCATIONS_CSV: &str = "\
location_id,country,state_union_territory,district,city_category
701,India,Karnataka,Bengaluru Urban,Metro
702,India,Karnataka,Mysuru,Tier 2
703,India,Kerala,Ernakulam,Tier 1
";

#[tokio::test]
async fn parsed_csv_rows_serve_catalog_queries() {
    let courses = ReferenceCatalog::parse_courses(COURSES_CSV.as_bytes()).expect("courses parse");
    let subjects =
        ReferenceCatalog::parse_subjects(SUBJECTS_CSV.as_bytes()).expect("subjects parse");
    let locations =
        ReferenceCatalog::parse_locations(LOCATIONS_CSV.as_bytes()).expect("locations parse");
    let catalog = ReferenceCatalog::new(courses, Vec::new(), Vec::new(), subjects, locations);

    let offered = catalog.course_options().await.expect("courses load");
    let names: Vec<&str> = offered.iter().map(|option| option.name.as_str()).collect();
    assert_eq!(
        names,
        ["B.Sc. Nursing", "M.Sc."],
        "the one-year certificate is not offered"
    );

    let areas = catalog.subject_areas().await.expect("areas load");
    assert_eq!(areas, ["Data Sciences", "Health Sciences"]);

    let health = catalog
        .sub_fields("Health Sciences")
        .await
        .expect("sub-fields load");
    assert_eq!(health.len(), 2);

    let states = catalog
        .location_options(&LocationSelection::country("India"))
        .await
        .expect("states load");
    assert_eq!(states.values, ["Karnataka", "Kerala"]);
    let districts = catalog
        .location_options(&LocationSelection::state("India", "Karnataka"))
        .await
        .expect("districts load");
    assert_eq!(districts.values, ["Bengaluru Urban", "Mysuru"]);
}

#[test]
fn header_order_does_not_matter() {
    let reordered = "\
display_name,course_duration,course_id
B.Des.,4,41
";
    let rows = ReferenceCatalog::parse_courses(reordered.as_bytes()).expect("parses");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].course_id, 41);
    assert_eq!(rows[0].display_name, "B.Des.");
}

#[test]
fn missing_columns_fail_the_import() {
    let truncated = "\
course_id,display_name
51,B.A.
";
    assert!(ReferenceCatalog::parse_courses(truncated.as_bytes()).is_err());
}

#[test]
fn whitespace_around_values_is_trimmed() {
    let padded = "\
course_id,display_name,course_duration
61,  B.Voc.  ,3
";
    let rows = ReferenceCatalog::parse_courses(padded.as_bytes()).expect("parses");
    assert_eq!(rows[0].display_name, "B.Voc.");
}
