use crate::workflows::registration::catalog::ReferenceCatalog;
use crate::workflows::registration::directory::ReferenceDirectory;
use crate::workflows::registration::domain::{LocationId, LocationSelection};

fn catalog() -> ReferenceCatalog {
    ReferenceCatalog::sample()
}

#[tokio::test]
async fn course_options_exclude_one_year_certificates() {
    let options = catalog().course_options().await.expect("courses load");
    let names: Vec<&str> = options.iter().map(|option| option.name.as_str()).collect();
    assert_eq!(names, ["B.Sc.", "B.Tech", "Integrated M.Sc."]);
    assert!(options.iter().all(|option| option.duration_years > 1));
}

#[tokio::test]
async fn course_options_carry_id_and_duration() {
    let options = catalog().course_options().await.expect("courses load");
    let btech = options
        .iter()
        .find(|option| option.name == "B.Tech")
        .expect("B.Tech offered");
    assert_eq!(btech.id.0, 12);
    assert_eq!(btech.duration_years, 4);
}

#[tokio::test]
async fn subject_options_are_distinct_and_sorted() {
    let options = catalog().subject_options().await.expect("subjects load");
    let names: Vec<&str> = options.iter().map(|option| option.name.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
    assert!(names.contains(&"Physics"));
    assert!(names.contains(&"Computer Science"));
}

#[tokio::test]
async fn sub_fields_are_scoped_to_their_area() {
    let catalog = catalog();
    let physical = catalog
        .sub_fields("Physical Sciences")
        .await
        .expect("sub-fields load");
    let names: Vec<&str> = physical.iter().map(|option| option.name.as_str()).collect();
    assert_eq!(names, ["Chemistry", "Physics"]);

    let unknown = catalog.sub_fields("Astrology").await.expect("query runs");
    assert!(unknown.is_empty());
}

#[tokio::test]
async fn subject_areas_are_distinct_and_sorted() {
    let areas = catalog().subject_areas().await.expect("areas load");
    assert_eq!(
        areas,
        [
            "Engineering",
            "Life Sciences",
            "Mathematical Sciences",
            "Physical Sciences"
        ]
    );
}

#[tokio::test]
async fn location_levels_narrow_step_by_step() {
    let catalog = catalog();

    let countries = catalog
        .location_options(&LocationSelection::default())
        .await
        .expect("countries load");
    assert_eq!(countries.values, ["India", "Nepal"]);

    let states = catalog
        .location_options(&LocationSelection::country("India"))
        .await
        .expect("states load");
    assert_eq!(states.values, ["Delhi", "Maharashtra"]);

    let districts = catalog
        .location_options(&LocationSelection::state("India", "Maharashtra"))
        .await
        .expect("districts load");
    assert_eq!(districts.values, ["Nagpur", "Pune"]);

    let cities = catalog
        .location_options(&LocationSelection::district("India", "Maharashtra", "Pune"))
        .await
        .expect("cities load");
    assert_eq!(cities.values, ["Tier 1", "Tier 2"]);
    assert_eq!(cities.id_of("Tier 1"), Some(LocationId(501)));
    assert_eq!(cities.id_of("Tier 2"), Some(LocationId(502)));
}

#[tokio::test]
async fn repeated_values_resolve_to_the_smallest_id() {
    // Maharashtra appears on rows 501, 502, and 503; the lookup must behave
    // like DISTINCT ON ordered by (value, id).
    let states = catalog()
        .location_options(&LocationSelection::country("India"))
        .await
        .expect("states load");
    assert_eq!(states.id_of("Maharashtra"), Some(LocationId(501)));
}

#[tokio::test]
async fn inconsistent_parent_yields_no_options() {
    let districts = catalog()
        .location_options(&LocationSelection::state("India", "Bagmati"))
        .await
        .expect("query runs");
    assert!(districts.is_empty());
    assert_eq!(districts.id_of("Kathmandu"), None);
}

#[test]
fn csv_rows_parse_into_the_catalog() {
    let courses = "course_id,display_name,course_duration\n21,B.Pharm,4\n22,Diploma,1\n";
    let parsed = ReferenceCatalog::parse_courses(courses.as_bytes()).expect("csv parses");
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].display_name, "B.Pharm");
    assert_eq!(parsed[1].course_duration, 1);
}

#[test]
fn malformed_csv_is_rejected() {
    let bad = "course_id,display_name,course_duration\nnot-a-number,B.Pharm,4\n";
    assert!(ReferenceCatalog::parse_courses(bad.as_bytes()).is_err());
}
