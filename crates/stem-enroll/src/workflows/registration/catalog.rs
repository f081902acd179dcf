//! In-memory reference catalog, seedable from CSV exports of the reference
//! tables. Serves demo mode and tests; production reads the same tables
//! through [`super::postgres::PgReferenceDirectory`].

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use super::directory::{
    CourseOption, DirectoryError, LocationOptions, NamedOption, ReferenceDirectory,
};
use super::domain::{CollegeId, CourseId, LocationId, LocationSelection, SubjectId, UniversityId};

#[derive(Debug, Clone, Deserialize)]
pub struct CourseRow {
    pub course_id: i32,
    pub display_name: String,
    pub course_duration: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UniversityRow {
    pub university_id: i32,
    pub standard_university_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollegeRow {
    pub college_id: i32,
    pub standard_college_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubjectRow {
    pub id: i32,
    pub subject_area: String,
    pub sub_field: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationRow {
    pub location_id: i32,
    pub country: String,
    pub state_union_territory: String,
    pub district: String,
    pub city_category: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogImportError {
    #[error("failed to read {file}: {source}")]
    Io {
        file: String,
        source: std::io::Error,
    },
    #[error("failed to parse {file}: {source}")]
    Csv { file: String, source: csv::Error },
}

/// Immutable, aggressively cacheable snapshot of the reference tables.
#[derive(Debug, Default, Clone)]
pub struct ReferenceCatalog {
    courses: Vec<CourseRow>,
    universities: Vec<UniversityRow>,
    colleges: Vec<CollegeRow>,
    subjects: Vec<SubjectRow>,
    locations: Vec<LocationRow>,
}

impl ReferenceCatalog {
    pub fn new(
        courses: Vec<CourseRow>,
        universities: Vec<UniversityRow>,
        colleges: Vec<CollegeRow>,
        subjects: Vec<SubjectRow>,
        locations: Vec<LocationRow>,
    ) -> Self {
        Self {
            courses,
            universities,
            colleges,
            subjects,
            locations,
        }
    }

    /// Load the catalog from a directory holding `courses.csv`,
    /// `universities.csv`, `colleges.csv`, `subjects.csv`, and
    /// `locations.csv`.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, CatalogImportError> {
        let dir = dir.as_ref();
        Ok(Self {
            courses: read_rows(dir, "courses.csv")?,
            universities: read_rows(dir, "universities.csv")?,
            colleges: read_rows(dir, "colleges.csv")?,
            subjects: read_rows(dir, "subjects.csv")?,
            locations: read_rows(dir, "locations.csv")?,
        })
    }

    pub fn parse_courses<R: Read>(reader: R) -> Result<Vec<CourseRow>, csv::Error> {
        parse_rows(reader)
    }

    pub fn parse_locations<R: Read>(reader: R) -> Result<Vec<LocationRow>, csv::Error> {
        parse_rows(reader)
    }

    pub fn parse_subjects<R: Read>(reader: R) -> Result<Vec<SubjectRow>, csv::Error> {
        parse_rows(reader)
    }

    /// Small built-in dataset for the CLI demo and tests.
    pub fn sample() -> Self {
        let courses = vec![
            CourseRow {
                course_id: 11,
                display_name: "B.Sc.".to_string(),
                course_duration: 3,
            },
            CourseRow {
                course_id: 12,
                display_name: "B.Tech".to_string(),
                course_duration: 4,
            },
            CourseRow {
                course_id: 13,
                display_name: "Integrated M.Sc.".to_string(),
                course_duration: 5,
            },
            // One-year certificate: present in the table, never offered.
            CourseRow {
                course_id: 14,
                display_name: "Certificate Course".to_string(),
                course_duration: 1,
            },
        ];

        let universities = vec![
            UniversityRow {
                university_id: 201,
                standard_university_name: "Savitribai Phule Pune University".to_string(),
            },
            UniversityRow {
                university_id: 202,
                standard_university_name: "University of Delhi".to_string(),
            },
        ];

        let colleges = vec![
            CollegeRow {
                college_id: 301,
                standard_college_name: "Fergusson College".to_string(),
            },
            CollegeRow {
                college_id: 302,
                standard_college_name: "Miranda House".to_string(),
            },
        ];

        let subjects = vec![
            SubjectRow {
                id: 401,
                subject_area: "Physical Sciences".to_string(),
                sub_field: "Physics".to_string(),
            },
            SubjectRow {
                id: 402,
                subject_area: "Physical Sciences".to_string(),
                sub_field: "Chemistry".to_string(),
            },
            SubjectRow {
                id: 403,
                subject_area: "Mathematical Sciences".to_string(),
                sub_field: "Mathematics".to_string(),
            },
            SubjectRow {
                id: 404,
                subject_area: "Life Sciences".to_string(),
                sub_field: "Microbiology".to_string(),
            },
            SubjectRow {
                id: 405,
                subject_area: "Engineering".to_string(),
                sub_field: "Computer Science".to_string(),
            },
        ];

        let locations = vec![
            LocationRow {
                location_id: 501,
                country: "India".to_string(),
                state_union_territory: "Maharashtra".to_string(),
                district: "Pune".to_string(),
                city_category: "Tier 1".to_string(),
            },
            LocationRow {
                location_id: 502,
                country: "India".to_string(),
                state_union_territory: "Maharashtra".to_string(),
                district: "Pune".to_string(),
                city_category: "Tier 2".to_string(),
            },
            LocationRow {
                location_id: 503,
                country: "India".to_string(),
                state_union_territory: "Maharashtra".to_string(),
                district: "Nagpur".to_string(),
                city_category: "Tier 2".to_string(),
            },
            LocationRow {
                location_id: 504,
                country: "India".to_string(),
                state_union_territory: "Delhi".to_string(),
                district: "New Delhi".to_string(),
                city_category: "Metro".to_string(),
            },
            LocationRow {
                location_id: 505,
                country: "Nepal".to_string(),
                state_union_territory: "Bagmati".to_string(),
                district: "Kathmandu".to_string(),
                city_category: "Capital".to_string(),
            },
        ];

        Self::new(courses, universities, colleges, subjects, locations)
    }
}

fn read_rows<T: for<'de> Deserialize<'de>>(
    dir: &Path,
    file: &str,
) -> Result<Vec<T>, CatalogImportError> {
    let path = dir.join(file);
    let handle = std::fs::File::open(&path).map_err(|source| CatalogImportError::Io {
        file: file.to_string(),
        source,
    })?;
    parse_rows(handle).map_err(|source| CatalogImportError::Csv {
        file: file.to_string(),
        source,
    })
}

fn parse_rows<R: Read, T: for<'de> Deserialize<'de>>(reader: R) -> Result<Vec<T>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    csv_reader.deserialize().collect()
}

/// Distinct name to smallest id, iterated in alphabetical order.
fn distinct_options<Id: Copy>(
    pairs: impl IntoIterator<Item = (String, i32)>,
    wrap: impl Fn(i32) -> Id,
) -> Vec<NamedOption<Id>> {
    let mut by_name: BTreeMap<String, i32> = BTreeMap::new();
    for (name, id) in pairs {
        by_name
            .entry(name)
            .and_modify(|existing| *existing = (*existing).min(id))
            .or_insert(id);
    }
    by_name
        .into_iter()
        .map(|(name, id)| NamedOption {
            name,
            id: wrap(id),
        })
        .collect()
}

#[async_trait]
impl ReferenceDirectory for ReferenceCatalog {
    async fn course_options(&self) -> Result<Vec<CourseOption>, DirectoryError> {
        let mut by_name: BTreeMap<String, (i32, u8)> = BTreeMap::new();
        for row in self.courses.iter().filter(|row| row.course_duration != 1) {
            by_name
                .entry(row.display_name.clone())
                .and_modify(|existing| {
                    if row.course_id < existing.0 {
                        *existing = (row.course_id, row.course_duration);
                    }
                })
                .or_insert((row.course_id, row.course_duration));
        }
        Ok(by_name
            .into_iter()
            .map(|(name, (id, duration_years))| CourseOption {
                name,
                id: CourseId(id),
                duration_years,
            })
            .collect())
    }

    async fn university_options(&self) -> Result<Vec<NamedOption<UniversityId>>, DirectoryError> {
        Ok(distinct_options(
            self.universities
                .iter()
                .map(|row| (row.standard_university_name.clone(), row.university_id)),
            UniversityId,
        ))
    }

    async fn college_options(&self) -> Result<Vec<NamedOption<CollegeId>>, DirectoryError> {
        Ok(distinct_options(
            self.colleges
                .iter()
                .map(|row| (row.standard_college_name.clone(), row.college_id)),
            CollegeId,
        ))
    }

    async fn subject_options(&self) -> Result<Vec<NamedOption<SubjectId>>, DirectoryError> {
        Ok(distinct_options(
            self.subjects
                .iter()
                .map(|row| (row.sub_field.clone(), row.id)),
            SubjectId,
        ))
    }

    async fn subject_areas(&self) -> Result<Vec<String>, DirectoryError> {
        let mut areas: Vec<String> = self
            .subjects
            .iter()
            .map(|row| row.subject_area.clone())
            .collect();
        areas.sort();
        areas.dedup();
        Ok(areas)
    }

    async fn sub_fields(&self, area: &str) -> Result<Vec<NamedOption<SubjectId>>, DirectoryError> {
        Ok(distinct_options(
            self.subjects
                .iter()
                .filter(|row| row.subject_area == area)
                .map(|row| (row.sub_field.clone(), row.id)),
            SubjectId,
        ))
    }

    async fn location_options(
        &self,
        selection: &LocationSelection,
    ) -> Result<LocationOptions, DirectoryError> {
        let pairs: Vec<(String, LocationId)> = match (
            selection.country.as_deref(),
            selection.state.as_deref(),
            selection.district.as_deref(),
        ) {
            (None, _, _) => self
                .locations
                .iter()
                .map(|row| (row.country.clone(), LocationId(row.location_id)))
                .collect(),
            (Some(country), None, _) => self
                .locations
                .iter()
                .filter(|row| row.country == country)
                .map(|row| {
                    (
                        row.state_union_territory.clone(),
                        LocationId(row.location_id),
                    )
                })
                .collect(),
            (Some(country), Some(state), None) => self
                .locations
                .iter()
                .filter(|row| row.country == country && row.state_union_territory == state)
                .map(|row| (row.district.clone(), LocationId(row.location_id)))
                .collect(),
            (Some(country), Some(state), Some(district)) => self
                .locations
                .iter()
                .filter(|row| {
                    row.country == country
                        && row.state_union_territory == state
                        && row.district == district
                })
                .map(|row| (row.city_category.clone(), LocationId(row.location_id)))
                .collect(),
        };

        Ok(LocationOptions::from_pairs(pairs))
    }
}
