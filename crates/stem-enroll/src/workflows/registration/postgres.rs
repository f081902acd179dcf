//! Postgres-backed store and reference directory. Every filter value is a
//! bound parameter; the schema this module expects:
//!
//! ```text
//! applicants            (id bigserial PK, email text UNIQUE, first_name,
//!                        last_name, gender, phone, date_of_birth date,
//!                        caste_category, annual_family_income,
//!                        location_id int)
//! applicant_education   (applicant_id, course_id, current_year_of_study,
//!                        subject_ids int[], interest_sub_field_id,
//!                        university_id, college_id, college_location_id,
//!                        start_year, end_year)
//! registration_details  (applicant_id, form_details jsonb,
//!                        submitted_at timestamptz)
//! referral_professors   (applicant_id, college_id, name, phone)
//! course_mapping        (course_id, display_name, course_duration)
//! university_mapping    (university_id, standard_university_name)
//! college_mapping       (college_id, standard_college_name)
//! subject_mapping       (id, subject_area, sub_field)
//! location_mapping      (location_id, country, state_union_territory,
//!                        district, city_category)
//! ```

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;

use super::directory::{
    CourseOption, DirectoryError, LocationOptions, NamedOption, ReferenceDirectory,
};
use super::domain::{
    ApplicantId, CollegeId, CourseId, LocationId, LocationSelection, SubjectId, UniversityId,
};
use super::store::{ApplicantUpsert, RegistrationBundle, RegistrationStore, StoreError};

fn map_store_error(error: sqlx::Error) -> StoreError {
    match &error {
        sqlx::Error::Database(db) if db.constraint().is_some() => {
            StoreError::Constraint(db.to_string())
        }
        _ => StoreError::Unavailable(error.to_string()),
    }
}

fn map_directory_error(error: sqlx::Error) -> DirectoryError {
    DirectoryError::Unavailable(error.to_string())
}

/// Write-side adapter over a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgRegistrationStore {
    pool: PgPool,
}

impl PgRegistrationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(map_store_error)?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RegistrationStore for PgRegistrationStore {
    async fn email_registered(&self, email: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM applicants WHERE lower(email) = lower($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_store_error)?;
        Ok(row.is_some())
    }

    async fn upsert_applicant(
        &self,
        applicant: &ApplicantUpsert,
    ) -> Result<ApplicantId, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO applicants (
                email, first_name, last_name, gender, phone, date_of_birth,
                caste_category, annual_family_income, location_id
            )
            VALUES (lower($1), $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (email) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                phone = EXCLUDED.phone,
                date_of_birth = EXCLUDED.date_of_birth,
                caste_category = EXCLUDED.caste_category,
                annual_family_income = EXCLUDED.annual_family_income,
                location_id = EXCLUDED.location_id
            RETURNING id
            "#,
        )
        .bind(&applicant.email)
        .bind(&applicant.first_name)
        .bind(&applicant.last_name)
        .bind(&applicant.gender)
        .bind(&applicant.phone)
        .bind(applicant.date_of_birth)
        .bind(&applicant.caste_category)
        .bind(&applicant.annual_family_income)
        .bind(applicant.location_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_store_error)?;

        let row = row.ok_or(StoreError::IdentifierUnavailable)?;
        let id: i64 = row
            .try_get(0)
            .map_err(|_| StoreError::IdentifierUnavailable)?;
        Ok(ApplicantId(id))
    }

    async fn persist_registration(
        &self,
        applicant_id: ApplicantId,
        bundle: &RegistrationBundle,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_store_error)?;

        let education = &bundle.education;
        let subject_ids: Vec<i32> = education.subject_ids.iter().map(|id| id.0).collect();
        sqlx::query(
            r#"
            INSERT INTO applicant_education (
                applicant_id, course_id, current_year_of_study, subject_ids,
                interest_sub_field_id, university_id, college_id,
                college_location_id, start_year, end_year
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(applicant_id.0)
        .bind(education.course_id.0)
        .bind(i16::from(education.current_year_of_study))
        .bind(&subject_ids)
        .bind(education.interest_sub_field_id.0)
        .bind(education.university_id.map(|id| id.0))
        .bind(education.college_id.map(|id| id.0))
        .bind(education.college_location_id.0)
        .bind(education.enrollment.start_year)
        .bind(education.enrollment.end_year)
        .execute(&mut *tx)
        .await
        .map_err(map_store_error)?;

        sqlx::query(
            "INSERT INTO registration_details (applicant_id, form_details, submitted_at) \
             VALUES ($1, $2, $3)",
        )
        .bind(applicant_id.0)
        .bind(&bundle.metadata.form_details)
        .bind(bundle.metadata.submitted_at)
        .execute(&mut *tx)
        .await
        .map_err(map_store_error)?;

        if let Some(referral) = &bundle.referral {
            sqlx::query(
                "INSERT INTO referral_professors (applicant_id, college_id, name, phone) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(applicant_id.0)
            .bind(referral.college_id.map(|id| id.0))
            .bind(referral.professor_name.as_deref())
            .bind(referral.professor_phone.as_deref())
            .execute(&mut *tx)
            .await
            .map_err(map_store_error)?;
        }

        tx.commit().await.map_err(map_store_error)
    }
}

/// Read-side adapter over the reference tables.
#[derive(Debug, Clone)]
pub struct PgReferenceDirectory {
    pool: PgPool,
}

impl PgReferenceDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferenceDirectory for PgReferenceDirectory {
    async fn course_options(&self) -> Result<Vec<CourseOption>, DirectoryError> {
        let rows = sqlx::query(
            "SELECT DISTINCT ON (display_name) display_name, course_id, course_duration \
             FROM course_mapping WHERE course_duration <> 1 \
             ORDER BY display_name, course_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_directory_error)?;

        rows.into_iter()
            .map(|row| {
                let name: String = row.try_get("display_name").map_err(map_directory_error)?;
                let id: i32 = row.try_get("course_id").map_err(map_directory_error)?;
                let duration: i32 = row.try_get("course_duration").map_err(map_directory_error)?;
                Ok(CourseOption {
                    name,
                    id: CourseId(id),
                    duration_years: duration.clamp(0, i32::from(u8::MAX)) as u8,
                })
            })
            .collect()
    }

    async fn university_options(&self) -> Result<Vec<NamedOption<UniversityId>>, DirectoryError> {
        let rows = sqlx::query(
            "SELECT DISTINCT ON (standard_university_name) standard_university_name, university_id \
             FROM university_mapping ORDER BY standard_university_name, university_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_directory_error)?;

        rows.into_iter()
            .map(|row| {
                let name: String = row
                    .try_get("standard_university_name")
                    .map_err(map_directory_error)?;
                let id: i32 = row.try_get("university_id").map_err(map_directory_error)?;
                Ok(NamedOption {
                    name,
                    id: UniversityId(id),
                })
            })
            .collect()
    }

    async fn college_options(&self) -> Result<Vec<NamedOption<CollegeId>>, DirectoryError> {
        let rows = sqlx::query(
            "SELECT DISTINCT ON (standard_college_name) standard_college_name, college_id \
             FROM college_mapping ORDER BY standard_college_name, college_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_directory_error)?;

        rows.into_iter()
            .map(|row| {
                let name: String = row
                    .try_get("standard_college_name")
                    .map_err(map_directory_error)?;
                let id: i32 = row.try_get("college_id").map_err(map_directory_error)?;
                Ok(NamedOption {
                    name,
                    id: CollegeId(id),
                })
            })
            .collect()
    }

    async fn subject_options(&self) -> Result<Vec<NamedOption<SubjectId>>, DirectoryError> {
        let rows = sqlx::query(
            "SELECT DISTINCT ON (sub_field) sub_field, id \
             FROM subject_mapping ORDER BY sub_field, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_directory_error)?;

        rows.into_iter()
            .map(|row| {
                let name: String = row.try_get("sub_field").map_err(map_directory_error)?;
                let id: i32 = row.try_get("id").map_err(map_directory_error)?;
                Ok(NamedOption {
                    name,
                    id: SubjectId(id),
                })
            })
            .collect()
    }

    async fn subject_areas(&self) -> Result<Vec<String>, DirectoryError> {
        let rows =
            sqlx::query("SELECT DISTINCT subject_area FROM subject_mapping ORDER BY subject_area")
                .fetch_all(&self.pool)
                .await
                .map_err(map_directory_error)?;

        rows.into_iter()
            .map(|row| row.try_get("subject_area").map_err(map_directory_error))
            .collect()
    }

    async fn sub_fields(&self, area: &str) -> Result<Vec<NamedOption<SubjectId>>, DirectoryError> {
        let rows = sqlx::query(
            "SELECT DISTINCT ON (sub_field) sub_field, id \
             FROM subject_mapping WHERE subject_area = $1 \
             ORDER BY sub_field, id",
        )
        .bind(area)
        .fetch_all(&self.pool)
        .await
        .map_err(map_directory_error)?;

        rows.into_iter()
            .map(|row| {
                let name: String = row.try_get("sub_field").map_err(map_directory_error)?;
                let id: i32 = row.try_get("id").map_err(map_directory_error)?;
                Ok(NamedOption {
                    name,
                    id: SubjectId(id),
                })
            })
            .collect()
    }

    async fn location_options(
        &self,
        selection: &LocationSelection,
    ) -> Result<LocationOptions, DirectoryError> {
        let rows = match (
            selection.country.as_deref(),
            selection.state.as_deref(),
            selection.district.as_deref(),
        ) {
            (None, _, _) => {
                sqlx::query(
                    "SELECT DISTINCT ON (country) country AS value, location_id \
                     FROM location_mapping ORDER BY country, location_id",
                )
                .fetch_all(&self.pool)
                .await
            }
            (Some(country), None, _) => {
                sqlx::query(
                    "SELECT DISTINCT ON (state_union_territory) state_union_territory AS value, location_id \
                     FROM location_mapping WHERE country = $1 \
                     ORDER BY state_union_territory, location_id",
                )
                .bind(country)
                .fetch_all(&self.pool)
                .await
            }
            (Some(country), Some(state), None) => {
                sqlx::query(
                    "SELECT DISTINCT ON (district) district AS value, location_id \
                     FROM location_mapping WHERE country = $1 AND state_union_territory = $2 \
                     ORDER BY district, location_id",
                )
                .bind(country)
                .bind(state)
                .fetch_all(&self.pool)
                .await
            }
            (Some(country), Some(state), Some(district)) => {
                sqlx::query(
                    "SELECT DISTINCT ON (city_category) city_category AS value, location_id \
                     FROM location_mapping \
                     WHERE country = $1 AND state_union_territory = $2 AND district = $3 \
                     ORDER BY city_category, location_id",
                )
                .bind(country)
                .bind(state)
                .bind(district)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_directory_error)?;

        let pairs = rows
            .into_iter()
            .map(|row| {
                let value: String = row.try_get("value").map_err(map_directory_error)?;
                let id: i32 = row.try_get("location_id").map_err(map_directory_error)?;
                Ok((value, LocationId(id)))
            })
            .collect::<Result<Vec<_>, DirectoryError>>()?;

        Ok(LocationOptions::from_pairs(pairs))
    }
}
