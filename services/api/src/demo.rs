use std::sync::Arc;

use chrono::NaiveDate;
use clap::Args;

use crate::infra::InMemoryRegistrationStore;
use stem_enroll::error::AppError;
use stem_enroll::workflows::registration::{
    InstitutionPick, LocationFields, ReferenceCatalog, RegistrationForm, RegistrationPolicy,
    RegistrationService, StepFields, StepOneFields, StepOutcome, StepThreeFields, StepTwoFields,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Email address for the demo applicant
    #[arg(long, default_value = "new.student@gmail.com")]
    pub(crate) email: String,
    /// Full name for the demo applicant
    #[arg(long, default_value = "asha rani")]
    pub(crate) full_name: String,
    /// 10-digit WhatsApp number for the demo applicant
    #[arg(long, default_value = "9876543210")]
    pub(crate) phone: String,
    /// Optional professor referral to exercise the conditional write
    #[arg(long)]
    pub(crate) professor_name: Option<String>,
}

fn print_outcome(step: &str, outcome: &StepOutcome) {
    if outcome.advance {
        println!("- {step}: passed");
    } else {
        println!("- {step}: blocked");
        for error in outcome.errors() {
            println!("    {error}");
        }
    }
}

/// Walk one registration through all three gates and the final submission
/// against the in-memory adapters and the built-in sample catalog.
pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let store = Arc::new(InMemoryRegistrationStore::default());
    let directory = Arc::new(ReferenceCatalog::sample());
    let service = RegistrationService::new(
        store.clone(),
        directory,
        RegistrationPolicy::default(),
    );

    println!("Registration pipeline demo (in-memory store, sample catalog)");

    let (form, outcome) = service
        .submit_step(
            RegistrationForm::new(),
            StepFields::One(StepOneFields {
                email: args.email.clone(),
                identifies_as_woman: Some(true),
            }),
        )
        .await
        .map_err(demo_error)?;
    print_outcome("step 1 (identity)", &outcome);
    if !outcome.advance {
        return Ok(());
    }

    let (form, outcome) = service
        .submit_step(
            form,
            StepFields::Two(StepTwoFields {
                full_name: args.full_name.clone(),
                academic_year: Some("2nd Year".to_string()),
                degree: Some("B.Tech".to_string()),
                university: Some(InstitutionPick::Listed {
                    name: "Savitribai Phule Pune University".to_string(),
                }),
                college: Some(InstitutionPick::Listed {
                    name: "Fergusson College".to_string(),
                }),
                college_location: LocationFields {
                    country: Some("India".to_string()),
                    state: Some("Maharashtra".to_string()),
                    district: Some("Pune".to_string()),
                    city_category: Some("Tier 1".to_string()),
                },
                subjects: vec!["Physics".to_string(), "Mathematics".to_string()],
            }),
        )
        .await
        .map_err(demo_error)?;
    print_outcome("step 2 (academics)", &outcome);
    if !outcome.advance {
        return Ok(());
    }

    let (form, outcome) = service
        .submit_step(
            form,
            StepFields::Three(StepThreeFields {
                phone: args.phone.clone(),
                date_of_birth: NaiveDate::from_ymd_opt(2004, 6, 15),
                future_subject_area: Some("Physical Sciences".to_string()),
                future_sub_field: Some("Physics".to_string()),
                hometown: LocationFields {
                    country: Some("India".to_string()),
                    state: Some("Maharashtra".to_string()),
                    district: Some("Nagpur".to_string()),
                    city_category: Some("Tier 2".to_string()),
                },
                caste_category: Some("General".to_string()),
                income_range: Some("Below or Equal to 3 lacs per year (INR)".to_string()),
                motivation: Some(
                    "I want to build a research career in physics and need the mentorship."
                        .to_string(),
                ),
                challenges: None,
                professor_name: args.professor_name.clone(),
                professor_phone: None,
                partner_organization: Some("Avanti Fellows".to_string()),
            }),
        )
        .await
        .map_err(demo_error)?;
    print_outcome("step 3 (personal)", &outcome);
    if !outcome.advance {
        return Ok(());
    }

    let (form, result) = service.submit_final(form).await;
    match result {
        Ok(receipt) => {
            println!("- final submission: persisted");
            println!("\nReceipt");
            println!("- applicant id: {}", receipt.applicant_id.0);
            println!(
                "- enrollment window: {} -> {}",
                receipt.enrollment.start_year, receipt.enrollment.end_year
            );
            println!("- submitted at: {}", receipt.submitted_at);
            println!("- form state: {}", form.step().label());
            println!("\nStore");
            println!("- applicants: {}", store.applicant_count());
            println!("- registration bundles: {}", store.bundle_count());
        }
        Err(error) => {
            println!("- final submission: failed");
            println!("    {error}");
        }
    }

    Ok(())
}

fn demo_error(error: stem_enroll::workflows::registration::RegistrationError) -> AppError {
    match error {
        stem_enroll::workflows::registration::RegistrationError::Store(err) => AppError::Store(err),
        stem_enroll::workflows::registration::RegistrationError::Directory(err) => AppError::Io(
            std::io::Error::new(std::io::ErrorKind::Other, err.to_string()),
        ),
    }
}
