// src/client/profiles.rs
//! Candidate resumes, company pages and recruiter profiles

use reqwest::multipart::Form;
use reqwest::Method;
use tracing::info;

use super::{file_part, ApiClient};
use crate::cache::PROFILE_TTL;
use crate::error::ApiError;
use crate::image::SelectedImage;
use crate::types::records::{Company, Recruiter, Resume};
use crate::validation::{CompanyForm, RecruiterForm, ResumeForm, Validate};

const RESUME_ENDPOINT: &str = "/create-resume";
const COMPANY_ENDPOINT: &str = "/company";
const RECRUITER_ENDPOINT: &str = "/recruiter";

pub(crate) const MY_RESUME_KEY: &str = "resume:me";
pub(crate) const RESUME_PREFIX: &str = "resume:";
pub(crate) const COMPANY_PREFIX: &str = "company:";
pub(crate) const RECRUITER_PREFIX: &str = "recruiter:";

pub(crate) fn resume_key(user_id: &str) -> String {
    format!("{}{}", RESUME_PREFIX, user_id)
}

fn image_form(field: &str, image: &SelectedImage) -> Result<Form, ApiError> {
    Ok(Form::new().part(
        field.to_string(),
        file_part(&image.bytes, &image.file_name, image.content_type)?,
    ))
}

impl ApiClient {
    // ===== Resume =====

    /// The signed-in candidate's resume, if one has been created.
    pub async fn my_resume(&self) -> Result<Option<Resume>, ApiError> {
        if let Some(hit) = self.cache().get::<Resume>(MY_RESUME_KEY).await {
            return Ok(Some(hit));
        }
        let result = self
            .fetch::<Resume>(self.request(Method::GET, &format!("{}/me", RESUME_ENDPOINT)))
            .await;
        let resume = match result {
            Ok(envelope) => envelope.into_optional()?,
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(e),
        };
        if let Some(resume) = &resume {
            self.cache().put(MY_RESUME_KEY, resume, PROFILE_TTL).await;
        }
        Ok(resume)
    }

    /// Public candidate page.
    pub async fn candidate(&self, user_id: &str) -> Result<Resume, ApiError> {
        self.get_cached(
            &resume_key(user_id),
            &format!("{}/{}", RESUME_ENDPOINT, user_id),
            PROFILE_TTL,
        )
        .await
    }

    /// Create or update the signed-in candidate's resume.
    pub async fn save_resume(&self, form: &ResumeForm) -> Result<Resume, ApiError> {
        form.validate()?;
        let resume: Resume = self.send_json(Method::POST, RESUME_ENDPOINT, form).await?;
        self.cache().invalidate_prefix(RESUME_PREFIX).await;
        info!("Saved resume {}", resume.id);
        Ok(resume)
    }

    pub async fn upload_resume_photo(&self, image: &SelectedImage) -> Result<Resume, ApiError> {
        let resume: Resume = self
            .post_multipart(&format!("{}/photo", RESUME_ENDPOINT), image_form("photo", image)?)
            .await?;
        self.cache().invalidate_prefix(RESUME_PREFIX).await;
        Ok(resume)
    }

    // ===== Company =====

    pub async fn company(&self, company_id: &str) -> Result<Company, ApiError> {
        self.get_cached(
            &format!("{}{}", COMPANY_PREFIX, company_id),
            &format!("{}/{}", COMPANY_ENDPOINT, company_id),
            PROFILE_TTL,
        )
        .await
    }

    pub async fn update_company(
        &self,
        company_id: &str,
        form: &CompanyForm,
    ) -> Result<Company, ApiError> {
        form.validate()?;
        let company: Company = self
            .send_json(
                Method::PUT,
                &format!("{}/{}", COMPANY_ENDPOINT, company_id),
                form,
            )
            .await?;
        self.cache()
            .invalidate(&format!("{}{}", COMPANY_PREFIX, company_id))
            .await;
        Ok(company)
    }

    pub async fn upload_company_logo(
        &self,
        company_id: &str,
        image: &SelectedImage,
    ) -> Result<Company, ApiError> {
        self.upload_company_image(company_id, "logo", image).await
    }

    pub async fn upload_company_banner(
        &self,
        company_id: &str,
        image: &SelectedImage,
    ) -> Result<Company, ApiError> {
        self.upload_company_image(company_id, "banner", image).await
    }

    async fn upload_company_image(
        &self,
        company_id: &str,
        kind: &str,
        image: &SelectedImage,
    ) -> Result<Company, ApiError> {
        let company: Company = self
            .post_multipart(
                &format!("{}/{}/{}", COMPANY_ENDPOINT, company_id, kind),
                image_form(kind, image)?,
            )
            .await?;
        self.cache()
            .invalidate(&format!("{}{}", COMPANY_PREFIX, company_id))
            .await;
        Ok(company)
    }

    // ===== Recruiter =====

    pub async fn recruiter(&self, recruiter_id: &str) -> Result<Recruiter, ApiError> {
        self.get_cached(
            &format!("{}{}", RECRUITER_PREFIX, recruiter_id),
            &format!("{}/{}", RECRUITER_ENDPOINT, recruiter_id),
            PROFILE_TTL,
        )
        .await
    }

    pub async fn update_recruiter(&self, form: &RecruiterForm) -> Result<Recruiter, ApiError> {
        form.validate()?;
        let recruiter: Recruiter = self
            .send_json(
                Method::PUT,
                &format!("{}/profile", RECRUITER_ENDPOINT),
                form,
            )
            .await?;
        self.cache().invalidate_prefix(RECRUITER_PREFIX).await;
        Ok(recruiter)
    }

    pub async fn upload_recruiter_photo(
        &self,
        image: &SelectedImage,
    ) -> Result<Recruiter, ApiError> {
        let recruiter: Recruiter = self
            .post_multipart(
                &format!("{}/photo", RECRUITER_ENDPOINT),
                image_form("photo", image)?,
            )
            .await?;
        self.cache().invalidate_prefix(RECRUITER_PREFIX).await;
        Ok(recruiter)
    }
}
