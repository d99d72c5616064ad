//! Turning an internal case draft into a stored row: screenshots first, then the insert.

use attachments::{storage_filename, Attachment};
use chrono::Utc;
use std::collections::BTreeMap;
use store::{
    insert_record, Backend, BlobStore, CaseSection, InternalTestingCase, SectionRecord,
    StoreResult, TestStatus, UploadOptions, TESTING_IMAGES_BUCKET,
};
use tracing::{debug, error, info};

/// One checklist section as the tester filled it in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionDraft {
    pub text_feedback: String,
    pub feedback: String,
    pub status: TestStatus,
    pub image: Option<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseDraft {
    pub test_name: String,
    pub sections: BTreeMap<CaseSection, SectionDraft>,
}

impl CaseDraft {
    /// A draft with every predefined section present and empty.
    pub fn new(test_name: impl Into<String>) -> Self {
        Self {
            test_name: test_name.into(),
            sections: CaseSection::ALL
                .into_iter()
                .map(|section| (section, SectionDraft::default()))
                .collect(),
        }
    }
}

/// Upload one screenshot and return its public URL.
///
/// Failures are logged and reported as `None`; a missing screenshot never
/// blocks the case itself.
pub async fn upload_testing_image<B>(
    store: &B,
    test_name: &str,
    section: CaseSection,
    attachment: &Attachment,
) -> Option<String>
where
    B: BlobStore + ?Sized,
{
    let file_name = storage_filename(
        test_name,
        section.title(),
        Utc::now().timestamp_millis(),
        &attachment.file_name,
    );
    let options = UploadOptions::default().with_content_type(attachment.content_type());

    debug!(
        "Uploading {} ({} bytes) for section {}",
        file_name,
        attachment.len(),
        section
    );
    match store
        .upload(
            TESTING_IMAGES_BUCKET,
            &file_name,
            attachment.bytes.clone(),
            &options,
        )
        .await
    {
        Ok(path) => Some(store.public_url(TESTING_IMAGES_BUCKET, &path)),
        Err(e) => {
            error!("Error uploading image for section {}: {}", section, e);
            None
        }
    }
}

/// Store a case, uploading its screenshots one after another before the insert.
pub async fn submit_internal_case<B>(
    store: &B,
    draft: &CaseDraft,
) -> StoreResult<InternalTestingCase>
where
    B: Backend + ?Sized,
{
    let mut case = InternalTestingCase::new(draft.test_name.clone());

    for (section, section_draft) in &draft.sections {
        let image_url = match &section_draft.image {
            Some(attachment) => {
                upload_testing_image(store, &draft.test_name, *section, attachment).await
            }
            None => None,
        };

        case.sections.insert(
            *section,
            SectionRecord {
                text_feedback: section_draft.text_feedback.clone(),
                image_url,
                feedback: section_draft.feedback.clone(),
                status: section_draft.status.clone(),
            },
        );
    }

    let stored = insert_record(store, &case)
        .await
        .inspect_err(|e| error!("Error inserting internal testing case: {}", e))?;
    info!(
        "Stored internal testing case {} with {} sections",
        stored.test_name,
        stored.sections.len()
    );
    Ok(stored)
}
