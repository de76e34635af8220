use crate::infra::{
    InMemoryApplicationRepository, InMemoryFileStore, TesseractCliRecognizer, TextCardRenderer,
    TranscriptRecognizer,
};
use card_intake::config::AppConfig;
use card_intake::error::AppError;
use card_intake::intake::{
    ApplicationSubmission, ApplicationType, DeclaredDetails, DocumentSlots, DocumentType,
    DocumentVerifier, IntakeError, IntakeService, VerificationMode,
};
use card_intake::telemetry;
use clap::{Args, ValueEnum};
use serde_json::json;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum DocumentArg {
    #[default]
    Aadhaar,
    Pan,
}

impl From<DocumentArg> for DocumentType {
    fn from(value: DocumentArg) -> Self {
        match value {
            DocumentArg::Aadhaar => DocumentType::Aadhaar,
            DocumentArg::Pan => DocumentType::Pan,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum ModeArg {
    Relaxed,
    Strict,
}

impl From<ModeArg> for VerificationMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Relaxed => VerificationMode::Relaxed,
            ModeArg::Strict => VerificationMode::Strict,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ExtractArgs {
    /// File holding text already recognized from the document
    #[arg(long, conflicts_with = "image", required_unless_present = "image")]
    pub(crate) text: Option<PathBuf>,
    /// Document image to run through the local `tesseract` binary
    #[arg(long)]
    pub(crate) image: Option<PathBuf>,
    /// Which document the input shows
    #[arg(long, value_enum, default_value_t = DocumentArg::Aadhaar)]
    pub(crate) document: DocumentArg,
    /// Verification mode (defaults to INTAKE_VERIFICATION_MODE)
    #[arg(long, value_enum)]
    pub(crate) mode: Option<ModeArg>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reject documents that carry no keyword evidence
    #[arg(long)]
    pub(crate) strict: bool,
}

pub(crate) fn run_extract(args: ExtractArgs) -> Result<(), AppError> {
    let ExtractArgs {
        text,
        image,
        document,
        mode,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let mode = mode
        .map(VerificationMode::from)
        .unwrap_or(config.intake.verification_mode);
    let document_type = DocumentType::from(document);

    let verification = match (text, image) {
        (Some(path), _) => {
            let text = std::fs::read_to_string(&path)?;
            DocumentVerifier::new(Arc::new(TranscriptRecognizer), mode)
                .verify_text(&text, document_type)
        }
        (None, Some(path)) => {
            ensure_image(&path)?;
            let image = std::fs::read(&path)?;
            let recognizer = TesseractCliRecognizer::new(config.intake.ocr_language);
            DocumentVerifier::new(Arc::new(recognizer), mode).verify_image(&image, document_type)
        }
        (None, None) => {
            return Err(AppError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "either --text or --image is required",
            )))
        }
    };

    println!("{}", serde_json::to_string_pretty(&verification)?);
    Ok(())
}

fn ensure_image(path: &Path) -> Result<(), AppError> {
    let guess = mime_guess::from_path(path).first();
    match guess {
        Some(mime) if mime.type_() == mime_guess::mime::IMAGE => Ok(()),
        _ => Err(AppError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("'{}' does not look like an image file", path.display()),
        ))),
    }
}

const SAMPLE_AADHAAR: &str =
    "GOVERNMENT OF INDIA\nRAVI KUMAR\nDOB: 01/01/1990\nMALE\n1234 5678 9012";
const SAMPLE_PAN: &str =
    "INCOME TAX DEPARTMENT\nRAVI KUMAR\nPermanent Account Number\nABCDE1234F";

fn sample_submission(
    full_name: &str,
    batch: &str,
    files: &InMemoryFileStore,
) -> ApplicationSubmission {
    ApplicationSubmission {
        personal_details: DeclaredDetails {
            full_name: full_name.to_string(),
            email: "ravi.kumar@example.in".to_string(),
            mobile: "9876543210".to_string(),
            city: "Bengaluru".to_string(),
            state: "Karnataka".to_string(),
            gender: None,
            id_number: None,
        },
        documents: DocumentSlots {
            aadhaar: Some(files.put(
                &format!("{batch}/aadhaar.png"),
                SAMPLE_AADHAAR.as_bytes(),
            )),
            pan: Some(files.put(&format!("{batch}/pan.png"), SAMPLE_PAN.as_bytes())),
            photo: Some(files.put(&format!("{batch}/photo.png"), b"portrait")),
        },
        application_type: ApplicationType::Free,
        referral_code: None,
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let mode = if args.strict {
        VerificationMode::Strict
    } else {
        VerificationMode::Relaxed
    };

    let files = Arc::new(InMemoryFileStore::default());
    let service = IntakeService::new(
        Arc::new(InMemoryApplicationRepository::default()),
        files.clone(),
        DocumentVerifier::new(Arc::new(TranscriptRecognizer), mode),
        Arc::new(TextCardRenderer),
    );

    println!("Card intake demo ({mode:?} verification)");

    println!("\n1. Matching documents for 'Ravi Kumar'");
    let receipt = service.submit(sample_submission("Ravi Kumar", "demo-1", &files))?;
    println!("{}", serde_json::to_string_pretty(&receipt)?);

    println!("\n2. Same documents declared as 'Suresh Singh'");
    match service.submit(sample_submission("Suresh Singh", "demo-2", &files)) {
        Ok(unexpected) => println!(
            "unexpectedly accepted as {}",
            unexpected.application.record.unique_code
        ),
        Err(IntakeError::Assembly(rejection)) => {
            let payload = json!({
                "success": false,
                "message": rejection.title(),
                "error": rejection.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Err(other) => return Err(other.into()),
    }
    println!(
        "uploads held after both submissions: {} (rejected files are released)",
        files.len()
    );

    println!("\n3. Card download for {}", receipt.application.id.0);
    let card = service.download_card(&receipt.application.id)?;
    print!("{}", String::from_utf8_lossy(&card.bytes));

    Ok(())
}
