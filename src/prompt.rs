use crate::document::{DocumentError, DocumentStore};

const DOCUMENT_HEADING: &str = "## Resume Content";
const DOCUMENT_INTRO: &str =
    "Here is the complete resume. Use this information to answer questions accurately:";
const GROUNDING_DIRECTIVE: &str = "Remember: Only provide information that is explicitly stated in the resume above. \
Do not invent or speculate about information not present in the resume.";

// Base instruction, then the document verbatim under its own heading,
// then the grounding directive
pub fn build_system_prompt(base_instruction: &str, document_text: &str) -> String {
    format!(
        "{base_instruction}\n\n{DOCUMENT_HEADING}\n\n{DOCUMENT_INTRO}\n\n{document_text}\n\n{GROUNDING_DIRECTIVE}"
    )
}

pub async fn assemble(base_instruction: &str, documents: &DocumentStore) -> Result<String, DocumentError> {
    let document_text = documents.read_document().await?;
    Ok(build_system_prompt(base_instruction, &document_text))
}
