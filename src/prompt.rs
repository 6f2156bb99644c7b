//! Prompt builder
//!
//! Pure composition of the completion request text. Section order is fixed:
//! role preamble, context excerpt, generation rules, user request, and, on
//! retry attempts only, the prior failure's diagnostic with a fix
//! instruction. Deterministic for identical inputs.

use crate::text::truncate_chars;

/// Character budget for the context excerpt embedded in the prompt.
const CONTEXT_CHAR_BUDGET: usize = 1500;

/// Builds the full prompt for one generation attempt.
///
/// `error_context` is present only on retries that follow a build or test
/// failure; extraction failures and service errors deliberately carry
/// nothing forward.
pub fn build_prompt(user_request: &str, error_context: Option<&str>, kb_context: &str) -> String {
    let mut prompt = format!(
        "You are a Scrypto (RadixDLT smart contract) code generator.\n\
         \n\
         CONTEXT - Key Scrypto Patterns:\n\
         {}\n\
         \n\
         INSTRUCTIONS:\n\
         1. Generate COMPLETE, COMPILABLE Scrypto code\n\
         2. Include ALL necessary imports\n\
         3. Use proper Scrypto v1.0+ syntax\n\
         4. Include basic tests\n\
         5. Follow asset-oriented programming patterns\n\
         6. Return ONLY the Rust/Scrypto code, no explanations\n\
         \n\
         USER REQUEST: {}\n",
        truncate_chars(kb_context, CONTEXT_CHAR_BUDGET),
        user_request
    );

    if let Some(error) = error_context {
        prompt.push_str(&format!(
            "\nPREVIOUS COMPILATION ERROR:\n{}\n\nPlease fix the above error and provide corrected code.\n",
            error
        ));
    }

    prompt
}
